//! List command implementation

use super::Manager;
use crate::cli::ListArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &ListArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let entries = add_path_context(manager.list(&args.path), &args.path)?;
    formatter.format_listing(&args.path, &entries, args.human_readable)
}
