//! Resolve command implementation.

use super::Manager;
use crate::cli::PathArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &PathArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let resolved = add_path_context(manager.resolve(&args.path), &args.path)?;
    let virtual_path = add_path_context(manager.to_virtual(&resolved), &args.path)?;
    formatter.format_resolved(resolved.as_path(), &virtual_path)
}
