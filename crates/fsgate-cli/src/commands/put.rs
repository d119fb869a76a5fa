//! Put command implementation: upload a local file.

use super::Manager;
use super::local_file_name;
use crate::cli::PutArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use std::fs;

pub fn execute(args: &PutArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => local_file_name(&args.file)?,
    };
    let bytes = fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let report = add_path_context(manager.upload_file(&args.dest_dir, &name, &bytes), &name)?;
    formatter.format_upload(&report)
}
