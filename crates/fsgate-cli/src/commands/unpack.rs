//! Unpack command implementation: import a local ZIP archive.

use super::Manager;
use super::local_file_name;
use crate::cli::UnpackArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use fsgate_core::FileManager;
use std::fs;

pub fn execute(args: &UnpackArgs, manager: &Manager, formatter: &dyn OutputFormatter) -> Result<()> {
    let filename = local_file_name(&args.archive)?;
    let bytes = fs::read(&args.archive)
        .with_context(|| format!("Failed to read archive {}", args.archive.display()))?;

    let mut limits = manager.config().limits;
    if let Some(max) = args.max_entries {
        limits.max_entries = max;
    }
    if let Some(max) = args.max_total_size {
        limits.max_total_size = max;
    }
    if let Some(max) = args.max_entry_size {
        limits.max_entry_size = max;
    }

    let result = if limits == manager.config().limits {
        manager.extract_archive(&args.dest_dir, &filename, &bytes)
    } else {
        let config = manager.config().clone().with_limits(limits);
        FileManager::with_config(manager.source().clone(), config).extract_archive(
            &args.dest_dir,
            &filename,
            &bytes,
        )
    };
    let report = add_path_context(result, &filename)?;

    formatter.format_extraction_result(&report)
}
