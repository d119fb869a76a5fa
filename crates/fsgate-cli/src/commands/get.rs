//! Get command implementation: download a file.

use super::Manager;
use super::Output;
use super::pipe;
use super::write_output;
use crate::cli::GetArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use crate::progress::TransferProgress;
use anyhow::Result;

/// Downloads a file to a local path or stdout.
///
/// Nothing is reported when the file goes to stdout, so the content
/// stream stays clean.
pub fn execute(
    args: &GetArgs,
    manager: &Manager,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let mut download = add_path_context(manager.read_for_download(&args.path), &args.path)?;
    let name = download.name().to_string();
    let size = download.size();

    let output = Output::select(args.output.as_deref(), &name);
    let progress = show_progress.then(|| TransferProgress::new(size, "Downloading"));
    let written = write_output(&output, args.force, |w| {
        pipe(&mut download, w, progress.as_ref())
    })?;
    drop(progress);

    match output {
        Output::Stdout => Ok(()),
        Output::File(path) => formatter.format_download(&name, written, &path),
    }
}
