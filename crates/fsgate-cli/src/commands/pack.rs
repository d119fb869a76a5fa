//! Pack command implementation: export a folder as a ZIP archive.

use super::Manager;
use super::Output;
use super::write_output;
use crate::cli::PackArgs;
use crate::error::add_path_context;
use crate::output::OutputFormatter;
use crate::progress::TransferProgress;
use anyhow::Result;
use fsgate_core::ArchiveChunks;
use fsgate_core::FileManager;
use std::io;
use std::io::Write;

pub fn execute(
    args: &PackArgs,
    manager: &Manager,
    formatter: &dyn OutputFormatter,
    show_progress: bool,
) -> Result<()> {
    let stream = match args.compression_level {
        Some(level) => {
            let config = manager
                .config()
                .clone()
                .with_compression_level(Some(level));
            FileManager::with_config(manager.source().clone(), config)
                .build_archive_stream(&args.dir)
        }
        None => manager.build_archive_stream(&args.dir),
    };
    let stream = add_path_context(stream, &args.dir)?;

    let size = stream.size();
    let (filename, chunks) = stream.into_parts();
    let output = Output::select(args.output.as_deref(), &filename);

    let progress = show_progress.then(|| TransferProgress::new(size, "Packing"));
    write_output(&output, args.force, |w| {
        write_chunks(chunks, w, progress.as_ref())
    })?;
    drop(progress);

    match output {
        Output::Stdout => Ok(()),
        Output::File(path) => formatter.format_pack(&filename, size, &path),
    }
}

/// Drains the archive stream into `writer`.
///
/// The spool file behind `chunks` is removed when the iterator finishes or
/// is dropped on error.
fn write_chunks(
    chunks: ArchiveChunks,
    writer: &mut dyn Write,
    progress: Option<&TransferProgress>,
) -> io::Result<u64> {
    let mut total = 0u64;
    for chunk in chunks {
        let chunk = chunk.map_err(io::Error::other)?;
        writer.write_all(&chunk)?;
        total += chunk.len() as u64;
        if let Some(progress) = progress {
            progress.advance(chunk.len() as u64);
        }
    }
    Ok(total)
}
