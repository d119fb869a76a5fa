//! Subcommand implementations.

pub mod completion;
pub mod get;
pub mod list;
pub mod manage;
pub mod pack;
pub mod put;
pub mod resolve;
pub mod unpack;

use crate::cli::Cli;
use crate::config::FileConfig;
use crate::progress::TransferProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use fsgate_core::FileManager;
use fsgate_core::RootRegistry;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// The manager every command operates on.
pub type Manager = FileManager<RootRegistry>;

/// Builds the manager from `--config` and `--root`.
pub fn build_manager(cli: &Cli) -> Result<Manager> {
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    let registry = file_config.registry(&cli.roots)?;
    tracing::debug!(roots = registry.len(), "configured roots");
    Ok(FileManager::with_config(
        registry,
        file_config.manager_config(),
    ))
}

/// Where a downloaded file or exported archive is written.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// `-` selects stdout; no path selects `default_name` in the current
    /// directory.
    pub fn select(requested: Option<&Path>, default_name: &str) -> Self {
        match requested {
            Some(path) if path.as_os_str() == "-" => Self::Stdout,
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::File(PathBuf::from(default_name)),
        }
    }
}

/// Opens a local output file, refusing to clobber unless `force` is set.
fn create_output(path: &Path, force: bool) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            anyhow::anyhow!(
                "Output file already exists: {}\n\
                 HINT: Use --force to overwrite it.",
                path.display()
            )
        } else {
            anyhow::Error::from(e)
                .context(format!("Failed to create output file: {}", path.display()))
        }
    })
}

/// Runs `write` against `output`, removing a partially written file on
/// failure.
pub fn write_output<F>(output: &Output, force: bool, write: F) -> Result<u64>
where
    F: FnOnce(&mut dyn Write) -> io::Result<u64>,
{
    match output {
        Output::Stdout => {
            let mut stdout = io::stdout().lock();
            let written = write(&mut stdout).context("Failed to write to stdout")?;
            stdout.flush()?;
            Ok(written)
        }
        Output::File(path) => {
            let mut file = create_output(path, force)?;
            match write(&mut file).and_then(|n| file.sync_all().map(|()| n)) {
                Ok(written) => Ok(written),
                Err(e) => {
                    drop(file);
                    let _ = std::fs::remove_file(path);
                    Err(anyhow::Error::from(e).context(format!("Failed to write {}", path.display())))
                }
            }
        }
    }
}

/// Copies `reader` into `writer`, advancing `progress` as bytes go by.
pub fn pipe(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    progress: Option<&TransferProgress>,
) -> io::Result<u64> {
    let mut buffer = vec![0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        total += n as u64;
        if let Some(progress) = progress {
            progress.advance(n as u64);
        }
    }
}

/// Returns the final component of a local path as a name to upload under.
fn local_file_name(path: &Path) -> Result<String> {
    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => bail!("Not a file path: {}", path.display()),
    }
}
