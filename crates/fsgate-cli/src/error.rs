//! Error conversion utilities for CLI.
//!
//! Converts fsgate-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use fsgate_core::FsError;

/// Converts `FsError` to a user-friendly anyhow error with context.
///
/// `subject` is the path or archive name the user passed on the command
/// line.
pub fn convert_fs_error(err: FsError, subject: &str) -> anyhow::Error {
    match err {
        FsError::Configuration => anyhow!(
            "No allowed root directories are configured\n\
             HINT: Pass --root <DIR> or enable a root in the config file."
        ),
        FsError::PathDenied { path } => anyhow!(
            "Access denied: '{path}' is outside every allowed root\n\
             HINT: Paths are resolved against the configured roots; '..' segments and \
             symbolic links cannot leave them."
        ),
        FsError::PathInvalid { path, reason } => anyhow!("Invalid path '{path}': {reason}"),
        FsError::NotFound { path } => anyhow!("Not found: '{path}'"),
        FsError::NotADirectory { path } => anyhow!(
            "Not a directory: '{path}'\n\
             HINT: The destination must be an existing folder."
        ),
        FsError::AlreadyExists { path } => anyhow!(
            "Already exists: '{path}'\n\
             HINT: Rename or delete the existing item first."
        ),
        FsError::PathTraversal { entry } => anyhow!(
            "Security violation: Archive '{subject}' attempted path traversal with '{entry}'\n\
             HINT: This archive may be malicious. Nothing was extracted."
        ),
        FsError::QuotaExceeded { resource } => anyhow!(
            "Extraction limit exceeded for '{subject}': {resource}\n\
             HINT: Use --max-entries, --max-total-size, or --max-entry-size to increase limits."
        ),
        FsError::UnsupportedFormat { filename } => anyhow!(
            "Archive format not supported: {filename}\n\
             HINT: Only .zip archives can be unpacked."
        ),
        FsError::InvalidArchive(reason) => anyhow!(
            "Invalid archive '{subject}': {reason}\n\
             HINT: The archive may be corrupted or malformed."
        ),
        FsError::Io(io_err) => anyhow!("I/O error while processing '{subject}': {io_err}"),
        _ => anyhow::Error::from(err).context(format!("Error processing '{subject}'")),
    }
}

/// Adds path context to a core result.
pub fn add_path_context<T>(result: Result<T, FsError>, subject: &str) -> anyhow::Result<T> {
    result.map_err(|e| convert_fs_error(e, subject))
}
