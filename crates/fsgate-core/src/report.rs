//! Reports returned by mutating operations.

use std::time::Duration;

use crate::types::VirtualPath;

/// Report of an archive extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Virtual path of the folder the archive was extracted into.
    pub folder: VirtualPath,

    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directories created, excluding the extraction folder.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Number of entries skipped (symlinks, self-referencing names).
    pub entries_skipped: usize,

    /// Duration of the extraction.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates an empty report for `folder`.
    #[must_use]
    pub fn new(folder: VirtualPath) -> Self {
        Self {
            folder,
            ..Self::default()
        }
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns the number of items written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of a single-file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Virtual path of the new file.
    pub path: VirtualPath,
    /// Bytes written.
    pub size: u64,
}
