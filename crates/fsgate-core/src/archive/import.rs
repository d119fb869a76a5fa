//! Zip-slip safe ZIP extraction.
//!
//! Extraction happens in two passes. The plan pass reads the central
//! directory only: every entry name is validated and every declared size
//! is checked against the quotas before a single byte is written. The
//! write pass then decompresses into a staging directory, bounding each
//! entry by what the quotas still allow.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Cursor;
use std::path::Path;

use zip::ZipArchive;

use crate::ArchiveLimits;
use crate::FsError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_limit;
use crate::report::ExtractionReport;
use crate::security::QuotaTracker;
use crate::types::EntryPath;

/// File type bits of a Unix mode.
const S_IFMT: u32 = 0o170_000;
/// Symlink file type.
const S_IFLNK: u32 = 0o120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlannedKind {
    Directory,
    File { mode: Option<u32> },
}

#[derive(Debug)]
struct PlannedEntry {
    index: usize,
    path: EntryPath,
    kind: PlannedKind,
}

/// A validated archive, ready to be written.
pub(crate) struct ImportPlan<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    entries: Vec<PlannedEntry>,
    quota: QuotaTracker,
    skipped: usize,
    warnings: Vec<String>,
}

impl std::fmt::Debug for ImportPlan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPlan")
            .field("entries", &self.entries)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

impl<'a> ImportPlan<'a> {
    /// Opens `bytes` as a ZIP archive and validates every entry against
    /// `extraction_root`.
    ///
    /// # Errors
    ///
    /// - `InvalidArchive` if `bytes` is not a readable ZIP archive
    /// - `PathTraversal` for the first entry that escapes
    /// - `QuotaExceeded` if declared sizes or the entry count are too large
    pub(crate) fn new(bytes: &'a [u8], extraction_root: &Path, limits: ArchiveLimits) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| FsError::InvalidArchive(format!("failed to open ZIP archive: {e}")))?;

        let mut quota = QuotaTracker::new(limits);
        let mut entries = Vec::with_capacity(archive.len());
        let mut skipped = 0;
        let mut warnings = Vec::new();

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index).map_err(|e| {
                FsError::InvalidArchive(format!("failed to read ZIP entry: {e}"))
            })?;
            let name = entry.name().to_string();

            let path = EntryPath::validate(&name, extraction_root).inspect_err(|_| {
                tracing::warn!(entry = %name, "archive entry escapes the extraction folder");
            })?;
            quota.record_entry(entry.size())?;

            let mode = entry.unix_mode();
            if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
                tracing::debug!(entry = %name, "skipping symlink entry");
                warnings.push(format!("skipped symlink: {name}"));
                skipped += 1;
                continue;
            }
            if path.is_empty() {
                skipped += 1;
                continue;
            }

            let kind = if entry.is_dir() {
                PlannedKind::Directory
            } else {
                PlannedKind::File { mode }
            };
            entries.push(PlannedEntry { index, path, kind });
        }

        Ok(Self {
            archive,
            entries,
            quota,
            skipped,
            warnings,
        })
    }

    /// Writes every planned entry below `staging`.
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` if an entry decompresses past its budget
    /// - `InvalidArchive` if entry data is corrupt
    /// - `Io` on filesystem failures
    pub(crate) fn write_into(mut self, staging: &Path, report: &mut ExtractionReport) -> Result<()> {
        let mut buffer = CopyBuffer::new();
        report.entries_skipped += self.skipped;
        report.warnings.append(&mut self.warnings);

        for planned in &self.entries {
            let target = staging.join(planned.path.as_path());

            match planned.kind {
                PlannedKind::Directory => {
                    fs::create_dir_all(&target)?;
                    report.directories_created += 1;
                }
                PlannedKind::File { mode } => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }

                    let mut entry = self.archive.by_index(planned.index).map_err(|e| {
                        FsError::InvalidArchive(format!("failed to read ZIP entry: {e}"))
                    })?;
                    let mut out = File::create(&target)?;
                    let written =
                        copy_with_limit(&mut entry, &mut out, &mut buffer, self.quota.entry_budget())
                            .map_err(corrupt_data_is_invalid)?;
                    self.quota.record_written(written)?;

                    apply_mode(&out, mode)?;
                    report.files_extracted += 1;
                    report.bytes_written += written;
                }
            }
        }

        Ok(())
    }
}

fn corrupt_data_is_invalid(error: FsError) -> FsError {
    match error {
        FsError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
            FsError::InvalidArchive(format!("corrupt entry data: {e}"))
        }
        other => other,
    }
}

#[cfg(unix)]
fn apply_mode(file: &File, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    // Permission bits only; setuid, setgid and sticky are dropped.
    if let Some(mode) = mode {
        file.set_permissions(fs::Permissions::from_mode(mode & 0o777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_file: &File, _mode: Option<u32>) -> Result<()> {
    Ok(())
}
