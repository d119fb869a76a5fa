//! Archive quota tracking.

use crate::ArchiveLimits;
use crate::FsError;
use crate::QuotaResource;
use crate::Result;

/// Tracks entry count and uncompressed bytes while an archive is planned
/// and written.
///
/// Declared sizes are checked while planning; [`QuotaTracker::entry_budget`]
/// bounds the bytes actually decompressed for each entry, because the sizes
/// in a ZIP central directory are attacker-controlled.
#[derive(Debug)]
pub struct QuotaTracker {
    limits: ArchiveLimits,
    entries: usize,
    declared_bytes: u64,
    written_bytes: u64,
}

impl QuotaTracker {
    /// Creates a new quota tracker.
    #[must_use]
    pub fn new(limits: ArchiveLimits) -> Self {
        Self {
            limits,
            entries: 0,
            declared_bytes: 0,
            written_bytes: 0,
        }
    }

    /// Records an entry with its declared uncompressed size.
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` if the entry count, the entry size or the
    /// running declared total is over the limit.
    pub fn record_entry(&mut self, declared_size: u64) -> Result<()> {
        self.entries += 1;
        if self.entries > self.limits.max_entries {
            return Err(FsError::QuotaExceeded {
                resource: QuotaResource::EntryCount {
                    current: self.entries,
                    max: self.limits.max_entries,
                },
            });
        }

        if declared_size > self.limits.max_entry_size {
            return Err(FsError::QuotaExceeded {
                resource: QuotaResource::EntrySize {
                    size: declared_size,
                    max: self.limits.max_entry_size,
                },
            });
        }

        self.declared_bytes = self.declared_bytes.checked_add(declared_size).ok_or(
            FsError::QuotaExceeded {
                resource: QuotaResource::IntegerOverflow,
            },
        )?;
        if self.declared_bytes > self.limits.max_total_size {
            return Err(FsError::QuotaExceeded {
                resource: QuotaResource::TotalSize {
                    current: self.declared_bytes,
                    max: self.limits.max_total_size,
                },
            });
        }

        Ok(())
    }

    /// Returns how many bytes the next entry may still decompress to.
    #[must_use]
    pub fn entry_budget(&self) -> u64 {
        let remaining_total = self
            .limits
            .max_total_size
            .saturating_sub(self.written_bytes);
        remaining_total.min(self.limits.max_entry_size)
    }

    /// Records bytes actually written for an entry.
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` if the running total passes the limit.
    pub fn record_written(&mut self, bytes: u64) -> Result<()> {
        self.written_bytes =
            self.written_bytes
                .checked_add(bytes)
                .ok_or(FsError::QuotaExceeded {
                    resource: QuotaResource::IntegerOverflow,
                })?;
        if self.written_bytes > self.limits.max_total_size {
            return Err(FsError::QuotaExceeded {
                resource: QuotaResource::TotalSize {
                    current: self.written_bytes,
                    max: self.limits.max_total_size,
                },
            });
        }
        Ok(())
    }

    /// Returns the number of entries recorded.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Returns the total bytes written.
    #[must_use]
    pub fn written_bytes(&self) -> u64 {
        self.written_bytes
    }
}
