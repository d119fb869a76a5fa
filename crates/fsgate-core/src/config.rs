//! Configuration for file operations and the archive codec.

use std::path::PathBuf;

/// Limits applied while extracting an uploaded archive.
///
/// Both the sizes declared in the ZIP central directory and the bytes
/// actually decompressed are checked against these limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Maximum number of entries in one archive.
    pub max_entries: usize,

    /// Maximum total uncompressed size in bytes.
    pub max_total_size: u64,

    /// Maximum uncompressed size of a single entry in bytes.
    pub max_entry_size: u64,
}

impl Default for ArchiveLimits {
    /// Default values:
    /// - `max_entries`: 10,000
    /// - `max_total_size`: 1 GiB
    /// - `max_entry_size`: 512 MiB
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_total_size: 1024 * 1024 * 1024,
            max_entry_size: 512 * 1024 * 1024,
        }
    }
}

/// Configuration for a [`FileManager`](crate::FileManager).
///
/// # Examples
///
/// ```
/// use fsgate_core::ManagerConfig;
///
/// let config = ManagerConfig::default()
///     .with_chunk_size(32 * 1024)
///     .with_compression_level(Some(9));
/// assert_eq!(config.chunk_size, 32 * 1024);
/// assert!(config.is_archive_name("Photos.ZIP"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Size of the chunks yielded by an archive export stream.
    pub chunk_size: usize,

    /// DEFLATE level for exported archives (1-9, `Some(0)` stores entries
    /// uncompressed, `None` uses 6).
    pub compression_level: Option<u8>,

    /// Extension (without the dot) an uploaded archive must carry.
    pub archive_extension: String,

    /// Extraction limits.
    pub limits: ArchiveLimits,

    /// Directory for export spool files; `None` uses the system temp
    /// directory.
    pub spool_dir: Option<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            compression_level: Some(6),
            archive_extension: "zip".to_string(),
            limits: ArchiveLimits::default(),
            spool_dir: None,
        }
    }
}

impl ManagerConfig {
    /// Sets the export chunk size. Zero is clamped to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sets the export compression level, clamped to 0-9.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<u8>) -> Self {
        self.compression_level = level.map(|l| l.min(9));
        self
    }

    /// Sets the extraction limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ArchiveLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the directory export spool files are created in.
    #[must_use]
    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = Some(dir.into());
        self
    }

    /// Returns the archive name with the archive extension stripped, if the
    /// name carries it. Comparison is case-insensitive.
    #[must_use]
    pub fn strip_archive_extension<'a>(&self, filename: &'a str) -> Option<&'a str> {
        let suffix_len = self.archive_extension.len() + 1;
        if filename.len() <= suffix_len || !filename.is_char_boundary(filename.len() - suffix_len)
        {
            return None;
        }
        let (stem, suffix) = filename.split_at(filename.len() - suffix_len);
        let ext = suffix.strip_prefix('.')?;
        ext.eq_ignore_ascii_case(&self.archive_extension)
            .then_some(stem)
    }

    /// Returns `true` if `filename` carries the archive extension.
    #[must_use]
    pub fn is_archive_name(&self, filename: &str) -> bool {
        self.strip_archive_extension(filename).is_some()
    }
}
