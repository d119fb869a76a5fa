//! Error types for root-confined file operations.
//!
//! Every variant that names a path carries the caller-supplied (virtual)
//! path or the archive entry name, never a resolved host path.

use thiserror::Error;

/// Result type alias using `FsError`.
pub type Result<T> = std::result::Result<T, FsError>;

/// Represents a specific archive quota that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaResource {
    /// Too many entries in the archive.
    EntryCount {
        /// Current entry count.
        current: usize,
        /// Maximum allowed entry count.
        max: usize,
    },
    /// Total uncompressed size exceeded.
    TotalSize {
        /// Current total size in bytes.
        current: u64,
        /// Maximum allowed total size in bytes.
        max: u64,
    },
    /// A single entry is larger than allowed.
    EntrySize {
        /// Entry size in bytes.
        size: u64,
        /// Maximum allowed entry size in bytes.
        max: u64,
    },
    /// Integer overflow detected in quota tracking.
    IntegerOverflow,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryCount { current, max } => {
                write!(f, "quota exceeded: entry count ({current} > {max})")
            }
            Self::TotalSize { current, max } => {
                write!(f, "quota exceeded: total size ({current} > {max})")
            }
            Self::EntrySize { size, max } => {
                write!(f, "quota exceeded: single entry size ({size} > {max})")
            }
            Self::IntegerOverflow => {
                write!(f, "quota exceeded: integer overflow in quota tracking")
            }
        }
    }
}

/// Boundary classification of an error.
///
/// The surrounding transport maps these onto its own status vocabulary;
/// [`ErrorKind::status_code`] gives the HTTP equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request or input.
    BadRequest,
    /// Access outside the permitted roots.
    Forbidden,
    /// The addressed item does not exist.
    NotFound,
    /// The target already exists.
    Conflict,
    /// Upload exceeds configured limits.
    TooLarge,
    /// Server-side fault or broken invariant.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code equivalent of this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::TooLarge => 413,
            Self::Internal => 500,
        }
    }
}

/// Errors produced by the path resolver, file operations and archive codec.
#[derive(Error, Debug)]
pub enum FsError {
    /// No allowed root is configured.
    #[error("no allowed root directories are configured")]
    Configuration,

    /// The path string cannot be parsed or is not acceptable as a name.
    #[error("invalid path '{path}': {reason}")]
    PathInvalid {
        /// The caller-supplied path.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// The path lies outside every allowed root.
    #[error("access to '{path}' is not allowed")]
    PathDenied {
        /// The caller-supplied path.
        path: String,
    },

    /// The addressed item does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The caller-supplied path.
        path: String,
    },

    /// The addressed item is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The caller-supplied path.
        path: String,
    },

    /// The target already exists.
    #[error("already exists: {path}")]
    AlreadyExists {
        /// Virtual path of the existing item.
        path: String,
    },

    /// A previously resolved path is no longer under any root.
    #[error("resolved path is no longer under any allowed root")]
    NotUnderAnyRoot,

    /// The uploaded archive name does not carry the expected extension.
    #[error("unsupported archive format: {filename}")]
    UnsupportedFormat {
        /// The uploaded file name.
        filename: String,
    },

    /// An archive entry would be written outside the extraction folder.
    #[error("archive entry escapes the extraction folder: {entry}")]
    PathTraversal {
        /// The archive entry name.
        entry: String,
    },

    /// The archive is corrupted or not a ZIP file.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Archive quota exceeded.
    #[error("{resource}")]
    QuotaExceeded {
        /// Description of the exceeded resource.
        resource: QuotaResource,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FsError {
    pub(crate) fn invalid(path: impl Into<String>, reason: &'static str) -> Self {
        Self::PathInvalid {
            path: path.into(),
            reason,
        }
    }

    pub(crate) fn denied(path: impl Into<String>) -> Self {
        Self::PathDenied { path: path.into() }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    pub(crate) fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Returns `true` if this error represents a rejected escape attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsgate_core::FsError;
    ///
    /// let err = FsError::PathTraversal {
    ///     entry: "../../evil".to_string(),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = FsError::NotFound {
    ///     path: "missing.txt".to_string(),
    /// };
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathDenied { .. } | Self::PathTraversal { .. } | Self::QuotaExceeded { .. }
        )
    }

    /// Returns the boundary classification of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use fsgate_core::ErrorKind;
    /// use fsgate_core::FsError;
    ///
    /// let err = FsError::PathDenied {
    ///     path: "/etc/passwd".to_string(),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::Forbidden);
    /// assert_eq!(err.kind().status_code(), 403);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PathInvalid { .. }
            | Self::NotADirectory { .. }
            | Self::UnsupportedFormat { .. }
            | Self::PathTraversal { .. }
            | Self::InvalidArchive(_) => ErrorKind::BadRequest,
            Self::PathDenied { .. } => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::QuotaExceeded { .. } => ErrorKind::TooLarge,
            Self::Configuration | Self::NotUnderAnyRoot => ErrorKind::Internal,
            Self::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorKind::NotFound,
                std::io::ErrorKind::PermissionDenied => ErrorKind::Forbidden,
                std::io::ErrorKind::AlreadyExists => ErrorKind::Conflict,
                _ => ErrorKind::Internal,
            },
        }
    }

    /// Returns the quota resource that was exceeded, if applicable.
    #[must_use]
    pub const fn quota_resource(&self) -> Option<&QuotaResource> {
        match self {
            Self::QuotaExceeded { resource } => Some(resource),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = FsError::Configuration;
        assert_eq!(
            err.to_string(),
            "no allowed root directories are configured"
        );
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_path_denied_uses_caller_path() {
        let err = FsError::denied("../../etc");
        assert_eq!(err.to_string(), "access to '../../etc' is not allowed");
        assert!(err.is_security_violation());
        assert_eq!(err.kind().status_code(), 403);
    }

    #[test]
    fn test_path_traversal_error() {
        let err = FsError::PathTraversal {
            entry: "../../evil".to_string(),
        };
        assert!(err.to_string().contains("escapes the extraction folder"));
        assert!(err.to_string().contains("../../evil"));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(FsError::not_found("a").kind(), ErrorKind::NotFound);
        assert_eq!(FsError::not_a_directory("a").kind(), ErrorKind::BadRequest);
        assert_eq!(FsError::already_exists("a").kind(), ErrorKind::Conflict);
        assert_eq!(FsError::invalid("a", "bad").kind(), ErrorKind::BadRequest);
        assert_eq!(FsError::NotUnderAnyRoot.kind(), ErrorKind::Internal);
        assert_eq!(
            FsError::UnsupportedFormat {
                filename: "a.rar".into()
            }
            .kind(),
            ErrorKind::BadRequest
        );
    }

    #[test]
    fn test_io_error_kind_mapping() {
        let err: FsError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no").into();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err: FsError = std::io::Error::other("disk on fire").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_quota_exceeded_error() {
        let err = FsError::QuotaExceeded {
            resource: QuotaResource::EntryCount {
                current: 11,
                max: 10,
            },
        };
        let display = err.to_string();
        assert!(display.contains("quota exceeded"));
        assert!(display.contains("entry count"));
        assert!(err.is_security_violation());
        assert_eq!(err.kind().status_code(), 413);
        assert_eq!(
            err.quota_resource(),
            Some(&QuotaResource::EntryCount {
                current: 11,
                max: 10
            })
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }
}
