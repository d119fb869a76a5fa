//! Resolver-approved absolute path.

use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;

/// An absolute, symlink-resolved path proven to lie inside one root at
/// resolution time.
///
/// # Security Properties
///
/// - Can ONLY be constructed by [`PathResolver`](crate::PathResolver)
/// - NO `From<PathBuf>` implementation
/// - Carries the root that contained it, so derived paths (rename targets,
///   copy destinations) can be checked against the same root
///
/// A `ResolvedPath` is a snapshot: it is not cached across requests, and
/// destructive operations re-resolve it before acting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    path: PathBuf,
    root: PathBuf,
}

impl ResolvedPath {
    pub(crate) fn new(path: PathBuf, root: PathBuf) -> Self {
        debug_assert!(path.starts_with(&root));
        Self { path, root }
    }

    /// Returns the absolute host path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Returns the resolved form of the root that contained this path.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` if this path is the root itself.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path == self.root
    }

    /// Returns the final component of the path.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        self.path.file_name()
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
