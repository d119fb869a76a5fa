//! Conversion of host paths back to root-relative virtual paths.

use std::path::Path;

use crate::FsError;
use crate::Result;
use crate::roots::Root;
use crate::security::is_within;
use crate::types::VirtualPath;

/// Maps absolute host paths onto [`VirtualPath`]s.
///
/// The owning root is the first one, in registry order, that contains the
/// path segment-wise. This is the inverse of
/// [`PathResolver`](crate::PathResolver): resolving the returned virtual
/// path yields the same host path.
#[derive(Debug, Clone, Copy)]
pub struct VirtualPathMapper<'a> {
    roots: &'a [Root],
}

impl<'a> VirtualPathMapper<'a> {
    /// Creates a mapper over `roots`.
    #[must_use]
    pub fn new(roots: &'a [Root]) -> Self {
        Self { roots }
    }

    /// Returns `path` relative to its owning root, forward-slash joined.
    ///
    /// # Errors
    ///
    /// Returns `NotUnderAnyRoot` if no root contains `path`, which happens
    /// when the root set changed in the middle of a request.
    pub fn to_virtual(&self, path: &Path) -> Result<VirtualPath> {
        let root = self
            .roots
            .iter()
            .find(|root| is_within(path, root.path()))
            .ok_or(FsError::NotUnderAnyRoot)?;

        let relative = path
            .strip_prefix(root.path())
            .map_err(|_| FsError::NotUnderAnyRoot)?;
        VirtualPath::from_relative(relative)
    }
}
