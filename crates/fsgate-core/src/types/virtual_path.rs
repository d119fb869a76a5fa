//! Root-relative path exposed to callers.

use std::fmt;
use std::path::Component;
use std::path::Path;

use crate::FsError;
use crate::Result;

/// A root-relative path using forward slashes, never containing `..`.
///
/// The empty virtual path denotes the root itself. Virtual paths are what
/// leaves the core; clients never see absolute host paths.
///
/// # Examples
///
/// ```
/// use fsgate_core::VirtualPath;
///
/// let root = VirtualPath::root();
/// assert!(root.is_root());
///
/// let docs = root.join("docs").join("report.pdf");
/// assert_eq!(docs.as_str(), "docs/report.pdf");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Returns the virtual path of a root.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Builds a virtual path from a path already relative to its root.
    ///
    /// # Errors
    ///
    /// Returns `PathInvalid` if `relative` contains anything other than
    /// plain components.
    pub(crate) fn from_relative(relative: &Path) -> Result<Self> {
        let mut out = String::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    if !out.is_empty() {
                        out.push('/');
                    }
                    out.push_str(&name.to_string_lossy());
                }
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(FsError::invalid(
                        relative.to_string_lossy(),
                        "not a root-relative path",
                    ));
                }
            }
        }
        Ok(Self(out))
    }

    /// Appends one name to this virtual path.
    #[must_use]
    pub fn join(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    /// Returns `true` for the virtual path of a root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts into the inner `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for VirtualPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VirtualPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
