//! Validated archive entry path.

use std::path::Path;
use std::path::PathBuf;

use crate::FsError;
use crate::Result;
use crate::security::is_within;

/// An archive entry name that has been proven to stay inside the
/// extraction folder.
///
/// `EntryPath` is relative; joining it onto the extraction folder yields the
/// destination of the entry.
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`EntryPath::validate`]
/// - Never absolute, never contains `..`
/// - Backslashes are treated as separators, so `..\..\evil` is caught on
///   every platform
///
/// # Examples
///
/// ```
/// use fsgate_core::types::EntryPath;
/// use std::path::Path;
///
/// let entry = EntryPath::validate("docs/./guide.txt", Path::new("/srv/upload"))?;
/// assert_eq!(entry.as_path(), Path::new("docs/guide.txt"));
///
/// assert!(EntryPath::validate("../../evil", Path::new("/srv/upload")).is_err());
/// assert!(EntryPath::validate("/etc/passwd", Path::new("/srv/upload")).is_err());
/// # Ok::<(), fsgate_core::FsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPath(PathBuf);

impl EntryPath {
    /// Validates an archive entry name against the extraction folder.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject NUL bytes
    /// 2. Reject absolute names (leading separator or drive prefix)
    /// 3. Resolve `.` and `..` segments lexically; reject if the name climbs
    ///    out of the extraction folder at any point
    /// 4. Verify `extraction_root/name` is a descendant of
    ///    `extraction_root`
    ///
    /// The extraction folder is freshly created by the codec and contains
    /// nothing but what the codec writes, so lexical resolution equals
    /// filesystem resolution.
    ///
    /// A name that resolves to the extraction folder itself (for example
    /// `./`) validates to an empty path; callers skip such entries.
    ///
    /// # Errors
    ///
    /// Returns `PathTraversal` carrying the entry name on any failure.
    pub fn validate(name: &str, extraction_root: &Path) -> Result<Self> {
        let traversal = || FsError::PathTraversal {
            entry: name.to_string(),
        };

        if name.contains('\0') {
            return Err(traversal());
        }

        if name.starts_with(['/', '\\']) || has_drive_prefix(name) {
            return Err(traversal());
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in name.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(traversal());
                    }
                }
                _ => segments.push(segment),
            }
        }

        let relative: PathBuf = segments.iter().collect();
        if !is_within(&extraction_root.join(&relative), extraction_root) {
            return Err(traversal());
        }

        Ok(Self(relative))
    }

    /// Returns `true` if the entry resolves to the extraction folder itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn root() -> &'static Path {
        Path::new("/srv/extract/photos")
    }

    #[test]
    fn test_plain_names() {
        let entry = EntryPath::validate("a/b/c.txt", root()).unwrap();
        assert_eq!(entry.as_path(), Path::new("a/b/c.txt"));
        assert!(!entry.is_empty());
    }

    #[test]
    fn test_directory_entry_trailing_slash() {
        let entry = EntryPath::validate("nested/dir/", root()).unwrap();
        assert_eq!(entry.as_path(), Path::new("nested/dir"));
    }

    #[test]
    fn test_inner_parent_that_stays_inside() {
        let entry = EntryPath::validate("a/b/../c.txt", root()).unwrap();
        assert_eq!(entry.as_path(), Path::new("a/c.txt"));
    }

    #[test]
    fn test_rejects_escaping_names() {
        let names = [
            "../evil",
            "../../evil",
            "a/../../evil",
            "a/b/../../../evil",
            "..\\..\\evil",
            "a\\..\\..\\evil",
        ];
        for name in names {
            assert!(
                matches!(
                    EntryPath::validate(name, root()),
                    Err(FsError::PathTraversal { ref entry }) if entry == name
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_absolute_names() {
        for name in ["/etc/passwd", "\\windows\\system32", "C:\\evil", "c:/evil"] {
            assert!(
                matches!(
                    EntryPath::validate(name, root()),
                    Err(FsError::PathTraversal { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_nul_bytes() {
        assert!(EntryPath::validate("file\0.txt", root()).is_err());
    }

    #[test]
    fn test_self_reference_is_empty() {
        assert!(EntryPath::validate("./", root()).unwrap().is_empty());
        assert!(EntryPath::validate("a/..", root()).unwrap().is_empty());
    }

    #[test]
    fn test_dotted_file_names_allowed() {
        let entry = EntryPath::validate("..hidden/...", root()).unwrap();
        assert_eq!(entry.as_path(), Path::new("..hidden/..."));
    }
}
