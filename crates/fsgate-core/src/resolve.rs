//! Mapping of untrusted path strings onto root-contained host paths.

use std::path::Component;
use std::path::Path;

use crate::FsError;
use crate::Result;
use crate::roots::Root;
use crate::security::is_within;
use crate::security::normalize_lexical;
use crate::security::resolve_symlinks;
use crate::types::ResolvedPath;

/// Resolves caller-supplied paths against a snapshot of the allowed roots.
///
/// The resolver owns no state beyond the borrowed root list, so a new one
/// is built for every request from a fresh
/// [`RootSource::list_roots`](crate::RootSource::list_roots) call.
///
/// # Resolution order
///
/// 1. The empty string resolves to the first root.
/// 2. NUL bytes are rejected as `PathInvalid`.
/// 3. Absolute input is normalized lexically, checked for containment in
///    each root, then symlink-resolved and checked again against the same
///    root.
/// 4. Relative input containing a `..` segment is rejected as `PathDenied`;
///    otherwise it is joined onto each root in turn, symlink-resolved and
///    checked for containment.
///
/// The first root that contains the result wins. When none does, the
/// result is `PathDenied`.
///
/// # Examples
///
/// ```no_run
/// use fsgate_core::PathResolver;
/// use fsgate_core::RootRegistry;
/// use fsgate_core::RootSource;
///
/// # fn main() -> Result<(), fsgate_core::FsError> {
/// let registry = RootRegistry::from_paths(["/srv/shared"])?;
/// let roots = registry.list_roots()?;
/// let resolver = PathResolver::new(&roots)?;
///
/// let file = resolver.resolve("docs/report.pdf")?;
/// assert!(file.as_path().starts_with("/srv/shared"));
/// assert!(resolver.resolve("../etc/passwd").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    roots: &'a [Root],
}

impl<'a> PathResolver<'a> {
    /// Creates a resolver over `roots`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `roots` is empty.
    pub fn new(roots: &'a [Root]) -> Result<Self> {
        if roots.is_empty() {
            return Err(FsError::Configuration);
        }
        Ok(Self { roots })
    }

    /// Returns the roots this resolver checks, in order.
    #[must_use]
    pub fn roots(&self) -> &'a [Root] {
        self.roots
    }

    /// Resolves `raw` to a path contained in one of the roots.
    ///
    /// # Errors
    ///
    /// - `PathInvalid` if `raw` contains a NUL byte
    /// - `PathDenied` if no root contains the resolved path
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath> {
        if raw.is_empty() {
            let first = &self.roots[0];
            return Ok(ResolvedPath::new(
                first.path().to_path_buf(),
                first.path().to_path_buf(),
            ));
        }

        if raw.contains('\0') {
            return Err(FsError::invalid(raw, "path contains a NUL byte"));
        }

        let input = Path::new(raw);
        let resolved = if input.is_absolute() {
            self.resolve_absolute(input)
        } else {
            self.resolve_relative(raw, input)
        };

        match resolved {
            Some(path) => {
                tracing::debug!(path = raw, "resolved path");
                Ok(path)
            }
            None => {
                tracing::warn!(path = raw, "path is outside every allowed root");
                Err(FsError::denied(raw))
            }
        }
    }

    fn resolve_absolute(&self, input: &Path) -> Option<ResolvedPath> {
        let normalized = normalize_lexical(input);

        self.roots.iter().find_map(|root| {
            if !is_within(&normalized, root.path()) {
                return None;
            }
            contained(&normalized, root)
        })
    }

    fn resolve_relative(&self, raw: &str, input: &Path) -> Option<ResolvedPath> {
        if has_parent_segment(raw, input) {
            return None;
        }

        self.roots
            .iter()
            .find_map(|root| contained(&root.path().join(input), root))
    }
}

/// Resolves symlinks in `candidate` and keeps it only if it is still inside
/// `root`.
///
/// An I/O failure means containment cannot be proven for this root.
fn contained(candidate: &Path, root: &Root) -> Option<ResolvedPath> {
    match resolve_symlinks(candidate) {
        Ok(real) if is_within(&real, root.path()) => {
            Some(ResolvedPath::new(real, root.path().to_path_buf()))
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "cannot resolve candidate path");
            None
        }
    }
}

fn has_parent_segment(raw: &str, input: &Path) -> bool {
    input.components().any(|c| c == Component::ParentDir)
        || raw.split(['/', '\\']).any(|segment| segment == "..")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(names: &[&str]) -> (TempDir, Vec<Root>) {
        let temp = TempDir::new().unwrap();
        let roots = names
            .iter()
            .map(|name| {
                let dir = temp.path().join(name);
                fs::create_dir_all(&dir).unwrap();
                Root::new(dir).unwrap()
            })
            .collect();
        (temp, roots)
    }

    #[test]
    fn test_new_requires_roots() {
        assert!(matches!(
            PathResolver::new(&[]),
            Err(FsError::Configuration)
        ));
    }

    #[test]
    fn test_empty_input_is_first_root() {
        let (_temp, roots) = setup(&["a", "b"]);
        let resolver = PathResolver::new(&roots).unwrap();
        let resolved = resolver.resolve("").unwrap();
        assert_eq!(resolved.as_path(), roots[0].path());
        assert!(resolved.is_root());
    }

    #[test]
    fn test_relative_input_joins_first_root() {
        let (_temp, roots) = setup(&["data"]);
        let resolver = PathResolver::new(&roots).unwrap();
        let resolved = resolver.resolve("docs/new.txt").unwrap();
        assert_eq!(resolved.as_path(), roots[0].path().join("docs/new.txt"));
        assert_eq!(resolved.root(), roots[0].path());
    }

    #[test]
    fn test_relative_parent_segment_denied() {
        let (_temp, roots) = setup(&["data"]);
        let resolver = PathResolver::new(&roots).unwrap();
        for raw in ["..", "../etc/passwd", "a/../b", "a/..", "a\\..\\b"] {
            assert!(
                matches!(resolver.resolve(raw), Err(FsError::PathDenied { ref path }) if path == raw),
                "{raw} should be denied"
            );
        }
    }

    #[test]
    fn test_nul_byte_is_invalid() {
        let (_temp, roots) = setup(&["data"]);
        let resolver = PathResolver::new(&roots).unwrap();
        assert!(matches!(
            resolver.resolve("a\0b"),
            Err(FsError::PathInvalid { .. })
        ));
    }

    #[test]
    fn test_absolute_inside_root() {
        let (_temp, roots) = setup(&["data"]);
        let resolver = PathResolver::new(&roots).unwrap();
        let raw = format!("{}/x/./y/../z", roots[0].path().display());
        let resolved = resolver.resolve(&raw).unwrap();
        assert_eq!(resolved.as_path(), roots[0].path().join("x/z"));
    }

    #[test]
    fn test_absolute_escape_denied() {
        let (_temp, roots) = setup(&["data"]);
        let resolver = PathResolver::new(&roots).unwrap();
        let raw = format!("{}/../secret", roots[0].path().display());
        assert!(matches!(
            resolver.resolve(&raw),
            Err(FsError::PathDenied { .. })
        ));
        assert!(resolver.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn test_sibling_prefix_not_contained() {
        let (temp, roots) = setup(&["a"]);
        fs::create_dir(temp.path().join("ab")).unwrap();
        let resolver = PathResolver::new(&roots).unwrap();
        let raw = format!("{}/file", temp.path().canonicalize().unwrap().join("ab").display());
        assert!(matches!(
            resolver.resolve(&raw),
            Err(FsError::PathDenied { .. })
        ));
    }

    #[test]
    fn test_second_root_matches_absolute() {
        let (_temp, roots) = setup(&["a", "b"]);
        let resolver = PathResolver::new(&roots).unwrap();
        let raw = format!("{}/doc.txt", roots[1].path().display());
        let resolved = resolver.resolve(&raw).unwrap();
        assert_eq!(resolved.root(), roots[1].path());
    }

    #[test]
    fn test_nested_roots_first_registered_wins() {
        let (_temp, roots) = setup(&["outer", "outer/inner"]);
        let resolver = PathResolver::new(&roots).unwrap();
        let raw = format!("{}/f", roots[1].path().display());
        assert_eq!(resolver.resolve(&raw).unwrap().root(), roots[0].path());

        let reversed = vec![roots[1].clone(), roots[0].clone()];
        let resolver = PathResolver::new(&reversed).unwrap();
        assert_eq!(resolver.resolve(&raw).unwrap().root(), roots[1].path());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_denied() {
        let (temp, roots) = setup(&["data"]);
        let outside = temp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, roots[0].path().join("link")).unwrap();

        let resolver = PathResolver::new(&roots).unwrap();
        assert!(matches!(
            resolver.resolve("link/file"),
            Err(FsError::PathDenied { .. })
        ));
        let raw = format!("{}/link", roots[0].path().display());
        assert!(matches!(
            resolver.resolve(&raw),
            Err(FsError::PathDenied { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_other_root_relative() {
        let (_temp, roots) = setup(&["a", "b"]);
        std::os::unix::fs::symlink(roots[1].path(), roots[0].path().join("to_b")).unwrap();

        let resolver = PathResolver::new(&roots).unwrap();
        // Escapes root a, and b/to_b does not exist, so the second root
        // yields b/to_b itself.
        let resolved = resolver.resolve("to_b").unwrap();
        assert_eq!(resolved.root(), roots[1].path());
        assert_eq!(resolved.as_path(), roots[1].path().join("to_b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_internal_symlink_allowed() {
        let (_temp, roots) = setup(&["data"]);
        fs::create_dir(roots[0].path().join("real")).unwrap();
        std::os::unix::fs::symlink(roots[0].path().join("real"), roots[0].path().join("alias"))
            .unwrap();

        let resolver = PathResolver::new(&roots).unwrap();
        let resolved = resolver.resolve("alias/f.txt").unwrap();
        assert_eq!(resolved.as_path(), roots[0].path().join("real/f.txt"));
    }
}
