//! Lexical normalization, segment-wise containment and symlink resolution.
//!
//! These are the primitives the resolver composes. Containment is always
//! decided on whole path components, so a root `/tmp/a` never contains
//! `/tmp/ab`.

use std::ffi::OsString;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Collapses `.`, `..` and redundant separators without touching the
/// filesystem.
///
/// `..` never climbs above the root or prefix of an absolute path. For a
/// relative path a leading `..` is kept, so callers that need confinement
/// must reject `..` segments before joining.
///
/// # Examples
///
/// ```
/// use fsgate_core::security::normalize_lexical;
/// use std::path::Path;
///
/// assert_eq!(
///     normalize_lexical(Path::new("/data/./a//b/../c")),
///     Path::new("/data/a/c")
/// );
/// assert_eq!(normalize_lexical(Path::new("/../../etc")), Path::new("/etc"));
/// ```
#[must_use]
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
        }
    }

    normalized
}

/// Returns `true` if `candidate` equals `root` or lies beneath it,
/// comparing whole path components.
///
/// # Examples
///
/// ```
/// use fsgate_core::security::is_within;
/// use std::path::Path;
///
/// assert!(is_within(Path::new("/tmp/a/file"), Path::new("/tmp/a")));
/// assert!(is_within(Path::new("/tmp/a"), Path::new("/tmp/a")));
/// assert!(!is_within(Path::new("/tmp/ab"), Path::new("/tmp/a")));
/// ```
#[inline]
#[must_use]
pub fn is_within(candidate: &Path, root: &Path) -> bool {
    candidate.starts_with(root)
}

/// Resolves symlinks in `path`, tolerating a non-existent tail.
///
/// The deepest existing ancestor is canonicalized and the missing
/// components are re-appended. A dangling symlink is accepted only as the
/// final component, in which case the link itself (not its target) is
/// returned; a dangling link followed by further components is an error
/// because writing through it could land anywhere.
///
/// # Errors
///
/// Returns an error if canonicalization fails for a reason other than a
/// missing path, or if a dangling symlink sits in the middle of `path`.
pub fn resolve_symlinks(path: &Path) -> io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => return Ok(canonical),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut existing = path;
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        match existing.symlink_metadata() {
            Ok(meta) => {
                let base = if meta.file_type().is_symlink() && existing.canonicalize().is_err() {
                    if !tail.is_empty() {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "dangling symbolic link inside path",
                        ));
                    }
                    let (parent, name) = split_last(existing)?;
                    let mut base = parent.canonicalize()?;
                    base.push(name);
                    base
                } else {
                    existing.canonicalize()?
                };

                let mut resolved = base;
                for name in tail.iter().rev() {
                    resolved.push(name);
                }
                return Ok(normalize_lexical(&resolved));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (parent, name) = split_last(existing)?;
                tail.push(name.to_os_string());
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    }
}

fn split_last(path: &Path) -> io::Result<(&Path, &std::ffi::OsStr)> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no existing ancestor",
        )),
    }
}
