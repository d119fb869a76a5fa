//! Registry of permitted root directories.
//!
//! The registry is an ordinary value handed to a
//! [`FileManager`](crate::FileManager) through the [`RootSource`] trait; there
//! is no process-wide root list.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use crate::FsError;
use crate::Result;
use crate::security::normalize_lexical;

/// An administrator-approved directory.
///
/// The path is absolute and fully resolved (no symlinks, no `..`) at the
/// moment the root is constructed.
///
/// # Examples
///
/// ```no_run
/// use fsgate_core::Root;
///
/// # fn main() -> Result<(), fsgate_core::FsError> {
/// let root = Root::new("/srv/shared")?.with_description("Team share");
/// assert!(root.is_allowed());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    path: PathBuf,
    allowed: bool,
    description: Option<String>,
}

impl Root {
    /// Creates an allowed root after resolving `path`.
    ///
    /// # Errors
    ///
    /// - `PathInvalid` if the path is relative
    /// - `NotFound` if it does not exist
    /// - `NotADirectory` if it is not a directory
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let shown = path.display().to_string();

        if !path.is_absolute() {
            return Err(FsError::invalid(shown, "root must be an absolute path"));
        }

        let canonical = path.canonicalize().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FsError::not_found(shown.clone())
            } else {
                FsError::Io(e)
            }
        })?;

        if !canonical.is_dir() {
            return Err(FsError::not_a_directory(shown));
        }

        Ok(Self {
            path: canonical,
            allowed: true,
            description: None,
        })
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the root allowed or disallowed.
    #[must_use]
    pub fn allowed(mut self, allowed: bool) -> Self {
        self.allowed = allowed;
        self
    }

    /// Returns the resolved root path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether file operations may use this root.
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Partial update for a registered root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootUpdate {
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New allowed flag.
    pub allowed: Option<bool>,
}

/// Supplies the ordered list of allowed roots.
///
/// Implementations are read once per file operation; freshness and caching
/// are the implementation's business.
pub trait RootSource {
    /// Returns the allowed roots in registration order.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if no allowed root is available.
    fn list_roots(&self) -> Result<Vec<Root>>;
}

impl<T: RootSource + ?Sized> RootSource for &T {
    fn list_roots(&self) -> Result<Vec<Root>> {
        (**self).list_roots()
    }
}

impl<T: RootSource + ?Sized> RootSource for Arc<T> {
    fn list_roots(&self) -> Result<Vec<Root>> {
        (**self).list_roots()
    }
}

impl<T: RootSource + ?Sized> RootSource for Box<T> {
    fn list_roots(&self) -> Result<Vec<Root>> {
        (**self).list_roots()
    }
}

impl RootSource for RwLock<RootRegistry> {
    fn list_roots(&self) -> Result<Vec<Root>> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .list_roots()
    }
}

/// Ordered, deduplicated set of roots.
///
/// # Examples
///
/// ```no_run
/// use fsgate_core::Root;
/// use fsgate_core::RootRegistry;
/// use fsgate_core::RootSource;
///
/// # fn main() -> Result<(), fsgate_core::FsError> {
/// let mut registry = RootRegistry::new();
/// registry.register(Root::new("/srv/shared")?);
/// registry.register(Root::new("/srv/archive")?.allowed(false));
///
/// let roots = registry.list_roots()?;
/// assert_eq!(roots.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RootRegistry {
    roots: Vec<Root>,
}

impl RootRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from directories, all allowed, in the given order.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Root::new`].
    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut registry = Self::new();
        for path in paths {
            registry.register(Root::new(path)?);
        }
        Ok(registry)
    }

    /// Registers a root at the end of the order.
    ///
    /// If a root with the same resolved path is already registered, its
    /// flag and description are replaced in place and `false` is returned.
    pub fn register(&mut self, root: Root) -> bool {
        if let Some(existing) = self.roots.iter_mut().find(|r| r.path == root.path) {
            tracing::debug!(root = %root.path.display(), "root already registered, updating");
            *existing = root;
            return false;
        }
        tracing::info!(root = %root.path.display(), allowed = root.allowed, "registered root");
        self.roots.push(root);
        true
    }

    /// Applies a partial update to the root registered at `path`.
    ///
    /// Returns `false` if no such root is registered.
    pub fn update(&mut self, path: &Path, update: RootUpdate) -> bool {
        let key = registry_key(path);
        let Some(root) = self.roots.iter_mut().find(|r| r.path == key) else {
            return false;
        };
        if let Some(description) = update.description {
            root.description = description;
        }
        if let Some(allowed) = update.allowed {
            root.allowed = allowed;
        }
        tracing::info!(root = %root.path.display(), allowed = root.allowed, "updated root");
        true
    }

    /// Removes the root registered at `path`.
    ///
    /// Returns `false` if no such root is registered.
    pub fn remove(&mut self, path: &Path) -> bool {
        let key = registry_key(path);
        let before = self.roots.len();
        self.roots.retain(|r| r.path != key);
        let removed = self.roots.len() != before;
        if removed {
            tracing::info!(root = %key.display(), "removed root");
        }
        removed
    }

    /// Returns every registered root, allowed or not, in order.
    #[must_use]
    pub fn all(&self) -> &[Root] {
        &self.roots
    }

    /// Returns the number of registered roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if no root is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl RootSource for RootRegistry {
    fn list_roots(&self) -> Result<Vec<Root>> {
        let allowed: Vec<Root> = self.roots.iter().filter(|r| r.allowed).cloned().collect();
        if allowed.is_empty() {
            return Err(FsError::Configuration);
        }
        Ok(allowed)
    }
}

/// Maps a caller-supplied root path onto the form stored in the registry.
///
/// A root directory may have vanished since registration, so fall back to
/// lexical normalization when it can no longer be canonicalized.
fn registry_key(path: &Path) -> PathBuf {
    path.canonicalize()
        .unwrap_or_else(|_| normalize_lexical(path))
}
