//! Root-confined file operations.
//!
//! Every operation takes a fresh snapshot of the allowed roots, resolves
//! the caller's paths against it and reports results as virtual paths.
//! Mutating operations resolve their paths once more against a new
//! snapshot right before touching the filesystem.

mod download;
mod list;
pub(crate) mod transfer;

pub use download::Download;
pub use list::DirEntry;
pub use list::EntryKind;

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

use crate::FsError;
use crate::ManagerConfig;
use crate::Result;
use crate::mapper::VirtualPathMapper;
use crate::report::UploadReport;
use crate::resolve::PathResolver;
use crate::roots::Root;
use crate::roots::RootSource;
use crate::security::is_within;
use crate::security::validate_bare_name;
use crate::types::ResolvedPath;
use crate::types::VirtualPath;

use transfer::exists;

/// The allowed roots as seen by one operation.
#[derive(Debug)]
pub(crate) struct Snapshot {
    roots: Vec<Root>,
}

impl Snapshot {
    pub(crate) fn resolve(&self, raw: &str) -> Result<ResolvedPath> {
        PathResolver::new(&self.roots)?.resolve(raw)
    }

    pub(crate) fn to_virtual(&self, path: &Path) -> Result<VirtualPath> {
        VirtualPathMapper::new(&self.roots).to_virtual(path)
    }
}

/// Entry point for all file and archive operations.
///
/// `FileManager` holds no mutable state; it is `Send + Sync` whenever its
/// [`RootSource`] is, and may be shared freely between request handlers.
///
/// # Examples
///
/// ```no_run
/// use fsgate_core::FileManager;
/// use fsgate_core::RootRegistry;
///
/// # fn main() -> Result<(), fsgate_core::FsError> {
/// let manager = FileManager::new(RootRegistry::from_paths(["/srv/shared"])?);
///
/// let folder = manager.create_folder("reports/2024")?;
/// for entry in manager.list("reports")? {
///     println!("{} {}", entry.kind.as_str(), entry.path);
/// }
/// manager.delete(folder.as_str())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileManager<S> {
    source: S,
    config: ManagerConfig,
}

impl<S: RootSource> FileManager<S> {
    /// Creates a manager with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, ManagerConfig::default())
    }

    /// Creates a manager with a custom configuration.
    pub fn with_config(source: S, config: ManagerConfig) -> Self {
        Self { source, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Returns the root source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub(crate) fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            roots: self.source.list_roots()?,
        })
    }

    /// Re-resolves `raw` against a fresh snapshot and checks it still
    /// designates `expected`.
    pub(crate) fn revalidate(&self, raw: &str, expected: &ResolvedPath) -> Result<Snapshot> {
        let snapshot = self.snapshot()?;
        let again = snapshot.resolve(raw)?;
        if again.as_path() != expected.as_path() {
            tracing::warn!(path = raw, "path changed between validation and use");
            return Err(FsError::denied(raw));
        }
        Ok(snapshot)
    }

    /// Resolves a caller-supplied path.
    ///
    /// # Errors
    ///
    /// - `Configuration` if no allowed root exists
    /// - `PathInvalid` or `PathDenied` as described on [`PathResolver`]
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath> {
        self.snapshot()?.resolve(raw)
    }

    /// Returns the virtual path of a resolved path.
    ///
    /// # Errors
    ///
    /// Returns `NotUnderAnyRoot` if the roots changed so that no root
    /// contains `resolved` any more.
    pub fn to_virtual(&self, resolved: &ResolvedPath) -> Result<VirtualPath> {
        self.snapshot()?.to_virtual(resolved.as_path())
    }

    /// Lists the contents of a directory.
    ///
    /// Folders come first, then files; each group is sorted by
    /// case-insensitive name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `dir` does not exist
    /// - `NotADirectory` if it is not a directory
    pub fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let snapshot = self.snapshot()?;
        let resolved = snapshot.resolve(dir)?;

        let metadata = fs::metadata(resolved.as_path()).map_err(|e| not_found_or_io(e, dir))?;
        if !metadata.is_dir() {
            return Err(FsError::not_a_directory(dir));
        }

        let base = snapshot.to_virtual(resolved.as_path())?;
        let entries = list::read_entries(resolved.as_path(), &base)?;
        tracing::debug!(path = %base, count = entries.len(), "listed directory");
        Ok(entries)
    }

    /// Creates a directory, including missing parents.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if anything exists at `path`.
    pub fn create_folder(&self, path: &str) -> Result<VirtualPath> {
        let snapshot = self.snapshot()?;
        let resolved = snapshot.resolve(path)?;
        let virtual_path = snapshot.to_virtual(resolved.as_path())?;

        if exists(resolved.as_path())? {
            return Err(FsError::already_exists(virtual_path.as_str()));
        }

        self.revalidate(path, &resolved)?;
        fs::create_dir_all(resolved.as_path())?;

        tracing::info!(path = %virtual_path, "created folder");
        Ok(virtual_path)
    }

    /// Renames an item within its directory.
    ///
    /// # Errors
    ///
    /// - `PathInvalid` if `new_name` is not a bare file name
    /// - `NotFound` if `path` does not exist
    /// - `PathDenied` if `path` is a root
    /// - `AlreadyExists` if the new name is taken
    pub fn rename(&self, path: &str, new_name: &str) -> Result<VirtualPath> {
        let new_name = validate_bare_name(new_name)?;
        let snapshot = self.snapshot()?;
        let source = snapshot.resolve(path)?;

        if !exists(source.as_path())? {
            return Err(FsError::not_found(path));
        }
        let Some(parent) = source.as_path().parent().filter(|_| !source.is_root()) else {
            return Err(FsError::denied(path));
        };

        let target = parent.join(new_name);
        let target_virtual = snapshot.to_virtual(&target)?;
        if exists(&target)? {
            return Err(FsError::already_exists(target_virtual.as_str()));
        }

        self.revalidate(path, &source)?;
        fs::rename(source.as_path(), &target)?;

        tracing::info!(from = path, to = %target_virtual, "renamed item");
        Ok(target_virtual)
    }

    /// Deletes a file, or a directory recursively.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `path` does not exist
    /// - `PathDenied` if `path` is a root
    pub fn delete(&self, path: &str) -> Result<()> {
        let snapshot = self.snapshot()?;
        let resolved = snapshot.resolve(path)?;

        if !exists(resolved.as_path())? {
            return Err(FsError::not_found(path));
        }
        if resolved.is_root() {
            tracing::warn!(path, "refusing to delete a root");
            return Err(FsError::denied(path));
        }

        let virtual_path = snapshot.to_virtual(resolved.as_path())?;
        self.revalidate(path, &resolved)?;
        transfer::remove_item(resolved.as_path())?;

        tracing::info!(path = %virtual_path, "deleted item");
        Ok(())
    }

    /// Copies an item into a directory, recursing into folders.
    ///
    /// Permissions and modification times are preserved. Symlinks inside a
    /// copied tree are recreated as symlinks.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `src` does not exist
    /// - `NotADirectory` if `dest_dir` is not a directory
    /// - `AlreadyExists` if `dest_dir` already holds an item of that name
    /// - `PathInvalid` if `dest_dir` lies inside the folder being copied
    pub fn copy(&self, src: &str, dest_dir: &str) -> Result<VirtualPath> {
        let snapshot = self.snapshot()?;
        let (source, dir, target) = self.plan_transfer(&snapshot, src, dest_dir)?;
        let target_virtual = snapshot.to_virtual(&target)?;

        self.revalidate(dest_dir, &dir)?;
        transfer::copy_item(source.as_path(), &target)?;

        tracing::info!(from = src, to = %target_virtual, "copied item");
        Ok(target_virtual)
    }

    /// Moves an item into a directory.
    ///
    /// Uses a rename where possible and falls back to copy and delete when
    /// source and destination are on different devices.
    ///
    /// # Errors
    ///
    /// As [`FileManager::copy`], plus `PathDenied` if `src` is a root.
    pub fn move_item(&self, src: &str, dest_dir: &str) -> Result<VirtualPath> {
        let snapshot = self.snapshot()?;
        let (source, dir, target) = self.plan_transfer(&snapshot, src, dest_dir)?;
        if source.is_root() {
            tracing::warn!(path = src, "refusing to move a root");
            return Err(FsError::denied(src));
        }
        let target_virtual = snapshot.to_virtual(&target)?;

        self.revalidate(src, &source)?;
        self.revalidate(dest_dir, &dir)?;
        transfer::move_item(source.as_path(), &target)?;

        tracing::info!(from = src, to = %target_virtual, "moved item");
        Ok(target_virtual)
    }

    /// Checks the shared preconditions of copy and move and returns the
    /// resolved source, destination directory and target path.
    fn plan_transfer(
        &self,
        snapshot: &Snapshot,
        src: &str,
        dest_dir: &str,
    ) -> Result<(ResolvedPath, ResolvedPath, std::path::PathBuf)> {
        let source = snapshot.resolve(src)?;
        let dir = snapshot.resolve(dest_dir)?;

        if !exists(source.as_path())? {
            return Err(FsError::not_found(src));
        }
        if !dir.as_path().is_dir() {
            return Err(FsError::not_a_directory(dest_dir));
        }
        if source.as_path().is_dir() && is_within(dir.as_path(), source.as_path()) {
            return Err(FsError::invalid(
                dest_dir,
                "cannot place a folder inside itself",
            ));
        }

        let Some(name) = source.file_name() else {
            return Err(FsError::invalid(src, "source has no file name"));
        };
        let target = dir.as_path().join(name);
        if exists(&target)? {
            let shown = snapshot.to_virtual(&target)?;
            return Err(FsError::already_exists(shown.as_str()));
        }

        Ok((source, dir, target))
    }

    /// Opens a regular file for reading.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `path` does not exist or is not a regular file.
    pub fn read_for_download(&self, path: &str) -> Result<Download> {
        let resolved = self.resolve(path)?;

        let metadata =
            fs::metadata(resolved.as_path()).map_err(|e| not_found_or_io(e, path))?;
        if !metadata.is_file() {
            return Err(FsError::not_found(path));
        }

        let file = File::open(resolved.as_path()).map_err(|e| not_found_or_io(e, path))?;
        let name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(path, size = metadata.len(), "opened file for download");
        Ok(Download::new(file, metadata.len(), name))
    }

    /// Writes `bytes` to a new file `filename` inside `dir`.
    ///
    /// # Errors
    ///
    /// - `PathInvalid` if `filename` is not a bare file name
    /// - `NotADirectory` if `dir` is not a directory
    /// - `AlreadyExists` if the file exists
    pub fn upload_file(&self, dir: &str, filename: &str, bytes: &[u8]) -> Result<UploadReport> {
        let filename = validate_bare_name(filename)?;
        let snapshot = self.snapshot()?;
        let directory = snapshot.resolve(dir)?;

        if !directory.as_path().is_dir() {
            return Err(FsError::not_a_directory(dir));
        }

        let target = directory.as_path().join(filename);
        let target_virtual = snapshot.to_virtual(&target)?;

        self.revalidate(dir, &directory)?;
        let mut file = File::options()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    FsError::already_exists(target_virtual.as_str())
                } else {
                    FsError::Io(e)
                }
            })?;
        let written = file.write_all(bytes).and_then(|()| file.sync_all());
        drop(file);
        discard_on_error(&target, written)?;

        tracing::info!(path = %target_virtual, size = bytes.len(), "uploaded file");
        Ok(UploadReport {
            path: target_virtual,
            size: bytes.len() as u64,
        })
    }
}

/// Removes the partially written file at `path` if `result` failed.
fn discard_on_error<T>(path: &Path, result: io::Result<T>) -> Result<T> {
    result.map_err(|e| {
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::debug!(error = %cleanup, "failed to remove partial file");
        }
        FsError::Io(e)
    })
}

pub(crate) fn not_found_or_io(error: io::Error, path: &str) -> FsError {
    if error.kind() == io::ErrorKind::NotFound {
        FsError::not_found(path)
    } else {
        FsError::Io(error)
    }
}
