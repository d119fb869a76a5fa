//! ZIP export and import.
//!
//! Export and import share no state. Export materializes the archive in a
//! temporary file and streams it back in chunks; import validates the whole
//! archive before writing anything and publishes the result with a single
//! rename.

mod export;
mod import;

pub use export::ArchiveChunks;
pub use export::ArchiveStream;

use std::fs;
use std::time::Instant;

use crate::FileManager;
use crate::FsError;
use crate::Result;
use crate::ops::not_found_or_io;
use crate::ops::transfer::exists;
use crate::report::ExtractionReport;
use crate::roots::RootSource;
use crate::security::validate_bare_name;

use import::ImportPlan;

impl<S: RootSource> FileManager<S> {
    /// Packs a folder into a ZIP archive.
    ///
    /// Regular files are DEFLATE-compressed under their folder-relative
    /// names; every subfolder gets an explicit entry so empty folders
    /// survive. Symlinks are skipped.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `dir` does not exist
    /// - `NotADirectory` if it is not a directory
    /// - `Io` if the archive cannot be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fsgate_core::FileManager;
    /// use fsgate_core::RootRegistry;
    /// use std::io::Write;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let manager = FileManager::new(RootRegistry::from_paths(["/srv/shared"])?);
    /// let stream = manager.build_archive_stream("photos")?;
    ///
    /// let mut out = std::fs::File::create(stream.filename())?;
    /// for chunk in stream.into_chunks() {
    ///     out.write_all(&chunk?)?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn build_archive_stream(&self, dir: &str) -> Result<ArchiveStream> {
        let resolved = self.resolve(dir)?;

        let metadata = fs::metadata(resolved.as_path()).map_err(|e| not_found_or_io(e, dir))?;
        if !metadata.is_dir() {
            return Err(FsError::not_a_directory(dir));
        }

        let stem = resolved
            .file_name()
            .map_or_else(|| "archive".into(), |n| n.to_string_lossy());
        let filename = format!("{stem}.{}", self.config().archive_extension);

        let stream = export::build(resolved.as_path(), filename, self.config())?;
        tracing::info!(path = dir, archive = stream.filename(), size = stream.size(), "exported folder");
        Ok(stream)
    }

    /// Extracts an uploaded ZIP archive into `dest_dir/<archive stem>`.
    ///
    /// The archive is validated completely before anything is written.
    /// Entries are written into a hidden staging folder inside `dest_dir`,
    /// which is renamed into place once every entry succeeded; on failure
    /// it is removed and `dest_dir` is left untouched.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if `filename` lacks the archive extension
    /// - `PathInvalid` if the archive stem is not a usable folder name
    /// - `NotADirectory` if `dest_dir` is not a directory
    /// - `AlreadyExists` if the extraction folder exists
    /// - `InvalidArchive` if `bytes` is not a readable ZIP archive
    /// - `PathTraversal` if an entry would land outside the folder
    /// - `QuotaExceeded` if the archive is larger than the limits allow
    pub fn extract_archive(
        &self,
        dest_dir: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ExtractionReport> {
        let start = Instant::now();

        let base_name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
        let stem = self
            .config()
            .strip_archive_extension(base_name)
            .ok_or_else(|| FsError::UnsupportedFormat {
                filename: filename.to_string(),
            })?;
        let stem = validate_bare_name(stem)?;

        let snapshot = self.snapshot()?;
        let dest = snapshot.resolve(dest_dir)?;
        if !dest.as_path().is_dir() {
            return Err(FsError::not_a_directory(dest_dir));
        }

        let target = dest.as_path().join(stem);
        let folder = snapshot.to_virtual(&target)?;
        if exists(&target)? {
            return Err(FsError::already_exists(folder.as_str()));
        }

        let plan = ImportPlan::new(bytes, &target, self.config().limits)?;

        self.revalidate(dest_dir, &dest)?;
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{stem}."))
            .tempdir_in(dest.as_path())?;

        let mut report = ExtractionReport::new(folder);
        plan.write_into(staging.path(), &mut report)?;
        publish_permissions(staging.path())?;

        if exists(&target)? {
            return Err(FsError::already_exists(report.folder.as_str()));
        }
        fs::rename(staging.path(), &target)?;
        let _ = staging.keep();

        report.duration = start.elapsed();
        tracing::info!(
            folder = %report.folder,
            files = report.files_extracted,
            bytes = report.bytes_written,
            skipped = report.entries_skipped,
            "extracted archive"
        );
        Ok(report)
    }
}

/// Staging folders are created private; the published folder is not.
#[cfg(unix)]
fn publish_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn publish_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}
