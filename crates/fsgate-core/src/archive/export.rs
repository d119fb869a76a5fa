//! Folder to ZIP export through a temporary spool file.

use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::iter::FusedIterator;
use std::path::Component;
use std::path::Path;

use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ManagerConfig;
use crate::Result;

/// Entries at or above this size need ZIP64 headers.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// A finished archive ready to be streamed to a client.
///
/// The archive lives in a temporary file owned by [`ArchiveChunks`]; the
/// file is removed once the chunks are exhausted, fail, or are dropped.
#[derive(Debug)]
pub struct ArchiveStream {
    filename: String,
    size: u64,
    chunks: ArchiveChunks,
}

impl ArchiveStream {
    /// Returns the download name, `<folder>.zip`.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the archive size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the chunk sequence, dropping the name.
    #[must_use]
    pub fn into_chunks(self) -> ArchiveChunks {
        self.chunks
    }

    /// Splits into the download name and the chunk sequence.
    #[must_use]
    pub fn into_parts(self) -> (String, ArchiveChunks) {
        (self.filename, self.chunks)
    }
}

/// Single-pass sequence of archive chunks.
///
/// Every chunk except the last holds exactly the configured chunk size.
/// After the first `None` or `Err` the spool file is gone and the sequence
/// stays finished.
#[derive(Debug)]
pub struct ArchiveChunks {
    spool: Option<NamedTempFile>,
    chunk_size: usize,
}

impl ArchiveChunks {
    /// Returns the spool file location while it still exists.
    #[must_use]
    pub fn spool_path(&self) -> Option<&Path> {
        self.spool.as_ref().map(NamedTempFile::path)
    }

    fn release(&mut self) {
        if let Some(spool) = self.spool.take()
            && let Err(e) = spool.close()
        {
            tracing::debug!(error = %e, "failed to remove archive spool file");
        }
    }
}

impl Iterator for ArchiveChunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let spool = self.spool.as_mut()?;
        let mut chunk = vec![0u8; self.chunk_size];
        let mut filled = 0;

        while filled < chunk.len() {
            match spool.as_file_mut().read(&mut chunk[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.release();
                    return Some(Err(e.into()));
                }
            }
        }

        if filled == 0 {
            self.release();
            return None;
        }

        chunk.truncate(filled);
        Some(Ok(chunk))
    }
}

impl FusedIterator for ArchiveChunks {}

/// Counts gathered while writing an export.
#[derive(Debug, Default, Clone, Copy)]
struct ExportStats {
    files: usize,
    directories: usize,
    skipped: usize,
}

/// Writes `dir` as a ZIP archive into a spool file and returns it as a
/// stream named `filename`.
pub(crate) fn build(dir: &Path, filename: String, config: &ManagerConfig) -> Result<ArchiveStream> {
    let mut spool = match &config.spool_dir {
        Some(spool_dir) => NamedTempFile::new_in(spool_dir)?,
        None => NamedTempFile::new()?,
    };
    // The spool may sit inside `dir` and must not archive itself.
    let spool_path = spool.path().canonicalize()?;
    let stats = write_zip(spool.as_file_mut(), dir, &spool_path, config)?;

    let size = spool.as_file().metadata()?.len();
    spool.as_file_mut().rewind()?;

    tracing::debug!(
        files = stats.files,
        directories = stats.directories,
        skipped = stats.skipped,
        size,
        "built archive"
    );

    Ok(ArchiveStream {
        filename,
        size,
        chunks: ArchiveChunks {
            spool: Some(spool),
            chunk_size: config.chunk_size.max(1),
        },
    })
}

fn write_zip<W: Write + Seek>(
    writer: W,
    dir: &Path,
    spool: &Path,
    config: &ManagerConfig,
) -> Result<ExportStats> {
    let mut zip = ZipWriter::new(writer);
    let mut stats = ExportStats::default();

    let options = if config.compression_level == Some(0) {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        let level = config.compression_level.unwrap_or(6);
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    };

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let name = archive_name(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            zip.add_directory(format!("{name}/"), options)
                .map_err(|e| io::Error::other(format!("failed to add directory: {e}")))?;
            stats.directories += 1;
        } else if file_type.is_file() && is_spool(&entry, spool) {
            tracing::debug!(entry = %name, "skipping archive spool file");
            stats.skipped += 1;
        } else if file_type.is_file() {
            let metadata = entry.metadata().map_err(io::Error::from)?;
            let file_options = file_options(options, &metadata);

            zip.start_file(name, file_options)
                .map_err(|e| io::Error::other(format!("failed to start file in ZIP: {e}")))?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut zip)?;
            stats.files += 1;
        } else {
            // Symlinks and special files are never followed or read.
            tracing::debug!(entry = %name, "skipping non-regular entry");
            stats.skipped += 1;
        }
    }

    zip.finish()
        .map_err(|e| io::Error::other(format!("failed to finish ZIP archive: {e}")))?;

    Ok(stats)
}

fn is_spool(entry: &walkdir::DirEntry, spool: &Path) -> bool {
    Some(entry.file_name()) == spool.file_name()
        && entry.path().canonicalize().is_ok_and(|path| path == spool)
}

fn file_options(options: SimpleFileOptions, metadata: &std::fs::Metadata) -> SimpleFileOptions {
    let options = options.large_file(metadata.len() >= ZIP64_THRESHOLD);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    }

    #[cfg(not(unix))]
    {
        options
    }
}

/// Joins the components of a walk-relative path with forward slashes.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub/empty")).unwrap();
        fs::write(temp.path().join("a.txt"), "alpha").unwrap();
        fs::write(temp.path().join("sub/b.txt"), "beta".repeat(100)).unwrap();
        temp
    }

    fn collect(chunks: ArchiveChunks) -> Vec<u8> {
        chunks.flat_map(|c| c.unwrap()).collect()
    }

    fn names(bytes: Vec<u8>) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_entries_sorted_with_directories() {
        let tree = sample_tree();
        let stream = build(tree.path(), "tree.zip".into(), &ManagerConfig::default()).unwrap();
        assert_eq!(stream.filename(), "tree.zip");

        let mut listed = names(collect(stream.into_chunks()));
        listed.sort();
        assert_eq!(listed, ["a.txt", "sub/", "sub/b.txt", "sub/empty/"]);
    }

    #[test]
    fn test_chunk_sizes() {
        let tree = sample_tree();
        let config = ManagerConfig::default().with_chunk_size(100);
        let stream = build(tree.path(), "t.zip".into(), &config).unwrap();
        let size = stream.size();

        let chunks: Vec<Vec<u8>> = stream.into_chunks().map(|c| c.unwrap()).collect();
        let (last, full) = chunks.split_last().unwrap();
        assert!(full.iter().all(|c| c.len() == 100));
        assert!(!last.is_empty() && last.len() <= 100);
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>() as u64, size);
    }

    #[test]
    fn test_spool_removed_when_exhausted() {
        let tree = sample_tree();
        let mut chunks = build(tree.path(), "t.zip".into(), &ManagerConfig::default())
            .unwrap()
            .into_chunks();
        let spool = chunks.spool_path().unwrap().to_path_buf();
        assert!(spool.exists());

        while chunks.next().is_some() {}
        assert!(!spool.exists());
        assert!(chunks.spool_path().is_none());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_spool_removed_when_dropped_early() {
        let tree = sample_tree();
        let config = ManagerConfig::default().with_chunk_size(16);
        let mut chunks = build(tree.path(), "t.zip".into(), &config)
            .unwrap()
            .into_chunks();
        let spool = chunks.spool_path().unwrap().to_path_buf();

        assert!(chunks.next().unwrap().is_ok());
        drop(chunks);
        assert!(!spool.exists());
    }

    #[test]
    fn test_spool_removed_when_build_fails() {
        let spool_dir = TempDir::new().unwrap();
        let config = ManagerConfig::default().with_spool_dir(spool_dir.path());

        let missing = spool_dir.path().join("missing");
        assert!(build(&missing, "missing.zip".into(), &config).is_err());
        assert_eq!(fs::read_dir(spool_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_spool_removed_when_read_fails() {
        let spool = NamedTempFile::new().unwrap();
        let (_, path) = spool.into_parts();
        let write_only = fs::File::options().write(true).open(&path).unwrap();
        let location = path.to_path_buf();

        let mut chunks = ArchiveChunks {
            spool: Some(NamedTempFile::from_parts(write_only, path)),
            chunk_size: 16,
        };
        assert!(chunks.next().unwrap().is_err());
        assert!(chunks.spool_path().is_none());
        assert!(!location.exists());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_spool_inside_exported_tree_is_skipped() {
        let tree = sample_tree();
        let spool_dir = tree.path().join("tmp");
        fs::create_dir(&spool_dir).unwrap();
        let config = ManagerConfig::default()
            .with_compression_level(Some(0))
            .with_spool_dir(&spool_dir);

        let stream = build(tree.path(), "tree.zip".into(), &config).unwrap();
        let mut listed = names(collect(stream.into_chunks()));
        listed.sort();
        assert_eq!(listed, ["a.txt", "sub/", "sub/b.txt", "sub/empty/", "tmp/"]);
        assert_eq!(fs::read_dir(&spool_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_stored_when_level_zero() {
        let tree = sample_tree();
        let config = ManagerConfig::default().with_compression_level(Some(0));
        let bytes = collect(build(tree.path(), "t.zip".into(), &config).unwrap().into_chunks());

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_name("a.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped() {
        let tree = sample_tree();
        std::os::unix::fs::symlink("/etc/passwd", tree.path().join("passwd")).unwrap();
        std::os::unix::fs::symlink(tree.path().join("sub"), tree.path().join("loop")).unwrap();

        let stream = build(tree.path(), "t.zip".into(), &ManagerConfig::default()).unwrap();
        let listed = names(collect(stream.into_chunks()));
        assert!(!listed.iter().any(|n| n.starts_with("passwd") || n.starts_with("loop")));
    }

    #[test]
    fn test_empty_folder_gives_valid_archive() {
        let temp = TempDir::new().unwrap();
        let stream = build(temp.path(), "empty.zip".into(), &ManagerConfig::default()).unwrap();
        assert!(names(collect(stream.into_chunks())).is_empty());
    }

    #[test]
    fn test_archive_name_uses_forward_slashes() {
        let relative: std::path::PathBuf = ["a", "b", "c.txt"].iter().collect();
        assert_eq!(archive_name(&relative), "a/b/c.txt");
    }
}
