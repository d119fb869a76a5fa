//! Recursive copy, move and removal of filesystem items.
//!
//! Symlinks inside a copied tree are recreated, never followed.

use std::fs;
use std::fs::File;
use std::fs::FileTimes;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::Result;

/// Copies a file, symlink or directory tree from `src` to `dest`.
///
/// `dest` must not exist. Permissions and modification times are carried
/// over.
pub(crate) fn copy_item(src: &Path, dest: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(src)?;
    if metadata.file_type().is_symlink() {
        return copy_symlink(src, dest);
    }
    if !metadata.is_dir() {
        return copy_file(src, dest, &metadata);
    }

    let mut directories: Vec<(PathBuf, PathBuf)> = Vec::new();

    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = if relative.as_os_str().is_empty() {
            dest.to_path_buf()
        } else {
            dest.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir(&target)?;
            directories.push((entry.path().to_path_buf(), target));
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            let metadata = entry.metadata().map_err(io::Error::from)?;
            copy_file(entry.path(), &target, &metadata)?;
        }
    }

    // Children first, so writing into a directory does not bump its mtime
    // after it was restored.
    for (source, target) in directories.iter().rev() {
        if let Ok(metadata) = fs::metadata(source) {
            copy_dir_attributes(target, &metadata);
        }
    }

    Ok(())
}

/// Moves `src` to `dest`, falling back to copy and delete across devices.
pub(crate) fn move_item(src: &Path, dest: &Path) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("rename crosses devices, copying instead");
            copy_then_remove(src, dest)
        }
        Err(e) => Err(e.into()),
    }
}

/// Copies `src` to `dest` and removes `src`. A failed copy removes whatever
/// it had already written to `dest`.
fn copy_then_remove(src: &Path, dest: &Path) -> Result<()> {
    if exists(dest)? {
        return Err(io::Error::from(io::ErrorKind::AlreadyExists).into());
    }

    if let Err(e) = copy_item(src, dest) {
        if exists(dest).unwrap_or(false)
            && let Err(cleanup) = remove_item(dest)
        {
            tracing::debug!(error = %cleanup, "failed to remove partial move target");
        }
        return Err(e);
    }
    remove_item(src)
}

/// Removes a file or symlink, or a directory recursively.
pub(crate) fn remove_item(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Returns whether anything, including a dangling symlink, exists at `path`.
pub(crate) fn exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn copy_file(src: &Path, dest: &Path, metadata: &Metadata) -> Result<()> {
    let mut reader = File::open(src)?;
    let mut writer = File::options().write(true).create_new(true).open(dest)?;
    io::copy(&mut reader, &mut writer)?;

    if let Ok(modified) = metadata.modified() {
        writer.set_times(FileTimes::new().set_modified(modified))?;
    }
    writer.set_permissions(metadata.permissions())?;
    Ok(())
}

fn copy_dir_attributes(dest: &Path, metadata: &Metadata) {
    if let Ok(modified) = metadata.modified()
        && let Ok(dir) = File::open(dest)
        && let Err(e) = dir.set_times(FileTimes::new().set_modified(modified))
    {
        tracing::debug!(error = %e, "could not restore directory mtime");
    }
    if let Err(e) = fs::set_permissions(dest, metadata.permissions()) {
        tracing::debug!(error = %e, "could not restore directory permissions");
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dest)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dest: &Path) -> Result<()> {
    tracing::debug!(link = %src.display(), "skipping symlink on this platform");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_times(FileTimes::new().set_modified(time)).unwrap();
    }

    #[test]
    fn test_copy_file_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, "hello").unwrap();
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        set_mtime(&src, past);

        let dest = temp.path().join("b.txt");
        copy_item(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "hello");
        assert_eq!(fs::metadata(&dest).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_copy_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("nested/empty")).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        fs::write(src.join("nested/inner.txt"), "inner").unwrap();

        let dest = temp.path().join("dest");
        copy_item(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("top.txt")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(dest.join("nested/inner.txt")).unwrap(),
            "inner"
        );
        assert!(dest.join("nested/empty").is_dir());
        assert!(src.join("top.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_tree_recreates_symlinks() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside.txt");
        fs::write(&outside, "secret").unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        std::os::unix::fs::symlink(&outside, src.join("link")).unwrap();

        let dest = temp.path().join("dest");
        copy_item(&src, &dest).unwrap();

        let copied = dest.join("link");
        assert!(fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&copied).unwrap(), outside);
    }

    #[test]
    fn test_copy_refuses_existing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();

        assert!(copy_item(&src, &dest).is_err());
    }

    #[test]
    fn test_move_and_remove() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("dir");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("f"), "x").unwrap();

        let dest = temp.path().join("moved");
        move_item(&src, &dest).unwrap();
        assert!(!exists(&src).unwrap());
        assert!(dest.join("f").is_file());

        remove_item(&dest).unwrap();
        assert!(!exists(&dest).unwrap());
    }

    #[test]
    fn test_copy_then_remove() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("dir");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("f"), "x").unwrap();

        let dest = temp.path().join("moved");
        copy_then_remove(&src, &dest).unwrap();
        assert!(!exists(&src).unwrap());
        assert_eq!(fs::read_to_string(dest.join("f")).unwrap(), "x");
    }

    #[test]
    fn test_copy_then_remove_keeps_existing_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, "new").unwrap();
        let dest = temp.path().join("b.txt");
        fs::write(&dest, "old").unwrap();

        assert!(copy_then_remove(&src, &dest).is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
        assert!(src.exists());
    }

    // Opening a socket file fails, so the copy breaks after `a.txt`.
    #[cfg(unix)]
    #[test]
    fn test_failed_copy_leaves_no_partial_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(src.join("sock")).unwrap();

        let dest = temp.path().join("dest");
        assert!(copy_then_remove(&src, &dest).is_err());
        assert!(!exists(&dest).unwrap());
        assert!(src.join("a.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_exists_sees_dangling_symlink() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("missing"), &link).unwrap();
        assert!(exists(&link).unwrap());
        remove_item(&link).unwrap();
        assert!(!exists(&link).unwrap());
    }
}
