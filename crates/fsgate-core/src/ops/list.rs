//! Directory listing.

use std::fs;
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::Result;
use crate::types::VirtualPath;

/// Kind of a listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A directory.
    Folder,
    /// Anything that is not a directory.
    File,
}

impl EntryKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DirEntry {
    /// File name of the item.
    pub name: String,
    /// Virtual path of the item.
    pub path: VirtualPath,
    /// Folder or file.
    pub kind: EntryKind,
    /// Size in bytes; `None` for folders.
    pub size: Option<u64>,
    /// Modification time in seconds since the Unix epoch.
    pub modified: f64,
}

impl DirEntry {
    /// Returns `true` if the item is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// Reads the immediate children of `dir`, folders first, then by
/// case-insensitive name.
///
/// Metadata follows symlinks; a dangling link is described by the link
/// itself.
pub(crate) fn read_entries(dir: &Path, base: &VirtualPath) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) => metadata,
            Err(_) => entry.metadata()?,
        };

        entries.push(describe(name, base, &metadata));
    }

    sort_entries(&mut entries);
    Ok(entries)
}

fn describe(name: String, base: &VirtualPath, metadata: &Metadata) -> DirEntry {
    let kind = if metadata.is_dir() {
        EntryKind::Folder
    } else {
        EntryKind::File
    };

    DirEntry {
        path: base.join(&name),
        name,
        kind,
        size: (kind == EntryKind::File).then(|| metadata.len()),
        modified: metadata.modified().map_or(0.0, unix_seconds),
    }
}

fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by_cached_key(|e| (!e.is_folder(), e.name.to_lowercase()));
}

fn unix_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}
