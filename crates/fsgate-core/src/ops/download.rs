//! Opened files handed out for download.

use std::fs::File;
use std::io;
use std::io::Read;

/// An open, readable file together with its reported size and name.
///
/// The handle was opened from a resolver-approved path; reading from it
/// never touches the root list again.
#[derive(Debug)]
pub struct Download {
    file: File,
    size: u64,
    name: String,
}

impl Download {
    pub(crate) fn new(file: File, size: u64, name: String) -> Self {
        Self { file, size, name }
    }

    /// Returns the size reported when the file was opened.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the file name, suitable for a download header.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consumes the download and returns the file handle.
    #[must_use]
    pub fn into_file(self) -> File {
        self.file
    }
}

impl Read for Download {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
