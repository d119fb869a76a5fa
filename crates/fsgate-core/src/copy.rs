//! Buffered byte copying with an upper bound.
//!
//! Used when decompressing archive entries, whose declared sizes cannot be
//! trusted, and when spooling export chunks.

use std::io;
use std::io::Read;
use std::io::Write;

use crate::FsError;
use crate::QuotaResource;
use crate::Result;

/// Buffer size for I/O operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer for copying.
///
/// One buffer is allocated per extraction and shared by every entry.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zero-initialized copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies from `reader` to `writer`, failing once more than `limit` bytes
/// have been read.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// - `QuotaExceeded` with [`QuotaResource::EntrySize`] if the source yields
///   more than `limit` bytes
/// - `Io` if reading or writing fails
pub fn copy_with_limit<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    limit: u64,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FsError::Io(e)),
        };

        total = total
            .checked_add(bytes_read as u64)
            .ok_or(FsError::QuotaExceeded {
                resource: QuotaResource::IntegerOverflow,
            })?;
        if total > limit {
            return Err(FsError::QuotaExceeded {
                resource: QuotaResource::EntrySize {
                    size: total,
                    max: limit,
                },
            });
        }

        writer.write_all(&buffer.buf[..bytes_read])?;
    }

    Ok(total)
}
