//! Read-only, random-access views over MMDB file bytes.
//!
//! Every other component in this crate reads through a `ByteSource`
//! rather than touching a file or buffer directly. This keeps the
//! decoder, trie walker, and layout scanner agnostic to whether the
//! bytes came from `mmap(2)` or were already sitting in memory.

use crate::error::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// A read-only, bounds-checked view of MMDB file bytes.
pub trait ByteSource {
    /// Total length of the underlying byte buffer.
    fn len(&self) -> usize;

    /// True if the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the full buffer.
    fn as_slice(&self) -> &[u8];

    /// Read `n` bytes starting at the absolute offset `offset`.
    ///
    /// Fails with [`Error::Truncated`] if `offset + n` exceeds the
    /// buffer length.
    fn read_at(&self, offset: usize, n: usize) -> Result<&[u8]> {
        let end = offset.checked_add(n).ok_or(Error::Truncated)?;
        self.as_slice().get(offset..end).ok_or(Error::Truncated)
    }

    /// Find the LAST occurrence of `needle` in the buffer.
    ///
    /// The metadata marker may legally appear earlier in the file
    /// (inside encoded data bytes); only the final occurrence is the
    /// real section boundary, so callers must never settle for the
    /// first match.
    fn find_last(&self, needle: &[u8]) -> Option<usize> {
        memchr::memmem::rfind(self.as_slice(), needle)
    }
}

/// A memory-mapped MMDB file.
pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    /// Open and memory-map a file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the file is not expected to be concurrently truncated
        // or resized for the lifetime of the mapping; this is the same
        // tradeoff every mmap-backed reader in this codebase makes.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }
}

impl ByteSource for MmapSource {
    fn len(&self) -> usize {
        self.mmap.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.mmap[..]
    }
}

/// An MMDB file already sitting in memory (no file handle, no mmap).
pub struct BufferSource {
    buf: Vec<u8>,
}

impl BufferSource {
    /// Take ownership of an in-memory buffer.
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf }
    }
}

impl ByteSource for BufferSource {
    fn len(&self) -> usize {
        self.buf.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}
