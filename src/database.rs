//! The public entry point: open an MMDB file (or an in-memory buffer)
//! and perform lookups against it.

use crate::byte_source::{BufferSource, ByteSource, MmapSource};
use crate::error::Result;
use crate::metadata::Metadata;
use crate::reader::ValueReader;
use crate::trie::{TrieNavigator, TrieOutcome};
use crate::value::Value;
use std::net::IpAddr;
use std::path::Path;

enum Source {
    Mmap(MmapSource),
    Buffer(BufferSource),
}

impl ByteSource for Source {
    fn len(&self) -> usize {
        match self {
            Source::Mmap(s) => s.len(),
            Source::Buffer(s) => s.len(),
        }
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            Source::Mmap(s) => s.as_slice(),
            Source::Buffer(s) => s.as_slice(),
        }
    }
}

/// An opened MMDB database.
///
/// Holds the mapped (or buffered) file bytes and the metadata decoded at
/// open time. Read-only and `Send + Sync`: lookups never mutate shared
/// state, so a single `Database` may be shared across threads. There is
/// no `close()`; the underlying mapping or buffer is released on `Drop`.
pub struct Database {
    source: Source,
    metadata: Metadata,
}

impl Database {
    /// Open and memory-map a file, then decode its metadata.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = Source::Mmap(MmapSource::open(path)?);
        Self::from_source(source)
    }

    /// Wrap an owned in-memory buffer as a database, decoding its
    /// metadata. Useful for tests, fuzzing, or bytes already fetched by
    /// the caller (no file, no mmap).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_source(Source::Buffer(BufferSource::new(bytes)))
    }

    fn from_source(source: Source) -> Result<Self> {
        let metadata = Metadata::read(&source)?;
        Ok(Self { source, metadata })
    }

    /// The decoded metadata for this database.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Look up an address, returning the decoded record, or `None` if
    /// the address is not covered by any entry in the database.
    pub fn lookup(&self, ip: IpAddr) -> Result<Option<Value>> {
        let navigator = TrieNavigator::new(
            &self.source,
            self.metadata.node_count,
            self.metadata.record_size,
        );

        match navigator.lookup(ip, self.metadata.ip_version)? {
            TrieOutcome::NoRecord => Ok(None),
            TrieOutcome::DataOffset { offset, .. } => {
                let reader = ValueReader::new(&self.source, self.metadata.data_section_start);
                let value = reader.decode_at(self.metadata.data_section_start + offset as usize)?;
                Ok(Some(value))
            }
        }
    }
}
