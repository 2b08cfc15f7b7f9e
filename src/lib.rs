//! mmdb-core: a reader for MaxMind DB (MMDB) files.
//!
//! MMDB files pair a binary-prefix search trie over IP address bits with
//! a self-describing, pointer-rich data section. This crate locates both
//! (and the trailing metadata section), decodes the tagged value
//! encoding, and walks the trie to answer address lookups.
//!
//! This crate reads MMDB files; it does not build, mutate, or merge
//! them, and it does not cache decoded values across lookups.
//!
//! # Quick start
//!
//! ```no_run
//! use mmdb_core::Database;
//! use std::net::IpAddr;
//!
//! let db = mmdb_core::Database::open("GeoLite2-Country.mmdb")?;
//! println!("{}", db.metadata().database_type);
//!
//! let ip: IpAddr = "1.1.1.1".parse()?;
//! if let Some(record) = db.lookup(ip)? {
//!     println!("{}", record.to_json());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layout
//!
//! ```text
//! ┌───────────────────────────────┐
//! │  Search tree (binary trie)    │
//! ├───────────────────────────────┤
//! │  16-byte zero separator       │
//! ├───────────────────────────────┤
//! │  Data section (pointer-rich)  │
//! ├───────────────────────────────┤
//! │  Metadata marker + metadata    │
//! └───────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Read-only, random-access views over MMDB file bytes.
pub mod byte_source;
/// The public entry point for opening a database and running lookups.
pub mod database;
/// Error types for mmdb-core operations.
pub mod error;
/// Locates the search tree, data section, and metadata section.
pub mod layout;
/// The metadata map, decoded and promoted into a typed struct.
pub mod metadata;
/// Decoding of MMDB-encoded values: control bytes, lengths, pointers.
pub mod reader;
/// Binary-search-trie traversal for address lookups.
pub mod trie;
/// The decoded MMDB value tree.
pub mod value;

pub use byte_source::{BufferSource, ByteSource, MmapSource};
pub use database::Database;
pub use error::{Error, Result};
pub use metadata::{IpVersion, Metadata, RecordSize};
pub use reader::ValueReader;
pub use value::Value;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
