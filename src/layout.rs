//! Locates the fixed sentinel byte strings that divide an MMDB file into
//! its search tree, data section, and metadata section.

use crate::byte_source::ByteSource;
use crate::error::{Error, Result};

/// `0xAB 0xCD 0xEF "MaxMind.com"`, marking the start of the metadata
/// section. Metadata is everything from just after this marker to EOF.
pub const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";

/// The data section is preceded by 16 zero bytes separating it from the
/// search tree.
pub const DATA_SECTION_SEPARATOR_LEN: usize = 16;

/// Find the metadata marker, keeping the LAST occurrence.
///
/// The marker bytes may legally recur earlier in the file as part of
/// encoded data; only the final occurrence is the real section
/// boundary.
pub fn find_metadata_marker<S: ByteSource>(source: &S) -> Result<usize> {
    source.find_last(METADATA_MARKER).ok_or(Error::NotAnMmdb)
}

/// Absolute offset where the metadata section's single Map value begins.
pub fn metadata_start<S: ByteSource>(source: &S) -> Result<usize> {
    Ok(find_metadata_marker(source)? + METADATA_MARKER.len())
}
