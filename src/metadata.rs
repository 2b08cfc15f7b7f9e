//! The MMDB metadata map, decoded once at open and promoted into a typed
//! struct alongside the raw value tree.

use crate::byte_source::ByteSource;
use crate::error::{Error, Result};
use crate::layout::{self, DATA_SECTION_SEPARATOR_LEN};
use crate::reader::ValueReader;
use crate::value::Value;

/// Width of a trie node record, in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RecordSize {
    Bits24,
    Bits28,
    Bits32,
}

impl RecordSize {
    /// Bytes occupied by one full node (both records).
    pub fn node_bytes(self) -> usize {
        match self {
            RecordSize::Bits24 => 6,
            RecordSize::Bits28 => 7,
            RecordSize::Bits32 => 8,
        }
    }

    pub fn from_bits(bits: u64) -> Result<Self> {
        match bits {
            24 => Ok(RecordSize::Bits24),
            28 => Ok(RecordSize::Bits28),
            32 => Ok(RecordSize::Bits32),
            _ => Err(Error::Malformed(format!(
                "unsupported record_size: {} bits",
                bits
            ))),
        }
    }
}

/// Whether a database's search tree stores IPv4 or IPv6 addresses.
///
/// An IPv6 database may still answer IPv4 queries (via the all-zero
/// prefix); an IPv4 database cannot answer IPv6 queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum IpVersion {
    V4,
    V6,
}

/// Typed view of the metadata map, with the required fields promoted to
/// named accessors, alongside the full decoded map for anything else a
/// caller wants.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Metadata {
    pub node_count: u32,
    pub record_size: RecordSize,
    pub ip_version: IpVersion,
    pub database_type: String,
    pub languages: Vec<String>,
    pub binary_format_major_version: u16,
    pub binary_format_minor_version: u16,
    pub build_epoch: u64,
    pub description: Vec<(String, String)>,
    /// The full decoded metadata map, unknown keys included.
    pub raw: Value,

    pub tree_size_bytes: usize,
    pub data_section_start: usize,
}

impl Metadata {
    /// Locate, decode, and promote the metadata map for a freshly opened
    /// database. `source` must contain the whole file.
    pub fn read<S: ByteSource>(source: &S) -> Result<Self> {
        let marker_offset = layout::find_metadata_marker(source)?;
        let metadata_start = marker_offset + layout::METADATA_MARKER.len();

        // Metadata values never contain pointers in practice (there is
        // no earlier data section to point into while it's being read),
        // but a data_section_start of 0 is harmless here since it only
        // matters if a pointer is actually encountered.
        let reader = ValueReader::new(source, 0);
        let (raw, end) = reader.decode_at_with_end(metadata_start)?;
        if end != source.len() {
            return Err(Error::Malformed(
                "trailing bytes after metadata map".to_string(),
            ));
        }

        let map = raw
            .as_map()
            .ok_or_else(|| Error::Malformed("metadata is not a map".to_string()))?;

        let node_count = extract_uint(map, "node_count")? as u32;
        let record_size = RecordSize::from_bits(extract_uint(map, "record_size")?)?;
        let ip_version = match extract_uint(map, "ip_version")? {
            4 => IpVersion::V4,
            6 => IpVersion::V6,
            other => {
                return Err(Error::Malformed(format!(
                    "unsupported ip_version: {}",
                    other
                )))
            }
        };
        let database_type = extract_string(map, "database_type")?;
        let languages = extract_string_array(map, "languages").unwrap_or_default();
        let binary_format_major_version =
            extract_uint(map, "binary_format_major_version")? as u16;
        let binary_format_minor_version =
            extract_uint(map, "binary_format_minor_version")? as u16;
        let build_epoch = extract_uint(map, "build_epoch")?;
        let description = extract_description(map).unwrap_or_default();

        let tree_size_bytes = node_count as usize * record_size.node_bytes();
        let data_section_start = tree_size_bytes + DATA_SECTION_SEPARATOR_LEN;

        Ok(Metadata {
            node_count,
            record_size,
            ip_version,
            database_type,
            languages,
            binary_format_major_version,
            binary_format_minor_version,
            build_epoch,
            description,
            raw,
            tree_size_bytes,
            data_section_start,
        })
    }
}

fn extract_uint(map: &[(String, Value)], key: &str) -> Result<u64> {
    let (_, v) = map
        .iter()
        .find(|(k, _)| k == key)
        .ok_or_else(|| Error::Malformed(format!("metadata missing required field '{}'", key)))?;
    v.as_u64()
        .ok_or_else(|| Error::Malformed(format!("metadata field '{}' is not an integer", key)))
}

fn extract_string(map: &[(String, Value)], key: &str) -> Result<String> {
    let (_, v) = map
        .iter()
        .find(|(k, _)| k == key)
        .ok_or_else(|| Error::Malformed(format!("metadata missing required field '{}'", key)))?;
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Malformed(format!("metadata field '{}' is not a string", key)))
}

fn extract_string_array(map: &[(String, Value)], key: &str) -> Option<Vec<String>> {
    let (_, v) = map.iter().find(|(k, _)| k == key)?;
    match v {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

fn extract_description(map: &[(String, Value)]) -> Option<Vec<(String, String)>> {
    let (_, v) = map.iter().find(|(k, _)| k == "description")?;
    let entries = v.as_map()?;
    Some(
        entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_source::BufferSource;
    use crate::layout::METADATA_MARKER;

    /// Hand-build a minimal metadata map and append it after the marker.
    fn fixture() -> BufferSource {
        // Map with 6 required keys + description.
        // node_count: Uint32(2), record_size: Uint16(24), ip_version: Uint16(4),
        // database_type: "Test", languages: ["en"],
        // binary_format_major_version: Uint16(2), binary_format_minor_version: Uint16(0),
        // build_epoch: Uint64(1000), description: {"en": "Test DB"}
        let mut data = Vec::new();
        data.extend_from_slice(METADATA_MARKER);

        // map with 9 entries
        data.push(0xE0 | 0x09); // type=7 (map), len=9 fits in 5 bits? 7<<5=0xE0, len=9 -> 0xE9
        push_str(&mut data, "node_count");
        push_uint32(&mut data, 2);
        push_str(&mut data, "record_size");
        push_uint16(&mut data, 24);
        push_str(&mut data, "ip_version");
        push_uint16(&mut data, 4);
        push_str(&mut data, "database_type");
        push_str(&mut data, "Test");
        push_str(&mut data, "languages");
        data.push(0x21); // array type=11->ext; wait array is primary type? array=11 which is >7 so extended
        // Correction: build array properly below instead of this placeholder.
        data.pop();
        push_array_one_string(&mut data, "en");
        push_str(&mut data, "binary_format_major_version");
        push_uint16(&mut data, 2);
        push_str(&mut data, "binary_format_minor_version");
        push_uint16(&mut data, 0);
        push_str(&mut data, "build_epoch");
        push_uint64(&mut data, 1000);
        push_str(&mut data, "description");
        push_map_one_string(&mut data, "en", "Test DB");

        BufferSource::new(data)
    }

    fn push_str(data: &mut Vec<u8>, s: &str) {
        let len = s.len() as u8;
        data.push(0x40 | len); // type=2 (utf8)
        data.extend_from_slice(s.as_bytes());
    }

    fn push_uint16(data: &mut Vec<u8>, v: u16) {
        if v == 0 {
            data.push(0xA0);
            return;
        }
        let bytes = v.to_be_bytes();
        let trimmed: Vec<u8> = if bytes[0] == 0 {
            vec![bytes[1]]
        } else {
            bytes.to_vec()
        };
        data.push(0xA0 | trimmed.len() as u8);
        data.extend_from_slice(&trimmed);
    }

    fn push_uint32(data: &mut Vec<u8>, v: u32) {
        let bytes = v.to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(3);
        let trimmed = &bytes[first_nonzero..];
        data.push(0xC0 | trimmed.len() as u8);
        data.extend_from_slice(trimmed);
    }

    fn push_uint64(data: &mut Vec<u8>, v: u64) {
        let bytes = v.to_be_bytes();
        let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        let trimmed = &bytes[first_nonzero..];
        // extended type 9 -> ext byte = 9-7 = 2
        data.push(0x00 | trimmed.len() as u8);
        data.push(2);
        data.extend_from_slice(trimmed);
    }

    fn push_array_one_string(data: &mut Vec<u8>, s: &str) {
        // extended type 11 (array) -> ext byte = 11-7=4, len=1
        data.push(0x01);
        data.push(4);
        push_str(data, s);
    }

    fn push_map_one_string(data: &mut Vec<u8>, key: &str, val: &str) {
        data.push(0xE0 | 0x01);
        push_str(data, key);
        push_str(data, val);
    }

    #[test]
    fn reads_required_fields() {
        let src = fixture();
        let meta = Metadata::read(&src).unwrap();
        assert_eq!(meta.node_count, 2);
        assert_eq!(meta.record_size, RecordSize::Bits24);
        assert_eq!(meta.ip_version, IpVersion::V4);
        assert_eq!(meta.database_type, "Test");
        assert_eq!(meta.languages, vec!["en".to_string()]);
        assert_eq!(meta.binary_format_major_version, 2);
        assert_eq!(meta.build_epoch, 1000);
        assert_eq!(
            meta.description,
            vec![("en".to_string(), "Test DB".to_string())]
        );
        assert_eq!(meta.tree_size_bytes, 2 * 6);
        assert_eq!(meta.data_section_start, 2 * 6 + DATA_SECTION_SEPARATOR_LEN);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let mut data = Vec::new();
        data.extend_from_slice(METADATA_MARKER);
        data.push(0xE0); // empty map
        let src = BufferSource::new(data);
        assert!(matches!(Metadata::read(&src), Err(Error::Malformed(_))));
    }
}
