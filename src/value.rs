//! The decoded MMDB value tree.
//!
//! `Value` is the tagged variant every data-section entry decodes into.
//! `Pointer`, `EndMarker`, and `DataCacheContainer` are internal
//! book-keeping tags: [`crate::reader::ValueReader`] resolves pointers
//! before returning a value to a caller and rejects the other two as
//! malformed, so well-formed databases never surface them through the
//! public API. They stay in the enum because the decoder has to
//! recognise them on the wire.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

/// A single MMDB-encoded value, decoded and owned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Internal: an unresolved reference to another data-section offset.
    Pointer(u32),
    /// A UTF-8 string.
    Utf8(String),
    /// An IEEE 754 double-precision float.
    Double(f64),
    /// Raw, untyped bytes.
    Bytes(Vec<u8>),
    /// An unsigned 16-bit integer.
    Uint16(u16),
    /// An unsigned 32-bit integer.
    Uint32(u32),
    /// An unsigned 64-bit integer.
    Uint64(u64),
    /// An unsigned 128-bit integer.
    Uint128(u128),
    /// A signed 32-bit integer.
    Int32(i32),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An ordered sequence of string-keyed values.
    ///
    /// Keeps insertion order (as written by the database) rather than
    /// collapsing into a `HashMap`, since MMDB map keys have no
    /// uniqueness guarantee a decoder should enforce and some callers
    /// care about the on-disk order (e.g. `description` language order).
    Map(Vec<(String, Value)>),
    /// A boolean.
    Boolean(bool),
    /// An IEEE 754 single-precision float.
    Float(f32),
    /// Internal: reserved tag, rejected if it reaches the public API.
    EndMarker,
    /// Internal: reserved tag, rejected if it reaches the public API.
    DataCacheContainer,
}

impl Value {
    /// Borrow this value as a `Map`, if it is one.
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in this value if it is a `Map`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Borrow this value as a UTF-8 string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }

    /// Widen this value to a `u64`, if it is one of the unsigned integer
    /// variants narrower than or equal to 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint16(n) => Some(*n as u64),
            Value::Uint32(n) => Some(*n as u64),
            Value::Uint64(n) => Some(*n),
            _ => None,
        }
    }

    /// Render this value as a `serde_json::Value`, for CLI/debug output.
    ///
    /// `Pointer`, `EndMarker`, and `DataCacheContainer` have no JSON
    /// representation and never appear in a fully-resolved value tree;
    /// they serialize as JSON `null` rather than panicking, since this
    /// is a display convenience, not a wire format.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Pointer(_) | Value::EndMarker | Value::DataCacheContainer => J::Null,
            Value::Utf8(s) => J::String(s.clone()),
            Value::Double(d) => serde_json::Number::from_f64(*d)
                .map(J::Number)
                .unwrap_or(J::Null),
            Value::Bytes(b) => J::Array(b.iter().map(|byte| J::from(*byte)).collect()),
            Value::Uint16(n) => J::from(*n),
            Value::Uint32(n) => J::from(*n),
            Value::Uint64(n) => J::from(*n),
            Value::Uint128(n) => J::String(n.to_string()),
            Value::Int32(n) => J::from(*n),
            Value::Array(items) => J::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => {
                let mut map = serde_json::Map::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                J::Object(map)
            }
            Value::Boolean(b) => J::Bool(*b),
            Value::Float(f) => serde_json::Number::from_f64(*f as f64)
                .map(J::Number)
                .unwrap_or(J::Null),
        }
    }

    /// Flatten a `Map` value into a `HashMap`, discarding key order.
    ///
    /// Convenience for callers that want simple field access (e.g.
    /// metadata extraction) and don't care about on-disk ordering.
    pub fn into_hash_map(self) -> Option<HashMap<String, Value>> {
        match self {
            Value::Map(entries) => Some(entries.into_iter().collect()),
            _ => None,
        }
    }
}

impl Serialize for Value {
    /// Serializes via [`Value::to_json`] rather than deriving a
    /// variant-tagged representation, since callers want the same JSON
    /// shape whether they call `to_json()` directly or serialize through
    /// `serde_json`/a CLI's `--format` flag.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}
