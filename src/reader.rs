//! Decoding of MMDB-encoded values: control bytes, lengths, and pointers.
//!
//! `ValueReader` decodes a single value at an absolute file offset and
//! follows pointers, but never more than one hop — a pointer whose
//! target is itself a pointer is rejected as [`Error::BadPointer`]
//! rather than silently chased, per the "exactly one dereference"
//! pointer policy.

use crate::byte_source::ByteSource;
use crate::error::{Error, Result};
use crate::value::Value;

/// Default bound on decode recursion (array/map nesting depth and
/// pointer dereferences). Guards against stack overflow on hostile or
/// corrupt input; 1024 comfortably exceeds anything a real MaxMind
/// database nests.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Decodes MMDB data-section values against a [`ByteSource`].
pub struct ValueReader<'a, S: ByteSource> {
    source: &'a S,
    /// Absolute file offset where the data section begins; pointer
    /// offsets are relative to this.
    data_section_start: usize,
    max_depth: usize,
}

impl<'a, S: ByteSource> ValueReader<'a, S> {
    /// Create a reader with the default recursion bound.
    pub fn new(source: &'a S, data_section_start: usize) -> Self {
        Self {
            source,
            data_section_start,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a reader with an explicit recursion bound (mainly for tests).
    pub fn with_max_depth(source: &'a S, data_section_start: usize, max_depth: usize) -> Self {
        Self {
            source,
            data_section_start,
            max_depth,
        }
    }

    /// Decode the value at absolute file offset `offset`.
    ///
    /// If the value at `offset` is itself a pointer, it is transparently
    /// followed (one hop only).
    pub fn decode_at(&self, offset: usize) -> Result<Value> {
        self.decode_at_with_end(offset).map(|(value, _)| value)
    }

    /// Decode the value at absolute file offset `offset`, also returning
    /// the absolute offset immediately past the bytes consumed.
    ///
    /// Callers that must confirm a value exactly fills a region (e.g. the
    /// metadata map, which MUST consume every remaining byte to EOF) use
    /// this instead of `decode_at` to check the returned cursor against
    /// the expected end.
    pub fn decode_at_with_end(&self, offset: usize) -> Result<(Value, usize)> {
        let mut cursor = offset;
        let value = self.decode_value(&mut cursor, 0)?;
        Ok((value, cursor))
    }

    fn read_u8(&self, cursor: &mut usize) -> Result<u8> {
        let b = self.source.read_at(*cursor, 1)?[0];
        *cursor += 1;
        Ok(b)
    }

    fn read_bytes(&self, cursor: &mut usize, n: usize) -> Result<&'a [u8]> {
        let bytes = self.source.read_at(*cursor, n)?;
        *cursor += n;
        Ok(bytes)
    }

    fn decode_value(&self, cursor: &mut usize, depth: usize) -> Result<Value> {
        if depth > self.max_depth {
            return Err(Error::Malformed("recursion depth exceeded".to_string()));
        }

        let ctrl = self.read_u8(cursor)?;
        let raw_type = ctrl >> 5;
        let raw_len = ctrl & 0x1F;

        if raw_type == 1 {
            // Pointer: the 5-bit field is SSVVV, not a length.
            let target = self.read_pointer_target(cursor, raw_len)?;
            return self.decode_pointer_target(target, depth);
        }

        let type_id = if raw_type == 0 {
            // Extended type: next whole byte gives the real type (E + 7).
            7u16 + self.read_u8(cursor)? as u16
        } else {
            raw_type as u16
        };

        match type_id {
            2 => self.decode_utf8(cursor, raw_len),
            3 => self.decode_double(cursor, raw_len),
            4 => self.decode_bytes(cursor, raw_len),
            5 => self.decode_uint(cursor, raw_len, 2).map(|v| Value::Uint16(v as u16)),
            6 => self.decode_uint(cursor, raw_len, 4).map(|v| Value::Uint32(v as u32)),
            7 => self.decode_map(cursor, raw_len, depth),
            8 => self.decode_int32(cursor, raw_len),
            9 => self.decode_uint(cursor, raw_len, 8).map(Value::Uint64),
            10 => self.decode_uint128(cursor, raw_len),
            11 => self.decode_array(cursor, raw_len, depth),
            12 => Err(Error::Malformed(
                "DataCacheContainer has no defined payload contract".to_string(),
            )),
            13 => Err(Error::Malformed(
                "EndMarker has no defined payload contract".to_string(),
            )),
            14 => Ok(Value::Boolean(raw_len != 0)),
            15 => self.decode_float(cursor, raw_len),
            other => Err(Error::BadType(other as u8)),
        }
    }

    /// Parse the pointer's `SSVVV` field and trailing bytes into an
    /// absolute file offset.
    fn read_pointer_target(&self, cursor: &mut usize, raw_len: u8) -> Result<usize> {
        let size = (raw_len >> 3) & 0x3;
        let high_bits = (raw_len & 0x7) as u32;

        let offset = match size {
            0 => {
                let b0 = self.read_u8(cursor)? as u32;
                (high_bits << 8) | b0
            }
            1 => {
                let tail = self.read_bytes(cursor, 2)?;
                let b = u16::from_be_bytes([tail[0], tail[1]]) as u32;
                2048 + ((high_bits << 16) | b)
            }
            2 => {
                let tail = self.read_bytes(cursor, 3)?;
                let b = ((tail[0] as u32) << 16) | ((tail[1] as u32) << 8) | (tail[2] as u32);
                526336 + ((high_bits << 24) | b)
            }
            3 => {
                let tail = self.read_bytes(cursor, 4)?;
                u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]])
            }
            _ => unreachable!("2-bit field"),
        };

        Ok(self.data_section_start + offset as usize)
    }

    /// Decode the value a pointer targets, rejecting a further pointer
    /// (chains longer than one hop are malformed).
    fn decode_pointer_target(&self, target: usize, depth: usize) -> Result<Value> {
        let ctrl = self.source.read_at(target, 1)?[0];
        if ctrl >> 5 == 1 {
            return Err(Error::BadPointer);
        }
        let mut target_cursor = target;
        self.decode_value(&mut target_cursor, depth + 1)
    }

    fn decode_size(&self, cursor: &mut usize, raw_len: u8) -> Result<usize> {
        match raw_len {
            0..=28 => Ok(raw_len as usize),
            29 => {
                let b1 = self.read_u8(cursor)? as usize;
                Ok(29 + b1)
            }
            30 => {
                let b = self.read_bytes(cursor, 2)?;
                Ok(285 + u16::from_be_bytes([b[0], b[1]]) as usize)
            }
            31 => {
                let b = self.read_bytes(cursor, 3)?;
                let v = ((b[0] as usize) << 16) | ((b[1] as usize) << 8) | (b[2] as usize);
                Ok(65821 + v)
            }
            _ => unreachable!("5-bit field"),
        }
    }

    fn decode_utf8(&self, cursor: &mut usize, raw_len: u8) -> Result<Value> {
        let len = self.decode_size(cursor, raw_len)?;
        let bytes = self.read_bytes(cursor, len)?;
        let s = std::str::from_utf8(bytes).map_err(|_| Error::BadUtf8)?;
        Ok(Value::Utf8(s.to_string()))
    }

    fn decode_bytes(&self, cursor: &mut usize, raw_len: u8) -> Result<Value> {
        let len = self.decode_size(cursor, raw_len)?;
        let bytes = self.read_bytes(cursor, len)?;
        Ok(Value::Bytes(bytes.to_vec()))
    }

    fn decode_double(&self, cursor: &mut usize, raw_len: u8) -> Result<Value> {
        let len = self.decode_size(cursor, raw_len)?;
        if len != 8 {
            return Err(Error::BadLength { kind: "Double", len });
        }
        let bytes = self.read_bytes(cursor, 8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(Value::Double(f64::from_be_bytes(buf)))
    }

    fn decode_float(&self, cursor: &mut usize, raw_len: u8) -> Result<Value> {
        let len = self.decode_size(cursor, raw_len)?;
        if len != 4 {
            return Err(Error::BadLength { kind: "Float", len });
        }
        let bytes = self.read_bytes(cursor, 4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Ok(Value::Float(f32::from_be_bytes(buf)))
    }

    /// Decode an unsigned, variable-width, big-endian integer no wider
    /// than `max_width_bytes`, widened into a `u128` for the caller to
    /// narrow.
    fn decode_uint(&self, cursor: &mut usize, raw_len: u8, max_width_bytes: usize) -> Result<u128> {
        let len = self.decode_size(cursor, raw_len)?;
        if len > max_width_bytes {
            return Err(Error::BadLength {
                kind: "unsigned integer",
                len,
            });
        }
        let bytes = self.read_bytes(cursor, len)?;
        let mut value: u128 = 0;
        for b in bytes {
            value = (value << 8) | (*b as u128);
        }
        Ok(value)
    }

    fn decode_uint128(&self, cursor: &mut usize, raw_len: u8) -> Result<Value> {
        self.decode_uint(cursor, raw_len, 16).map(Value::Uint128)
    }

    fn decode_int32(&self, cursor: &mut usize, raw_len: u8) -> Result<Value> {
        let len = self.decode_size(cursor, raw_len)?;
        if len > 4 {
            return Err(Error::BadLength {
                kind: "Int32",
                len,
            });
        }
        let bytes = self.read_bytes(cursor, len)?;
        let mut value: i32 = if len > 0 && bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for b in bytes {
            value = (value << 8) | (*b as i32);
        }
        Ok(Value::Int32(value))
    }

    fn decode_array(&self, cursor: &mut usize, raw_len: u8, depth: usize) -> Result<Value> {
        let count = self.decode_size(cursor, raw_len)?;
        let mut items = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            items.push(self.decode_value(cursor, depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn decode_map(&self, cursor: &mut usize, raw_len: u8, depth: usize) -> Result<Value> {
        let count = self.decode_size(cursor, raw_len)?;
        let mut entries = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let key = match self.decode_value(cursor, depth + 1)? {
                Value::Utf8(s) => s,
                _ => {
                    return Err(Error::Malformed(
                        "map key must be a string (or a pointer to one)".to_string(),
                    ))
                }
            };
            let value = self.decode_value(cursor, depth + 1)?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }
}
