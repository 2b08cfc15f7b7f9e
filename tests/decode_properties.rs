//! Property-based coverage of the control-byte/length decoder: for any
//! byte sequence, the decoder either consumes bytes and returns a value
//! or returns a declared error. It must never panic.

use mmdb_core::byte_source::BufferSource;
use mmdb_core::reader::ValueReader;
use proptest::prelude::*;

proptest! {
    #[test]
    fn decoder_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let src = BufferSource::new(bytes);
        let reader = ValueReader::new(&src, 0);
        // Any outcome (Ok or a declared Err) is acceptable; a panic would
        // fail the test on its own.
        let _ = reader.decode_at(0);
    }

    #[test]
    fn uint_zero_payload_decodes_to_zero(len_code in 0u8..=3) {
        // type=6 (Uint32), length = len_code (0..=3, always valid widths).
        let ctrl = 0xC0 | len_code;
        let mut bytes = vec![ctrl];
        bytes.extend(std::iter::repeat(0u8).take(len_code as usize));
        let src = BufferSource::new(bytes);
        let reader = ValueReader::new(&src, 0);
        let value = reader.decode_at(0).unwrap();
        prop_assert_eq!(value.as_u64(), Some(0));
    }

    #[test]
    fn length_extension_29_matches_formula(b1 in any::<u8>()) {
        // type=4 (Bytes), len field = 29 (extended, +1 byte).
        let mut bytes = vec![0x80 | 29, b1];
        let expected_len = 29usize + b1 as usize;
        bytes.extend(std::iter::repeat(0xAAu8).take(expected_len));
        let src = BufferSource::new(bytes);
        let reader = ValueReader::new(&src, 0);
        match reader.decode_at(0).unwrap() {
            mmdb_core::Value::Bytes(b) => prop_assert_eq!(b.len(), expected_len),
            other => prop_assert!(false, "expected Bytes, got {:?}", other),
        }
    }
}
