//! Short/long form size and count fields
//!
//! A field whose first byte has the top bit clear is a 1-byte short form
//! (0-127). Otherwise it is a 4-byte big-endian long form and the remaining
//! 31 bits carry the magnitude.

use crate::constants::{LONG_FORM_FLAG, MAX_FIELD_VALUE, SHORT_FORM_MAX};
use crate::error::{BinnError, Result};
use smallvec::SmallVec;

/// Encoded width of a field holding `val`.
pub fn field_len(val: usize) -> usize {
    if val <= SHORT_FORM_MAX as usize {
        1
    } else {
        4
    }
}

/// Encode a size/count field in its shortest form
pub fn encode_field(val: usize) -> Result<SmallVec<[u8; 4]>> {
    let mut result = SmallVec::new();
    if val <= SHORT_FORM_MAX as usize {
        result.push(val as u8);
        return Ok(result);
    }
    if val > MAX_FIELD_VALUE as usize {
        return Err(BinnError::LimitExceeded(format!(
            "field value {} exceeds {}",
            val, MAX_FIELD_VALUE
        )));
    }

    let mut bytes = (val as u32).to_be_bytes();
    bytes[0] |= LONG_FORM_FLAG;
    result.extend_from_slice(&bytes);
    Ok(result)
}

/// Decode a size/count field from the front of `bytes`.
///
/// Returns the magnitude and the number of bytes consumed. Never reads
/// past `bytes`.
pub fn decode_field(bytes: &[u8]) -> Result<(usize, usize)> {
    let first = *bytes.first().ok_or(BinnError::UnexpectedEof)?;
    if first & LONG_FORM_FLAG == 0 {
        return Ok((first as usize, 1));
    }

    let long: [u8; 4] = bytes
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(BinnError::UnexpectedEof)?;
    let val = u32::from_be_bytes(long) & MAX_FIELD_VALUE;
    Ok((val as usize, 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_field_roundtrip() {
        let test_cases = vec![0usize, 1, 127, 128, 255, 65_536, MAX_FIELD_VALUE as usize];

        for val in test_cases {
            let encoded = encode_field(val).unwrap();
            assert_eq!(encoded.len(), field_len(val));
            let (decoded, consumed) = decode_field(&encoded).unwrap();
            assert_eq!(val, decoded);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn test_field_encoding_values() {
        assert_eq!(encode_field(0).unwrap().as_slice(), &[0x00]);
        assert_eq!(encode_field(127).unwrap().as_slice(), &[0x7F]);
        assert_eq!(encode_field(128).unwrap().as_slice(), &[0x80, 0x00, 0x00, 0x80]);
        assert_eq!(
            encode_field(0x0123_4567).unwrap().as_slice(),
            &[0x81, 0x23, 0x45, 0x67]
        );
    }

    #[test]
    fn test_field_too_large() {
        assert!(matches!(
            encode_field(MAX_FIELD_VALUE as usize + 1),
            Err(BinnError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_field_decode_truncated() {
        assert!(matches!(decode_field(&[]), Err(BinnError::UnexpectedEof)));
        assert!(matches!(decode_field(&[0x80]), Err(BinnError::UnexpectedEof)));
        assert!(matches!(
            decode_field(&[0x80, 0x00, 0x00]),
            Err(BinnError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_field_decode_non_canonical_long_form() {
        // Long form holding a value that fits the short form is still readable.
        assert_eq!(decode_field(&[0x80, 0x00, 0x00, 0x05]).unwrap(), (5, 4));
    }

    proptest! {
        #[test]
        fn prop_field_roundtrip(value in 0usize..=MAX_FIELD_VALUE as usize) {
            let encoded = encode_field(value).unwrap();
            let (decoded, consumed) = decode_field(&encoded).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, encoded.len());
        }

        #[test]
        fn prop_decode_never_overreads(input in prop::collection::vec(any::<u8>(), 0..8)) {
            if let Ok((_, consumed)) = decode_field(&input) {
                prop_assert!(consumed <= input.len());
            }
        }
    }
}
