//! BINN Codec - Builders, readers and validation
//!
//! This crate provides the engine on top of `binn-format`:
//!
//! - Growable or caller-supplied buffers
//! - The item tag codec with integer compression
//! - Container writers ([`Value`]) and borrowed readers ([`ContainerRef`])
//! - The structural validator for untrusted buffers
//! - A JSON bridge

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod item;
pub mod json;
pub mod reader;
pub mod validate;
pub mod value;

// Re-export commonly used types
pub use binn_format::{BinnError, ContainerKind, Family, Limits, Result, TypeTag};

// Re-export our own types
pub use item::Item;
pub use json::{from_json, to_json};
pub use reader::{ContainerRef, Entries, Key};
pub use validate::{is_valid, validate, validate_with_limits, ValidatedHeader};
pub use value::{Value, ValueOptions};

use binn_format::varint::decode_field;
use binn_format::{ContainerHeader, StorageClass};

/// Encode one standalone item with integer compression.
pub fn encode_item(item: &Item<'_>) -> Result<Vec<u8>> {
    encode_item_with(item, true)
}

/// Encode one standalone item.
pub fn encode_item_with(item: &Item<'_>, compress_ints: bool) -> Result<Vec<u8>> {
    let len = item.encoded_len(compress_ints)?;
    let mut out = Vec::new();
    out.try_reserve_exact(len)?;
    out.resize(len, 0);
    item.write(compress_ints, &mut out)?;
    Ok(out)
}

/// Validate `bytes` and decode the item at its start.
pub fn decode_item(bytes: &[u8]) -> Result<Item<'_>> {
    decode_item_with_limits(bytes, &Limits::default())
}

/// [`decode_item`] with explicit limits.
pub fn decode_item_with_limits<'a>(bytes: &'a [u8], limits: &Limits) -> Result<Item<'a>> {
    validate_with_limits(bytes, limits)?;
    let (item, _) = Item::read(bytes)?;
    Ok(item)
}

/// Size claimed by the leading item of `bytes`, or 0 if unreadable.
///
/// Only the item's own header is read; the entries are not validated. An
/// item that claims more bytes than `bytes` holds is unreadable.
pub fn encoded_size(bytes: &[u8]) -> usize {
    let Some(&type_byte) = bytes.first() else {
        return 0;
    };
    if TypeTag::from_u8(type_byte).is_err() {
        return 0;
    }
    match StorageClass::of(type_byte) {
        StorageClass::Container => ContainerHeader::decode(bytes)
            .map(|(header, _)| header.size)
            .unwrap_or(0),
        StorageClass::String => match decode_field(&bytes[1..]) {
            Ok((len, len_bytes)) => (1 + len_bytes)
                .checked_add(len)
                .and_then(|n| n.checked_add(1))
                .filter(|&total| total <= bytes.len())
                .unwrap_or(0),
            Err(_) => 0,
        },
        _ => Item::read(bytes).map(|(_, len)| len).unwrap_or(0),
    }
}

/// Encoded size of a value; `None` is 0.
pub fn size_of(value: Option<&Value<'_>>) -> usize {
    value.map_or(0, Value::size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_scalar() {
        let bytes = encode_item(&Item::Int32(-2)).unwrap();
        assert_eq!(bytes, vec![0x21, 0xFE]);
        assert_eq!(decode_item(&bytes).unwrap().as_i32().unwrap(), -2);

        let wide = encode_item_with(&Item::Int32(-2), false).unwrap();
        assert_eq!(wide, vec![0x61, 0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn test_decode_item_validates_containers() {
        assert!(decode_item(&[0xE0, 0x05, 0x01, 0x20, 0x07]).is_ok());
        assert!(decode_item(&[0xE0, 0x05, 0x02, 0x20, 0x07]).is_err());
    }

    #[test]
    fn test_decode_item_with_limits() {
        // [[[]]]
        let bytes = [0xE0, 0x09, 0x01, 0xE0, 0x06, 0x01, 0xE0, 0x03, 0x00];
        let shallow = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        assert!(matches!(
            decode_item_with_limits(&bytes, &shallow),
            Err(BinnError::LimitExceeded(_))
        ));
        assert!(decode_item(&bytes).unwrap().as_container().is_ok());
    }

    #[test]
    fn test_encoded_size() {
        assert_eq!(encoded_size(&[]), 0);
        assert_eq!(encoded_size(&[0xE2, 0x03, 0x00]), 3);
        assert_eq!(encoded_size(&[0xE0, 0x80, 0x00, 0x01, 0x00]), 0);
        assert_eq!(encoded_size(&[0xA0, 0x02, b'h', b'i', 0x00]), 5);
        // Claimed size only; the terminator is not checked.
        assert_eq!(encoded_size(&[0xA0, 0x02, b'h', b'i', 0xFF]), 5);
        assert_eq!(encoded_size(&[0x62, 0, 0, 0, 0]), 5);
        assert_eq!(encoded_size(&[0x03]), 0);
    }

    #[test]
    fn test_encoded_size_rejects_unknown_or_truncated_strings() {
        assert_eq!(encoded_size(&[0xA1, 0x02, b'h', b'i', 0x00]), 0);
        assert_eq!(encoded_size(&[0xA0, 0x02, b'h']), 0);
        assert_eq!(encoded_size(&[0xA0, 0x7F]), 0);
        assert_eq!(encoded_size(&[0xA0, 0x80, 0x00]), 0);
    }

    #[test]
    fn test_size_of_absent_value() {
        assert_eq!(size_of(None), 0);
        let list = Value::list().unwrap();
        assert_eq!(size_of(Some(&list)), 3);
    }
}
