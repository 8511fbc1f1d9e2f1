//! Container header structures

use crate::constants::{MAX_HEADER_SIZE, MAX_VALUE_SIZE, MIN_HEADER_SIZE};
use crate::error::{BinnError, Result as BinnResult};
use crate::types::{ContainerKind, TypeTag};
use crate::varint::{decode_field, encode_field, field_len};
use smallvec::SmallVec;

/// Container header: type byte, size field, count field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Container kind from the type byte
    pub kind: ContainerKind,
    /// Total encoded length, header included
    pub size: usize,
    /// Number of entries
    pub count: usize,
}

impl ContainerHeader {
    /// Compact header for a container whose entries occupy `body_len` bytes.
    pub fn for_body(kind: ContainerKind, body_len: usize, count: usize) -> BinnResult<Self> {
        let count_len = field_len(count);
        let short_total = 1 + 1 + count_len + body_len;
        let size = if short_total <= 0x7F {
            short_total
        } else {
            1 + 4 + count_len + body_len
        };

        if size > MAX_VALUE_SIZE {
            return Err(BinnError::LimitExceeded(format!(
                "container size {} exceeds {}",
                size, MAX_VALUE_SIZE
            )));
        }

        Ok(Self { kind, size, count })
    }

    /// Number of bytes this header occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        1 + field_len(self.size) + field_len(self.count)
    }

    /// Length of the entries following the header.
    pub fn body_len(&self) -> usize {
        self.size - self.encoded_len()
    }

    /// Encode header to bytes
    pub fn encode(&self) -> BinnResult<SmallVec<[u8; MAX_HEADER_SIZE]>> {
        let mut result = SmallVec::new();
        result.push(self.kind.type_tag() as u8);
        result.extend_from_slice(&encode_field(self.size)?);
        result.extend_from_slice(&encode_field(self.count)?);
        Ok(result)
    }

    /// Decode header from bytes
    ///
    /// `bytes` is everything the caller can vouch for; the declared size must
    /// fit inside it. Returns the header and the number of header bytes.
    pub fn decode(bytes: &[u8]) -> BinnResult<(Self, usize)> {
        let type_byte = *bytes.first().ok_or(BinnError::UnexpectedEof)?;
        let kind = TypeTag::from_u8(type_byte)?
            .container_kind()
            .ok_or_else(|| BinnError::Malformed(format!("{type_byte:#04x} is not a container")))?;
        let mut pos = 1;

        let (size, size_len) = decode_field(&bytes[pos..])?;
        pos += size_len;
        if size < MIN_HEADER_SIZE {
            return Err(BinnError::Malformed(format!(
                "container size {} below minimum header",
                size
            )));
        }
        if size > bytes.len() {
            return Err(BinnError::UnexpectedEof);
        }

        let (count, count_len) = decode_field(&bytes[pos..])?;
        pos += count_len;
        if pos > size {
            return Err(BinnError::Malformed(format!(
                "header length {} exceeds container size {}",
                pos, size
            )));
        }

        // Every entry needs at least its key and tag byte.
        let min_body = count
            .checked_mul(kind.key_len(0) + 1)
            .ok_or_else(|| BinnError::Malformed("entry count overflows".to_string()))?;
        if min_body > size - pos {
            return Err(BinnError::Malformed(format!(
                "{} entries cannot fit in {} bytes",
                count,
                size - pos
            )));
        }

        Ok((Self { kind, size, count }, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_header_is_three_bytes() {
        let header = ContainerHeader::for_body(ContainerKind::List, 0, 0).unwrap();
        assert_eq!(header.size, 3);
        assert_eq!(header.encode().unwrap().as_slice(), &[0xE0, 0x03, 0x00]);
    }

    #[test]
    fn test_header_roundtrip() {
        for (kind, body, count) in [
            (ContainerKind::List, 10, 3),
            (ContainerKind::Map, 124, 1),
            (ContainerKind::Map, 125, 1),
            (ContainerKind::Object, 1_000, 200),
            (ContainerKind::Object, 70_000, 70_000 / 2),
        ] {
            let header = ContainerHeader::for_body(kind, body, count).unwrap();
            assert_eq!(header.body_len(), body);
            let mut encoded = header.encode().unwrap().to_vec();
            assert_eq!(encoded.len(), header.encoded_len());
            encoded.resize(header.size, 0x00);
            let (decoded, consumed) = ContainerHeader::decode(&encoded).unwrap();
            assert_eq!(decoded, header);
            assert_eq!(consumed, header.encoded_len());
        }
    }

    #[test]
    fn test_size_switches_to_long_form() {
        // 1 + 1 + 1 + 124 = 127 fits the short form.
        let short = ContainerHeader::for_body(ContainerKind::List, 124, 1).unwrap();
        assert_eq!(short.size, 127);
        assert_eq!(short.encoded_len(), 3);

        let long = ContainerHeader::for_body(ContainerKind::List, 125, 1).unwrap();
        assert_eq!(long.size, 131);
        assert_eq!(long.encoded_len(), 6);
    }

    #[test]
    fn test_long_count_accounts_for_size() {
        // 125 bytes of body with a long count no longer fits a short size.
        let header = ContainerHeader::for_body(ContainerKind::List, 123, 128).unwrap();
        assert_eq!(header.size, 1 + 4 + 4 + 123);
        assert_eq!(header.encoded_len(), 9);
    }

    #[test]
    fn test_decode_rejects_scalar_type() {
        assert!(matches!(
            ContainerHeader::decode(&[0x20, 0x05]),
            Err(BinnError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_size_below_minimum() {
        assert!(matches!(
            ContainerHeader::decode(&[0xE0, 0x02, 0x00]),
            Err(BinnError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_size_beyond_buffer() {
        assert!(matches!(
            ContainerHeader::decode(&[0xE0, 0x05, 0x00]),
            Err(BinnError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decode_rejects_header_longer_than_size() {
        // Long count needs 6 header bytes but size claims 4.
        assert!(matches!(
            ContainerHeader::decode(&[0xE0, 0x04, 0x80, 0x00, 0x00, 0x00]),
            Err(BinnError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_impossible_count() {
        // Two map entries need at least 10 bytes.
        assert!(matches!(
            ContainerHeader::decode(&[0xE1, 0x08, 0x02, 0, 0, 0, 0, 0]),
            Err(BinnError::Malformed(_))
        ));
    }
}
