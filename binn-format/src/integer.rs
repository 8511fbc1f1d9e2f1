//! Integer width compression and widening
//!
//! Integers travel through the codec as `i128`, which holds every value of
//! every supported width. Non-negative values compress to the narrowest
//! unsigned tag, negative values to the narrowest signed tag.

use crate::error::{BinnError, Result};
use crate::types::{Family, TypeTag};

/// Narrowest tag that stores `value` without loss.
pub fn compact_tag(value: i128) -> TypeTag {
    if value >= 0 {
        if value <= u8::MAX as i128 {
            TypeTag::UInt8
        } else if value <= u16::MAX as i128 {
            TypeTag::UInt16
        } else if value <= u32::MAX as i128 {
            TypeTag::UInt32
        } else {
            TypeTag::UInt64
        }
    } else if value >= i8::MIN as i128 {
        TypeTag::Int8
    } else if value >= i16::MIN as i128 {
        TypeTag::Int16
    } else if value >= i32::MIN as i128 {
        TypeTag::Int32
    } else {
        TypeTag::Int64
    }
}

/// Write `value` as the big-endian payload of `tag` into `dst`.
///
/// Returns the payload width. `value` must fit `tag`.
pub fn write_int(tag: TypeTag, value: i128, dst: &mut [u8]) -> Result<usize> {
    fn put(bytes: &[u8], dst: &mut [u8]) -> Result<usize> {
        let slot = dst.get_mut(..bytes.len()).ok_or(BinnError::UnexpectedEof)?;
        slot.copy_from_slice(bytes);
        Ok(bytes.len())
    }

    macro_rules! put_as {
        ($ty:ty) => {{
            let narrowed = <$ty>::try_from(value).map_err(|_| BinnError::OutOfRange {
                found: tag,
                target: "encoded width",
            })?;
            put(&narrowed.to_be_bytes(), dst)
        }};
    }

    match tag {
        TypeTag::UInt8 => put_as!(u8),
        TypeTag::Int8 => put_as!(i8),
        TypeTag::UInt16 => put_as!(u16),
        TypeTag::Int16 => put_as!(i16),
        TypeTag::UInt32 => put_as!(u32),
        TypeTag::Int32 => put_as!(i32),
        TypeTag::UInt64 => put_as!(u64),
        TypeTag::Int64 => put_as!(i64),
        other => Err(BinnError::TypeMismatch {
            expected: Family::Integer.name(),
            found: other,
        }),
    }
}

/// Read the big-endian integer payload of `tag` from the front of `src`.
pub fn read_int(tag: TypeTag, src: &[u8]) -> Result<i128> {
    fn take<const N: usize>(src: &[u8]) -> Result<[u8; N]> {
        src.get(..N)
            .and_then(|b| b.try_into().ok())
            .ok_or(BinnError::UnexpectedEof)
    }

    let value = match tag {
        TypeTag::UInt8 => u8::from_be_bytes(take(src)?) as i128,
        TypeTag::Int8 => i8::from_be_bytes(take(src)?) as i128,
        TypeTag::UInt16 => u16::from_be_bytes(take(src)?) as i128,
        TypeTag::Int16 => i16::from_be_bytes(take(src)?) as i128,
        TypeTag::UInt32 => u32::from_be_bytes(take(src)?) as i128,
        TypeTag::Int32 => i32::from_be_bytes(take(src)?) as i128,
        TypeTag::UInt64 => u64::from_be_bytes(take(src)?) as i128,
        TypeTag::Int64 => i64::from_be_bytes(take(src)?) as i128,
        other => {
            return Err(BinnError::TypeMismatch {
                expected: Family::Integer.name(),
                found: other,
            })
        }
    };
    Ok(value)
}

/// Narrow a decoded integer to the caller's width.
pub fn narrow<T: TryFrom<i128>>(value: i128, found: TypeTag) -> Result<T> {
    T::try_from(value).map_err(|_| BinnError::OutOfRange {
        found,
        target: std::any::type_name::<T>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compact_tag_boundaries() {
        let cases = vec![
            (0i128, TypeTag::UInt8),
            (255, TypeTag::UInt8),
            (256, TypeTag::UInt16),
            (789, TypeTag::UInt16),
            (65_535, TypeTag::UInt16),
            (65_536, TypeTag::UInt32),
            (u32::MAX as i128, TypeTag::UInt32),
            (u32::MAX as i128 + 1, TypeTag::UInt64),
            (u64::MAX as i128, TypeTag::UInt64),
            (-1, TypeTag::Int8),
            (-128, TypeTag::Int8),
            (-129, TypeTag::Int16),
            (-32_768, TypeTag::Int16),
            (-32_769, TypeTag::Int32),
            (i32::MIN as i128, TypeTag::Int32),
            (i32::MIN as i128 - 1, TypeTag::Int64),
            (i64::MIN as i128, TypeTag::Int64),
        ];

        for (value, expected) in cases {
            assert_eq!(compact_tag(value), expected, "value {value}");
        }
    }

    #[test]
    fn test_write_int_big_endian() {
        let mut buf = [0u8; 8];
        assert_eq!(write_int(TypeTag::UInt16, 789, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[0x03, 0x15]);
        assert_eq!(write_int(TypeTag::Int32, -2, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], &[0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn test_write_int_rejects_overflowing_width() {
        let mut buf = [0u8; 8];
        assert!(matches!(
            write_int(TypeTag::UInt8, 256, &mut buf),
            Err(BinnError::OutOfRange { .. })
        ));
        assert!(matches!(
            write_int(TypeTag::UInt32, -1, &mut buf),
            Err(BinnError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_read_int_truncated() {
        assert!(matches!(
            read_int(TypeTag::Int64, &[0x00; 7]),
            Err(BinnError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_narrow_rejects_negative_into_unsigned() {
        assert!(matches!(
            narrow::<u32>(-1, TypeTag::Int8),
            Err(BinnError::OutOfRange { .. })
        ));
        assert_eq!(narrow::<i32>(200, TypeTag::UInt8).unwrap(), 200);
        assert!(narrow::<i8>(200, TypeTag::UInt8).is_err());
    }

    proptest! {
        #[test]
        fn prop_compact_roundtrip_i64(value in any::<i64>()) {
            let tag = compact_tag(value as i128);
            let mut buf = [0u8; 8];
            let width = write_int(tag, value as i128, &mut buf).unwrap();
            prop_assert_eq!(read_int(tag, &buf[..width]).unwrap(), value as i128);
        }

        #[test]
        fn prop_compact_roundtrip_u64(value in any::<u64>()) {
            let tag = compact_tag(value as i128);
            let mut buf = [0u8; 8];
            let width = write_int(tag, value as i128, &mut buf).unwrap();
            prop_assert_eq!(read_int(tag, &buf[..width]).unwrap(), value as i128);
        }
    }
}
