//! Typed items and the tag codec
//!
//! [`Item`] is both what writers accept and what readers return. Writing
//! picks the wire tag (compressing integers when asked); reading widens or
//! narrows through the typed accessors.

use crate::reader::ContainerRef;
use binn_format::constants::{BLOB_LEN_SIZE, MAX_FIELD_VALUE, MAX_VALUE_SIZE};
use binn_format::integer::{compact_tag, narrow, read_int, write_int};
use binn_format::varint::{decode_field, encode_field, field_len};
use binn_format::{BinnError, Family, Result, TypeTag};

/// One typed value, borrowed from the caller or from an encoded buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'a> {
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Unsigned 8-bit integer
    UInt8(u8),
    /// Signed 8-bit integer
    Int8(i8),
    /// Unsigned 16-bit integer
    UInt16(u16),
    /// Signed 16-bit integer
    Int16(i16),
    /// Unsigned 32-bit integer
    UInt32(u32),
    /// Signed 32-bit integer
    Int32(i32),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// Signed 64-bit integer
    Int64(i64),
    /// Single precision float
    Float32(f32),
    /// Double precision float
    Float64(f64),
    /// UTF-8 string
    Str(&'a str),
    /// Opaque bytes
    Blob(&'a [u8]),
    /// Nested list, map or object
    Container(ContainerRef<'a>),
}

impl<'a> Item<'a> {
    /// Declared type tag, before any integer compression.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Item::Null => TypeTag::Null,
            Item::Bool(true) => TypeTag::True,
            Item::Bool(false) => TypeTag::False,
            Item::UInt8(_) => TypeTag::UInt8,
            Item::Int8(_) => TypeTag::Int8,
            Item::UInt16(_) => TypeTag::UInt16,
            Item::Int16(_) => TypeTag::Int16,
            Item::UInt32(_) => TypeTag::UInt32,
            Item::Int32(_) => TypeTag::Int32,
            Item::UInt64(_) => TypeTag::UInt64,
            Item::Int64(_) => TypeTag::Int64,
            Item::Float32(_) => TypeTag::Float32,
            Item::Float64(_) => TypeTag::Float64,
            Item::Str(_) => TypeTag::String,
            Item::Blob(_) => TypeTag::Blob,
            Item::Container(c) => c.kind().type_tag(),
        }
    }

    /// Semantic family of the item.
    pub fn family(&self) -> Family {
        self.type_tag().family()
    }

    fn int_value(&self) -> Option<i128> {
        let value = match *self {
            Item::UInt8(v) => v as i128,
            Item::Int8(v) => v as i128,
            Item::UInt16(v) => v as i128,
            Item::Int16(v) => v as i128,
            Item::UInt32(v) => v as i128,
            Item::Int32(v) => v as i128,
            Item::UInt64(v) => v as i128,
            Item::Int64(v) => v as i128,
            _ => return None,
        };
        Some(value)
    }

    fn from_int(tag: TypeTag, value: i128) -> Result<Self> {
        let item = match tag {
            TypeTag::UInt8 => Item::UInt8(narrow(value, tag)?),
            TypeTag::Int8 => Item::Int8(narrow(value, tag)?),
            TypeTag::UInt16 => Item::UInt16(narrow(value, tag)?),
            TypeTag::Int16 => Item::Int16(narrow(value, tag)?),
            TypeTag::UInt32 => Item::UInt32(narrow(value, tag)?),
            TypeTag::Int32 => Item::Int32(narrow(value, tag)?),
            TypeTag::UInt64 => Item::UInt64(narrow(value, tag)?),
            TypeTag::Int64 => Item::Int64(narrow(value, tag)?),
            other => {
                return Err(BinnError::TypeMismatch {
                    expected: Family::Integer.name(),
                    found: other,
                })
            }
        };
        Ok(item)
    }

    /// Tag written on the wire.
    pub fn wire_tag(&self, compress_ints: bool) -> TypeTag {
        match self.int_value() {
            Some(value) if compress_ints => compact_tag(value),
            _ => self.type_tag(),
        }
    }

    /// Number of bytes [`Item::write`] produces.
    pub fn encoded_len(&self, compress_ints: bool) -> Result<usize> {
        let len = match self {
            Item::Str(s) => {
                check_len(s.len(), "string")?;
                1 + field_len(s.len()) + s.len() + 1
            }
            Item::Blob(b) => {
                check_len(b.len(), "blob")?;
                1 + BLOB_LEN_SIZE + b.len()
            }
            Item::Container(c) => c.size(),
            Item::Null | Item::Bool(_) => 1,
            Item::Float32(_) => 5,
            Item::Float64(_) => 9,
            _ => {
                let width = self.wire_tag(compress_ints).storage().fixed_len();
                1 + width.unwrap_or_default()
            }
        };
        Ok(len)
    }

    /// Encode tag and payload into the front of `dst`.
    pub fn write(&self, compress_ints: bool, dst: &mut [u8]) -> Result<usize> {
        let mut w = SliceWriter::new(dst);
        if let Item::Container(c) = self {
            // Container bytes carry their own type byte.
            w.put(c.as_bytes())?;
            return Ok(w.position());
        }

        let tag = self.wire_tag(compress_ints);
        w.put(&[tag as u8])?;
        match *self {
            Item::Null | Item::Bool(_) | Item::Container(_) => {}
            Item::Float32(v) => w.put(&v.to_bits().to_be_bytes())?,
            Item::Float64(v) => w.put(&v.to_bits().to_be_bytes())?,
            Item::Str(s) => {
                check_len(s.len(), "string")?;
                w.put(&encode_field(s.len())?)?;
                w.put(s.as_bytes())?;
                w.put(&[0])?;
            }
            Item::Blob(b) => {
                check_len(b.len(), "blob")?;
                w.put(&(b.len() as u32).to_be_bytes())?;
                w.put(b)?;
            }
            _ => {
                let value = self.int_value().ok_or(BinnError::TypeMismatch {
                    expected: Family::Integer.name(),
                    found: tag,
                })?;
                let width = write_int(tag, value, w.remaining_mut())?;
                w.advance(width);
            }
        }
        Ok(w.position())
    }

    /// Decode one item from the front of `bytes`.
    ///
    /// Every length is checked against `bytes`; nested containers are only
    /// header-checked here, the validator walks them.
    pub fn read(bytes: &'a [u8]) -> Result<(Self, usize)> {
        let type_byte = *bytes.first().ok_or(BinnError::UnexpectedEof)?;
        let tag = TypeTag::from_u8(type_byte)?;
        let body = &bytes[1..];

        let decoded = match tag {
            TypeTag::Null => (Item::Null, 1),
            TypeTag::True => (Item::Bool(true), 1),
            TypeTag::False => (Item::Bool(false), 1),
            TypeTag::Float32 => {
                let raw = take::<4>(body)?;
                (Item::Float32(f32::from_bits(u32::from_be_bytes(raw))), 5)
            }
            TypeTag::Float64 => {
                let raw = take::<8>(body)?;
                (Item::Float64(f64::from_bits(u64::from_be_bytes(raw))), 9)
            }
            TypeTag::String => {
                let (len, len_bytes) = decode_field(body)?;
                let start = 1 + len_bytes;
                let end = start
                    .checked_add(len)
                    .ok_or_else(|| BinnError::Malformed("string length overflows".to_string()))?;
                let raw = bytes.get(start..end).ok_or(BinnError::UnexpectedEof)?;
                match bytes.get(end) {
                    Some(0) => {}
                    Some(_) => {
                        return Err(BinnError::Malformed(
                            "string missing NUL terminator".to_string(),
                        ))
                    }
                    None => return Err(BinnError::UnexpectedEof),
                }
                let s = std::str::from_utf8(raw)
                    .map_err(|e| BinnError::Malformed(format!("string is not UTF-8: {e}")))?;
                (Item::Str(s), end + 1)
            }
            TypeTag::Blob => {
                let len = u32::from_be_bytes(take::<4>(body)?) as usize;
                if len > MAX_VALUE_SIZE {
                    return Err(BinnError::Malformed(format!("blob length {len} too large")));
                }
                let start = 1 + BLOB_LEN_SIZE;
                let raw = bytes
                    .get(start..start + len)
                    .ok_or(BinnError::UnexpectedEof)?;
                (Item::Blob(raw), start + len)
            }
            TypeTag::List | TypeTag::Map | TypeTag::Object => {
                let container = ContainerRef::parse(bytes)?;
                (Item::Container(container), container.size())
            }
            int_tag => {
                let value = read_int(int_tag, body)?;
                let width = int_tag.storage().fixed_len().unwrap_or_default();
                (Item::from_int(int_tag, value)?, 1 + width)
            }
        };
        Ok(decoded)
    }

    fn mismatch(&self, expected: Family) -> BinnError {
        BinnError::TypeMismatch {
            expected: expected.name(),
            found: self.type_tag(),
        }
    }

    /// Whether the item is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        match *self {
            Item::Bool(b) => Ok(b),
            _ => Err(self.mismatch(Family::Bool)),
        }
    }

    /// Read any integer tag at the width of `T`.
    ///
    /// Fails with [`BinnError::OutOfRange`] when the stored value does not
    /// fit `T`, e.g. a negative value read as unsigned.
    pub fn as_int<T: TryFrom<i128>>(&self) -> Result<T> {
        let value = self
            .int_value()
            .ok_or_else(|| self.mismatch(Family::Integer))?;
        narrow(value, self.type_tag())
    }

    /// Read as `i32`.
    pub fn as_i32(&self) -> Result<i32> {
        self.as_int()
    }

    /// Read as `i64`.
    pub fn as_i64(&self) -> Result<i64> {
        self.as_int()
    }

    /// Read as `u32`.
    pub fn as_u32(&self) -> Result<u32> {
        self.as_int()
    }

    /// Read as `u64`.
    pub fn as_u64(&self) -> Result<u64> {
        self.as_int()
    }

    /// Read as `f64`; accepts both float widths.
    pub fn as_f64(&self) -> Result<f64> {
        match *self {
            Item::Float32(v) => Ok(v as f64),
            Item::Float64(v) => Ok(v),
            _ => Err(self.mismatch(Family::Float)),
        }
    }

    /// Read as `f32`; a stored `f64` must convert without loss.
    pub fn as_f32(&self) -> Result<f32> {
        match *self {
            Item::Float32(v) => Ok(v),
            Item::Float64(v) => {
                let narrowed = v as f32;
                if narrowed as f64 == v || v.is_nan() {
                    Ok(narrowed)
                } else {
                    Err(BinnError::OutOfRange {
                        found: TypeTag::Float64,
                        target: "f32",
                    })
                }
            }
            _ => Err(self.mismatch(Family::Float)),
        }
    }

    /// Read as a string slice.
    pub fn as_str(&self) -> Result<&'a str> {
        match *self {
            Item::Str(s) => Ok(s),
            _ => Err(self.mismatch(Family::String)),
        }
    }

    /// Read as blob bytes.
    pub fn as_blob(&self) -> Result<&'a [u8]> {
        match *self {
            Item::Blob(b) => Ok(b),
            _ => Err(self.mismatch(Family::Blob)),
        }
    }

    /// Read as a nested container.
    pub fn as_container(&self) -> Result<ContainerRef<'a>> {
        match *self {
            Item::Container(c) => Ok(c),
            _ => Err(self.mismatch(Family::Container)),
        }
    }
}

fn check_len(len: usize, what: &str) -> Result<()> {
    if len > MAX_FIELD_VALUE as usize {
        return Err(BinnError::LimitExceeded(format!(
            "{what} of {len} bytes exceeds {MAX_FIELD_VALUE}"
        )));
    }
    Ok(())
}

fn take<const N: usize>(src: &[u8]) -> Result<[u8; N]> {
    src.get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or(BinnError::UnexpectedEof)
}

/// Cursor over a destination slice; every write is bounds-checked.
pub(crate) struct SliceWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> SliceWriter<'b> {
    pub(crate) fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        self.buf
            .get_mut(self.pos..end)
            .ok_or(BinnError::UnexpectedEof)?
            .copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn remaining_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

macro_rules! from_prim {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<$ty> for Item<'a> {
                fn from(v: $ty) -> Self {
                    Item::$variant(v)
                }
            }
        )*
    };
}

from_prim!(
    bool => Bool,
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    u64 => UInt64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);

impl<'a> From<&'a str> for Item<'a> {
    fn from(s: &'a str) -> Self {
        Item::Str(s)
    }
}

impl<'a> From<&'a String> for Item<'a> {
    fn from(s: &'a String) -> Self {
        Item::Str(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for Item<'a> {
    fn from(b: &'a [u8]) -> Self {
        Item::Blob(b)
    }
}

impl<'a> From<ContainerRef<'a>> for Item<'a> {
    fn from(c: ContainerRef<'a>) -> Self {
        Item::Container(c)
    }
}

impl<'a, T: Into<Item<'a>>> From<Option<T>> for Item<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Item::Null, Into::into)
    }
}

macro_rules! try_from_int {
    ($($ty:ty),*) => {
        $(
            impl<'a> TryFrom<Item<'a>> for $ty {
                type Error = BinnError;

                fn try_from(item: Item<'a>) -> Result<Self> {
                    item.as_int()
                }
            }
        )*
    };
}

try_from_int!(u8, i8, u16, i16, u32, i32, u64, i64);

impl<'a> TryFrom<Item<'a>> for bool {
    type Error = BinnError;

    fn try_from(item: Item<'a>) -> Result<Self> {
        item.as_bool()
    }
}

impl<'a> TryFrom<Item<'a>> for f32 {
    type Error = BinnError;

    fn try_from(item: Item<'a>) -> Result<Self> {
        item.as_f32()
    }
}

impl<'a> TryFrom<Item<'a>> for f64 {
    type Error = BinnError;

    fn try_from(item: Item<'a>) -> Result<Self> {
        item.as_f64()
    }
}

impl<'a> TryFrom<Item<'a>> for &'a str {
    type Error = BinnError;

    fn try_from(item: Item<'a>) -> Result<Self> {
        item.as_str()
    }
}

impl<'a> TryFrom<Item<'a>> for &'a [u8] {
    type Error = BinnError;

    fn try_from(item: Item<'a>) -> Result<Self> {
        item.as_blob()
    }
}

impl<'a> TryFrom<Item<'a>> for ContainerRef<'a> {
    type Error = BinnError;

    fn try_from(item: Item<'a>) -> Result<Self> {
        item.as_container()
    }
}
