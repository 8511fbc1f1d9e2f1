//! Constants and type bytes for the BINN format

/// Mask selecting the storage class (top three bits) of a type byte.
pub const STORAGE_MASK: u8 = 0xE0;
/// Bit marking an extended (two-byte) type. Not supported by this codec.
pub const EXTENDED_TYPE_FLAG: u8 = 0x10;

/// Storage class: no payload bytes.
pub const STORAGE_NOBYTES: u8 = 0x00;
/// Storage class: 1 payload byte.
pub const STORAGE_BYTE: u8 = 0x20;
/// Storage class: 2 payload bytes.
pub const STORAGE_WORD: u8 = 0x40;
/// Storage class: 4 payload bytes.
pub const STORAGE_DWORD: u8 = 0x60;
/// Storage class: 8 payload bytes.
pub const STORAGE_QWORD: u8 = 0x80;
/// Storage class: length-prefixed, NUL-terminated string.
pub const STORAGE_STRING: u8 = 0xA0;
/// Storage class: 4-byte length-prefixed blob.
pub const STORAGE_BLOB: u8 = 0xC0;
/// Storage class: container with size and count fields.
pub const STORAGE_CONTAINER: u8 = 0xE0;

/// Type byte for `null`.
pub const TYPE_NULL: u8 = 0x00;
/// Type byte for `true`.
pub const TYPE_TRUE: u8 = 0x01;
/// Type byte for `false`.
pub const TYPE_FALSE: u8 = 0x02;
/// Type byte for an unsigned 8-bit integer.
pub const TYPE_UINT8: u8 = 0x20;
/// Type byte for a signed 8-bit integer.
pub const TYPE_INT8: u8 = 0x21;
/// Type byte for an unsigned 16-bit integer.
pub const TYPE_UINT16: u8 = 0x40;
/// Type byte for a signed 16-bit integer.
pub const TYPE_INT16: u8 = 0x41;
/// Type byte for an unsigned 32-bit integer.
pub const TYPE_UINT32: u8 = 0x60;
/// Type byte for a signed 32-bit integer.
pub const TYPE_INT32: u8 = 0x61;
/// Type byte for an IEEE 754 single precision float.
pub const TYPE_FLOAT32: u8 = 0x62;
/// Type byte for an unsigned 64-bit integer.
pub const TYPE_UINT64: u8 = 0x80;
/// Type byte for a signed 64-bit integer.
pub const TYPE_INT64: u8 = 0x81;
/// Type byte for an IEEE 754 double precision float.
pub const TYPE_FLOAT64: u8 = 0x82;
/// Type byte for a UTF-8 string.
pub const TYPE_STRING: u8 = 0xA0;
/// Type byte for an opaque blob.
pub const TYPE_BLOB: u8 = 0xC0;
/// Type byte for a list container.
pub const TYPE_LIST: u8 = 0xE0;
/// Type byte for an int32-keyed map container.
pub const TYPE_MAP: u8 = 0xE1;
/// Type byte for a string-keyed object container.
pub const TYPE_OBJECT: u8 = 0xE2;

/// Top bit of a size/count field selecting the 4-byte long form.
pub const LONG_FORM_FLAG: u8 = 0x80;
/// Largest magnitude representable by a 1-byte short form field.
pub const SHORT_FORM_MAX: u32 = 0x7F;
/// Largest magnitude representable by a size/count field (31 bits).
pub const MAX_FIELD_VALUE: u32 = 0x7FFF_FFFF;

/// Smallest container header: type, short size, short count.
pub const MIN_HEADER_SIZE: usize = 3;
/// Largest container header: type, long size, long count.
pub const MAX_HEADER_SIZE: usize = 9;
/// Largest encoded value, bounded by the 31-bit size field.
pub const MAX_VALUE_SIZE: usize = MAX_FIELD_VALUE as usize;

/// Width of a map entry key (big-endian `i32`).
pub const MAP_KEY_SIZE: usize = 4;
/// Longest object key in bytes (1-byte length prefix).
pub const MAX_OBJECT_KEY_LEN: usize = 255;
/// Width of a blob length prefix.
pub const BLOB_LEN_SIZE: usize = 4;

/// Base block size for owned buffers; growth doubles from here.
pub const CHUNK_SIZE: usize = 256;
