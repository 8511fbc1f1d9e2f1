//! Type tags, storage classes and container kinds

use crate::constants::*;
use crate::error::BinnError;
use std::fmt;

/// Storage class encoded in the top three bits of a type byte.
///
/// The storage class alone decides how many payload bytes follow the tag,
/// which is what makes the format decodable without a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    /// No payload.
    NoBytes,
    /// 1 payload byte.
    Byte,
    /// 2 payload bytes.
    Word,
    /// 4 payload bytes.
    DWord,
    /// 8 payload bytes.
    QWord,
    /// Length field, bytes, NUL terminator.
    String,
    /// 4-byte length, bytes.
    Blob,
    /// Size field, count field, entries.
    Container,
}

impl StorageClass {
    /// Storage class of a raw type byte.
    pub fn of(byte: u8) -> Self {
        match byte & STORAGE_MASK {
            STORAGE_NOBYTES => StorageClass::NoBytes,
            STORAGE_BYTE => StorageClass::Byte,
            STORAGE_WORD => StorageClass::Word,
            STORAGE_DWORD => StorageClass::DWord,
            STORAGE_QWORD => StorageClass::QWord,
            STORAGE_STRING => StorageClass::String,
            STORAGE_BLOB => StorageClass::Blob,
            _ => StorageClass::Container,
        }
    }

    /// Payload width for fixed-size classes.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            StorageClass::NoBytes => Some(0),
            StorageClass::Byte => Some(1),
            StorageClass::Word => Some(2),
            StorageClass::DWord => Some(4),
            StorageClass::QWord => Some(8),
            StorageClass::String | StorageClass::Blob | StorageClass::Container => None,
        }
    }
}

/// Semantic family of a type tag; accessors match on family, not tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Any signed or unsigned integer width
    Integer,
    /// `float32` / `float64`
    Float,
    /// UTF-8 string
    String,
    /// Opaque bytes
    Blob,
    /// List, map or object
    Container,
}

impl Family {
    /// Human readable family name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Family::Null => "null",
            Family::Bool => "bool",
            Family::Integer => "integer",
            Family::Float => "float",
            Family::String => "string",
            Family::Blob => "blob",
            Family::Container => "container",
        }
    }
}

/// Type tag codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// `null`
    Null = TYPE_NULL,
    /// `true`
    True = TYPE_TRUE,
    /// `false`
    False = TYPE_FALSE,
    /// Unsigned 8-bit integer
    UInt8 = TYPE_UINT8,
    /// Signed 8-bit integer
    Int8 = TYPE_INT8,
    /// Unsigned 16-bit integer
    UInt16 = TYPE_UINT16,
    /// Signed 16-bit integer
    Int16 = TYPE_INT16,
    /// Unsigned 32-bit integer
    UInt32 = TYPE_UINT32,
    /// Signed 32-bit integer
    Int32 = TYPE_INT32,
    /// Single precision float
    Float32 = TYPE_FLOAT32,
    /// Unsigned 64-bit integer
    UInt64 = TYPE_UINT64,
    /// Signed 64-bit integer
    Int64 = TYPE_INT64,
    /// Double precision float
    Float64 = TYPE_FLOAT64,
    /// NUL-terminated UTF-8 string
    String = TYPE_STRING,
    /// Length-prefixed blob
    Blob = TYPE_BLOB,
    /// List container
    List = TYPE_LIST,
    /// Map container
    Map = TYPE_MAP,
    /// Object container
    Object = TYPE_OBJECT,
}

impl TypeTag {
    /// Convert from u8
    pub fn from_u8(val: u8) -> Result<Self, BinnError> {
        let tag = match val {
            TYPE_NULL => TypeTag::Null,
            TYPE_TRUE => TypeTag::True,
            TYPE_FALSE => TypeTag::False,
            TYPE_UINT8 => TypeTag::UInt8,
            TYPE_INT8 => TypeTag::Int8,
            TYPE_UINT16 => TypeTag::UInt16,
            TYPE_INT16 => TypeTag::Int16,
            TYPE_UINT32 => TypeTag::UInt32,
            TYPE_INT32 => TypeTag::Int32,
            TYPE_FLOAT32 => TypeTag::Float32,
            TYPE_UINT64 => TypeTag::UInt64,
            TYPE_INT64 => TypeTag::Int64,
            TYPE_FLOAT64 => TypeTag::Float64,
            TYPE_STRING => TypeTag::String,
            TYPE_BLOB => TypeTag::Blob,
            TYPE_LIST => TypeTag::List,
            TYPE_MAP => TypeTag::Map,
            TYPE_OBJECT => TypeTag::Object,
            other => return Err(BinnError::UnknownType(other)),
        };
        Ok(tag)
    }

    /// Lowercase name used in tool output.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Null => "null",
            TypeTag::True => "true",
            TypeTag::False => "false",
            TypeTag::UInt8 => "uint8",
            TypeTag::Int8 => "int8",
            TypeTag::UInt16 => "uint16",
            TypeTag::Int16 => "int16",
            TypeTag::UInt32 => "uint32",
            TypeTag::Int32 => "int32",
            TypeTag::Float32 => "float32",
            TypeTag::UInt64 => "uint64",
            TypeTag::Int64 => "int64",
            TypeTag::Float64 => "float64",
            TypeTag::String => "string",
            TypeTag::Blob => "blob",
            TypeTag::List => "list",
            TypeTag::Map => "map",
            TypeTag::Object => "object",
        }
    }

    /// Storage class of this tag.
    pub fn storage(self) -> StorageClass {
        StorageClass::of(self as u8)
    }

    /// Semantic family of this tag.
    pub fn family(self) -> Family {
        match self {
            TypeTag::Null => Family::Null,
            TypeTag::True | TypeTag::False => Family::Bool,
            TypeTag::UInt8
            | TypeTag::Int8
            | TypeTag::UInt16
            | TypeTag::Int16
            | TypeTag::UInt32
            | TypeTag::Int32
            | TypeTag::UInt64
            | TypeTag::Int64 => Family::Integer,
            TypeTag::Float32 | TypeTag::Float64 => Family::Float,
            TypeTag::String => Family::String,
            TypeTag::Blob => Family::Blob,
            TypeTag::List | TypeTag::Map | TypeTag::Object => Family::Container,
        }
    }

    /// Whether this tag opens a container.
    pub fn is_container(self) -> bool {
        self.container_kind().is_some()
    }

    /// Container kind for container tags.
    pub fn container_kind(self) -> Option<ContainerKind> {
        match self {
            TypeTag::List => Some(ContainerKind::List),
            TypeTag::Map => Some(ContainerKind::Map),
            TypeTag::Object => Some(ContainerKind::Object),
            _ => None,
        }
    }
}

/// The three container kinds. Their layout is identical; only the key
/// carried by each entry differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Positional entries, no key.
    List,
    /// Entries keyed by a big-endian `i32`.
    Map,
    /// Entries keyed by a length-prefixed string.
    Object,
}

impl ContainerKind {
    /// Type tag written in the container header.
    pub fn type_tag(self) -> TypeTag {
        match self {
            ContainerKind::List => TypeTag::List,
            ContainerKind::Map => TypeTag::Map,
            ContainerKind::Object => TypeTag::Object,
        }
    }

    /// Encoded length of an entry key for this kind.
    pub fn key_len(self, name_len: usize) -> usize {
        match self {
            ContainerKind::List => 0,
            ContainerKind::Map => MAP_KEY_SIZE,
            ContainerKind::Object => 1 + name_len,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::List => "list",
            ContainerKind::Map => "map",
            ContainerKind::Object => "object",
        };
        f.write_str(name)
    }
}
