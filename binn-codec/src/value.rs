//! Container writers
//!
//! A [`Value`] is a list, map or object under construction. The buffer
//! starts with [`MAX_HEADER_SIZE`] reserved bytes; after every successful
//! write the compact header is stored right-aligned in that space, so the
//! finished encoding is always one contiguous slice.

use crate::buffer::Buffer;
use crate::item::{Item, SliceWriter};
use crate::reader::{ContainerRef, Key};
use crate::validate::validate_with_limits;
use binn_format::constants::{CHUNK_SIZE, MAX_HEADER_SIZE, MAX_OBJECT_KEY_LEN};
use binn_format::{BinnError, ContainerHeader, ContainerKind, Limits, Result};
use smallvec::SmallVec;
use std::ops::Range;
use tracing::debug;

type EncodedHeader = SmallVec<[u8; MAX_HEADER_SIZE]>;

/// Construction options for owned values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueOptions {
    /// Bytes allocated up front, header reserve included (default: 256)
    pub initial_capacity: usize,
    /// Store integers at their narrowest lossless width (default: true)
    pub int_compression: bool,
}

impl Default for ValueOptions {
    fn default() -> Self {
        Self {
            initial_capacity: CHUNK_SIZE,
            int_compression: true,
        }
    }
}

/// A container being built
pub struct Value<'a> {
    kind: ContainerKind,
    count: usize,
    header_len: usize,
    int_compression: bool,
    buf: Buffer<'a>,
}

impl Value<'static> {
    /// Empty owned container of `kind`.
    pub fn new(kind: ContainerKind) -> Result<Self> {
        Self::with_options(kind, ValueOptions::default())
    }

    /// Empty owned list.
    pub fn list() -> Result<Self> {
        Self::new(ContainerKind::List)
    }

    /// Empty owned map.
    pub fn map() -> Result<Self> {
        Self::new(ContainerKind::Map)
    }

    /// Empty owned object.
    pub fn object() -> Result<Self> {
        Self::new(ContainerKind::Object)
    }

    /// Empty owned container with explicit options.
    pub fn with_options(kind: ContainerKind, opts: ValueOptions) -> Result<Self> {
        let buf = Buffer::with_capacity(opts.initial_capacity.max(MAX_HEADER_SIZE))?;
        Self::init(kind, buf, opts.int_compression)
    }

    /// Validate an encoded container and load it for further writes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_limits(bytes, &Limits::default())
    }

    /// [`Value::from_bytes`] with explicit limits.
    pub fn from_bytes_with_limits(bytes: &[u8], limits: &Limits) -> Result<Self> {
        let validated = validate_with_limits(bytes, limits)?;
        let kind = validated
            .type_tag
            .container_kind()
            .ok_or(BinnError::TypeMismatch {
                expected: "container",
                found: validated.type_tag,
            })?;
        let (header, header_len) = ContainerHeader::decode(bytes)?;
        let body = &bytes[header_len..header.size];

        let opts = ValueOptions {
            initial_capacity: MAX_HEADER_SIZE + body.len(),
            ..ValueOptions::default()
        };
        let mut value = Self::with_options(kind, opts)?;
        let compact = encode_header(kind, body.len(), header.count)?;
        value.buf.extend_from_slice(body)?;
        value.install_header(&compact, header.count)?;

        debug!(%kind, size = value.size(), count = value.count, "loaded value");
        Ok(value)
    }
}

impl<'a> Value<'a> {
    /// Empty container inside caller memory.
    ///
    /// `data` is a hard ceiling: writes that do not fit fail with
    /// [`BinnError::OutOfSpace`]. It must hold at least the
    /// [`MAX_HEADER_SIZE`] reserved bytes.
    pub fn with_buffer(kind: ContainerKind, data: &'a mut [u8]) -> Result<Self> {
        if data.len() < MAX_HEADER_SIZE {
            return Err(BinnError::OutOfSpace {
                needed: MAX_HEADER_SIZE,
                capacity: data.len(),
            });
        }
        Self::init(kind, Buffer::preallocated(data), true)
    }

    fn init(kind: ContainerKind, mut buf: Buffer<'a>, int_compression: bool) -> Result<Self> {
        buf.extend_from_slice(&[0; MAX_HEADER_SIZE])?;
        let mut value = Self {
            kind,
            count: 0,
            header_len: 0,
            int_compression,
            buf,
        };
        let header = encode_header(kind, 0, 0)?;
        value.install_header(&header, 0)?;
        Ok(value)
    }

    /// Container kind, fixed at construction.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Total encoded length, header included.
    pub fn size(&self) -> usize {
        self.header_len + self.body_len()
    }

    /// Allocated bytes, header reserve included.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Whether the value lives in caller memory.
    pub fn is_preallocated(&self) -> bool {
        self.buf.is_preallocated()
    }

    /// Whether integers are compressed on write.
    pub fn int_compression(&self) -> bool {
        self.int_compression
    }

    /// Toggle integer compression for subsequent writes.
    pub fn set_int_compression(&mut self, enabled: bool) {
        self.int_compression = enabled;
    }

    /// The finished encoding; valid after every successful write.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_slice()[self.header_start()..]
    }

    /// Owned copy of [`Value::as_bytes`].
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Reader over the entries written so far.
    pub fn reader(&self) -> ContainerRef<'_> {
        ContainerRef::from_parts(self.kind, self.as_bytes(), self.header_len, self.count)
    }

    /// Append to a list.
    pub fn list_add<'i>(&mut self, item: impl Into<Item<'i>>) -> Result<()> {
        self.expect_kind(ContainerKind::List)?;
        self.append(Key::Position(self.count + 1), item.into())
    }

    /// Insert under a new map key; an existing key is [`BinnError::KeyExists`].
    pub fn map_set<'i>(&mut self, id: i32, item: impl Into<Item<'i>>) -> Result<()> {
        self.expect_kind(ContainerKind::Map)?;
        let key = Key::Id(id);
        if self.reader().locate(key)?.is_some() {
            return Err(BinnError::KeyExists(key.to_string()));
        }
        self.append(key, item.into())
    }

    /// Insert or replace under a map key.
    pub fn map_upsert<'i>(&mut self, id: i32, item: impl Into<Item<'i>>) -> Result<()> {
        self.expect_kind(ContainerKind::Map)?;
        self.upsert(Key::Id(id), item.into())
    }

    /// Insert under a new object key; an existing key is [`BinnError::KeyExists`].
    pub fn object_set<'i>(&mut self, name: &str, item: impl Into<Item<'i>>) -> Result<()> {
        self.expect_kind(ContainerKind::Object)?;
        check_object_key(name)?;
        let key = Key::Name(name);
        if self.reader().locate(key)?.is_some() {
            return Err(BinnError::KeyExists(name.to_string()));
        }
        self.append(key, item.into())
    }

    /// Insert or replace under an object key.
    pub fn object_upsert<'i>(&mut self, name: &str, item: impl Into<Item<'i>>) -> Result<()> {
        self.expect_kind(ContainerKind::Object)?;
        check_object_key(name)?;
        self.upsert(Key::Name(name), item.into())
    }

    fn expect_kind(&self, expected: ContainerKind) -> Result<()> {
        if self.kind != expected {
            return Err(BinnError::KindMismatch {
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }

    fn header_start(&self) -> usize {
        MAX_HEADER_SIZE - self.header_len
    }

    fn body_len(&self) -> usize {
        self.buf.used() - MAX_HEADER_SIZE
    }

    fn upsert(&mut self, key: Key<'_>, item: Item<'_>) -> Result<()> {
        match self.reader().locate(key)? {
            Some(range) => self.replace(range, key, item),
            None => self.append(key, item),
        }
    }

    // Header and entry are fully encoded before the buffer changes, so a
    // failed append leaves the value untouched.
    fn append(&mut self, key: Key<'_>, item: Item<'_>) -> Result<()> {
        let compress = self.int_compression;
        let entry_len = key.encoded_len() + item.encoded_len(compress)?;
        let body_len = self
            .body_len()
            .checked_add(entry_len)
            .ok_or_else(|| BinnError::LimitExceeded("container size overflows".to_string()))?;
        let count = self.count + 1;
        let header = encode_header(self.kind, body_len, count)?;

        self.buf.ensure_capacity(self.buf.used() + entry_len)?;
        let written = write_entry(key, &item, compress, self.buf.spare_mut(entry_len)?)?;
        debug_assert_eq!(written, entry_len);
        self.buf.commit(entry_len);
        self.install_header(&header, count)
    }

    /// Swap the entry at `range` (relative to the container start).
    fn replace(&mut self, range: Range<usize>, key: Key<'_>, item: Item<'_>) -> Result<()> {
        let compress = self.int_compression;
        let entry_len = key.encoded_len() + item.encoded_len(compress)?;
        let mut entry = Vec::new();
        entry.try_reserve_exact(entry_len)?;
        entry.resize(entry_len, 0);
        write_entry(key, &item, compress, &mut entry)?;

        let body_len = self.body_len() - range.len() + entry_len;
        let header = encode_header(self.kind, body_len, self.count)?;
        let start = self.header_start();
        self.buf
            .splice(start + range.start..start + range.end, &entry)?;
        self.install_header(&header, self.count)
    }

    fn install_header(&mut self, header: &[u8], count: usize) -> Result<()> {
        self.buf.write_at(MAX_HEADER_SIZE - header.len(), header)?;
        self.header_len = header.len();
        self.count = count;
        Ok(())
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("kind", &self.kind)
            .field("count", &self.count)
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .field("preallocated", &self.is_preallocated())
            .finish()
    }
}

impl<'a> From<&'a Value<'_>> for Item<'a> {
    fn from(value: &'a Value<'_>) -> Self {
        Item::Container(value.reader())
    }
}

fn encode_header(kind: ContainerKind, body_len: usize, count: usize) -> Result<EncodedHeader> {
    ContainerHeader::for_body(kind, body_len, count)?.encode()
}

fn check_object_key(name: &str) -> Result<()> {
    if name.len() > MAX_OBJECT_KEY_LEN {
        return Err(BinnError::InvalidKey(format!(
            "object key is {} bytes, limit is {}",
            name.len(),
            MAX_OBJECT_KEY_LEN
        )));
    }
    Ok(())
}

fn write_entry(key: Key<'_>, item: &Item<'_>, compress: bool, dst: &mut [u8]) -> Result<usize> {
    let mut w = SliceWriter::new(dst);
    match key {
        Key::Position(_) => {}
        Key::Id(id) => w.put(&id.to_be_bytes())?,
        Key::Name(name) => {
            let len = u8::try_from(name.len())
                .map_err(|_| BinnError::InvalidKey(format!("object key {name:?} too long")))?;
            w.put(&[len])?;
            w.put(name.as_bytes())?;
        }
    }
    let key_len = w.position();
    let item_len = item.write(compress, &mut dst[key_len..])?;
    Ok(key_len + item_len)
}
