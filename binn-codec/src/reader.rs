//! Container readers
//!
//! A [`ContainerRef`] is a borrowed view over one encoded container. Lookups
//! scan entries in wire order; every step is bounds-checked against the
//! container's declared size, so a corrupt buffer yields an error, never a
//! panic.

use crate::item::Item;
use crate::validate::validate_with_limits;
use binn_format::constants::MAP_KEY_SIZE;
use binn_format::{BinnError, ContainerHeader, ContainerKind, Limits, Result};
use std::fmt;
use std::ops::Range;

/// Entry key as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// 1-based list position (not encoded)
    Position(usize),
    /// Map key
    Id(i32),
    /// Object key
    Name(&'a str),
}

impl<'a> Key<'a> {
    /// Container kind this key addresses.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Key::Position(_) => ContainerKind::List,
            Key::Id(_) => ContainerKind::Map,
            Key::Name(_) => ContainerKind::Object,
        }
    }

    /// Encoded length of the key prefix.
    pub fn encoded_len(&self) -> usize {
        match self {
            Key::Position(_) => 0,
            Key::Id(_) => MAP_KEY_SIZE,
            Key::Name(name) => 1 + name.len(),
        }
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Position(pos) => write!(f, "#{pos}"),
            Key::Id(id) => write!(f, "{id}"),
            Key::Name(name) => write!(f, "{name:?}"),
        }
    }
}

/// Borrowed view over an encoded list, map or object
#[derive(Clone, Copy)]
pub struct ContainerRef<'a> {
    kind: ContainerKind,
    bytes: &'a [u8],
    header_len: usize,
    count: usize,
}

impl<'a> ContainerRef<'a> {
    /// Validate an untrusted buffer and open the container at its start.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        Self::open_with_limits(bytes, &Limits::default())
    }

    /// [`ContainerRef::open`] with explicit limits.
    pub fn open_with_limits(bytes: &'a [u8], limits: &Limits) -> Result<Self> {
        let header = validate_with_limits(bytes, limits)?;
        if !header.type_tag.is_container() {
            return Err(BinnError::TypeMismatch {
                expected: "container",
                found: header.type_tag,
            });
        }
        Self::parse(bytes)
    }

    /// Header-checked view; entries are not walked.
    pub(crate) fn parse(bytes: &'a [u8]) -> Result<Self> {
        let (header, header_len) = ContainerHeader::decode(bytes)?;
        Ok(Self {
            kind: header.kind,
            bytes: &bytes[..header.size],
            header_len,
            count: header.count,
        })
    }

    /// View over bytes the caller built and already trusts.
    pub(crate) fn from_parts(
        kind: ContainerKind,
        bytes: &'a [u8],
        header_len: usize,
        count: usize,
    ) -> Self {
        Self {
            kind,
            bytes,
            header_len,
            count,
        }
    }

    /// Container kind.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the container has no entries.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total encoded length, header included.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The encoded container.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Iterate `(key, item)` pairs in wire order.
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            kind: self.kind,
            bytes: self.bytes,
            pos: self.header_len,
            index: 0,
            remaining: self.count,
        }
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

    /// Item at 1-based `pos`; 0 and positions past the end are not found.
    pub fn list_get(&self, pos: usize) -> Result<Item<'a>> {
        self.get(Key::Position(pos))
    }

    /// Item stored under map key `id`.
    pub fn map_get(&self, id: i32) -> Result<Item<'a>> {
        self.get(Key::Id(id))
    }

    /// Item stored under object key `name`.
    pub fn object_get(&self, name: &str) -> Result<Item<'a>> {
        self.get(Key::Name(name))
    }

    /// Item stored under `key`; the key must match the container kind.
    pub fn get(&self, key: Key<'_>) -> Result<Item<'a>> {
        self.expect_kind(key.kind())?;
        if let Key::Position(pos) = key {
            if pos == 0 || pos > self.count {
                return Err(BinnError::NotFound);
            }
            let mut entries = self.entries();
            for _ in 1..pos {
                entries.next_entry()?;
            }
            return match entries.next_entry()? {
                Some((_, item, _)) => Ok(item),
                None => Err(BinnError::NotFound),
            };
        }

        let mut entries = self.entries();
        while let Some((found, item, _)) = entries.next_entry()? {
            if found == key {
                return Ok(item);
            }
        }
        Err(BinnError::NotFound)
    }

    /// Byte range of the entry stored under `key`, relative to the
    /// container start.
    pub(crate) fn locate(&self, key: Key<'_>) -> Result<Option<Range<usize>>> {
        self.expect_kind(key.kind())?;
        let mut entries = self.entries();
        while let Some((found, _, range)) = entries.next_entry()? {
            if found == key {
                return Ok(Some(range));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for ContainerRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerRef")
            .field("kind", &self.kind)
            .field("size", &self.size())
            .field("count", &self.count)
            .finish()
    }
}

impl PartialEq for ContainerRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.bytes == other.bytes
    }
}

/// Iterator over the entries of a container
///
/// Yields an error once and then stops if the buffer is corrupt.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    kind: ContainerKind,
    bytes: &'a [u8],
    pos: usize,
    index: usize,
    remaining: usize,
}

impl<'a> Entries<'a> {
    fn next_entry(&mut self) -> Result<Option<(Key<'a>, Item<'a>, Range<usize>)>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        match self.decode_entry() {
            Ok(entry) => {
                self.remaining -= 1;
                Ok(Some(entry))
            }
            Err(e) => {
                self.remaining = 0;
                Err(e)
            }
        }
    }

    fn decode_entry(&mut self) -> Result<(Key<'a>, Item<'a>, Range<usize>)> {
        let start = self.pos;
        let rest = self.bytes.get(start..).ok_or(BinnError::UnexpectedEof)?;
        let (key, key_len) = read_key(self.kind, rest, self.index + 1)?;
        let (item, item_len) = Item::read(&rest[key_len..])?;
        self.pos = start + key_len + item_len;
        self.index += 1;
        Ok((key, item, start..self.pos))
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<(Key<'a>, Item<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
            .transpose()
            .map(|entry| entry.map(|(key, item, _)| (key, item)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Decode the key prefix of one entry.
pub(crate) fn read_key<'a>(
    kind: ContainerKind,
    bytes: &'a [u8],
    position: usize,
) -> Result<(Key<'a>, usize)> {
    match kind {
        ContainerKind::List => Ok((Key::Position(position), 0)),
        ContainerKind::Map => {
            let raw: [u8; MAP_KEY_SIZE] = bytes
                .get(..MAP_KEY_SIZE)
                .and_then(|b| b.try_into().ok())
                .ok_or(BinnError::UnexpectedEof)?;
            Ok((Key::Id(i32::from_be_bytes(raw)), MAP_KEY_SIZE))
        }
        ContainerKind::Object => {
            let len = *bytes.first().ok_or(BinnError::UnexpectedEof)? as usize;
            let raw = bytes.get(1..1 + len).ok_or(BinnError::UnexpectedEof)?;
            let name = std::str::from_utf8(raw)
                .map_err(|e| BinnError::Malformed(format!("object key is not UTF-8: {e}")))?;
            Ok((Key::Name(name), 1 + len))
        }
    }
}
