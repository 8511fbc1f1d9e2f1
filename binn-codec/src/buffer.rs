//! Growable buffer manager
//!
//! A [`Buffer`] is either owned and grown on demand, or borrowed from the
//! caller with a fixed capacity. Both expose the same interface; only
//! [`Buffer::ensure_capacity`] behaves differently.

use binn_format::constants::CHUNK_SIZE;
use binn_format::{BinnError, Result};
use std::ops::Range;
use tracing::trace;

enum Storage<'a> {
    /// Zero-filled vector whose length is the allocated capacity.
    Owned(Vec<u8>),
    /// Caller-supplied buffer; never grown, never freed.
    Borrowed(&'a mut [u8]),
}

/// Byte buffer backing a value under construction
pub struct Buffer<'a> {
    storage: Storage<'a>,
    used: usize,
}

impl Buffer<'static> {
    /// Owned buffer with at least `capacity` bytes allocated up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        data.resize(capacity, 0);
        Ok(Self {
            storage: Storage::Owned(data),
            used: 0,
        })
    }
}

impl<'a> Buffer<'a> {
    /// Fixed-capacity buffer over caller memory.
    pub fn preallocated(data: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::Borrowed(data),
            used: 0,
        }
    }

    /// Whether the buffer is caller-supplied.
    pub fn is_preallocated(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.raw().len()
    }

    /// Bytes in use.
    pub fn used(&self) -> usize {
        self.used
    }

    /// The used prefix of the buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.raw()[..self.used]
    }

    /// Make room for `needed` total bytes.
    ///
    /// Returns `true` when the buffer was reallocated. A pre-allocated buffer
    /// fails with [`BinnError::OutOfSpace`]; an owned one doubles from
    /// [`CHUNK_SIZE`] until it fits. On error nothing changes.
    pub fn ensure_capacity(&mut self, needed: usize) -> Result<bool> {
        let capacity = self.capacity();
        if needed <= capacity {
            return Ok(false);
        }

        match &mut self.storage {
            Storage::Borrowed(_) => Err(BinnError::OutOfSpace { needed, capacity }),
            Storage::Owned(data) => {
                let new_capacity = grown_capacity(capacity, needed);
                data.try_reserve_exact(new_capacity - data.len())?;
                data.resize(new_capacity, 0);
                trace!(from = capacity, to = new_capacity, needed, "grew buffer");
                Ok(true)
            }
        }
    }

    /// Writable window of `len` bytes just past the used prefix.
    pub fn spare_mut(&mut self, len: usize) -> Result<&mut [u8]> {
        let start = self.used;
        let capacity = self.capacity();
        self.raw_mut()
            .get_mut(start..start + len)
            .ok_or(BinnError::OutOfSpace {
                needed: start + len,
                capacity,
            })
    }

    /// Mark `len` bytes written through [`Buffer::spare_mut`] as used.
    pub fn commit(&mut self, len: usize) {
        debug_assert!(self.used + len <= self.capacity());
        self.used += len;
    }

    /// Append `bytes` after the used prefix, growing if allowed.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_capacity(self.used + bytes.len())?;
        self.spare_mut(bytes.len())?.copy_from_slice(bytes);
        self.commit(bytes.len());
        Ok(())
    }

    /// Overwrite bytes inside the used prefix.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let used = self.used;
        self.raw_mut()[..used]
            .get_mut(offset..offset + bytes.len())
            .ok_or(BinnError::UnexpectedEof)?
            .copy_from_slice(bytes);
        Ok(())
    }

    /// Replace `range` of the used prefix with `bytes`, moving the tail.
    ///
    /// Capacity is secured before anything moves; on error nothing changes.
    pub fn splice(&mut self, range: Range<usize>, bytes: &[u8]) -> Result<()> {
        let used = self.used;
        if range.start > range.end || range.end > used {
            return Err(BinnError::UnexpectedEof);
        }
        let new_used = used - range.len() + bytes.len();
        self.ensure_capacity(new_used)?;

        let tail_start = range.start + bytes.len();
        let raw = self.raw_mut();
        raw.copy_within(range.end..used, tail_start);
        raw[range.start..tail_start].copy_from_slice(bytes);
        self.used = new_used;
        Ok(())
    }

    fn raw(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(data) => data.as_slice(),
            Storage::Borrowed(data) => &data[..],
        }
    }

    fn raw_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Owned(data) => data.as_mut_slice(),
            Storage::Borrowed(data) => &mut data[..],
        }
    }
}

impl std::fmt::Debug for Buffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("used", &self.used)
            .field("capacity", &self.capacity())
            .field("preallocated", &self.is_preallocated())
            .finish()
    }
}

/// Double from the base block size until `needed` fits.
fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(CHUNK_SIZE);
    while capacity < needed {
        capacity = capacity.checked_mul(2).unwrap_or(needed);
    }
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grown_capacity_doubles_from_chunk() {
        assert_eq!(grown_capacity(0, 1), CHUNK_SIZE);
        assert_eq!(grown_capacity(CHUNK_SIZE, CHUNK_SIZE + 1), CHUNK_SIZE * 2);
        assert_eq!(grown_capacity(CHUNK_SIZE, CHUNK_SIZE * 5), CHUNK_SIZE * 8);
        assert_eq!(grown_capacity(100, 300), 512);
    }

    #[test]
    fn test_no_reallocation_when_room_remains() {
        let mut buf = Buffer::with_capacity(CHUNK_SIZE).unwrap();
        assert!(!buf.ensure_capacity(CHUNK_SIZE).unwrap());
        assert_eq!(buf.capacity(), CHUNK_SIZE);
    }

    #[test]
    fn test_growth_preserves_used_bytes() {
        let mut buf = Buffer::with_capacity(CHUNK_SIZE).unwrap();
        let payload: Vec<u8> = (0..=255u8).collect();
        buf.extend_from_slice(&payload).unwrap();
        assert_eq!(buf.capacity(), CHUNK_SIZE);

        buf.extend_from_slice(&[0xAA]).unwrap();
        assert_eq!(buf.capacity(), CHUNK_SIZE * 2);
        assert_eq!(&buf.as_slice()[..256], payload.as_slice());
        assert_eq!(buf.as_slice()[256], 0xAA);
        assert!(buf.used() <= buf.capacity());
    }

    #[test]
    fn test_preallocated_is_hard_ceiling() {
        let mut backing = [0u8; 8];
        let mut buf = Buffer::preallocated(&mut backing);
        buf.extend_from_slice(&[1, 2, 3, 4, 5, 6]).unwrap();

        match buf.extend_from_slice(&[7, 8, 9]) {
            Err(BinnError::OutOfSpace { needed, capacity }) => {
                assert_eq!(needed, 9);
                assert_eq!(capacity, 8);
            }
            other => panic!("expected OutOfSpace, got {other:?}"),
        }
        assert_eq!(buf.used(), 6);
        assert_eq!(buf.capacity(), 8);
        drop(buf);
        assert_eq!(&backing[..6], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_splice_moves_tail() {
        let mut buf = Buffer::with_capacity(16).unwrap();
        buf.extend_from_slice(&[1, 2, 3, 4, 5]).unwrap();
        buf.splice(1..3, &[]).unwrap();
        assert_eq!(buf.as_slice(), &[1, 4, 5]);
        buf.splice(1..2, &[7, 7, 7]).unwrap();
        assert_eq!(buf.as_slice(), &[1, 7, 7, 7, 5]);
        assert!(buf.splice(2..9, &[]).is_err());
        assert_eq!(buf.as_slice(), &[1, 7, 7, 7, 5]);
    }

    #[test]
    fn test_splice_respects_preallocated_ceiling() {
        let mut backing = [0u8; 6];
        let mut buf = Buffer::preallocated(&mut backing);
        buf.extend_from_slice(&[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            buf.splice(1..2, &[9, 9, 9, 9]),
            Err(BinnError::OutOfSpace { .. })
        ));
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
        buf.splice(1..2, &[9, 9, 9]).unwrap();
        assert_eq!(buf.as_slice(), &[1, 9, 9, 9, 3, 4]);
    }

    #[test]
    fn test_write_at_stays_inside_used() {
        let mut buf = Buffer::with_capacity(16).unwrap();
        buf.extend_from_slice(&[0, 0, 0]).unwrap();
        buf.write_at(1, &[9, 9]).unwrap();
        assert_eq!(buf.as_slice(), &[0, 9, 9]);
        assert!(buf.write_at(2, &[1, 1]).is_err());
    }
}
