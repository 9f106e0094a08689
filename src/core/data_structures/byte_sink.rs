/*!
 * Byte Sink
 *
 * Growable in-memory accumulator for bytes drained from a pipe.
 *
 * # Growth
 *
 * Storage doubles whenever an append does not fit, or grows to the exact
 * requirement when doubling is not enough. Single-threaded; wrap it in a lock
 * to share it.
 */

use crate::core::errors::RangeError;
use crate::core::limits::{DEFAULT_SINK_CAPACITY, MAX_SINK_CAPACITY};
use bytes::{BufMut, Bytes, BytesMut};
use std::io;

/// Append-only byte accumulator backed by `BytesMut`
#[derive(Debug, Clone)]
pub struct ByteSink {
    buf: BytesMut,
}

impl ByteSink {
    /// Create a sink with the default starting capacity (32 bytes)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SINK_CAPACITY)
    }

    /// Create a sink with room for `capacity` bytes before the first growth
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    fn ensure_capacity(&mut self, min_capacity: usize) {
        let current = self.buf.capacity();
        if min_capacity <= current {
            return;
        }

        let mut target = current.saturating_mul(2).max(min_capacity);
        if target > MAX_SINK_CAPACITY {
            target = min_capacity.max(MAX_SINK_CAPACITY);
        }
        self.buf.reserve(target - self.buf.len());
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.ensure_capacity(self.buf.len() + 1);
        self.buf.put_u8(byte);
    }

    pub fn write_slice(&mut self, data: &[u8]) {
        self.ensure_capacity(self.buf.len().saturating_add(data.len()));
        self.buf.extend_from_slice(data);
    }

    /// Append `data[offset..offset + length]`
    pub fn write_at(&mut self, data: &[u8], offset: usize, length: usize) -> Result<(), RangeError> {
        let range = RangeError::check(data.len(), offset, length)?;
        self.write_slice(&data[range]);
        Ok(())
    }

    /// Copy everything appended so far into `out`
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.buf)
    }

    /// Forget the contents but keep the allocated storage
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Snapshot copy of the contents
    pub fn to_vec(&self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Snapshot copy of the contents as immutable `Bytes`
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    /// Consume the sink without copying
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for ByteSink {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for ByteSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
