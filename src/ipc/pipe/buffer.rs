/*!
 * Circular Buffer
 * Fixed-capacity byte ring backing a pipe
 *
 * `head` is the next byte to read, `tail` the next slot to write. `len` keeps
 * the empty and full cases apart when `head == tail`.
 */

/// Fixed-capacity byte ring
///
/// Not synchronized; the owning pipe only touches it under its lock.
#[derive(Debug)]
pub struct CircularBuffer {
    data: Box<[u8]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl CircularBuffer {
    /// Allocate a ring of `capacity` bytes. `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes currently buffered
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn vacant_len(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Longest run that can be written at `tail` without wrapping or overrunning `head`
    #[inline]
    fn contiguous_vacant(&self) -> usize {
        if self.is_full() {
            0
        } else if self.tail >= self.head {
            self.capacity() - self.tail
        } else {
            self.head - self.tail
        }
    }

    /// Longest run that can be read at `head` without wrapping or passing `tail`
    #[inline]
    fn contiguous_occupied(&self) -> usize {
        if self.is_empty() {
            0
        } else if self.head < self.tail {
            self.tail - self.head
        } else {
            self.capacity() - self.head
        }
    }

    #[inline]
    fn advance(cursor: usize, by: usize, capacity: usize) -> usize {
        let next = cursor + by;
        if next >= capacity {
            next - capacity
        } else {
            next
        }
    }

    /// Append one byte. Returns `false` (and stores nothing) when full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.data[self.tail] = byte;
        self.tail = Self::advance(self.tail, 1, self.capacity());
        self.len += 1;
        true
    }

    /// Copy as much of `src` as fits, one contiguous run at a time
    ///
    /// Returns the number of bytes stored.
    pub fn push_slice(&mut self, src: &[u8]) -> usize {
        let mut written = 0;
        while written < src.len() {
            let run = self.contiguous_vacant().min(src.len() - written);
            if run == 0 {
                break;
            }
            self.data[self.tail..self.tail + run].copy_from_slice(&src[written..written + run]);
            self.tail = Self::advance(self.tail, run, self.capacity());
            self.len += run;
            written += run;
        }
        written
    }

    /// Remove the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.data[self.head];
        self.head = Self::advance(self.head, 1, self.capacity());
        self.len -= 1;
        Some(byte)
    }

    /// Move up to `dst.len()` of the oldest bytes into `dst`
    ///
    /// Returns the number of bytes copied.
    pub fn pop_slice(&mut self, dst: &mut [u8]) -> usize {
        let mut read = 0;
        while read < dst.len() {
            let run = self.contiguous_occupied().min(dst.len() - read);
            if run == 0 {
                break;
            }
            dst[read..read + run].copy_from_slice(&self.data[self.head..self.head + run]);
            self.head = Self::advance(self.head, run, self.capacity());
            self.len -= run;
            read += run;
        }
        read
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}
