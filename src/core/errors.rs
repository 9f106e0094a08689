/*!
 * Error Types
 * Shared argument validation errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// An `(offset, length)` pair that does not fit inside the caller's buffer
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case")]
#[error("Range out of bounds: offset {offset}, length {length}, buffer length {buffer_len}")]
#[diagnostic(
    code(buffer::range_out_of_bounds),
    help("offset + length must not exceed the length of the buffer.")
)]
pub struct RangeError {
    pub offset: usize,
    pub length: usize,
    pub buffer_len: usize,
}

impl RangeError {
    /// Validate `offset..offset + length` against a buffer of `buffer_len` bytes
    ///
    /// Returns the checked range on success. Overflowing sums are rejected.
    pub fn check(buffer_len: usize, offset: usize, length: usize) -> Result<Range<usize>, Self> {
        offset
            .checked_add(length)
            .filter(|&end| end <= buffer_len)
            .map(|end| offset..end)
            .ok_or(Self {
                offset,
                length,
                buffer_len,
            })
    }
}
