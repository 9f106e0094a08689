/*!
 * Pipe Types
 * Common types, results, and errors for pipes
 */

use super::state::ConnectionStatus;
use crate::core::errors::RangeError;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Process-wide identifier assigned to each connected pipe (for logs and stats)
pub type PipeId = u32;

/// Result type for pipe operations
pub type PipeResult<T> = Result<T, PipeError>;

/// Which end of a pipe an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Writer,
    Reader,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Writer => f.write_str("write"),
            Side::Reader => f.write_str("read"),
        }
    }
}

/// Pipe error types
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum PipeError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(pipe::invalid_argument),
        help("Check the capacity, poll interval, or the offset/length passed to the call.")
    )]
    InvalidArgument(String),

    #[error("Pipe not connected")]
    #[diagnostic(
        code(pipe::not_connected),
        help("Connect the writer and reader before reading or writing.")
    )]
    NotConnected,

    #[error("Already connected")]
    #[diagnostic(
        code(pipe::already_connected),
        help("A writer and a reader can each be bound to exactly one pipe.")
    )]
    AlreadyConnected,

    #[error("Pipe closed")]
    #[diagnostic(
        code(pipe::closed),
        help("The pipe was closed and can no longer carry data in this direction.")
    )]
    ClosedPipe,

    #[error("Pipe broken: {0} end is dead")]
    #[diagnostic(
        code(pipe::broken),
        help("The peer handle was abandoned without being closed.")
    )]
    BrokenPipe(Side),

    #[error("Wait interrupted")]
    #[diagnostic(
        code(pipe::interrupted),
        help("A WaitInterrupter cancelled the blocked call. The pipe itself is still usable.")
    )]
    InterruptedWait,
}

impl From<RangeError> for PipeError {
    fn from(err: RangeError) -> Self {
        PipeError::InvalidArgument(err.to_string())
    }
}

impl From<PipeError> for io::Error {
    fn from(err: PipeError) -> Self {
        let kind = match &err {
            PipeError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            PipeError::NotConnected => io::ErrorKind::NotConnected,
            PipeError::AlreadyConnected => io::ErrorKind::AlreadyExists,
            PipeError::ClosedPipe => io::ErrorKind::Other,
            PipeError::BrokenPipe(_) => io::ErrorKind::BrokenPipe,
            PipeError::InterruptedWait => io::ErrorKind::Interrupted,
        };
        io::Error::new(kind, err)
    }
}

/// Successful result of a bulk read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were copied into the caller's buffer
    Data(usize),
    /// The writer closed and every buffered byte has been consumed
    EndOfStream,
}

impl ReadOutcome {
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }

    /// Bytes read, 0 at end of stream
    #[inline]
    pub fn bytes_read(&self) -> usize {
        match self {
            ReadOutcome::Data(n) => *n,
            ReadOutcome::EndOfStream => 0,
        }
    }
}

/// Pipe statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipeStats {
    pub id: PipeId,
    pub capacity: usize,
    pub buffered: usize,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub status: ConnectionStatus,
    pub waiters: usize,
}
