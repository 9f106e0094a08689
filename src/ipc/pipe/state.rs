/*!
 * Connection State
 * Lifecycle flags shared by both ends of a pipe
 */

use super::types::{PipeError, PipeResult};
use serde::{Deserialize, Serialize};

/// Connected / closed flags of a pipe
///
/// The two closed flags are independent: both ends may close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionState {
    connected: bool,
    closed_by_writer: bool,
    closed_by_reader: bool,
}

impl ConnectionState {
    pub const fn new() -> Self {
        Self {
            connected: false,
            closed_by_writer: false,
            closed_by_reader: false,
        }
    }

    /// Move from unconnected to connected. Happens at most once.
    pub fn connect(&mut self) -> PipeResult<()> {
        if self.connected {
            return Err(PipeError::AlreadyConnected);
        }
        self.connected = true;
        Ok(())
    }

    /// Returns `true` if this call performed the transition
    pub fn close_writer(&mut self) -> bool {
        !std::mem::replace(&mut self.closed_by_writer, true)
    }

    /// Returns `true` if this call performed the transition
    pub fn close_reader(&mut self) -> bool {
        !std::mem::replace(&mut self.closed_by_reader, true)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[inline]
    pub fn closed_by_writer(&self) -> bool {
        self.closed_by_writer
    }

    #[inline]
    pub fn closed_by_reader(&self) -> bool {
        self.closed_by_reader
    }

    pub fn status(&self) -> ConnectionStatus {
        match (self.connected, self.closed_by_writer, self.closed_by_reader) {
            (false, _, _) => ConnectionStatus::Unconnected,
            (true, false, false) => ConnectionStatus::Connected,
            (true, true, false) => ConnectionStatus::ClosedByWriter,
            (true, false, true) => ConnectionStatus::ClosedByReader,
            (true, true, true) => ConnectionStatus::Closed,
        }
    }
}

/// Reportable view of a `ConnectionState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Unconnected,
    Connected,
    ClosedByWriter,
    ClosedByReader,
    /// Both ends closed
    Closed,
}
