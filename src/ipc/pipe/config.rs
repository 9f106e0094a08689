/*!
 * Pipe Configuration
 *
 * Ring size and wait-loop tuning for a pipe
 */

use super::types::{PipeError, PipeResult};
use crate::core::limits::{
    DEFAULT_DEAD_PEER_POLLS, DEFAULT_PIPE_CAPACITY, DEFAULT_POLL_INTERVAL,
    LOW_LATENCY_POLL_INTERVAL, MAX_PIPE_CAPACITY,
};
use std::time::Duration;

/// Pipe configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeConfig {
    /// Ring buffer size in bytes
    pub capacity: usize,
    /// Longest single wait before a blocked call re-checks the peer
    pub poll_interval: Duration,
    /// Polls a blocked reader keeps waiting after seeing the writer dead
    pub dead_peer_polls: u32,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_PIPE_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            dead_peer_polls: DEFAULT_DEAD_PEER_POLLS,
        }
    }
}

impl PipeConfig {
    /// Configuration that notices a dead peer within tens of milliseconds
    pub const fn low_latency() -> Self {
        Self {
            capacity: DEFAULT_PIPE_CAPACITY,
            poll_interval: LOW_LATENCY_POLL_INTERVAL,
            dead_peer_polls: DEFAULT_DEAD_PEER_POLLS,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_dead_peer_polls(mut self, polls: u32) -> Self {
        self.dead_peer_polls = polls;
        self
    }

    pub fn validate(&self) -> PipeResult<()> {
        if self.capacity == 0 {
            return Err(PipeError::InvalidArgument("Pipe size must be > 0".to_string()));
        }
        if self.capacity > MAX_PIPE_CAPACITY {
            return Err(PipeError::InvalidArgument(format!(
                "Pipe size {} exceeds maximum {}",
                self.capacity, MAX_PIPE_CAPACITY
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(PipeError::InvalidArgument(
                "Poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
