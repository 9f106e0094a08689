/*!
 * Pipe Implementation
 * Shared state of a connected pipe and the blocking read/write protocol
 *
 * # Protocol
 *
 * Both directions use the same loop while they cannot make progress:
 * re-validate the connection, wake the other side, then wait on the monitor
 * for at most one poll interval. Closing, abandoning, or interrupting an end
 * notifies the monitor, so blocked calls react without waiting out the
 * interval. The interval only bounds how long a dead peer can go unnoticed.
 */

use super::buffer::CircularBuffer;
use super::config::PipeConfig;
use super::signals::{EndpointSignals, PeerLiveness};
use super::state::ConnectionState;
use super::types::{PipeError, PipeId, PipeResult, PipeStats, ReadOutcome, Side};
use crate::core::sync::{Monitor, WakeResult};
use parking_lot::MutexGuard;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, trace, warn};

static NEXT_PIPE_ID: AtomicU32 = AtomicU32::new(1);

struct PipeInner {
    ring: CircularBuffer,
    state: ConnectionState,
    bytes_written: u64,
    bytes_read: u64,
}

impl PipeInner {
    fn check_writable(&self, reader: &PeerLiveness) -> PipeResult<()> {
        if !self.state.is_connected() {
            Err(PipeError::NotConnected)
        } else if self.state.closed_by_writer() || self.state.closed_by_reader() {
            Err(PipeError::ClosedPipe)
        } else if !reader.is_alive() {
            Err(PipeError::BrokenPipe(Side::Reader))
        } else {
            Ok(())
        }
    }

    fn check_readable(&self, writer: &PeerLiveness) -> PipeResult<()> {
        if !self.state.is_connected() {
            Err(PipeError::NotConnected)
        } else if self.state.closed_by_reader() {
            Err(PipeError::ClosedPipe)
        } else if !writer.is_alive() && !self.state.closed_by_writer() && self.ring.is_empty() {
            Err(PipeError::BrokenPipe(Side::Writer))
        } else {
            Ok(())
        }
    }
}

pub(crate) struct Pipe {
    id: PipeId,
    config: PipeConfig,
    monitor: Monitor<PipeInner>,
}

impl std::fmt::Debug for Pipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.monitor.lock();
        f.debug_struct("Pipe")
            .field("id", &self.id)
            .field("capacity", &inner.ring.capacity())
            .field("buffered_bytes", &inner.ring.len())
            .field("status", &inner.state.status())
            .finish()
    }
}

impl Pipe {
    /// Allocate the ring and mark the pipe connected
    pub fn connect(config: PipeConfig) -> PipeResult<Self> {
        config.validate()?;

        let mut state = ConnectionState::new();
        state.connect()?;

        Ok(Self {
            id: NEXT_PIPE_ID.fetch_add(1, Ordering::Relaxed),
            monitor: Monitor::new(PipeInner {
                ring: CircularBuffer::new(config.capacity),
                state,
                bytes_written: 0,
                bytes_read: 0,
            }),
            config,
        })
    }

    #[inline]
    pub fn id(&self) -> PipeId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Wake every blocked caller so it re-evaluates the pipe
    pub fn wake_all(&self) -> WakeResult {
        self.monitor.touch_and_notify()
    }

    /// Store a prefix of `data`, blocking only while the ring is full
    ///
    /// Returns how many bytes were stored. A wait that fails returns the error
    /// before anything is stored, so an `Err` always means nothing was written.
    pub fn write_some(
        &self,
        data: &[u8],
        writer: &EndpointSignals,
        reader: &PeerLiveness,
    ) -> PipeResult<usize> {
        let mut inner = self.monitor.lock();
        inner.check_writable(reader)?;
        if data.is_empty() {
            return Ok(0);
        }

        self.await_space(&mut inner, writer, reader)?;
        let pushed = inner.ring.push_slice(data);
        inner.bytes_written += pushed as u64;

        // data available
        self.monitor.notify_all();

        trace!(
            pipe_id = self.id,
            bytes = pushed,
            buffered = inner.ring.len(),
            "pipe write"
        );
        Ok(pushed)
    }

    pub fn write_byte(
        &self,
        byte: u8,
        writer: &EndpointSignals,
        reader: &PeerLiveness,
    ) -> PipeResult<()> {
        let mut inner = self.monitor.lock();
        self.await_space(&mut inner, writer, reader)?;

        if inner.ring.push(byte) {
            inner.bytes_written += 1;
            self.monitor.notify_all();
        }
        Ok(())
    }

    fn await_space(
        &self,
        inner: &mut MutexGuard<'_, PipeInner>,
        writer: &EndpointSignals,
        reader: &PeerLiveness,
    ) -> PipeResult<()> {
        loop {
            // closing the reader clears the ring, so re-validate before every exit
            inner.check_writable(reader)?;
            if !inner.ring.is_full() {
                return Ok(());
            }
            if writer.take_interrupt() {
                return Err(PipeError::InterruptedWait);
            }

            // full: kick any waiting reader
            self.monitor.notify_all();
            if self.monitor.wait_for(inner, self.config.poll_interval).timed_out() {
                trace!(pipe_id = self.id, "write poll elapsed");
            }
        }
    }

    /// Block until at least one byte is buffered
    ///
    /// Returns `Ok(false)` when the writer closed and the ring is drained.
    fn await_data(
        &self,
        inner: &mut MutexGuard<'_, PipeInner>,
        reader: &EndpointSignals,
        writer: &PeerLiveness,
    ) -> PipeResult<bool> {
        inner.check_readable(writer)?;

        let mut trials = self.config.dead_peer_polls;
        while inner.ring.is_empty() {
            if inner.state.closed_by_writer() {
                return Ok(false);
            }
            if inner.state.closed_by_reader() {
                return Err(PipeError::ClosedPipe);
            }
            if !writer.is_alive() {
                if trials == 0 {
                    warn!(pipe_id = self.id, "pipe broken: writer abandoned while reader waited");
                    return Err(PipeError::BrokenPipe(Side::Writer));
                }
                trials -= 1;
            }
            if reader.take_interrupt() {
                return Err(PipeError::InterruptedWait);
            }

            // might be a writer waiting
            self.monitor.notify_all();
            if self.monitor.wait_for(inner, self.config.poll_interval).timed_out() {
                trace!(pipe_id = self.id, trials, "read poll elapsed");
            }
        }
        Ok(true)
    }

    /// Block for the first byte, then drain whatever is already buffered into `buf`
    pub fn read(
        &self,
        buf: &mut [u8],
        reader: &EndpointSignals,
        writer: &PeerLiveness,
    ) -> PipeResult<ReadOutcome> {
        let mut inner = self.monitor.lock();
        if buf.is_empty() {
            inner.check_readable(writer)?;
            if inner.ring.is_empty() && inner.state.closed_by_writer() {
                return Ok(ReadOutcome::EndOfStream);
            }
            return Ok(ReadOutcome::Data(0));
        }

        if !self.await_data(&mut inner, reader, writer)? {
            trace!(pipe_id = self.id, "pipe end of stream");
            return Ok(ReadOutcome::EndOfStream);
        }

        let read = inner.ring.pop_slice(buf);
        inner.bytes_read += read as u64;

        // space available
        self.monitor.notify_all();

        trace!(
            pipe_id = self.id,
            bytes = read,
            buffered = inner.ring.len(),
            "pipe read"
        );
        Ok(ReadOutcome::Data(read))
    }

    /// Block for one byte. `None` is end of stream.
    pub fn read_byte(
        &self,
        reader: &EndpointSignals,
        writer: &PeerLiveness,
    ) -> PipeResult<Option<u8>> {
        let mut inner = self.monitor.lock();
        if !self.await_data(&mut inner, reader, writer)? {
            return Ok(None);
        }

        let byte = inner.ring.pop();
        if byte.is_some() {
            inner.bytes_read += 1;
            // space available
            self.monitor.notify_all();
        }
        Ok(byte)
    }

    /// Bytes that can be read without blocking
    pub fn available(&self) -> usize {
        let inner = self.monitor.lock();
        if inner.state.closed_by_reader() {
            0
        } else {
            inner.ring.len()
        }
    }

    pub fn close_writer(&self) {
        let mut inner = self.monitor.lock();
        if inner.state.close_writer() {
            debug!(
                pipe_id = self.id,
                buffered = inner.ring.len(),
                "pipe closed by writer"
            );
        }
        self.monitor.notify_all();
    }

    /// Close the read end and discard what can no longer be read
    pub fn close_reader(&self) {
        let mut inner = self.monitor.lock();
        if inner.state.close_reader() {
            let discarded = inner.ring.len();
            inner.ring.clear();
            debug!(pipe_id = self.id, discarded, "pipe closed by reader");
        }
        self.monitor.notify_all();
    }

    pub fn stats(&self) -> PipeStats {
        let inner = self.monitor.lock();
        PipeStats {
            id: self.id,
            capacity: inner.ring.capacity(),
            buffered: inner.ring.len(),
            bytes_written: inner.bytes_written,
            bytes_read: inner.bytes_read,
            status: inner.state.status(),
            waiters: self.monitor.waiter_count(),
        }
    }
}
