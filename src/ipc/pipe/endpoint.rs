/*!
 * Pipe Endpoints
 * The writer and reader handles bound to a shared pipe
 *
 * A handle is created unbound and connected to exactly one peer, or created
 * already connected through `pipe()`. Dropping a handle closes it. A handle
 * dropped while its thread is panicking is marked abandoned instead, which the
 * peer reports as a broken pipe.
 */

use super::config::PipeConfig;
use super::pipe::Pipe;
use super::signals::{EndpointSignals, PeerLiveness, WaitInterrupter};
use super::types::{PipeError, PipeResult, PipeStats, ReadOutcome, Side};
use crate::core::errors::RangeError;
use std::io;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

struct Binding {
    pipe: Arc<Pipe>,
    peer: PeerLiveness,
}

/// Create a connected writer/reader pair with a ring of `capacity` bytes
pub fn pipe(capacity: usize) -> PipeResult<(PipeWriter, PipeReader)> {
    pipe_with_config(PipeConfig::default().with_capacity(capacity))
}

/// Create a connected writer/reader pair from a full configuration
pub fn pipe_with_config(config: PipeConfig) -> PipeResult<(PipeWriter, PipeReader)> {
    let mut reader = PipeReader::with_config(config)?;
    let mut writer = PipeWriter::new();
    writer.connect(&mut reader)?;
    Ok((writer, reader))
}

#[instrument(level = "debug", skip_all)]
fn bind(writer: &mut PipeWriter, reader: &mut PipeReader) -> PipeResult<()> {
    if writer.binding.is_some() || reader.binding.is_some() {
        return Err(PipeError::AlreadyConnected);
    }

    let pipe = Arc::new(Pipe::connect(reader.config.clone())?);
    debug!(
        pipe_id = pipe.id(),
        capacity = pipe.capacity(),
        "pipe connected"
    );

    writer.binding = Some(Binding {
        pipe: Arc::clone(&pipe),
        peer: PeerLiveness::new(&reader.signals),
    });
    reader.binding = Some(Binding {
        pipe,
        peer: PeerLiveness::new(&writer.signals),
    });
    Ok(())
}

fn mark_abandoned(signals: &EndpointSignals, binding: Option<&Binding>, side: Side) {
    if !signals.abandon() {
        return;
    }
    if let Some(binding) = binding {
        warn!(pipe_id = binding.pipe.id(), side = %side, "pipe endpoint abandoned");
        binding.pipe.wake_all();
    }
}

/// Producing end of a pipe
pub struct PipeWriter {
    signals: Arc<EndpointSignals>,
    binding: Option<Binding>,
}

impl PipeWriter {
    /// Create an unconnected writer
    pub fn new() -> Self {
        Self {
            signals: Arc::new(EndpointSignals::default()),
            binding: None,
        }
    }

    /// Bind this writer to `reader`. Either side may initiate the connection.
    pub fn connect(&mut self, reader: &mut PipeReader) -> PipeResult<()> {
        bind(self, reader)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    fn binding(&self) -> PipeResult<&Binding> {
        self.binding.as_ref().ok_or(PipeError::NotConnected)
    }

    /// Write every byte of `data`, blocking while the pipe is full
    ///
    /// On error a prefix of `data` may already be buffered for the reader. Use
    /// [`write_some`](Self::write_some) when the caller must know how much
    /// landed.
    pub fn write(&self, data: &[u8]) -> PipeResult<()> {
        let mut remaining = data;
        loop {
            let written = self.write_some(remaining)?;
            remaining = &remaining[written..];
            if remaining.is_empty() {
                return Ok(());
            }
        }
    }

    /// Write as much of `data` as fits, blocking only while the pipe is full
    ///
    /// Returns the number of bytes written. An error means nothing was written.
    pub fn write_some(&self, data: &[u8]) -> PipeResult<usize> {
        let binding = self.binding()?;
        binding.pipe.write_some(data, &self.signals, &binding.peer)
    }

    pub fn write_byte(&self, byte: u8) -> PipeResult<()> {
        let binding = self.binding()?;
        binding.pipe.write_byte(byte, &self.signals, &binding.peer)
    }

    /// Write `data[offset..offset + length]`
    pub fn write_at(&self, data: &[u8], offset: usize, length: usize) -> PipeResult<()> {
        let range = RangeError::check(data.len(), offset, length)?;
        self.write(&data[range])
    }

    /// Wake a reader waiting for data
    pub fn wake_reader(&self) {
        if let Some(binding) = &self.binding {
            binding.pipe.wake_all();
        }
    }

    /// Signal end of stream. Idempotent; a no-op on an unconnected writer.
    pub fn close(&self) {
        if let Some(binding) = &self.binding {
            binding.pipe.close_writer();
        }
    }

    /// Give up on the pipe without closing it
    ///
    /// The reader drains what is buffered and then fails with
    /// `PipeError::BrokenPipe`.
    pub fn abandon(self) {
        mark_abandoned(&self.signals, self.binding.as_ref(), Side::Writer);
    }

    pub fn interrupter(&self) -> PipeResult<WaitInterrupter> {
        let binding = self.binding()?;
        Ok(WaitInterrupter::new(
            Arc::clone(&self.signals),
            Arc::clone(&binding.pipe),
            Side::Writer,
        ))
    }

    pub fn stats(&self) -> PipeResult<PipeStats> {
        Ok(self.binding()?.pipe.stats())
    }
}

impl Default for PipeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        if std::thread::panicking() {
            mark_abandoned(&self.signals, self.binding.as_ref(), Side::Writer);
        } else if !self.signals.is_abandoned() {
            self.close();
        }
    }
}

impl std::fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeWriter")
            .field("pipe", &self.binding.as_ref().map(|b| b.pipe.id()))
            .field("abandoned", &self.signals.is_abandoned())
            .finish()
    }
}

impl io::Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_some(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.wake_reader();
        Ok(())
    }
}

/// Consuming end of a pipe; owns the ring configuration until connected
pub struct PipeReader {
    signals: Arc<EndpointSignals>,
    config: PipeConfig,
    binding: Option<Binding>,
}

impl PipeReader {
    /// Create an unconnected reader with the default configuration
    pub fn new() -> Self {
        Self {
            signals: Arc::new(EndpointSignals::default()),
            config: PipeConfig::default(),
            binding: None,
        }
    }

    /// Create an unconnected reader whose ring will hold `capacity` bytes
    pub fn with_capacity(capacity: usize) -> PipeResult<Self> {
        Self::with_config(PipeConfig::default().with_capacity(capacity))
    }

    pub fn with_config(config: PipeConfig) -> PipeResult<Self> {
        config.validate()?;
        Ok(Self {
            signals: Arc::new(EndpointSignals::default()),
            config,
            binding: None,
        })
    }

    /// Bind this reader to `writer`. Either side may initiate the connection.
    pub fn connect(&mut self, writer: &mut PipeWriter) -> PipeResult<()> {
        bind(writer, self)
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    fn binding(&self) -> PipeResult<&Binding> {
        self.binding.as_ref().ok_or(PipeError::NotConnected)
    }

    /// Ring size this reader was configured with
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Read one byte, blocking until one arrives. `None` is end of stream.
    pub fn read_byte(&self) -> PipeResult<Option<u8>> {
        let binding = self.binding()?;
        binding.pipe.read_byte(&self.signals, &binding.peer)
    }

    /// Block until at least one byte is available, then copy as many buffered
    /// bytes as fit into `buf` without blocking again
    pub fn read(&self, buf: &mut [u8]) -> PipeResult<ReadOutcome> {
        let binding = self.binding()?;
        binding.pipe.read(buf, &self.signals, &binding.peer)
    }

    /// Read into `buf[offset..offset + length]`
    pub fn read_at(&self, buf: &mut [u8], offset: usize, length: usize) -> PipeResult<ReadOutcome> {
        let range = RangeError::check(buf.len(), offset, length)?;
        self.read(&mut buf[range])
    }

    /// Read up to `max_len` bytes into a fresh vector. `None` is end of stream.
    ///
    /// With `max_len == 0` this does not block; it returns `None` once the
    /// writer has closed and everything was consumed.
    pub fn read_chunk(&self, max_len: usize) -> PipeResult<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; max_len.min(self.config.capacity)];
        match self.read(&mut chunk)? {
            ReadOutcome::Data(n) => {
                chunk.truncate(n);
                Ok(Some(chunk))
            }
            ReadOutcome::EndOfStream => Ok(None),
        }
    }

    /// Bytes readable without blocking; 0 when unconnected or closed
    pub fn available(&self) -> usize {
        self.binding
            .as_ref()
            .map_or(0, |binding| binding.pipe.available())
    }

    /// Stop reading and discard buffered bytes. Idempotent.
    pub fn close(&self) {
        if let Some(binding) = &self.binding {
            binding.pipe.close_reader();
        }
    }

    /// Give up on the pipe without closing it
    ///
    /// The writer's next write fails with `PipeError::BrokenPipe`.
    pub fn abandon(self) {
        mark_abandoned(&self.signals, self.binding.as_ref(), Side::Reader);
    }

    pub fn interrupter(&self) -> PipeResult<WaitInterrupter> {
        let binding = self.binding()?;
        Ok(WaitInterrupter::new(
            Arc::clone(&self.signals),
            Arc::clone(&binding.pipe),
            Side::Reader,
        ))
    }

    pub fn stats(&self) -> PipeResult<PipeStats> {
        Ok(self.binding()?.pipe.stats())
    }
}

impl Default for PipeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        if std::thread::panicking() {
            mark_abandoned(&self.signals, self.binding.as_ref(), Side::Reader);
        } else if !self.signals.is_abandoned() {
            self.close();
        }
    }
}

impl std::fmt::Debug for PipeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeReader")
            .field("pipe", &self.binding.as_ref().map(|b| b.pipe.id()))
            .field("capacity", &self.config.capacity)
            .field("abandoned", &self.signals.is_abandoned())
            .finish()
    }
}

impl io::Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(PipeReader::read(self, buf)?.bytes_read())
    }
}
