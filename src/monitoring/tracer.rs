/*!
 * Tracing
 * Structured logging for pipe lifecycle and transfers using the tracing crate
 *
 * Features:
 * - Env-filtered output (`RUST_LOG`, default `info`)
 * - Optional JSON output for machine parsing
 * - Timed transfer spans that warn when a transfer runs long
 */

use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Transfers slower than this are reported at `warn`
const SLOW_TRANSFER: Duration = Duration::from_secs(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - PIPE_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("PIPE_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span covering one side's whole transfer over a pipe
///
/// Records the byte count and logs the elapsed time when dropped.
pub struct TransferSpan {
    span: Span,
    start: Instant,
    bytes: u64,
}

impl TransferSpan {
    pub fn new(role: &'static str, pipe_id: u32) -> Self {
        let span = span!(
            Level::DEBUG,
            "transfer",
            role,
            pipe_id,
            bytes = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );
        debug!(parent: &span, "transfer started");

        Self {
            span,
            start: Instant::now(),
            bytes: 0,
        }
    }

    /// Count bytes moved through the pipe
    pub fn add_bytes(&mut self, n: usize) {
        self.bytes += n as u64;
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// The underlying span, for entering or parenting events
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for TransferSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("bytes", self.bytes);
        self.span.record("duration_ms", duration.as_millis() as u64);

        if duration > SLOW_TRANSFER {
            warn!(
                parent: &self.span,
                bytes = self.bytes,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow transfer"
            );
        } else {
            debug!(
                parent: &self.span,
                bytes = self.bytes,
                duration_us = duration.as_micros() as u64,
                "transfer completed"
            );
        }
    }
}
