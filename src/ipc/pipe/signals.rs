/*!
 * Endpoint Signals
 *
 * Per-handle flags observed by the wait loops:
 * - abandoned: the handle went away without closing (panic unwind or `abandon`)
 * - interrupted: someone asked the handle's blocked call to give up
 *
 * Each handle owns its signals. The peer only gets a read-only
 * `PeerLiveness` view.
 */

use super::pipe::Pipe;
use super::types::Side;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub(crate) struct EndpointSignals {
    abandoned: AtomicBool,
    interrupted: AtomicBool,
}

impl EndpointSignals {
    #[inline]
    pub fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    /// Returns `true` for the call that raised the flag
    pub fn abandon(&self) -> bool {
        !self.abandoned.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }

    /// Consume a pending interrupt
    #[inline]
    pub fn take_interrupt(&self) -> bool {
        self.interrupted.swap(false, Ordering::AcqRel)
    }
}

/// Read-only view of the peer's signals
#[derive(Debug, Clone)]
pub(crate) struct PeerLiveness(Arc<EndpointSignals>);

impl PeerLiveness {
    pub fn new(peer: &Arc<EndpointSignals>) -> Self {
        Self(Arc::clone(peer))
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.0.is_abandoned()
    }
}

/// Cancels a blocked read or write from another thread
///
/// The interrupted call fails with `PipeError::InterruptedWait`. An interrupt
/// raised while the handle is not blocked is delivered to its next wait.
#[derive(Clone)]
pub struct WaitInterrupter {
    signals: Arc<EndpointSignals>,
    pipe: Arc<Pipe>,
    side: Side,
}

impl WaitInterrupter {
    pub(crate) fn new(signals: Arc<EndpointSignals>, pipe: Arc<Pipe>, side: Side) -> Self {
        Self { signals, pipe, side }
    }

    pub fn interrupt(&self) {
        self.signals.interrupt();
        let woken = self.pipe.wake_all();
        debug!(
            pipe_id = self.pipe.id(),
            side = %self.side,
            woken = woken.count(),
            "pipe wait interrupted"
        );
    }
}

impl std::fmt::Debug for WaitInterrupter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitInterrupter")
            .field("pipe_id", &self.pipe.id())
            .field("side", &self.side)
            .finish()
    }
}
