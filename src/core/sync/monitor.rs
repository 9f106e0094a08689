/*!
 * Monitor
 *
 * A value guarded by a `parking_lot::Mutex` paired with a single
 * `parking_lot::Condvar`, so every state change and every wait go through
 * the same lock.
 *
 * # Design
 *
 * Waits are always bounded: callers pass the longest interval they are
 * willing to sleep and get back a `WaitOutcome`. Callers re-check their own
 * predicate after every return, spurious wakeups included.
 */

use super::traits::{WaitOutcome, WakeResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mutex-guarded state with an attached condition variable
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
pub struct Monitor<T> {
    state: Mutex<T>,
    condvar: Condvar,
    waiters: AtomicUsize,
}

impl<T> Monitor<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(value),
            condvar: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Acquire the state lock
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock()
    }

    /// Release `guard`, sleep until notified or `timeout` elapses, then reacquire
    pub fn wait_for(&self, guard: &mut MutexGuard<'_, T>, timeout: Duration) -> WaitOutcome {
        self.waiters.fetch_add(1, Ordering::Relaxed);
        let result = self.condvar.wait_for(guard, timeout);
        self.waiters.fetch_sub(1, Ordering::Relaxed);

        if result.timed_out() {
            WaitOutcome::TimedOut
        } else {
            WaitOutcome::Notified
        }
    }

    /// Wake every thread currently waiting on this monitor
    #[inline]
    pub fn notify_all(&self) -> WakeResult {
        WakeResult::from_count(self.condvar.notify_all())
    }

    /// Take the lock briefly, then wake all waiters
    ///
    /// Used by signals raised outside the lock so a waiter that is between its
    /// predicate check and its wait cannot miss the notification.
    pub fn touch_and_notify(&self) -> WakeResult {
        drop(self.state.lock());
        self.notify_all()
    }

    /// Approximate number of threads parked in `wait_for` (for diagnostics)
    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

impl<T: Default> Default for Monitor<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
