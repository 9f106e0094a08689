/*!
 * Pipe Limits and Constants
 *
 * Centralized location for pipe sizing and wait-loop tuning values.
 *
 * ## Conventions
 * - Values that affect blocking latency are marked with [LATENCY]
 * - Values that bound memory use are marked with [MEMORY]
 */

use std::time::Duration;

// =============================================================================
// BUFFER SIZING
// =============================================================================

/// Default ring capacity for a pipe (1KB)
pub const DEFAULT_PIPE_CAPACITY: usize = 1024;

/// Maximum ring capacity accepted by `PipeConfig::validate` (16MB)
/// [MEMORY] The ring is allocated eagerly at connect time
pub const MAX_PIPE_CAPACITY: usize = 16 * 1024 * 1024;

/// Default starting capacity of a `ByteSink`
pub const DEFAULT_SINK_CAPACITY: usize = 32;

/// Largest capacity a `ByteSink` will grow to before falling back to the exact request
/// [MEMORY] Keeps the doubling step clear of `isize::MAX`
pub const MAX_SINK_CAPACITY: usize = isize::MAX as usize - 8;

// =============================================================================
// WAIT LOOP
// =============================================================================

/// Upper bound on a single condition wait inside a blocked read or write
/// [LATENCY] Liveness of the peer is re-checked at least this often
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll interval used by `PipeConfig::low_latency`
/// [LATENCY]
pub const LOW_LATENCY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Number of polls a reader keeps waiting after it observed the writer as dead
/// before reporting a broken pipe
pub const DEFAULT_DEAD_PEER_POLLS: u32 = 2;
