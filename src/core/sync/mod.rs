/*!
 * Synchronization Primitives
 *
 * Wait/notify building blocks used by the pipe:
 * - `Monitor`: mutex-guarded state with a condition variable and bounded waits
 * - `WakeResult` / `WaitOutcome`: compact results for diagnostics
 */

mod monitor;
mod traits;

pub use monitor::Monitor;
pub use traits::{WaitOutcome, WakeResult};
