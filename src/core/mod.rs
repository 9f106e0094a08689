/*!
 * Core Module
 * Shared limits, error types, synchronization primitives, and data structures
 */

pub mod data_structures;
pub mod errors;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use data_structures::ByteSink;
pub use errors::RangeError;
