/*!
 * Monitoring
 * Structured tracing setup and timed spans for pipe transfers
 */

mod tracer;

pub use tracer::{init_tracing, TransferSpan};
