/*!
 * Pipe Module
 * Bounded in-process byte pipes between one writer and one reader
 */

mod buffer;
mod config;
mod endpoint;
mod pipe;
mod signals;
mod state;
pub mod types;

// Re-export public API
pub use buffer::CircularBuffer;
pub use config::PipeConfig;
pub use endpoint::{pipe, pipe_with_config, PipeReader, PipeWriter};
pub use signals::WaitInterrupter;
pub use state::{ConnectionState, ConnectionStatus};
pub use types::{PipeError, PipeId, PipeResult, PipeStats, ReadOutcome, Side};
