/*!
 * IPC Module
 * In-process byte pipes
 */

pub mod pipe;

// Re-export for convenience
pub use pipe::{
    pipe, pipe_with_config, ConnectionStatus, PipeConfig, PipeError, PipeReader, PipeResult,
    PipeStats, PipeWriter, ReadOutcome, Side, WaitInterrupter,
};
