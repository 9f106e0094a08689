/*!
 * bytepipe
 * Bounded, blocking, in-process byte pipes between one producer and one consumer
 *
 * ```
 * use bytepipe::{pipe, ReadOutcome};
 *
 * let (writer, reader) = pipe(4).unwrap();
 * writer.write(b"hi").unwrap();
 * writer.close();
 *
 * let mut buf = [0u8; 4];
 * assert_eq!(reader.read(&mut buf).unwrap(), ReadOutcome::Data(2));
 * assert_eq!(reader.read(&mut buf).unwrap(), ReadOutcome::EndOfStream);
 * ```
 */

pub mod core;
pub mod ipc;
pub mod monitoring;

// Re-exports
pub use crate::core::{ByteSink, RangeError};
pub use ipc::{
    pipe, pipe_with_config, ConnectionStatus, PipeConfig, PipeError, PipeReader, PipeResult,
    PipeStats, PipeWriter, ReadOutcome, Side, WaitInterrupter,
};
pub use monitoring::{init_tracing, TransferSpan};
