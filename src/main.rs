/*!
 * Pipe Demo - Main Entry Point
 *
 * Runs one sender thread and one receiver thread over a single pipe:
 * - the sender writes a message longer than the pipe and closes
 * - the receiver drains it in chunks into a ByteSink until end of stream
 *
 * Environment:
 * - PIPE_CAPACITY: ring size in bytes (default 1024)
 * - PIPE_POLL_INTERVAL_MS: liveness poll interval (default 1000)
 */

use bytepipe::{
    init_tracing, pipe_with_config, ByteSink, PipeConfig, PipeReader, PipeWriter, TransferSpan,
};
use std::error::Error;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

const READ_CHUNK: usize = 1024;

fn config_from_env() -> Result<PipeConfig, Box<dyn Error>> {
    let mut config = PipeConfig::default();
    if let Ok(capacity) = std::env::var("PIPE_CAPACITY") {
        config = config.with_capacity(capacity.parse()?);
    }
    if let Ok(poll_ms) = std::env::var("PIPE_POLL_INTERVAL_MS") {
        config = config.with_poll_interval(Duration::from_millis(poll_ms.parse()?));
    }
    config.validate()?;
    Ok(config)
}

fn long_message() -> Vec<u8> {
    let mut message = "0123456789".repeat(102);
    message.push_str("abcdefghijklmnopqrstuvwxyz");
    message.into_bytes()
}

fn send(writer: PipeWriter, message: Vec<u8>) -> Result<u64, bytepipe::PipeError> {
    let mut span = TransferSpan::new("sender", writer.stats()?.id);
    let _entered = span.span().clone().entered();

    writer.write(&message)?;
    span.add_bytes(message.len());
    writer.close();
    Ok(span.bytes())
}

fn receive(reader: PipeReader) -> Result<ByteSink, bytepipe::PipeError> {
    let mut span = TransferSpan::new("receiver", reader.stats()?.id);
    let _entered = span.span().clone().entered();

    let mut sink = ByteSink::new();
    while let Some(chunk) = reader.read_chunk(READ_CHUNK)? {
        info!(bytes = chunk.len(), "received chunk");
        span.add_bytes(chunk.len());
        sink.write_slice(&chunk);
    }

    let stats = reader.stats()?;
    match serde_json::to_string(&stats) {
        Ok(json) => info!(stats = %json, "pipe drained"),
        Err(e) => error!(error = %e, "failed to serialize pipe stats"),
    }
    Ok(sink)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = config_from_env()?;
    info!(
        capacity = config.capacity,
        poll_ms = config.poll_interval.as_millis() as u64,
        "starting pipe demo"
    );

    let (writer, reader) = pipe_with_config(config)?;
    let message = long_message();
    let expected = message.len();

    let sender = thread::Builder::new()
        .name("sender".into())
        .spawn(move || send(writer, message))?;
    let receiver = thread::Builder::new()
        .name("receiver".into())
        .spawn(move || receive(reader))?;

    let sent = sender.join().map_err(|_| "sender thread panicked")??;
    let sink = receiver.join().map_err(|_| "receiver thread panicked")??;

    info!(sent, received = sink.len(), "transfer finished");
    if sink.len() != expected {
        return Err(format!("expected {} bytes, received {}", expected, sink.len()).into());
    }

    println!("{}", String::from_utf8_lossy(sink.as_slice()));
    Ok(())
}
