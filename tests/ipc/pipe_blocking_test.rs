/*!
 * Pipe Blocking Tests
 * Cross-thread wait/notify behavior: full and empty waits, closes, dead peers, interrupts
 */

use bytepipe::{pipe, pipe_with_config, PipeConfig, PipeError, ReadOutcome, Side};
use pretty_assertions::assert_eq;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval long enough that only a notification can explain a fast wakeup
fn slow_poll(capacity: usize) -> PipeConfig {
    PipeConfig::default()
        .with_capacity(capacity)
        .with_poll_interval(Duration::from_secs(5))
}

fn fast_poll(capacity: usize) -> PipeConfig {
    PipeConfig::low_latency()
        .with_capacity(capacity)
        .with_poll_interval(Duration::from_millis(10))
}

#[test]
fn test_concurrent_transfer_larger_than_capacity() {
    let (writer, reader) = pipe(1024).unwrap();
    let data: Vec<u8> = (0..1050u32).map(|i| (i % 251) as u8).collect();
    let expected = data.clone();

    let producer = thread::spawn(move || {
        writer.write(&data).unwrap();
        writer.close();
    });

    let mut received = Vec::new();
    let mut buf = [0u8; 100];
    loop {
        match reader.read(&mut buf).unwrap() {
            ReadOutcome::Data(n) => received.extend_from_slice(&buf[..n]),
            ReadOutcome::EndOfStream => break,
        }
    }
    producer.join().unwrap();

    assert_eq!(received.len(), 1050);
    assert_eq!(received, expected);
}

#[test]
fn test_writer_blocks_when_full() {
    let (writer, reader) = pipe(4).unwrap();
    let done = Arc::new(AtomicBool::new(false));
    let done_clone = done.clone();

    let producer = thread::spawn(move || {
        writer.write(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        done_clone.store(true, Ordering::SeqCst);
    });

    // Give the writer time to fill the ring and park
    thread::sleep(Duration::from_millis(100));
    assert!(!done.load(Ordering::SeqCst));
    assert_eq!(reader.available(), 4);

    let mut received = Vec::new();
    while received.len() < 10 {
        if let Some(byte) = reader.read_byte().unwrap() {
            received.push(byte);
        }
    }
    producer.join().unwrap();

    assert!(done.load(Ordering::SeqCst));
    assert_eq!(received, (0..10).collect::<Vec<u8>>());
}

#[test]
fn test_reader_blocks_until_data() {
    let (writer, reader) = pipe_with_config(slow_poll(8)).unwrap();

    let consumer = thread::spawn(move || {
        let start = Instant::now();
        let byte = reader.read_byte().unwrap();
        (byte, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    writer.write_byte(42).unwrap();

    let (byte, elapsed) = consumer.join().unwrap();
    assert_eq!(byte, Some(42));
    assert!(elapsed >= Duration::from_millis(40));
    assert!(elapsed < Duration::from_secs(4));
}

#[test]
fn test_writer_close_wakes_blocked_reader() {
    let (writer, reader) = pipe_with_config(slow_poll(8)).unwrap();

    let consumer = thread::spawn(move || {
        let start = Instant::now();
        let result = reader.read_byte();
        (result, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    writer.close();

    let (result, elapsed) = consumer.join().unwrap();
    assert_eq!(result, Ok(None));
    assert!(elapsed < Duration::from_secs(4));
}

#[test]
fn test_reader_close_wakes_blocked_writer() {
    let (writer, reader) = pipe_with_config(slow_poll(2)).unwrap();

    let producer = thread::spawn(move || {
        let start = Instant::now();
        let result = writer.write(b"more than fits");
        (result, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    reader.close();

    let (result, elapsed) = producer.join().unwrap();
    assert_eq!(result, Err(PipeError::ClosedPipe));
    assert!(elapsed < Duration::from_secs(4));
}

#[test]
fn test_writer_woken_by_reader_close_stores_nothing() {
    let (writer, reader) = pipe_with_config(slow_poll(2)).unwrap();
    writer.write(b"ab").unwrap();

    let producer = thread::spawn(move || {
        let result = writer.write_some(b"cd");
        (result, writer.stats().unwrap().bytes_written)
    });

    thread::sleep(Duration::from_millis(50));
    reader.close();

    let (result, bytes_written) = producer.join().unwrap();
    assert_eq!(result, Err(PipeError::ClosedPipe));
    assert_eq!(bytes_written, 2);
}

#[test]
fn test_dropped_reader_unblocks_writer() {
    let (writer, reader) = pipe_with_config(slow_poll(2)).unwrap();

    let producer = thread::spawn(move || writer.write(b"overflow"));

    thread::sleep(Duration::from_millis(50));
    drop(reader);

    assert_eq!(producer.join().unwrap(), Err(PipeError::ClosedPipe));
}

#[test]
fn test_panicking_writer_breaks_pipe() {
    let (writer, reader) = pipe_with_config(fast_poll(8)).unwrap();

    let producer = thread::spawn(move || {
        let _writer = writer;
        panic!("producer crashed");
    });
    assert!(producer.join().is_err());

    assert_eq!(reader.read_byte(), Err(PipeError::BrokenPipe(Side::Writer)));
}

#[test]
fn test_writer_abandoned_while_reader_waits() {
    let config = fast_poll(8).with_dead_peer_polls(2);
    let (writer, reader) = pipe_with_config(config).unwrap();

    let consumer = thread::spawn(move || {
        let start = Instant::now();
        let result = reader.read_byte();
        (result, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    writer.abandon();

    let (result, elapsed) = consumer.join().unwrap();
    assert_eq!(result, Err(PipeError::BrokenPipe(Side::Writer)));
    // two grace polls of 10ms after the wakeup, far below any hang
    assert!(elapsed < Duration::from_secs(2));
}

#[test]
fn test_panicking_reader_breaks_blocked_writer() {
    let (writer, reader) = pipe_with_config(slow_poll(2)).unwrap();

    let producer = thread::spawn(move || {
        let start = Instant::now();
        let result = writer.write(b"abcdef");
        (result, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    let consumer = thread::spawn(move || {
        let _reader = reader;
        panic!("consumer crashed");
    });
    assert!(consumer.join().is_err());

    let (result, elapsed) = producer.join().unwrap();
    assert_eq!(result, Err(PipeError::BrokenPipe(Side::Reader)));
    assert!(elapsed < Duration::from_secs(4));
}

#[test]
fn test_interrupt_blocked_reader() {
    let (writer, reader) = pipe_with_config(slow_poll(8)).unwrap();
    let interrupter = reader.interrupter().unwrap();

    let consumer = thread::spawn(move || {
        let start = Instant::now();
        let first = reader.read_byte();
        let elapsed = start.elapsed();
        (reader, first, elapsed)
    });

    thread::sleep(Duration::from_millis(50));
    interrupter.interrupt();

    let (reader, first, elapsed) = consumer.join().unwrap();
    assert_eq!(first, Err(PipeError::InterruptedWait));
    assert!(elapsed < Duration::from_secs(4));

    // the pipe survives an interrupt
    writer.write_byte(7).unwrap();
    assert_eq!(reader.read_byte().unwrap(), Some(7));
}

#[test]
fn test_interrupt_blocked_writer() {
    let (writer, reader) = pipe_with_config(slow_poll(2)).unwrap();
    let interrupter = writer.interrupter().unwrap();

    let producer = thread::spawn(move || writer.write(b"abcd"));

    thread::sleep(Duration::from_millis(50));
    interrupter.interrupt();

    assert_eq!(producer.join().unwrap(), Err(PipeError::InterruptedWait));
    assert_eq!(reader.available(), 2);
}

#[test]
fn test_interrupted_write_all_delivers_each_byte_once() {
    let (mut writer, mut reader) = pipe_with_config(slow_poll(4)).unwrap();
    let interrupter = writer.interrupter().unwrap();

    let producer = thread::spawn(move || writer.write_all(b"abcdefgh"));

    // first four bytes are buffered, the rest waits for space
    thread::sleep(Duration::from_millis(100));
    interrupter.interrupt();
    thread::sleep(Duration::from_millis(50));

    let mut received = Vec::new();
    reader.read_to_end(&mut received).unwrap();

    assert!(producer.join().unwrap().is_ok());
    assert_eq!(received, b"abcdefgh".to_vec());
}

#[test]
fn test_interrupted_write_some_stores_nothing() {
    let (writer, reader) = pipe_with_config(slow_poll(2)).unwrap();
    writer.write(b"ab").unwrap();
    let interrupter = writer.interrupter().unwrap();

    let producer = thread::spawn(move || writer.write_some(b"cd"));

    thread::sleep(Duration::from_millis(50));
    interrupter.interrupt();

    assert_eq!(producer.join().unwrap(), Err(PipeError::InterruptedWait));
    assert_eq!(reader.stats().unwrap().bytes_written, 2);
}

#[test]
fn test_io_traits_round_trip() {
    let (mut writer, mut reader) = pipe(16).unwrap();
    let payload: Vec<u8> = (0..500u32).map(|i| (i * 7 % 256) as u8).collect();
    let expected = payload.clone();

    let producer = thread::spawn(move || {
        std::io::copy(&mut payload.as_slice(), &mut writer).unwrap();
        writer.flush().unwrap();
    });

    let mut received = Vec::new();
    reader.read_to_end(&mut received).unwrap();
    producer.join().unwrap();

    assert_eq!(received, expected);
}
