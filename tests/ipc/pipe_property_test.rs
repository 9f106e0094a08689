/*!
 * Pipe Property Tests
 * Ordering, bounds, and ring bookkeeping under generated workloads
 */

use bytepipe::ipc::pipe::CircularBuffer;
use bytepipe::{pipe, ReadOutcome};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::thread;

#[derive(Debug, Clone)]
enum RingOp {
    Push(Vec<u8>),
    Pop(usize),
}

fn ring_op() -> impl Strategy<Value = RingOp> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..24).prop_map(RingOp::Push),
        (0usize..24).prop_map(RingOp::Pop),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_chunked_transfer_preserves_bytes(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16),
        capacity in 1usize..48,
        read_len in 1usize..32,
    ) {
        let (writer, reader) = pipe(capacity).unwrap();
        let expected: Vec<u8> = chunks.concat();

        let producer = thread::spawn(move || {
            for chunk in &chunks {
                writer.write(chunk).unwrap();
            }
            writer.close();
        });

        let mut received = Vec::new();
        let mut buf = vec![0u8; read_len];
        loop {
            let available = reader.available();
            prop_assert!(available <= capacity);

            let stats = reader.stats().unwrap();
            prop_assert_eq!(stats.buffered as u64, stats.bytes_written - stats.bytes_read);

            match reader.read(&mut buf).unwrap() {
                ReadOutcome::Data(n) => {
                    prop_assert!(n >= 1 && n <= read_len);
                    received.extend_from_slice(&buf[..n]);
                }
                ReadOutcome::EndOfStream => break,
            }
        }
        producer.join().unwrap();

        prop_assert_eq!(received, expected);
    }

    #[test]
    fn prop_ring_matches_queue_model(
        capacity in 1usize..32,
        ops in prop::collection::vec(ring_op(), 0..64),
    ) {
        let mut ring = CircularBuffer::new(capacity);
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                RingOp::Push(data) => {
                    let pushed = ring.push_slice(&data);
                    prop_assert_eq!(pushed, data.len().min(capacity - model.len()));
                    model.extend(&data[..pushed]);
                }
                RingOp::Pop(len) => {
                    let mut out = vec![0u8; len];
                    let popped = ring.pop_slice(&mut out);
                    prop_assert_eq!(popped, len.min(model.len()));
                    let expected: Vec<u8> = model.drain(..popped).collect();
                    prop_assert_eq!(&out[..popped], &expected[..]);
                }
            }
            prop_assert_eq!(ring.len(), model.len());
            prop_assert_eq!(ring.is_full(), model.len() == capacity);
            prop_assert_eq!(ring.is_empty(), model.is_empty());
        }
    }
}
