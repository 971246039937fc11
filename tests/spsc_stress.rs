//! Scenario 5 from spec.md §8: one producer thread and one consumer thread,
//! each record tagged with a monotonic sequence number and a CRC-8/SAE-J1850
//! checksum, verifying sequence monotonicity, checksum correctness, and equal
//! enqueue/dequeue counts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spsc_vsq::{queue_size, Queue};

const POLY: u8 = 0x1D;

fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ POLY } else { crc << 1 };
        }
    }
    crc ^ 0xFF
}

/// header layout for a tagged record: 4-byte big-endian seq, 1-byte crc,
/// then 0..=S random filler bytes.
fn make_payload(seq: u32, filler: &[u8]) -> Vec<u8> {
    let mut tagged = Vec::with_capacity(5 + filler.len());
    tagged.extend_from_slice(&seq.to_be_bytes());
    tagged.push(0); // placeholder, overwritten below
    tagged.extend_from_slice(filler);
    let crc = crc8(&tagged[..4]);
    tagged[4] = crc;
    tagged
}

#[test]
fn spsc_stress_one_hundred_thousand_records() {
    const N: usize = 100_000;
    const S: u32 = 32;

    let needed = queue_size(256, S);
    let mut buf = vec![0u8; needed];
    let queue = Queue::create(&mut buf, 256, S).unwrap();
    let (producer, mut consumer) = queue.split();

    let stop = Arc::new(AtomicBool::new(false));

    std::thread::scope(|scope| {
        let producer_stop = Arc::clone(&stop);
        let producer_thread = scope.spawn(move || {
            let rng = fastrand::Rng::with_seed(0x2545_f491_2545_f491);
            let mut sent = 0usize;
            for seq in 0..N as u32 {
                let filler_len = rng.usize(0..(S as usize - 4));
                let filler = vec![(seq & 0xFF) as u8; filler_len];
                let payload = make_payload(seq, &filler);

                loop {
                    match producer.write_tail(&payload) {
                        Ok(()) => {
                            sent += 1;
                            break;
                        }
                        Err(_) => std::thread::yield_now(),
                    }
                }
            }
            producer_stop.store(true, Ordering::SeqCst);
            sent
        });

        let mut received = 0usize;
        let mut expected_seq = 0u32;
        loop {
            match consumer.read_head() {
                Some(payload) => {
                    assert!(payload.len() >= 5);
                    let seq = u32::from_be_bytes(payload[0..4].try_into().unwrap());
                    assert_eq!(seq, expected_seq, "sequence must be strictly monotonic");
                    assert_eq!(crc8(&payload[0..4]), payload[4], "checksum must match");
                    expected_seq += 1;
                    received += 1;
                }
                None => {
                    if stop.load(Ordering::SeqCst) && received == N {
                        break;
                    }
                    if stop.load(Ordering::SeqCst) && received < N {
                        // producer finished but a handful of records may still
                        // be in flight between its last store and our load
                        std::thread::yield_now();
                        continue;
                    }
                    std::thread::yield_now();
                }
            }
        }

        let sent = producer_thread.join().unwrap();
        assert_eq!(sent, N);
        assert_eq!(received, N);
    });
}
