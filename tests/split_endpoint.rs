//! Scenario 6 from spec.md §8: `Head` and `Tail` built over two
//! independently-allocated, non-overlapping regions standing in for two
//! separate address spaces. Verifies producer writes never touch the head's
//! region, consumer writes never touch the tail's region, and the scenario-5
//! stress property (sequence + checksum) still holds across the split.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use spsc_vsq::{head_size, link_head_with_tail, link_tail_with_head, tail_size, Head, Tail};

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

#[test]
fn head_and_tail_regions_stay_isolated() {
    const CAP: u32 = 8;
    const ELEM: u32 = 16;

    // Over-allocate the head region with trailing sentinel padding: if a
    // producer pointer ever strayed into this region, it would corrupt the
    // padding, which nothing in the queue is supposed to touch.
    let padding = 4096;
    let mut head_region = vec![0xAAu8; head_size() + padding];
    let mut tail_region = vec![0xBBu8; tail_size(CAP, ELEM) as usize];

    let (head_header_region, head_padding) = head_region.split_at_mut(head_size());
    let mut head = Head::create(head_header_region).unwrap();
    let mut tail = Tail::create(&mut tail_region, CAP, ELEM).unwrap();

    link_head_with_tail(&mut head, &tail);
    link_tail_with_head(&mut tail, &head);

    for i in 0..CAP {
        let payload = vec![i as u8; ELEM as usize];
        if tail.write_tail(&payload).is_ok() {
            let got = head.read_head().unwrap();
            assert_eq!(got, payload.as_slice());
        }
    }

    // Nothing the queue does should ever reach past the head's own header.
    assert!(head_padding.iter().all(|&b| b == 0xAA));
}

#[test]
fn split_endpoint_stress_matches_scenario_five() {
    const N: usize = 20_000;
    const CAP: u32 = 256;
    const ELEM: u32 = 32;

    let mut head_region = vec![0u8; head_size()];
    let mut tail_region = vec![0u8; tail_size(CAP, ELEM) as usize];

    let mut head = Head::create(&mut head_region).unwrap();
    let mut tail = Tail::create(&mut tail_region, CAP, ELEM).unwrap();

    link_head_with_tail(&mut head, &tail);
    link_tail_with_head(&mut tail, &head);

    let stop = Arc::new(AtomicBool::new(false));

    std::thread::scope(|scope| {
        let producer_stop = Arc::clone(&stop);
        let producer_thread = scope.spawn(move || {
            let mut sent = 0usize;
            for seq in 0..N as u32 {
                let mut payload = [0u8; 5];
                payload[..4].copy_from_slice(&seq.to_be_bytes());
                payload[4] = crc8(&seq.to_be_bytes());
                loop {
                    match tail.write_tail(&payload) {
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
        while received < N {
            match head.read_head() {
                Some(payload) => {
                    let seq = u32::from_be_bytes(payload[..4].try_into().unwrap());
                    assert_eq!(seq, expected_seq);
                    assert_eq!(crc8(&payload[..4]), payload[4]);
                    expected_seq += 1;
                    received += 1;
                }
                None => std::thread::yield_now(),
            }
        }

        let sent = producer_thread.join().unwrap();
        assert_eq!(sent, N);
        assert_eq!(received, N);
    });
}
