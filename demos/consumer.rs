//! Consumer-side loop for the split-binary demo (spec.md §4.L):
//! poll-until-timeout, a progress line every N messages, and a final
//! statistics block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use spsc_vsq::Consumer;

use crate::crc8::crc8;

const IDLE_TIMEOUT: Duration = Duration::from_secs(5);
const PROGRESS_EVERY: usize = 1000;

/// Drain up to `expected` records, checking sequence monotonicity and the
/// CRC-8 tag written by [`crate::producer::run`]. Returns
/// `(received, checksum_failures)`.
pub fn run(consumer: &mut Consumer<'_>, expected: usize, keep_alive: &AtomicBool) -> (usize, usize) {
    let start = Instant::now();
    let mut received = 0usize;
    let mut failures = 0usize;
    let mut last_seq: Option<u32> = None;
    let mut idle_since = Instant::now();

    while received < expected {
        if !keep_alive.load(Ordering::SeqCst) {
            println!("Consumer: shutdown requested, stopping after {received} messages");
            break;
        }

        match consumer.read_head() {
            Some(payload) => {
                idle_since = Instant::now();
                if payload.len() != 5 {
                    failures += 1;
                } else {
                    let seq = u32::from_be_bytes(payload[..4].try_into().unwrap());
                    if crc8(&payload[..4]) != payload[4] {
                        failures += 1;
                        println!("Consumer: checksum mismatch at seq {seq}");
                    }
                    if let Some(prev) = last_seq {
                        if seq != prev + 1 {
                            failures += 1;
                            println!("Consumer: out-of-order record, expected {}, got {seq}", prev + 1);
                        }
                    }
                    last_seq = Some(seq);
                }

                received += 1;
                if received % PROGRESS_EVERY == 0 {
                    println!("Consumer: received {received} messages");
                }
            }
            None => {
                if idle_since.elapsed() > IDLE_TIMEOUT {
                    println!("Consumer: timed out waiting for more messages");
                    break;
                }
                std::thread::yield_now();
            }
        }
    }

    let elapsed = start.elapsed();
    println!("Consumer: received {received} messages ({failures} failures) in {elapsed:.2?}");
    (received, failures)
}
