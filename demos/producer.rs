//! Producer-side loop for the split-binary demo (spec.md §4.L): round-robin
//! send with bounded retry on "full", a progress line every N messages, and a
//! final statistics block.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use spsc_vsq::Producer;

use crate::crc8::crc8;

const MAX_RETRIES: u32 = 10;
const RETRY_SLEEP: Duration = Duration::from_micros(100);
const PROGRESS_EVERY: usize = 1000;

/// Send `num_messages` tagged records. Each payload is `seq:crc` where `seq`
/// is a 4-byte big-endian monotonic counter and `crc` is the CRC-8/SAE-J1850
/// of `seq`'s bytes, letting the consumer side verify both ordering and
/// integrity.
pub fn run(producer: &Producer<'_>, num_messages: usize, keep_alive: &AtomicBool) -> usize {
    let start = Instant::now();
    let mut sent = 0usize;

    for seq in 0..num_messages as u32 {
        if !keep_alive.load(Ordering::SeqCst) {
            println!("Producer: shutdown requested, stopping at message {seq}");
            break;
        }

        let mut payload = [0u8; 5];
        payload[..4].copy_from_slice(&seq.to_be_bytes());
        payload[4] = crc8(&seq.to_be_bytes());

        let mut retries = 0;
        loop {
            match producer.write_tail(&payload) {
                Ok(()) => {
                    sent += 1;
                    break;
                }
                Err(_full) => {
                    retries += 1;
                    if retries >= MAX_RETRIES {
                        println!("Producer: queue stayed full, stopping at message {seq}");
                        return sent;
                    }
                    std::thread::sleep(RETRY_SLEEP);
                }
            }
        }

        if sent % PROGRESS_EVERY == 0 {
            println!("Producer: sent {sent} messages");
        }
    }

    let elapsed = start.elapsed();
    println!("Producer: sent {sent} messages in {elapsed:.2?}");
    sent
}
