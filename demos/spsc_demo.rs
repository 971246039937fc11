//! Two-thread demonstration of the single-address-space queue API, backed by
//! a real `/dev/shm`-mapped region rather than a plain heap buffer — showing
//! that the queue is just bytes and does not care who mapped them.
//!
//! Usage: `vsq-demo <num_messages> [capacity] [element_size]`

mod crc8;
#[path = "consumer.rs"]
mod consumer;
#[path = "producer.rs"]
mod producer;
#[path = "shmem_support.rs"]
mod shmem_support;

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shmem_support::ShmRegion;
use spsc_vsq::Queue;

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <num_messages> [capacity] [element_size]", args[0]);
        std::process::exit(1);
    }

    let num_messages: usize = args[1].parse().expect("num_messages must be a number");
    let capacity: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1024);
    let element_size: u32 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(8);

    let needed = spsc_vsq::queue_size(capacity, element_size);
    println!("Demo: queue needs {needed} bytes for capacity={capacity}, element_size={element_size}");

    let region_name = format!("vsq-demo-{}", std::process::id());
    let mut region =
        ShmRegion::create(&region_name, needed).expect("failed to create shared-memory region");

    let keep_alive = Arc::new(AtomicBool::new(true));
    let keep_alive_handler = Arc::clone(&keep_alive);
    ctrlc::set_handler(move || {
        keep_alive_handler.store(false, Ordering::SeqCst);
    })
    .expect("failed to install Ctrl+C handler");

    let queue = Queue::create(region.as_mut_slice(), capacity, element_size)
        .expect("queue parameters did not fit the allocated region");
    let (producer, mut consumer) = queue.split();

    // `Producer`/`Consumer` borrow from `region`, which is not `'static`, so
    // a scoped spawn is used instead of `std::thread::spawn` — the scope
    // guarantees both threads finish before `region` (and the queue's view
    // into it) can be dropped.
    let (sent, received, failures) = std::thread::scope(|scope| {
        let consumer_keep_alive = Arc::clone(&keep_alive);
        let consumer_thread =
            scope.spawn(move || consumer::run(&mut consumer, num_messages, &consumer_keep_alive));

        let sent = producer::run(&producer, num_messages, &keep_alive);
        let (received, failures) = consumer_thread.join().expect("consumer thread panicked");
        (sent, received, failures)
    });

    region.unlink();

    println!();
    println!("{}", "=".repeat(60));
    println!("Demo summary: sent={sent} received={received} failures={failures}");
    println!("{}", "=".repeat(60));

    if failures > 0 || received != sent {
        std::process::exit(1);
    }
}
