//! End-to-end scenarios from spec.md §8, against the single-address-space
//! [`spsc_vsq::Queue`] API.

use spsc_vsq::{queue_size, Queue};

fn build(max_std_elements: u32, size_of_std_element: u32) -> Vec<u8> {
    vec![0u8; queue_size(max_std_elements, size_of_std_element)]
}

#[test]
fn construct_and_drain() {
    let mut buf = build(3, 8);
    let queue = Queue::create(&mut buf, 3, 8).unwrap();
    let (producer, mut consumer) = queue.split();

    producer.write_tail(b"AAAA").unwrap();
    producer.write_tail(b"BBBBBBBB").unwrap();
    producer.write_tail(b"C").unwrap();

    assert_eq!(consumer.read_head().unwrap(), b"AAAA");
    assert_eq!(consumer.read_head().unwrap(), b"BBBBBBBB");
    assert_eq!(consumer.read_head().unwrap(), b"C");
    assert!(consumer.read_head().is_none());
}

#[test]
fn fill_to_capacity() {
    let mut buf = build(3, 8);
    let queue = Queue::create(&mut buf, 3, 8).unwrap();
    let (producer, _consumer) = queue.split();

    assert!(producer.write_tail(&[1u8; 8]).is_ok());
    assert!(producer.write_tail(&[2u8; 8]).is_ok());
    assert!(producer.write_tail(&[3u8; 8]).is_ok());
    assert!(producer.write_tail(&[4u8; 8]).is_err());
}

#[test]
fn wrap_around() {
    let mut buf = build(3, 16);
    let queue = Queue::create(&mut buf, 3, 16).unwrap();
    let (producer, mut consumer) = queue.split();

    let a = [1u8; 16];
    let b = [2u8; 16];
    let c = [3u8; 16];

    producer.write_tail(&a).unwrap();
    producer.write_tail(&b).unwrap();
    assert_eq!(consumer.read_head().unwrap(), &a[..]);

    // Must succeed by wrapping to offset 0 even though the linear tail
    // remainder is too small for a third 16-byte record.
    producer.write_tail(&c).unwrap();

    assert_eq!(consumer.read_head().unwrap(), &b[..]);
    assert_eq!(consumer.read_head().unwrap(), &c[..]);
    assert!(consumer.read_head().is_none());
}

#[test]
fn variable_sizes_cause_fragmentation() {
    let mut buf = build(10, 8);
    let queue = Queue::create(&mut buf, 10, 8).unwrap();
    let (producer, mut consumer) = queue.split();

    let payloads: Vec<Vec<u8>> = (1u8..=10).map(|n| vec![n; n as usize]).collect();

    let mut enqueued = 0;
    for p in &payloads {
        if producer.write_tail(p).is_ok() {
            enqueued += 1;
        } else {
            break;
        }
    }
    assert!(enqueued > 0);

    #[cfg(feature = "diagnostics")]
    {
        let bufs = queue_size(10, 8);
        assert!(producer.max_bytes_in_use() as usize <= bufs);
    }

    for p in payloads.iter().take(enqueued) {
        assert_eq!(consumer.read_head().unwrap(), p.as_slice());
    }
}

#[test]
fn zero_length_records_round_trip() {
    let mut buf = build(2, 8);
    let queue = Queue::create(&mut buf, 2, 8).unwrap();
    let (producer, mut consumer) = queue.split();

    producer.write_tail(&[]).unwrap();
    let got = consumer.read_head().unwrap();
    assert_eq!(got.len(), 0);
}

#[test]
fn alloc_pointers_are_aligned() {
    let mut buf = build(4, 24);
    let queue = Queue::create(&mut buf, 4, 24).unwrap();
    let (producer, _consumer) = queue.split();

    for len in [1u32, 3, 7, 8, 15, 24] {
        if let Some(ptr) = producer.alloc_tail(len) {
            assert_eq!(ptr as usize % spsc_vsq::ALIGN, 0);
            producer.post_tail();
        }
    }
}

#[cfg(feature = "diagnostics")]
#[test]
fn peaks_are_non_decreasing_across_full_cycle() {
    let mut buf = build(3, 8);
    let queue = Queue::create(&mut buf, 3, 8).unwrap();
    let (producer, mut consumer) = queue.split();

    let mut last_usage = 0;
    let mut last_bytes = 0;
    for _ in 0..20 {
        if producer.write_tail(&[7u8; 8]).is_err() {
            let _ = consumer.read_head();
            continue;
        }
        assert!(producer.max_queue_usage() >= last_usage);
        assert!(producer.max_bytes_in_use() >= last_bytes);
        last_usage = producer.max_queue_usage();
        last_bytes = producer.max_bytes_in_use();
    }
}
