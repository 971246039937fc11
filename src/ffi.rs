//! `extern "C"` surface mirroring the original `vsq_*` entry points
//! (`vsq_threadSafeQueueVariableSize.h`), gated behind the `ffi` feature.
//!
//! The original C API hands a single `vsq_queue_t*` to both the writer and
//! the reader side; this wrapper does the same by boxing a [`Producer`] and
//! a [`Consumer`] together behind one opaque handle. Safety still rests on
//! the caller honoring the one-writer/one-reader discipline documented on
//! every function below — the Rust layer's `&mut` enforcement on
//! [`Consumer::read_head`] cannot reach across an FFI boundary, so misuse
//! here is a contract violation exactly as in the original C, not a checked
//! error.

use std::ptr;

use crate::consumer::Consumer;
use crate::producer::Producer;
use crate::queue::Queue;

const VSQ_SUCCESS: i32 = 0;
const VSQ_ERROR_NULL_POINTER: i32 = -1;
const VSQ_ERROR_FULL: i32 = -3;

/// Opaque queue handle returned by [`vsq_create_queue`].
pub struct VsqQueue {
    producer: Producer<'static>,
    consumer: Consumer<'static>,
}

/// Prior to queue creation: query the size of a queue object
/// (spec.md §4.A / §6 `size_of_queue`). Returns `0` on impossible parameters.
#[no_mangle]
pub extern "C" fn vsq_get_size_of_queue(max_queue_length: u32, max_element_size: u32) -> usize {
    crate::layout::queue_size(max_queue_length, max_element_size)
}

/// Create a new queue object over caller-owned memory.
///
/// # Safety
/// `mem` must point to at least `mem_len` writable, `ALIGN`-aligned bytes
/// that remain valid and exclusively owned by the queue (not touched by the
/// caller again) until [`vsq_destroy_queue`] is called.
#[no_mangle]
pub unsafe extern "C" fn vsq_create_queue(
    mem: *mut u8,
    mem_len: usize,
    max_queue_length: u32,
    max_element_size: u32,
) -> *mut VsqQueue {
    if mem.is_null() {
        return ptr::null_mut();
    }

    let slice: &'static mut [u8] = std::slice::from_raw_parts_mut(mem, mem_len);
    match Queue::create(slice, max_queue_length, max_element_size) {
        Ok(queue) => {
            let (producer, consumer) = queue.split();
            Box::into_raw(Box::new(VsqQueue { producer, consumer }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "vsq_create_queue failed");
            ptr::null_mut()
        }
    }
}

/// Destroy a queue object. Does not free `mem` — the caller owns that, as in
/// the original C API.
///
/// # Safety
/// `queue` must be a handle returned by [`vsq_create_queue`] and not already
/// destroyed.
#[no_mangle]
pub unsafe extern "C" fn vsq_destroy_queue(queue: *mut VsqQueue) {
    if !queue.is_null() {
        drop(Box::from_raw(queue));
    }
}

/// Append a new element to the tail of the queue (spec.md §4.D `write_tail`).
///
/// # Safety
/// `queue` must be a live handle; `data` must point to at least `no_bytes`
/// readable bytes.
#[no_mangle]
pub unsafe extern "C" fn vsq_write_to_tail(
    queue: *mut VsqQueue,
    data: *const u8,
    no_bytes: u32,
) -> i32 {
    if queue.is_null() || (data.is_null() && no_bytes != 0) {
        return VSQ_ERROR_NULL_POINTER;
    }
    let slice = if no_bytes == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, no_bytes as usize)
    };
    match (*queue).producer.write_tail(slice) {
        Ok(()) => VSQ_SUCCESS,
        Err(_) => VSQ_ERROR_FULL,
    }
}

/// Check if the queue has room for `size_of_payload` bytes and return a
/// pointer to the reserved region, or NULL if full (spec.md §4.D
/// `alloc_tail`).
///
/// # Safety
/// `queue` must be a live handle.
#[no_mangle]
pub unsafe extern "C" fn vsq_alloc_tail_element(
    queue: *mut VsqQueue,
    size_of_payload: u32,
) -> *mut u8 {
    if queue.is_null() {
        return ptr::null_mut();
    }
    (*queue)
        .producer
        .alloc_tail(size_of_payload)
        .unwrap_or(ptr::null_mut())
}

/// Submit the element reserved by [`vsq_alloc_tail_element`].
///
/// # Safety
/// `queue` must be a live handle with a pending reservation.
#[no_mangle]
pub unsafe extern "C" fn vsq_post_tail_element(queue: *mut VsqQueue) {
    if !queue.is_null() {
        (*queue).producer.post_tail();
    }
}

/// Read a meanwhile-received new element from the head of the queue
/// (spec.md §4.E `read_head`). Returns NULL and sets `*size_of_payload = 0`
/// if nothing new has been published.
///
/// # Safety
/// `queue` must be a live handle; `size_of_payload` must point to a valid
/// `u32`.
#[no_mangle]
pub unsafe extern "C" fn vsq_read_from_head(
    queue: *mut VsqQueue,
    size_of_payload: *mut u32,
) -> *const u8 {
    if queue.is_null() || size_of_payload.is_null() {
        return ptr::null();
    }
    match (*queue).consumer.read_head() {
        Some(payload) => {
            *size_of_payload = payload.len() as u32;
            payload.as_ptr()
        }
        None => {
            *size_of_payload = 0;
            ptr::null()
        }
    }
}

/// Get the maximum number of queued elements ever seen. Producer-context
/// only, as documented on [`crate::producer::Producer::max_queue_usage`].
///
/// # Safety
/// `queue` must be a live handle.
#[cfg(feature = "diagnostics")]
#[no_mangle]
pub unsafe extern "C" fn vsq_get_maximum_queue_usage(queue: *const VsqQueue) -> u32 {
    if queue.is_null() {
        return 0;
    }
    (*queue).producer.max_queue_usage()
}

/// Get the maximum number of bytes in use ever seen. Producer-context only.
///
/// # Safety
/// `queue` must be a live handle.
#[cfg(feature = "diagnostics")]
#[no_mangle]
pub unsafe extern "C" fn vsq_get_maximum_queue_usage_in_byte(queue: *const VsqQueue) -> u32 {
    if queue.is_null() {
        return 0;
    }
    (*queue).producer.max_bytes_in_use()
}
