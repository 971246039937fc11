//! A lock-free, single-producer/single-consumer, variable-sized byte-record
//! queue for carrying messages between two execution contexts that share
//! memory but no synchronization primitive: two priorities on one core, two
//! cores of an MCU, or two OS processes sharing a mapped region.
//!
//! Correctness rests on three things, and nothing else:
//!
//! 1. spatial separation of the producer's and consumer's byte ranges within
//!    one arena (never locks),
//! 2. a full memory fence bracketing each publish and each retire,
//! 3. single-word atomic load/store of the two cursor offsets.
//!
//! There is no allocation after construction and no blocking: every public
//! operation is a bounded-time probe that reports "full" or "empty" rather
//! than waiting.
//!
//! Two shapes are provided:
//!
//! - [`queue::Queue`] — one buffer, split into a [`producer::Producer`] and a
//!   [`consumer::Consumer`] that share it directly. Use this when both sides
//!   live in the same address space (two threads, two tasks on one core).
//! - [`split::Head`]/[`split::Tail`] — two independently-allocated halves,
//!   linked after construction, for when the producer and the consumer do
//!   not share writable memory at all (different processes, or cores with
//!   distinct MPU views).
//!
//! See `spec.md`/`SPEC_FULL.md` in the repository root for the full design
//! rationale; this crate implements it literally, including the "ambiguous
//! source behaviour" resolutions called out there.

mod algo;
mod diagnostics;

pub mod consumer;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod layout;
mod link;
pub mod producer;
pub mod queue;
mod record;
pub mod split;

pub use consumer::Consumer;
pub use error::QueueError;
pub use layout::{head_size, queue_size, tail_size};
pub use link::{Link, ALIGN};
pub use producer::{Full, Producer};
pub use queue::Queue;
pub use split::{link_head_with_tail, link_tail_with_head, Head, Tail};
