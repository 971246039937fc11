//! Construction-time error type.
//!
//! Steady-state operations (`alloc_tail`, `write_tail`, `read_head`) never
//! return this type — per spec.md §7, "full" and "empty" are not exceptional
//! and are modelled as plain `Option`/`Result<(), Full>` returns. Only the
//! one-time sizing/construction calls can fail, and they fail for reasons a
//! caller can actually act on (pick a bigger buffer, a smaller capacity, ...).

use thiserror::Error;

/// Why a queue (or a split half of one) could not be constructed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `max_std_elements` was zero.
    #[error("queue capacity must be non-zero")]
    ZeroCapacity,

    /// `size_of_std_element` was zero.
    #[error("standard element size must be non-zero")]
    ZeroElementSize,

    /// The arena required for the requested capacity would need offsets
    /// wider than the configured link word can represent (spec invariant 6).
    #[error("requested capacity needs an arena larger than the link word can address")]
    ArenaTooLarge,

    /// The caller-provided buffer is smaller than `size_of_queue(...)`/
    /// `size_of_head()`/`size_of_tail(...)` computed for these parameters.
    #[error("buffer too small: need at least {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    /// The caller-provided buffer does not start at an `ALIGN`-byte boundary.
    #[error("buffer base pointer is not aligned to {align} bytes")]
    Misaligned { align: usize },
}
