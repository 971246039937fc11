//! Producer endpoint, single-address-space variant (spec.md §4.D).

use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{fence, Ordering};

use crate::algo;
#[cfg(feature = "diagnostics")]
use crate::diagnostics::ProducerDiag;
use crate::queue::QueueHeader;

/// The producer half of a split-off [`crate::queue::Queue`]. Not `Sync`: only
/// one thread may drive a given `Producer` at a time, matching spec.md §5
/// ("the producer must serialize `alloc_tail`/`post_tail`/`write_tail` within
/// its own side"). It *is* `Send` — handing the whole endpoint to the
/// producer-side thread is exactly the intended use.
pub struct Producer<'a> {
    header: NonNull<QueueHeader>,
    arena_base: NonNull<u8>,
    arena_len: usize,
    idx_reserved_tail: Cell<Option<u32>>,
    #[cfg(feature = "diagnostics")]
    diag: ProducerDiag,
    _marker: PhantomData<&'a mut [u8]>,
}

// SAFETY: a `Producer` only ever touches the byte ranges spec.md §3
// invariant 4 grants the producer, and its one mutable cursor word
// (`idxTail`) is never written by the consumer. Moving it to another thread
// is the whole point; sharing it between two threads (`Sync`) is not
// supported and is intentionally not implemented.
unsafe impl<'a> Send for Producer<'a> {}

impl<'a> Producer<'a> {
    pub(crate) fn new(
        header: NonNull<QueueHeader>,
        arena_base: NonNull<u8>,
        arena_len: usize,
        seed_offset: u32,
    ) -> Self {
        Self {
            header,
            arena_base,
            arena_len,
            idx_reserved_tail: Cell::new(None),
            #[cfg(feature = "diagnostics")]
            diag: ProducerDiag::new(seed_offset),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn header(&self) -> &QueueHeader {
        unsafe { self.header.as_ref() }
    }

    /// Reserve a slot for `len` payload bytes and return a pointer to it, or
    /// `None` if no suitable free region exists right now (spec.md §4.D).
    ///
    /// The returned pointer is `ALIGN`-aligned and stays valid until the next
    /// producer call on this queue. Calling this again before `post_tail`
    /// matching a prior success is a contract violation.
    pub fn alloc_tail(&self, len: u32) -> Option<*mut u8> {
        debug_assert!(
            self.idx_reserved_tail.get().is_none(),
            "alloc_tail called while a previous reservation is still pending post_tail"
        );

        let idx_tail = self.header().idx_tail().load(Ordering::Relaxed);
        let idx_head = self.header().idx_head().load(Ordering::Relaxed);

        let alloc = unsafe {
            algo::try_alloc(
                self.arena_base.as_ptr(),
                self.arena_len,
                idx_tail,
                idx_head,
                len,
            )
        };

        match alloc {
            None => {
                tracing::trace!(len, idx_tail, idx_head, "alloc_tail: full");
                None
            }
            Some(res) => {
                self.idx_reserved_tail.set(Some(res.new_offset));

                #[cfg(feature = "diagnostics")]
                unsafe {
                    self.diag.on_alloc(
                        self.arena_base.as_ptr(),
                        self.arena_len,
                        idx_head,
                        res.successor_offset,
                        self.header().diag(),
                    );
                }

                tracing::trace!(len, new_offset = res.new_offset, "alloc_tail: reserved");
                Some(res.payload_ptr)
            }
        }
    }

    /// Publish the record reserved by the prior [`Self::alloc_tail`] call.
    ///
    /// Calling this without a pending reservation is a contract violation
    /// (debug-checked only, like `alloc_tail`'s reservation guard above).
    pub fn post_tail(&self) {
        debug_assert!(
            self.idx_reserved_tail.get().is_some(),
            "post_tail called without a matching alloc_tail"
        );
        let offset = self.idx_reserved_tail.take().unwrap_or_default();

        fence(Ordering::SeqCst);
        self.header().idx_tail().store(offset, Ordering::Relaxed);

        tracing::trace!(offset, "post_tail: published");
    }

    /// `alloc_tail` + copy + `post_tail` in one call.
    pub fn write_tail(&self, data: &[u8]) -> Result<(), Full> {
        match self.alloc_tail(data.len() as u32) {
            None => Err(Full),
            Some(ptr) => {
                unsafe {
                    std::ptr::copy_nonoverlapping(data.as_ptr(), ptr, data.len());
                }
                self.post_tail();
                Ok(())
            }
        }
    }

    /// The maximum number of live records ever observed, including the one
    /// just allocated. Producer-context only (spec.md §4.F).
    #[cfg(feature = "diagnostics")]
    pub fn max_queue_usage(&self) -> u32 {
        self.header().diag().max_usage()
    }

    /// The maximum byte distance between `idxHead` and a freshly allocated
    /// record ever observed. Producer-context only (spec.md §4.F).
    #[cfg(feature = "diagnostics")]
    pub fn max_bytes_in_use(&self) -> u32 {
        self.header().diag().max_bytes_in_use()
    }
}

/// `alloc_tail`/`write_tail` could not place a record right now; not fatal,
/// retry later (spec.md §7 "Full").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

impl std::fmt::Display for Full {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("queue full")
    }
}

impl std::error::Error for Full {}
