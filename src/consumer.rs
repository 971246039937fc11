//! Consumer endpoint, single-address-space variant (spec.md §4.E).

use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{fence, Ordering};

use crate::algo;
use crate::queue::QueueHeader;

/// The consumer half of a split-off [`crate::queue::Queue`]. Not `Sync`: per
/// spec.md §5 `read_head` is not reentrant and must be serialized by the
/// consumer side. It is `Send` so the whole endpoint can live on the
/// consumer-side thread.
pub struct Consumer<'a> {
    header: NonNull<QueueHeader>,
    arena_base: NonNull<u8>,
    arena_len: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

// SAFETY: mirrors `Producer` — the consumer only writes `idxHead`, which the
// producer never writes, and only reads byte ranges it currently owns.
unsafe impl<'a> Send for Consumer<'a> {}

impl<'a> Consumer<'a> {
    pub(crate) fn new(header: NonNull<QueueHeader>, arena_base: NonNull<u8>, arena_len: usize) -> Self {
        Self {
            header,
            arena_base,
            arena_len,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn header(&self) -> &QueueHeader {
        unsafe { self.header.as_ref() }
    }

    /// Retire the previously held record and return the newly published one,
    /// or `None` if nothing new has been published since the last call
    /// (spec.md §4.E).
    ///
    /// Takes `&mut self` so the borrow checker enforces the ownership rule
    /// from spec.md §4.E directly: the slice returned by a successful call
    /// borrows from `self` and is invalidated by construction the next time
    /// this is called, because that call requires the same exclusive borrow.
    pub fn read_head(&mut self) -> Option<&[u8]> {
        let idx_head = self.header().idx_head().load(Ordering::Relaxed);
        let idx_tail = self.header().idx_tail().load(Ordering::Relaxed);

        if idx_head == idx_tail {
            tracing::trace!(idx_head, "read_head: empty");
            return None;
        }

        fence(Ordering::SeqCst);

        let (new_head, ptr, len) = unsafe { algo::retire(self.arena_base.as_ptr(), idx_head) };
        self.header().idx_head().store(new_head, Ordering::Relaxed);

        tracing::trace!(new_head, len, "read_head: retired");

        debug_assert!((new_head as usize) < self.arena_len);
        Some(unsafe { std::slice::from_raw_parts(ptr, len as usize) })
    }
}
