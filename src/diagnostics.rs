//! Optional producer-side usage/occupancy tracking (spec.md §4.F).
//!
//! Gated behind the `diagnostics` Cargo feature, on by default, mirroring the
//! C source's `VSQ_ENABLE_API_QUEUE_DIAGNOSTICS` defaulting to 1.
//!
//! Per spec.md Design Notes, the usage walk only happens on the allocating
//! path: a `full` return leaves `idxHeadCopy`/`usage` untouched, so the peaks
//! reported here are conservative (a burst of `read_head` calls with no
//! matching `alloc_tail` afterwards is invisible to `max_queue_usage`).

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::record;

/// Atomics living in the shared header, publishable so any thread may read
/// the peaks — but per spec.md §4.F this is only *safe* to call from the
/// producer context, because computing `usage` mixes this with producer-local
/// state.
#[repr(C)]
pub(crate) struct DiagHeader {
    max_usage: AtomicU32,
    max_bytes_in_use: AtomicU32,
}

impl DiagHeader {
    pub(crate) fn new() -> Self {
        Self {
            max_usage: AtomicU32::new(0),
            max_bytes_in_use: AtomicU32::new(0),
        }
    }

    pub(crate) fn max_usage(&self) -> u32 {
        self.max_usage.load(Ordering::Relaxed)
    }

    pub(crate) fn max_bytes_in_use(&self) -> u32 {
        self.max_bytes_in_use.load(Ordering::Relaxed)
    }

    fn publish_peak(&self, usage: u32, bytes_in_use: u32) {
        // Racy read-then-write is fine: the only writer is the producer that
        // owns this `DiagHeader`'s producer-local counterpart, so there is no
        // concurrent writer to race with.
        if usage > self.max_usage.load(Ordering::Relaxed) {
            self.max_usage.store(usage, Ordering::Relaxed);
        }
        if bytes_in_use > self.max_bytes_in_use.load(Ordering::Relaxed) {
            self.max_bytes_in_use.store(bytes_in_use, Ordering::Relaxed);
        }
    }
}

/// Producer-local scratch state: `idxHeadCopy` and `usage` from spec.md §3.
pub(crate) struct ProducerDiag {
    idx_head_copy: Cell<u32>,
    usage: Cell<u32>,
}

impl ProducerDiag {
    pub(crate) fn new(seed_offset: u32) -> Self {
        Self {
            idx_head_copy: Cell::new(seed_offset),
            usage: Cell::new(0),
        }
    }

    /// Walk `idxHeadCopy -> idxHead`, counting retired records, then account
    /// for the one record just allocated. Called only on the allocating path
    /// of `alloc_tail`, never on `full`.
    ///
    /// `successor_offset` is the offset one past the just-placed record (its
    /// `link` value, wrapped mod `arena_len`), matching the C source's
    /// `usageInByte = idxStartOfSuccessor - idxHead`: occupancy is measured
    /// to the end of the record just placed, not its start.
    ///
    /// # Safety
    /// `arena` must be a live arena and `idx_head_copy..idx_head_observed`
    /// must form a valid link chain within it.
    pub(crate) unsafe fn on_alloc(
        &self,
        arena: *const u8,
        arena_len: usize,
        idx_head_observed: u32,
        successor_offset: u32,
        diag: &DiagHeader,
    ) {
        let mut cursor = self.idx_head_copy.get();
        let mut retired = 0u32;
        while cursor != idx_head_observed {
            cursor = record::link_of(arena, cursor);
            retired += 1;
        }
        self.idx_head_copy.set(idx_head_observed);

        let usage = self.usage.get().saturating_sub(retired) + 1;
        self.usage.set(usage);

        let bytes_in_use = if successor_offset >= idx_head_observed {
            successor_offset - idx_head_observed
        } else {
            arena_len as u32 - idx_head_observed + successor_offset
        };

        diag.publish_peak(usage, bytes_in_use);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_are_monotonic() {
        let diag = DiagHeader::new();
        diag.publish_peak(2, 100);
        diag.publish_peak(1, 50);
        assert_eq!(diag.max_usage(), 2);
        assert_eq!(diag.max_bytes_in_use(), 100);
        diag.publish_peak(5, 400);
        assert_eq!(diag.max_usage(), 5);
        assert_eq!(diag.max_bytes_in_use(), 400);
    }
}
