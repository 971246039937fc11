//! The slot-selection ladder (spec.md §4.D) and the retire-and-read step
//! (spec.md §4.E), factored out as free functions so both the single-instance
//! [`crate::producer::Producer`]/[`crate::consumer::Consumer`] and the
//! split-endpoint [`crate::split::Tail`]/[`crate::split::Head`] can share one
//! implementation — the algorithm itself does not care whether `idxHead` is
//! local memory or a cross-address-space back-reference, only the caller's
//! pointer provenance differs (spec.md §4.G).

use crate::record;

/// Result of a successful allocation: the producer must still fill the
/// payload and then call its `post_tail` to publish.
pub(crate) struct Alloc {
    pub(crate) new_offset: u32,
    /// Offset of the record that would follow this one, wrapped mod
    /// `arena_len`. This is the byte position diagnostics measures
    /// occupancy up to — the record placed at `new_offset` occupies
    /// `[new_offset, successor_offset)` modulo wraparound.
    pub(crate) successor_offset: u32,
    pub(crate) payload_ptr: *mut u8,
}

/// Apply the four-case ladder from spec.md §4.D to choose where the next
/// record goes, then write its header and fix up the chain from the
/// currently-published tail record. Does **not** publish: the caller must
/// still issue a full fence and store `new_offset` into `idxTail`.
///
/// # Safety
/// `arena` must be a live arena of `arena_len` bytes; `idx_tail` and
/// `idx_head` must be valid offsets of well-formed records within it per
/// spec.md §3 invariant 1.
pub(crate) unsafe fn try_alloc(
    arena: *mut u8,
    arena_len: usize,
    idx_tail: u32,
    idx_head: u32,
    len: u32,
) -> Option<Alloc> {
    let need = record::HEADER_SIZE as u32 + record::aligned_elem_size(len);
    let candidate = record::link_of(arena, idx_tail);

    let new_offset = if candidate > idx_head || candidate == idx_head {
        // Case 1 / 3: candidate is at or ahead of idxHead. Treating equality
        // as "ahead" is safe because idxTail (not candidate) is the record
        // the consumer might still be retiring from, and candidate is a
        // distinct offset chosen by a prior publish or by construction.
        if candidate as u64 + need as u64 <= arena_len as u64 {
            candidate
        } else if need <= idx_head {
            0
        } else {
            return None;
        }
    } else if candidate < idx_head && candidate as u64 + need as u64 <= idx_head as u64 {
        // Case 2.
        candidate
    } else {
        // Case 4: no explicit else in the source ladder — refuse.
        return None;
    };

    let succ = {
        let raw = new_offset as u64 + need as u64;
        if raw == arena_len as u64 {
            0
        } else {
            raw as u32
        }
    };

    record::set_link(arena, new_offset, succ);
    record::set_payload_len(arena, new_offset, len);
    // Fix the chain from the currently-published record. This byte range is
    // producer-owned: the consumer only follows it once idxTail has moved
    // past idx_tail, which has not happened yet.
    record::set_link(arena, idx_tail, new_offset);

    Some(Alloc {
        new_offset,
        successor_offset: succ,
        payload_ptr: record::payload_ptr(arena, new_offset),
    })
}

/// Follow `idxHead`'s link to the successor record and return its pointer and
/// length, without yet publishing the new `idxHead` value (spec.md §4.E steps
/// 2 and 4; the caller performs the fence and the atomic store of step 1/3).
///
/// # Safety
/// Same requirements as [`try_alloc`].
pub(crate) unsafe fn retire(arena: *const u8, idx_head: u32) -> (u32, *const u8, u32) {
    let new_head = record::link_of(arena, idx_head);
    let len = record::payload_len_of(arena, new_head);
    let ptr = record::payload_ptr(arena as *mut u8, new_head) as *const u8;
    (new_head, ptr, len)
}
