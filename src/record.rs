//! Per-record header: `link` (next record's offset) followed by `payload_len`.
//!
//! Rust has no flexible array member, so the header is a plain `#[repr(C)]`
//! struct and the payload is reached by pointer arithmetic past `HEADER_SIZE`
//! bytes (spec.md Design Notes, "Flexible-array-member record layout").
//! Every access here is through raw pointers into caller-owned memory shared
//! with the other side of the queue; callers are responsible for bounds and
//! for only calling these once they hold the relevant byte range per the
//! producer/consumer ownership rules in spec.md §3 invariant 4.

use crate::link::{align_up, Link, ALIGN};

#[repr(C)]
struct RawHeader {
    link: Link,
    payload_len: Link,
}

/// Header size `H = aligned(2*W, A)`, rounded up to [`ALIGN`].
pub const HEADER_SIZE: usize = align_up(std::mem::size_of::<RawHeader>(), ALIGN);

/// `elemAligned = roundUp(size, A)`.
#[inline]
pub(crate) const fn aligned_elem_size(size: u32) -> u32 {
    align_up(size as usize, ALIGN) as u32
}

/// `recordCell = H + elemAligned`, the stride of one record slot carrying a
/// standard-sized payload.
#[inline]
pub(crate) const fn record_cell(size_of_std_element: u32) -> u32 {
    HEADER_SIZE as u32 + aligned_elem_size(size_of_std_element)
}

#[inline]
unsafe fn header_ptr(arena: *mut u8, offset: u32) -> *mut RawHeader {
    arena.add(offset as usize) as *mut RawHeader
}

/// Read the `link` word of the record at `offset`.
///
/// # Safety
/// `arena` must point to a live arena at least `offset + HEADER_SIZE` bytes
/// long.
#[inline]
pub(crate) unsafe fn link_of(arena: *const u8, offset: u32) -> u32 {
    let hdr = arena.add(offset as usize) as *const RawHeader;
    (*hdr).link as u32
}

/// # Safety
/// Same requirements as [`link_of`]; additionally, only the side that owns
/// this record's byte range may call this (spec.md §3 invariant 4).
#[inline]
pub(crate) unsafe fn set_link(arena: *mut u8, offset: u32, value: u32) {
    debug_assert!((value as u64) < super::link::link_range());
    (*header_ptr(arena, offset)).link = value as Link;
}

/// # Safety
/// Same as [`link_of`].
#[inline]
pub(crate) unsafe fn payload_len_of(arena: *const u8, offset: u32) -> u32 {
    let hdr = arena.add(offset as usize) as *const RawHeader;
    (*hdr).payload_len as u32
}

/// # Safety
/// Same as [`set_link`].
#[inline]
pub(crate) unsafe fn set_payload_len(arena: *mut u8, offset: u32, value: u32) {
    debug_assert!((value as u64) < super::link::link_range());
    (*header_ptr(arena, offset)).payload_len = value as Link;
}

/// Pointer to the first payload byte of the record at `offset`. Always
/// `ALIGN`-aligned because `offset` is `ALIGN`-aligned and `HEADER_SIZE` is a
/// multiple of `ALIGN` (spec.md §3 invariant 5).
///
/// # Safety
/// Same as [`link_of`].
#[inline]
pub(crate) unsafe fn payload_ptr(arena: *mut u8, offset: u32) -> *mut u8 {
    arena.add(offset as usize + HEADER_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_aligned_and_holds_two_links() {
        assert_eq!(HEADER_SIZE % ALIGN, 0);
        assert!(HEADER_SIZE >= 2 * std::mem::size_of::<Link>());
    }

    #[test]
    fn record_cell_rounds_payload_up_to_align() {
        let cell = record_cell(1);
        assert_eq!(cell as usize, HEADER_SIZE + ALIGN);
    }

    #[test]
    fn header_round_trips_link_and_len() {
        let mut buf = vec![0u8; HEADER_SIZE + ALIGN];
        unsafe {
            set_link(buf.as_mut_ptr(), 0, 42);
            set_payload_len(buf.as_mut_ptr(), 0, 7);
            assert_eq!(link_of(buf.as_ptr(), 0), 42);
            assert_eq!(payload_len_of(buf.as_ptr(), 0), 7);
            assert_eq!(payload_ptr(buf.as_mut_ptr(), 0), buf.as_mut_ptr().add(HEADER_SIZE));
        }
    }
}
