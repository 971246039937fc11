//! Memory layout helper (spec.md §4.A): given a desired capacity and
//! standard element size, compute how many bytes a caller must allocate.

use crate::link::{align_up, link_range, ALIGN};
use crate::queue::QueueHeader;
use crate::record::record_cell;
use crate::split::{HeadHeader, TailHeader};

/// `arenaSize = (maxNoStdElements + 1) * recordCell`, `0` if either input is
/// zero or the arena would need offsets beyond what the configured link word
/// can represent (spec invariant 6).
pub(crate) fn arena_size(max_std_elements: u32, size_of_std_element: u32) -> usize {
    if max_std_elements == 0 || size_of_std_element == 0 {
        return 0;
    }
    let cell = record_cell(size_of_std_element) as u64;
    let slots = max_std_elements as u64 + 1;
    let total = slots * cell;
    if total >= link_range() {
        return 0;
    }
    total as usize
}

/// Bytes required for a single-instance [`crate::queue::Queue`] carrying
/// `max_std_elements` records of `size_of_std_element` bytes each.
///
/// Returns `0` if either input is zero or the arena would exceed the
/// configured link word's range.
pub fn queue_size(max_std_elements: u32, size_of_std_element: u32) -> usize {
    let arena = arena_size(max_std_elements, size_of_std_element);
    if arena == 0 {
        return 0;
    }
    align_up(std::mem::size_of::<QueueHeader>(), ALIGN) + arena
}

/// Bytes required for the consumer-owned half of a split queue
/// (spec.md §4.G, §6 `size_of_head`).
pub fn head_size() -> usize {
    align_up(std::mem::size_of::<HeadHeader>(), ALIGN)
}

/// Bytes required for the producer-owned half of a split queue
/// (spec.md §4.G, §6 `size_of_tail`). Same capacity rules as [`queue_size`].
pub fn tail_size(max_std_elements: u32, size_of_std_element: u32) -> usize {
    let arena = arena_size(max_std_elements, size_of_std_element);
    if arena == 0 {
        return 0;
    }
    align_up(std::mem::size_of::<TailHeader>(), ALIGN) + arena
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_inputs_yield_zero() {
        assert_eq!(queue_size(0, 8), 0);
        assert_eq!(queue_size(4, 0), 0);
        assert_eq!(tail_size(0, 8), 0);
    }

    #[test]
    fn grows_with_capacity_and_element_size() {
        let small = queue_size(3, 8);
        let bigger_capacity = queue_size(30, 8);
        let bigger_elems = queue_size(3, 64);
        assert!(small > 0);
        assert!(bigger_capacity > small);
        assert!(bigger_elems > small);
    }

    #[test]
    fn head_size_is_small_and_fixed() {
        let h1 = head_size();
        assert!(h1 > 0 && h1 < 256);
    }
}
