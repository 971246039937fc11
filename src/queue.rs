//! Single-address-space queue: one buffer, split into a [`Producer`] and a
//! [`Consumer`] handle that share it without any synchronization primitive
//! beyond the two atomic cursor words (spec.md §3, §4.D, §4.E).
//!
//! Use [`crate::split`] instead when producer and consumer do not share
//! writable memory (different processes, or cores with distinct MPU views).

use crossbeam_utils::CachePadded;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::AtomicU32;

use crate::consumer::Consumer;
use crate::error::QueueError;
use crate::link::ALIGN;
use crate::producer::Producer;
use crate::record;
use crate::layout;
#[cfg(feature = "diagnostics")]
use crate::diagnostics::DiagHeader;

#[repr(C)]
pub(crate) struct QueueHeader {
    idx_head: CachePadded<AtomicU32>,
    idx_tail: CachePadded<AtomicU32>,
    #[cfg(feature = "diagnostics")]
    diag: DiagHeader,
}

impl QueueHeader {
    fn new(seed_offset: u32) -> Self {
        Self {
            idx_head: CachePadded::new(AtomicU32::new(seed_offset)),
            idx_tail: CachePadded::new(AtomicU32::new(seed_offset)),
            #[cfg(feature = "diagnostics")]
            diag: DiagHeader::new(),
        }
    }

    pub(crate) fn idx_head(&self) -> &AtomicU32 {
        &self.idx_head
    }

    pub(crate) fn idx_tail(&self) -> &AtomicU32 {
        &self.idx_tail
    }

    #[cfg(feature = "diagnostics")]
    pub(crate) fn diag(&self) -> &DiagHeader {
        &self.diag
    }
}

/// A freshly constructed, not-yet-split queue instance. Call [`Queue::split`]
/// to obtain the producer and consumer halves.
pub struct Queue<'a> {
    header: NonNull<QueueHeader>,
    arena_base: NonNull<u8>,
    arena_len: usize,
    _marker: PhantomData<&'a mut [u8]>,
}

impl<'a> Queue<'a> {
    /// Construct a queue over `buf`, carved into a header followed by an
    /// arena sized for `max_std_elements` records of `size_of_std_element`
    /// bytes (spec.md §4.A / §6 `create`).
    pub fn create(
        buf: &'a mut [u8],
        max_std_elements: u32,
        size_of_std_element: u32,
    ) -> Result<Self, QueueError> {
        if max_std_elements == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        if size_of_std_element == 0 {
            return Err(QueueError::ZeroElementSize);
        }

        let arena_len = layout::arena_size(max_std_elements, size_of_std_element);
        if arena_len == 0 {
            return Err(QueueError::ArenaTooLarge);
        }

        let header_size = crate::link::align_up(std::mem::size_of::<QueueHeader>(), ALIGN);
        let needed = header_size + arena_len;
        if buf.len() < needed {
            return Err(QueueError::BufferTooSmall {
                needed,
                got: buf.len(),
            });
        }

        let base = buf.as_mut_ptr();
        if (base as usize) % ALIGN != 0 {
            return Err(QueueError::Misaligned { align: ALIGN });
        }

        // Seed record: zero payload length, placed at the high end of the
        // arena, link pointing back to offset 0 (spec.md §3 Lifecycle).
        let seed_offset = (arena_len - record::HEADER_SIZE) as u32;

        unsafe {
            let header_ptr = base as *mut QueueHeader;
            header_ptr.write(QueueHeader::new(seed_offset));

            let arena_base = base.add(header_size);
            record::set_link(arena_base, seed_offset, 0);
            record::set_payload_len(arena_base, seed_offset, 0);
        }

        tracing::debug!(
            arena_len,
            header_size,
            seed_offset,
            align = ALIGN,
            "constructed single-instance vsq"
        );

        Ok(Self {
            header: NonNull::new(base as *mut QueueHeader).unwrap(),
            arena_base: NonNull::new(unsafe { base.add(header_size) }).unwrap(),
            arena_len,
            _marker: PhantomData,
        })
    }

    /// Split into the two endpoints. There is exactly one producer and one
    /// consumer per queue instance; this consumes `self` so a second split
    /// is not possible.
    pub fn split(self) -> (Producer<'a>, Consumer<'a>) {
        let seed_offset = unsafe { self.header.as_ref().idx_head().load(std::sync::atomic::Ordering::Relaxed) };
        let producer = Producer::new(self.header, self.arena_base, self.arena_len, seed_offset);
        let consumer = Consumer::new(self.header, self.arena_base, self.arena_len);
        (producer, consumer)
    }
}
