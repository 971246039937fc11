//! Split-endpoint linkage (spec.md §4.G): a queue decomposed into a
//! consumer-owned [`Head`] and a producer-owned [`Tail`], each living in its
//! own writable memory, stitched together after both exist.
//!
//! Neither half owns the other's memory — `link_head_with_tail` and
//! `link_tail_with_head` populate *weak* back-references (raw pointers, not
//! `Arc`/`Rc`: the two halves may live in different processes and cannot
//! share a refcount). The rendezvous that exchanges the two addresses
//! (shared-memory handshake, socket, whatever) is outside this crate's scope,
//! exactly as spec.md §4.G describes.

use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{fence, AtomicU32, Ordering};

use crossbeam_utils::CachePadded;

use crate::algo;
#[cfg(feature = "diagnostics")]
use crate::diagnostics::{DiagHeader, ProducerDiag};
use crate::error::QueueError;
use crate::link::ALIGN;
use crate::layout;
use crate::producer::Full;
use crate::record;

#[repr(C)]
pub(crate) struct HeadHeader {
    idx_head: CachePadded<AtomicU32>,
}

impl HeadHeader {
    fn new() -> Self {
        Self {
            idx_head: CachePadded::new(AtomicU32::new(0)),
        }
    }
}

#[repr(C)]
pub(crate) struct TailHeader {
    idx_tail: CachePadded<AtomicU32>,
    #[cfg(feature = "diagnostics")]
    diag: DiagHeader,
}

impl TailHeader {
    fn new(seed_offset: u32) -> Self {
        Self {
            idx_tail: CachePadded::new(AtomicU32::new(seed_offset)),
            #[cfg(feature = "diagnostics")]
            diag: DiagHeader::new(),
        }
    }
}

/// The consumer-owned half of a split queue.
pub struct Head<'a> {
    header: NonNull<HeadHeader>,
    // Weak reference to the tail's arena and `idxTail`, populated by
    // `link_head_with_tail`. `None` until linked.
    peer: Cell<Option<PeerView>>,
    _marker: PhantomData<&'a mut [u8]>,
}

#[derive(Clone, Copy)]
struct PeerView {
    arena_base: NonNull<u8>,
    arena_len: usize,
    idx_tail: NonNull<AtomicU32>,
}

unsafe impl<'a> Send for Head<'a> {}

impl<'a> Head<'a> {
    /// Construct the consumer's half over `buf`. The capacity is not known
    /// yet — it is learned from the tail side at [`link_head_with_tail`]
    /// time — so `idxHead` only becomes meaningful after linking.
    pub fn create(buf: &'a mut [u8]) -> Result<Self, QueueError> {
        let needed = layout::head_size();
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

        unsafe {
            (base as *mut HeadHeader).write(HeadHeader::new());
        }

        Ok(Self {
            header: NonNull::new(base as *mut HeadHeader).unwrap(),
            peer: Cell::new(None),
            _marker: PhantomData,
        })
    }

    #[inline]
    fn header(&self) -> &HeadHeader {
        unsafe { self.header.as_ref() }
    }

    fn idx_head(&self) -> &AtomicU32 {
        &self.header().idx_head
    }

    /// Retire the previously held record and return the newly published one,
    /// exactly as [`crate::consumer::Consumer::read_head`].
    ///
    /// # Panics
    /// If called before [`link_head_with_tail`].
    pub fn read_head(&mut self) -> Option<&[u8]> {
        let peer = self.peer.get().expect("Head used before link_head_with_tail");

        let idx_head = self.idx_head().load(Ordering::Relaxed);
        let idx_tail = unsafe { peer.idx_tail.as_ref().load(Ordering::Relaxed) };

        if idx_head == idx_tail {
            tracing::trace!(idx_head, "read_head: empty");
            return None;
        }

        fence(Ordering::SeqCst);

        let (new_head, ptr, len) = unsafe { algo::retire(peer.arena_base.as_ptr(), idx_head) };
        self.idx_head().store(new_head, Ordering::Relaxed);

        debug_assert!((new_head as usize) < peer.arena_len);
        tracing::trace!(new_head, len, "read_head: retired");
        Some(unsafe { std::slice::from_raw_parts(ptr, len as usize) })
    }
}

/// The producer-owned half of a split queue.
pub struct Tail<'a> {
    header: NonNull<TailHeader>,
    arena_base: NonNull<u8>,
    arena_len: usize,
    idx_reserved_tail: Cell<Option<u32>>,
    // Weak reference to the head's `idxHead`, populated by
    // `link_tail_with_head`. `None` until linked.
    idx_head: Cell<Option<NonNull<AtomicU32>>>,
    #[cfg(feature = "diagnostics")]
    diag: ProducerDiag,
    _marker: PhantomData<&'a mut [u8]>,
}

unsafe impl<'a> Send for Tail<'a> {}

impl<'a> Tail<'a> {
    /// Construct the producer's half over `buf`, sized for `max_std_elements`
    /// records of `size_of_std_element` bytes.
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

        let header_size = crate::link::align_up(std::mem::size_of::<TailHeader>(), ALIGN);
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

        let seed_offset = (arena_len - record::HEADER_SIZE) as u32;

        unsafe {
            (base as *mut TailHeader).write(TailHeader::new(seed_offset));
            let arena_base = base.add(header_size);
            record::set_link(arena_base, seed_offset, 0);
            record::set_payload_len(arena_base, seed_offset, 0);
        }

        tracing::debug!(arena_len, seed_offset, "constructed split tail");

        Ok(Self {
            header: NonNull::new(base as *mut TailHeader).unwrap(),
            arena_base: NonNull::new(unsafe { base.add(header_size) }).unwrap(),
            arena_len,
            idx_reserved_tail: Cell::new(None),
            idx_head: Cell::new(None),
            #[cfg(feature = "diagnostics")]
            diag: ProducerDiag::new(seed_offset),
            _marker: PhantomData,
        })
    }

    #[inline]
    fn header(&self) -> &TailHeader {
        unsafe { self.header.as_ref() }
    }

    fn idx_tail(&self) -> &AtomicU32 {
        &self.header().idx_tail
    }

    fn seed_offset(&self) -> u32 {
        self.idx_tail().load(Ordering::Relaxed)
    }

    /// See [`crate::producer::Producer::alloc_tail`].
    ///
    /// # Panics
    /// If called before [`link_tail_with_head`].
    pub fn alloc_tail(&self, len: u32) -> Option<*mut u8> {
        debug_assert!(
            self.idx_reserved_tail.get().is_none(),
            "alloc_tail called while a previous reservation is still pending post_tail"
        );

        let idx_head_ptr = self.idx_head.get().expect("Tail used before link_tail_with_head");
        let idx_tail = self.idx_tail().load(Ordering::Relaxed);
        let idx_head = unsafe { idx_head_ptr.as_ref().load(Ordering::Relaxed) };

        let alloc = unsafe {
            algo::try_alloc(self.arena_base.as_ptr(), self.arena_len, idx_tail, idx_head, len)
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
                        &self.header().diag,
                    );
                }

                tracing::trace!(len, new_offset = res.new_offset, "alloc_tail: reserved");
                Some(res.payload_ptr)
            }
        }
    }

    /// See [`crate::producer::Producer::post_tail`].
    pub fn post_tail(&self) {
        debug_assert!(
            self.idx_reserved_tail.get().is_some(),
            "post_tail called without a matching alloc_tail"
        );
        let offset = self.idx_reserved_tail.take().unwrap_or_default();
        fence(Ordering::SeqCst);
        self.idx_tail().store(offset, Ordering::Relaxed);

        tracing::trace!(offset, "post_tail: published");
    }

    /// See [`crate::producer::Producer::write_tail`].
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

    #[cfg(feature = "diagnostics")]
    pub fn max_queue_usage(&self) -> u32 {
        self.header().diag.max_usage()
    }

    #[cfg(feature = "diagnostics")]
    pub fn max_bytes_in_use(&self) -> u32 {
        self.header().diag.max_bytes_in_use()
    }
}

/// Link a consumer's [`Head`] to a producer's [`Tail`]. Idempotent: calling
/// this again with the same tail has no effect — in particular it does
/// *not* re-seed `idxHead`, which would silently discard any records already
/// posted and retired since the first link.
///
/// This is also where `idxHead`'s initial value is established: the head
/// object does not know the tail's capacity at construction time, so it
/// cannot compute the seed offset itself (spec.md §3 Lifecycle) — it learns
/// it from the tail here, once both halves exist and addresses have been
/// exchanged. That one-time seeding only happens the first time this head is
/// linked, or if it is later linked to a genuinely different tail.
pub fn link_head_with_tail(head: &mut Head<'_>, tail: &Tail<'_>) {
    let idx_tail_ptr = NonNull::from(tail.idx_tail());
    let already_linked_to_this_peer = match head.peer.get() {
        Some(peer) => peer.idx_tail == idx_tail_ptr,
        None => false,
    };
    if already_linked_to_this_peer {
        return;
    }

    head.peer.set(Some(PeerView {
        arena_base: tail.arena_base,
        arena_len: tail.arena_len,
        idx_tail: idx_tail_ptr,
    }));
    head.idx_head().store(tail.seed_offset(), Ordering::Relaxed);
}

/// Link a producer's [`Tail`] to a consumer's [`Head`]. Always safe to call
/// again: it only repoints a weak reference to `idxHead` and never touches
/// `idxTail` or any producer-local state, so unlike [`link_head_with_tail`]
/// there is nothing here that re-linking could discard.
pub fn link_tail_with_head(tail: &mut Tail<'_>, head: &Head<'_>) {
    let idx_head_ptr = NonNull::from(head.idx_head());
    tail.idx_head.set(Some(idx_head_ptr));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_then_roundtrip_one_record() {
        let mut head_buf = vec![0u8; layout::head_size()];
        let mut tail_buf = vec![0u8; layout::tail_size(4, 16)];

        let mut head = Head::create(&mut head_buf).unwrap();
        let mut tail = Tail::create(&mut tail_buf, 4, 16).unwrap();

        link_head_with_tail(&mut head, &tail);
        link_tail_with_head(&mut tail, &head);

        assert!(tail.write_tail(b"hello").is_ok());
        let got = head.read_head().unwrap();
        assert_eq!(got, b"hello");
        assert!(head.read_head().is_none());
    }

    #[test]
    fn relinking_to_the_same_peer_does_not_discard_unread_records() {
        let mut head_buf = vec![0u8; layout::head_size()];
        let mut tail_buf = vec![0u8; layout::tail_size(4, 16)];

        let mut head = Head::create(&mut head_buf).unwrap();
        let mut tail = Tail::create(&mut tail_buf, 4, 16).unwrap();

        link_head_with_tail(&mut head, &tail);
        link_tail_with_head(&mut tail, &head);

        tail.write_tail(b"one").unwrap();
        tail.write_tail(b"two").unwrap();

        // Calling link_head_with_tail again, after records have been posted
        // but before they are all read, must not move idxHead and must not
        // lose either record.
        link_head_with_tail(&mut head, &tail);

        assert_eq!(head.read_head().unwrap(), b"one");

        link_head_with_tail(&mut head, &tail);

        assert_eq!(head.read_head().unwrap(), b"two");
        assert!(head.read_head().is_none());
    }
}
