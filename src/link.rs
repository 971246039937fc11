//! The width of the record header's `link`/`payload_len` words.
//!
//! Chosen at compile time via the `link-u16` / `link-u32` Cargo features.
//! `u16` is the default: it halves the per-record header cost, at the price
//! of capping any single arena at 64 KiB (spec invariant 6).

#[cfg(all(feature = "link-u16", feature = "link-u32"))]
compile_error!("enable exactly one of the `link-u16` / `link-u32` features, not both");

#[cfg(not(any(feature = "link-u16", feature = "link-u32")))]
compile_error!("enable exactly one of the `link-u16` / `link-u32` features");

#[cfg(feature = "link-u16")]
pub type Link = u16;

#[cfg(feature = "link-u32")]
pub type Link = u32;

/// Payload/header alignment `A`. Fixed at the natural word alignment of the
/// targets this crate cares about; every record header and every payload
/// pointer handed to a caller is aligned to this boundary.
pub const ALIGN: usize = 8;

#[inline]
pub(crate) const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Highest offset representable by [`Link`], exclusive. An arena whose size
/// would require an offset at or beyond this value cannot be built.
#[inline]
pub(crate) const fn link_range() -> u64 {
    1u64 << (core::mem::size_of::<Link>() * 8)
}
