//! Low-level primitives for arena memory operations.
//!
//! [`Fronts`] owns the two cursors and the borrowed byte range. It is the
//! only place in the crate that builds slices from raw pointers; every
//! `unsafe` block carries a `// SAFETY:` comment.
//!
//! Soundness rests on one rule: cursors only move *inward* (toward each
//! other) through `&self`, and only move *outward* through `&mut self`.
//! A slice handed out by a bump therefore lives at most as long as the
//! shared borrow that produced it, and no release can run while it exists.

#![allow(unsafe_code)]

use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Exclusive view over a byte range with a bottom and a top cursor.
///
/// Invariant: `0 <= bottom <= top <= len`.
pub(crate) struct Fronts<'buf> {
    base: NonNull<u8>,
    len: usize,
    bottom: Cell<usize>,
    top: Cell<usize>,
    _bytes: PhantomData<&'buf mut [u8]>,
}

// SAFETY: `Fronts` is built from a `&'buf mut [u8]` and behaves like one;
// moving it to another thread moves the unique borrow with it. It stays
// `!Sync` because the cursors are `Cell`s.
unsafe impl Send for Fronts<'_> {}

impl<'buf> Fronts<'buf> {
    /// Take over `bytes` with both cursors at their empty positions.
    pub(crate) fn new(bytes: &'buf mut [u8]) -> Self {
        let len = bytes.len();
        Self {
            base: NonNull::from(bytes).cast(),
            len,
            bottom: Cell::new(0),
            top: Cell::new(len),
            _bytes: PhantomData,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn bottom(&self) -> usize {
        self.bottom.get()
    }

    pub(crate) fn top(&self) -> usize {
        self.top.get()
    }

    /// Address of the first byte.
    pub(crate) fn addr(&self) -> usize {
        self.base.as_ptr().addr()
    }

    /// Bytes the bottom cursor must advance to reach an `align`-aligned
    /// address.
    pub(crate) fn bottom_padding(&self, align: usize) -> usize {
        debug_assert!(align.is_power_of_two());
        (self.addr() + self.bottom.get()).wrapping_neg() & (align - 1)
    }

    /// Bytes the top cursor must retreat to reach an `align`-aligned
    /// address.
    pub(crate) fn top_padding(&self, align: usize) -> usize {
        debug_assert!(align.is_power_of_two());
        (self.addr() + self.top.get()) & (align - 1)
    }

    /// Reserve `len` bytes at the bottom cursor.
    ///
    /// Returns the start offset and the region, or `Err(len)` if it did not
    /// fit. On error nothing moves.
    pub(crate) fn bump_bottom(&self, len: usize) -> Result<(usize, &mut [u8]), usize> {
        let start = self.bottom.get();
        if len > self.top.get() - start {
            return Err(len);
        }
        self.bottom.set(start + len);
        // SAFETY: `start..start + len` lies inside `bottom..top`. Bottom-side
        // slices still alive end at or before the old `bottom` and top-side
        // slices begin at or after `top`, because cursors only retreat
        // through `&mut self`. The range is therefore unaliased and within
        // the `len`-byte allocation behind `base`.
        let bytes = unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(start), len) };
        Ok((start, bytes))
    }

    /// Reserve `len` bytes ending at the top cursor.
    ///
    /// Same contract as [`Fronts::bump_bottom`], mirrored.
    pub(crate) fn bump_top(&self, len: usize) -> Result<(usize, &mut [u8]), usize> {
        let top = self.top.get();
        if len > top - self.bottom.get() {
            return Err(len);
        }
        let start = top - len;
        self.top.set(start);
        // SAFETY: `start..start + len` lies inside `bottom..top`, mirrored
        // argument of `bump_bottom`.
        let bytes = unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(start), len) };
        Ok((start, bytes))
    }

    /// Move the bottom cursor to `offset` (either direction).
    ///
    /// # Panics
    ///
    /// Panics if `offset` would cross the top cursor.
    pub(crate) fn set_bottom(&mut self, offset: usize) {
        assert!(offset <= self.top.get(), "bottom cursor crossed top");
        self.bottom.set(offset);
    }

    /// Move the top cursor to `offset` (either direction).
    ///
    /// # Panics
    ///
    /// Panics if `offset` would cross the bottom cursor or the end.
    pub(crate) fn set_top(&mut self, offset: usize) {
        assert!(
            offset >= self.bottom.get() && offset <= self.len,
            "top cursor crossed bottom"
        );
        self.top.set(offset);
    }

    /// Overwrite `start..end` with `byte`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub(crate) fn fill(&mut self, start: usize, end: usize, byte: u8) {
        assert!(start <= end && end <= self.len, "fill out of bounds");
        // SAFETY: `&mut self` guarantees no slice produced by a bump is
        // alive, and the range was bounds-checked above.
        let bytes =
            unsafe { std::slice::from_raw_parts_mut(self.base.as_ptr().add(start), end - start) };
        bytes.fill(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_meet_in_the_middle() {
        let mut buf = [0u8; 32];
        let fronts = Fronts::new(&mut buf);
        let (b, lo) = fronts.bump_bottom(10).unwrap();
        let (t, hi) = fronts.bump_top(22).unwrap();
        assert_eq!((b, lo.len()), (0, 10));
        assert_eq!((t, hi.len()), (10, 22));
        assert_eq!(fronts.bottom(), fronts.top());
        assert_eq!(fronts.bump_bottom(1), Err(1));
        assert_eq!(fronts.bump_top(1), Err(1));
    }

    #[test]
    fn padding_measures_distance_to_alignment() {
        let mut buf = [0u64; 4];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut buf);
        let fronts = Fronts::new(bytes);
        assert_eq!(fronts.bottom_padding(8), 0);
        fronts.bump_bottom(1).unwrap();
        assert_eq!(fronts.bottom_padding(8), 7);
        assert_eq!(fronts.bottom_padding(1), 0);
        fronts.bump_top(3).unwrap();
        assert_eq!(fronts.top_padding(4), 1);
        assert_eq!(fronts.top_padding(8), 5);
    }

    #[test]
    fn set_and_fill_after_release() {
        let mut buf = [0u8; 8];
        let mut fronts = Fronts::new(&mut buf);
        fronts.bump_bottom(4).unwrap().1.fill(7);
        fronts.set_bottom(0);
        fronts.fill(0, 4, 0xCD);
        let (_, again) = fronts.bump_bottom(4).unwrap();
        assert_eq!(again, &[0xCD; 4]);
    }

    #[test]
    #[should_panic(expected = "bottom cursor crossed top")]
    fn set_bottom_past_top_panics() {
        let mut buf = [0u8; 8];
        let mut fronts = Fronts::new(&mut buf);
        fronts.bump_top(4).unwrap();
        fronts.set_bottom(5);
    }

    #[test]
    fn empty_buffer_accepts_zero_length_bumps() {
        let mut buf: [u8; 0] = [];
        let fronts = Fronts::new(&mut buf);
        assert!(fronts.bump_bottom(0).is_ok());
        assert!(fronts.bump_top(0).is_ok());
        assert_eq!(fronts.bump_bottom(1), Err(1));
    }
}
