//! Typed convenience layer over the byte API.
//!
//! Every operation here is exactly `size_of::<T>() * count` bytes passed
//! through to the byte-level push/pop, so a typed pop always undoes the
//! matching typed push. A typed push never pads: if its cursor is not
//! aligned for `T` it fails with [`ArenaError::Misaligned`]. Callers that
//! mix sizes pad with [`Arena::align_to`], which is an ordinary byte push
//! they pop like any other.
//!
//! Element types are [`bytemuck::Pod`], so any stale bytes in a fresh
//! region are a valid `T` and no initialisation is needed. Zero-sized types
//! are rejected at compile time.

use std::mem::{align_of, size_of};

use bytemuck::Pod;

use crate::arena::Arena;
use crate::error::{ArenaError, Side};

fn array_len<T>(count: usize) -> usize {
    size_of::<T>().checked_mul(count).unwrap_or(usize::MAX)
}

impl<'buf> Arena<'buf> {
    /// Push the padding that brings the bottom cursor to an `align`-aligned
    /// address. Returns the number of padding bytes, to be released with
    /// [`Arena::pop`] once everything pushed after it is gone.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn align_to(&self, align: usize) -> Result<usize, ArenaError> {
        self.pad(Side::Bottom, align)
    }

    /// Top-side [`Arena::align_to`]; release with [`Arena::pop_top`].
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn align_to_top(&self, align: usize) -> Result<usize, ArenaError> {
        self.pad(Side::Top, align)
    }

    fn pad(&self, side: Side, align: usize) -> Result<usize, ArenaError> {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        let padding = self.padding(side, align);
        self.carve(side, padding)?;
        Ok(padding)
    }

    /// Reserve `len` bytes on `side` whose start is aligned for `T`.
    fn carve_for<T: Pod>(&self, side: Side, len: usize) -> Result<&mut [u8], ArenaError> {
        let align = align_of::<T>();
        if self.padding(side, align) != 0 {
            return Err(ArenaError::Misaligned {
                side,
                depth: self.depth(side),
                align,
            });
        }
        self.carve(side, len)
    }

    /// Reserve space for one `T` on the bottom side. Contents unspecified.
    #[allow(clippy::mut_from_ref)]
    pub fn push_type<T: Pod>(&self) -> Result<&mut T, ArenaError> {
        const { assert!(size_of::<T>() != 0, "zero-sized types cannot be pushed") };
        let bytes = self.carve_for::<T>(Side::Bottom, size_of::<T>())?;
        Ok(bytemuck::from_bytes_mut(bytes))
    }

    /// Reserve space for one `T` on the top side. Contents unspecified.
    #[allow(clippy::mut_from_ref)]
    pub fn push_type_top<T: Pod>(&self) -> Result<&mut T, ArenaError> {
        const { assert!(size_of::<T>() != 0, "zero-sized types cannot be pushed") };
        let bytes = self.carve_for::<T>(Side::Top, size_of::<T>())?;
        Ok(bytemuck::from_bytes_mut(bytes))
    }

    /// Push `value` onto the bottom side.
    #[allow(clippy::mut_from_ref)]
    pub fn push_value<T: Pod>(&self, value: T) -> Result<&mut T, ArenaError> {
        let slot = self.push_type::<T>()?;
        *slot = value;
        Ok(slot)
    }

    /// Push `value` onto the top side.
    #[allow(clippy::mut_from_ref)]
    pub fn push_value_top<T: Pod>(&self, value: T) -> Result<&mut T, ArenaError> {
        let slot = self.push_type_top::<T>()?;
        *slot = value;
        Ok(slot)
    }

    /// Reserve `count` contiguous `T`s on the bottom side. Contents
    /// unspecified. `count == 0` returns an empty slice without touching
    /// the cursor.
    #[allow(clippy::mut_from_ref)]
    pub fn push_array<T: Pod>(&self, count: usize) -> Result<&mut [T], ArenaError> {
        const { assert!(size_of::<T>() != 0, "zero-sized types cannot be pushed") };
        if count == 0 {
            return Ok(&mut []);
        }
        let bytes = self.carve_for::<T>(Side::Bottom, array_len::<T>(count))?;
        Ok(bytemuck::cast_slice_mut(bytes))
    }

    /// Reserve `count` contiguous `T`s on the top side.
    #[allow(clippy::mut_from_ref)]
    pub fn push_array_top<T: Pod>(&self, count: usize) -> Result<&mut [T], ArenaError> {
        const { assert!(size_of::<T>() != 0, "zero-sized types cannot be pushed") };
        if count == 0 {
            return Ok(&mut []);
        }
        let bytes = self.carve_for::<T>(Side::Top, array_len::<T>(count))?;
        Ok(bytemuck::cast_slice_mut(bytes))
    }

    /// Copy `src` into a fresh bottom-side array.
    #[allow(clippy::mut_from_ref)]
    pub fn push_array_copy<T: Pod>(&self, src: &[T]) -> Result<&mut [T], ArenaError> {
        let dst = self.push_array::<T>(src.len())?;
        dst.copy_from_slice(src);
        Ok(dst)
    }

    /// Release one `T` from the bottom side.
    pub fn pop_type<T: Pod>(&mut self) -> Result<(), ArenaError> {
        self.pop(size_of::<T>())
    }

    /// Release one `T` from the top side.
    pub fn pop_type_top<T: Pod>(&mut self) -> Result<(), ArenaError> {
        self.pop_top(size_of::<T>())
    }

    /// Release `count` `T`s from the bottom side.
    pub fn pop_array<T: Pod>(&mut self, count: usize) -> Result<(), ArenaError> {
        self.pop(array_len::<T>(count))
    }

    /// Release `count` `T`s from the top side.
    pub fn pop_array_top<T: Pod>(&mut self, count: usize) -> Result<(), ArenaError> {
        self.pop_top(array_len::<T>(count))
    }
}

#[cfg(test)]
mod tests {
    use bytemuck::{Pod, Zeroable};

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct QuadLayout {
        offset: [f32; 2],
        size: [f32; 2],
        color: [f32; 4],
    }

    fn aligned(words: &mut [u64]) -> &mut [u8] {
        bytemuck::cast_slice_mut(words)
    }

    #[test]
    fn push_value_stores_and_returns_value() {
        let mut words = [0u64; 8];
        let arena = Arena::new(aligned(&mut words));
        let v = arena.push_value(0xDEAD_BEEFu32).unwrap();
        assert_eq!(*v, 0xDEAD_BEEF);
        assert_eq!(arena.commit_size(), 4);
    }

    #[test]
    fn push_array_reserves_size_times_count() {
        let mut words = [0u64; 64];
        let arena = Arena::new(aligned(&mut words));
        let quads = arena.push_array::<QuadLayout>(4).unwrap();
        assert_eq!(quads.len(), 4);
        assert_eq!(arena.commit_size(), 4 * size_of::<QuadLayout>());
        quads[3].color = [1.0; 4];
        assert_eq!(quads[3].color, [1.0; 4]);
    }

    #[test]
    fn misaligned_typed_push_is_rejected() {
        let mut words = [0u64; 8];
        let arena = Arena::new(aligned(&mut words));
        arena.push(1).unwrap();
        assert_eq!(
            arena.push_value(7u64).unwrap_err(),
            ArenaError::Misaligned {
                side: Side::Bottom,
                depth: 1,
                align: align_of::<u64>(),
            }
        );
        assert_eq!(arena.commit_size(), 1);
        // Byte-aligned types never need padding.
        assert!(arena.push_value(7u8).is_ok());
    }

    #[test]
    fn typed_pop_undoes_typed_push_after_explicit_padding() {
        let mut words = [0u64; 8];
        let mut arena = Arena::new(aligned(&mut words));
        arena.push(1).unwrap();
        let padding = arena.align_to(align_of::<u64>()).unwrap();
        assert_eq!(padding, 7);
        let x = arena.push_value(7u64).unwrap();
        assert_eq!((x as *mut u64).addr() % align_of::<u64>(), 0);
        arena.pop_type::<u64>().unwrap();
        assert_eq!(arena.commit_size(), 8);
        arena.pop(padding).unwrap();
        arena.pop(1).unwrap();
        assert_eq!(arena.commit_size(), 0);
    }

    #[test]
    fn top_padding_is_popped_like_any_allocation() {
        let mut words = [0u64; 8];
        let mut arena = Arena::new(aligned(&mut words));
        arena.push_top(3).unwrap();
        assert!(matches!(
            arena.push_array_top::<u32>(2),
            Err(ArenaError::Misaligned { side: Side::Top, depth: 3, align: 4 })
        ));
        let padding = arena.align_to_top(align_of::<u32>()).unwrap();
        assert_eq!(padding, 1);
        let pair = arena.push_array_top::<u32>(2).unwrap();
        assert_eq!(pair.as_ptr().addr() % align_of::<u32>(), 0);
        arena.pop_array_top::<u32>(2).unwrap();
        arena.pop_top(padding).unwrap();
        arena.pop_top(3).unwrap();
        assert_eq!(arena.free_size(), 64);
    }

    #[test]
    fn align_to_on_aligned_cursor_pushes_nothing() {
        let mut words = [0u64; 2];
        let arena = Arena::new(aligned(&mut words));
        assert_eq!(arena.align_to(16), Ok(0));
        assert_eq!(arena.align_to_top(8), Ok(0));
        assert_eq!(arena.commit_size(), 0);
    }

    #[test]
    fn padding_that_does_not_fit_is_a_capacity_error() {
        let mut words = [0u64; 2];
        let arena = Arena::new(aligned(&mut words));
        arena.push(9).unwrap();
        arena.push_top(4).unwrap();
        // Offset 9 needs 7 bytes to reach 16 but only 3 are free.
        assert!(matches!(
            arena.align_to(8),
            Err(ArenaError::CapacityExceeded { requested: 7, available: 3 })
        ));
        assert_eq!(arena.commit_size(), 13);
    }

    #[test]
    fn pop_type_top_mirrors_push_type_top() {
        let mut words = [0u64; 8];
        let mut arena = Arena::new(aligned(&mut words));
        arena.push_type_top::<u64>().unwrap();
        arena.pop_type_top::<u64>().unwrap();
        assert_eq!(arena.free_size(), 64);
        arena.push_array_top::<u16>(5).unwrap();
        arena.pop_array_top::<u16>(5).unwrap();
        assert_eq!(arena.free_size(), 64);
    }

    #[test]
    fn empty_array_does_not_move_cursor() {
        let mut words = [0u64; 2];
        let arena = Arena::new(aligned(&mut words));
        arena.push(1).unwrap();
        assert!(arena.push_array::<u64>(0).unwrap().is_empty());
        assert!(arena.push_array_top::<u64>(0).unwrap().is_empty());
        assert_eq!(arena.commit_size(), 1);
    }

    #[test]
    fn overflowing_count_is_capacity_error() {
        let mut words = [0u64; 2];
        let arena = Arena::new(aligned(&mut words));
        assert!(matches!(
            arena.push_array::<u64>(usize::MAX),
            Err(ArenaError::CapacityExceeded { .. })
        ));
        assert_eq!(arena.commit_size(), 0);
    }

    #[test]
    fn push_array_copy_round_trips_values() {
        let mut words = [0u64; 8];
        let arena = Arena::new(aligned(&mut words));
        let src = [1.5f32, -2.0, 3.25];
        assert_eq!(arena.push_array_copy(&src).unwrap(), &src);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn padded_typed_push_pops_back_to_start(
                lead in 0usize..16,
                count in 0usize..8,
            ) {
                let mut words = [0u64; 16];
                let mut arena = Arena::new(aligned(&mut words));
                arena.push(lead).unwrap();
                let padding = arena.align_to(align_of::<u64>()).unwrap();
                prop_assert!(padding < align_of::<u64>());
                arena.push_array::<u64>(count).unwrap();
                arena.pop_array::<u64>(count).unwrap();
                arena.pop(padding).unwrap();
                prop_assert_eq!(arena.commit_size(), lead);
            }
        }
    }
}
