//! Saved cursor positions.
//!
//! A [`Checkpoint`] records how deep one side of an arena was at the time
//! of [`Arena::save`](crate::Arena::save) or
//! [`Arena::save_top`](crate::Arena::save_top). The side is part of the
//! type, so a bottom checkpoint cannot be handed to `restore_top`.

use std::fmt;
use std::marker::PhantomData;

use crate::error::Side;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Bottom {}
    impl Sealed for super::Top {}
}

/// Type-level marker for an arena growth front.
pub trait Front: sealed::Sealed + Copy + fmt::Debug + Eq {
    /// The runtime side this marker stands for.
    const SIDE: Side;
}

/// Marker for the bottom (upward-growing) front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bottom;

/// Marker for the top (downward-growing) front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Top;

impl Front for Bottom {
    const SIDE: Side = Side::Bottom;
}

impl Front for Top {
    const SIDE: Side = Side::Top;
}

/// Opaque saved depth of one arena side.
///
/// Depth is measured from the side's origin: bytes from offset 0 for the
/// bottom, bytes from the end for the top. The checkpoint also remembers
/// which arena instance produced it; restoring it on any other arena,
/// including a partition or a later arena over the same bytes, is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Checkpoint<S: Front = Bottom> {
    pub(crate) depth: usize,
    pub(crate) arena: u64,
    _front: PhantomData<S>,
}

impl<S: Front> Checkpoint<S> {
    pub(crate) fn new(depth: usize, arena: u64) -> Self {
        Self {
            depth,
            arena,
            _front: PhantomData,
        }
    }

    /// Committed bytes on this side when the checkpoint was taken.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The side this checkpoint belongs to.
    pub fn side(&self) -> Side {
        S::SIDE
    }
}

impl<S: Front> fmt::Display for Checkpoint<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checkpoint({}, depth={})", S::SIDE, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_follows_marker() {
        let bottom: Checkpoint = Checkpoint::new(12, 1);
        let top: Checkpoint<Top> = Checkpoint::new(4, 1);
        assert_eq!(bottom.side(), Side::Bottom);
        assert_eq!(top.side(), Side::Top);
        assert_eq!(bottom.depth(), 12);
    }

    #[test]
    fn display_names_side_and_depth() {
        let top: Checkpoint<Top> = Checkpoint::new(4, 1);
        assert_eq!(top.to_string(), "Checkpoint(top, depth=4)");
    }
}
