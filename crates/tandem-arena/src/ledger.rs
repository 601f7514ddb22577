//! Debug-build tracking of allocation boundaries.
//!
//! The arena itself never records individual allocations. In builds with
//! `debug_assertions` each arena additionally keeps a [`Ledger`]: for each
//! side, the ascending list of depths at which a release may legally land.
//! A pop or restore that would stop strictly inside a live allocation is
//! rejected as a LIFO violation. Release builds compile this module out.

use smallvec::{smallvec, SmallVec};

use crate::error::Side;

/// Legal release depths for one side, ascending. Always contains 0 and the
/// current cursor depth.
#[derive(Debug)]
struct Boundaries(SmallVec<[usize; 16]>);

impl Boundaries {
    fn new() -> Self {
        Self(smallvec![0])
    }

    fn record(&mut self, from: usize, to: usize) {
        debug_assert_eq!(self.0.last(), Some(&from), "ledger lost the cursor");
        if to > from {
            self.0.push(to);
        }
    }

    fn release(&mut self, depth: usize) -> bool {
        match self.0.binary_search(&depth) {
            Ok(index) => {
                self.0.truncate(index + 1);
                true
            }
            Err(_) => false,
        }
    }
}

/// Per-arena boundary tracking for both sides.
#[derive(Debug)]
pub(crate) struct Ledger {
    bottom: Boundaries,
    top: Boundaries,
}

impl Ledger {
    pub(crate) fn new() -> Self {
        Self {
            bottom: Boundaries::new(),
            top: Boundaries::new(),
        }
    }

    fn side(&mut self, side: Side) -> &mut Boundaries {
        match side {
            Side::Bottom => &mut self.bottom,
            Side::Top => &mut self.top,
        }
    }

    /// Note a push that moved `side` from depth `from` to `to`.
    pub(crate) fn record(&mut self, side: Side, from: usize, to: usize) {
        self.side(side).record(from, to);
    }

    /// Validate a release of `side` down to `depth`, forgetting every
    /// boundary above it. Returns `false` if `depth` splits an allocation.
    pub(crate) fn release(&mut self, side: Side, depth: usize) -> bool {
        self.side(side).release(depth)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}
