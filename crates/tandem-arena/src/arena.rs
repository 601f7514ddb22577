//! The dual-ended region allocator.
//!
//! An [`Arena`] manages one fixed byte range with two bump cursors: the
//! bottom cursor grows up from offset 0, the top cursor grows down from the
//! end. Allocation is O(1) and never fails silently; release is only
//! possible in stack order, by popping a byte count or restoring a
//! [`Checkpoint`].
//!
//! ```text
//! 0                 bottom              top                 len
//! |== bottom allocs ==|------ free ------|==== top allocs ====|
//! ```
//!
//! # Borrowing model
//!
//! Pushing takes `&self`, so any number of regions may be held at once.
//! Popping, restoring and resetting take `&mut self`, which the borrow
//! checker refuses while any pushed region is still in use. A child arena
//! from [`Arena::partition`] borrows its parent the same way.

#[cfg(debug_assertions)]
use std::cell::RefCell;
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::checkpoint::{Bottom, Checkpoint, Top};
use crate::config::{ArenaConfig, OverflowPolicy};
use crate::error::{ArenaError, Side};
#[cfg(debug_assertions)]
use crate::ledger::Ledger;
use crate::raw::Fronts;

/// Point-in-time usage figures for an [`Arena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total bytes managed by the arena.
    pub capacity: usize,
    /// Bytes committed on the bottom side.
    pub bottom: usize,
    /// Bytes committed on the top side.
    pub top: usize,
    /// `bottom + top`.
    pub committed: usize,
    /// Bytes between the two cursors.
    pub free: usize,
    /// Largest bottom commitment seen since creation or the last
    /// [`Arena::reset_high_water`].
    pub bottom_high_water: usize,
    /// Largest top commitment seen, as above.
    pub top_high_water: usize,
}

/// Counter for unique per-arena ids stamped into checkpoints.
static ARENA_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Fixed-capacity, dual-ended bump allocator over borrowed bytes.
pub struct Arena<'buf> {
    fronts: Fronts<'buf>,
    id: u64,
    bottom_high_water: Cell<usize>,
    top_high_water: Cell<usize>,
    /// Lowest depth reached per side since the innermost open scope began.
    bottom_floor: Cell<usize>,
    top_floor: Cell<usize>,
    overflow: OverflowPolicy,
    poison: Option<u8>,
    #[cfg(debug_assertions)]
    ledger: RefCell<Ledger>,
}

impl<'buf> Arena<'buf> {
    /// Bind an arena to `buffer` with default policies.
    ///
    /// The arena never frees or grows `buffer`; it only hands out
    /// sub-slices of it. Both cursors start empty.
    pub fn new(buffer: &'buf mut [u8]) -> Self {
        Self::with_policies(buffer, OverflowPolicy::default(), None)
    }

    /// Bind an arena to `buffer`, taking the overflow and poison policies
    /// from `config`. The capacity is the buffer's length, not
    /// `config.capacity`.
    pub fn with_config(buffer: &'buf mut [u8], config: &ArenaConfig) -> Self {
        Self::with_policies(buffer, config.overflow, config.poison)
    }

    fn with_policies(buffer: &'buf mut [u8], overflow: OverflowPolicy, poison: Option<u8>) -> Self {
        Self {
            fronts: Fronts::new(buffer),
            id: ARENA_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed),
            bottom_high_water: Cell::new(0),
            top_high_water: Cell::new(0),
            bottom_floor: Cell::new(0),
            top_floor: Cell::new(0),
            overflow,
            poison,
            #[cfg(debug_assertions)]
            ledger: RefCell::new(Ledger::new()),
        }
    }

    // ── Bottom side ──────────────────────────────────────────────

    /// Reserve `len` bytes from the bottom front.
    ///
    /// The contents are whatever the bytes last held; use
    /// [`Arena::push_zeroed`] when zeroes are required.
    #[allow(clippy::mut_from_ref)]
    pub fn push(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        self.carve(Side::Bottom, len)
    }

    /// Release the most recent `len` bytes of the bottom side.
    ///
    /// Callers must pop exactly what they pushed, in reverse order.
    pub fn pop(&mut self, len: usize) -> Result<(), ArenaError> {
        self.release_by(Side::Bottom, len)
    }

    /// Save the bottom cursor.
    pub fn save(&self) -> Checkpoint<Bottom> {
        Checkpoint::new(self.depth(Side::Bottom), self.id)
    }

    /// Discard every bottom allocation made since `checkpoint` was saved.
    pub fn restore(&mut self, checkpoint: Checkpoint<Bottom>) -> Result<(), ArenaError> {
        self.rewind(Side::Bottom, checkpoint.depth, checkpoint.arena)
    }

    /// Carve a child arena of `len` bytes off the bottom front.
    ///
    /// The bytes stay consumed from this arena until a restore to a
    /// checkpoint taken before the partition, which the borrow checker only
    /// allows once the child is gone.
    pub fn partition(&self, len: usize) -> Result<Arena<'_>, ArenaError> {
        let bytes = self.carve(Side::Bottom, len)?;
        tracing::debug!(len, side = %Side::Bottom, "arena partitioned");
        Ok(Arena::with_policies(bytes, self.overflow, self.poison))
    }

    // ── Top side ─────────────────────────────────────────────────

    /// Reserve `len` bytes from the top front.
    #[allow(clippy::mut_from_ref)]
    pub fn push_top(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        self.carve(Side::Top, len)
    }

    /// Release the most recent `len` bytes of the top side.
    pub fn pop_top(&mut self, len: usize) -> Result<(), ArenaError> {
        self.release_by(Side::Top, len)
    }

    /// Save the top cursor.
    pub fn save_top(&self) -> Checkpoint<Top> {
        Checkpoint::new(self.depth(Side::Top), self.id)
    }

    /// Discard every top allocation made since `checkpoint` was saved.
    pub fn restore_top(&mut self, checkpoint: Checkpoint<Top>) -> Result<(), ArenaError> {
        self.rewind(Side::Top, checkpoint.depth, checkpoint.arena)
    }

    /// Carve a child arena of `len` bytes off the top front.
    pub fn partition_top(&self, len: usize) -> Result<Arena<'_>, ArenaError> {
        let bytes = self.carve(Side::Top, len)?;
        tracing::debug!(len, side = %Side::Top, "arena partitioned");
        Ok(Arena::with_policies(bytes, self.overflow, self.poison))
    }

    // ── Introspection ────────────────────────────────────────────

    /// Total bytes managed by this arena.
    pub fn capacity(&self) -> usize {
        self.fronts.len()
    }

    /// Bytes currently allocated on both sides.
    pub fn commit_size(&self) -> usize {
        self.depth(Side::Bottom) + self.depth(Side::Top)
    }

    /// Bytes available between the cursors.
    pub fn free_size(&self) -> usize {
        self.fronts.top() - self.fronts.bottom()
    }

    /// Whether a byte push of `len` bytes would succeed.
    pub fn can_accommodate(&self, len: usize) -> bool {
        self.free_size() >= len
    }

    /// Usage snapshot, including high-water marks.
    pub fn stats(&self) -> ArenaStats {
        let bottom = self.depth(Side::Bottom);
        let top = self.depth(Side::Top);
        ArenaStats {
            capacity: self.capacity(),
            bottom,
            top,
            committed: bottom + top,
            free: self.free_size(),
            bottom_high_water: self.bottom_high_water.get(),
            top_high_water: self.top_high_water.get(),
        }
    }

    /// Restart high-water tracking from the current commitment.
    pub fn reset_high_water(&mut self) {
        self.bottom_high_water.set(self.depth(Side::Bottom));
        self.top_high_water.set(self.depth(Side::Top));
    }

    /// Release everything on both sides.
    pub fn reset(&mut self) {
        let (bottom, top, len) = (self.fronts.bottom(), self.fronts.top(), self.fronts.len());
        if let Some(byte) = self.poison {
            self.fronts.fill(0, bottom, byte);
            self.fronts.fill(top, len, byte);
        }
        self.fronts.set_bottom(0);
        self.fronts.set_top(len);
        self.bottom_floor.set(0);
        self.top_floor.set(0);
        #[cfg(debug_assertions)]
        self.ledger.get_mut().clear();
    }

    // ── Convenience ──────────────────────────────────────────────

    /// [`Arena::push`] followed by zero-filling the region.
    #[allow(clippy::mut_from_ref)]
    pub fn push_zeroed(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        let bytes = self.push(len)?;
        bytes.fill(0);
        Ok(bytes)
    }

    /// [`Arena::push_top`] followed by zero-filling the region.
    #[allow(clippy::mut_from_ref)]
    pub fn push_zeroed_top(&self, len: usize) -> Result<&mut [u8], ArenaError> {
        let bytes = self.push_top(len)?;
        bytes.fill(0);
        Ok(bytes)
    }

    /// Push a copy of `src` onto the bottom side.
    #[allow(clippy::mut_from_ref)]
    pub fn push_copy(&self, src: &[u8]) -> Result<&mut [u8], ArenaError> {
        let bytes = self.push(src.len())?;
        bytes.copy_from_slice(src);
        Ok(bytes)
    }

    /// Push a copy of `src` onto the top side.
    #[allow(clippy::mut_from_ref)]
    pub fn push_copy_top(&self, src: &[u8]) -> Result<&mut [u8], ArenaError> {
        let bytes = self.push_top(src.len())?;
        bytes.copy_from_slice(src);
        Ok(bytes)
    }

    // ── Internals shared with the typed layer ────────────────────

    /// Committed bytes on `side`.
    pub(crate) fn depth(&self, side: Side) -> usize {
        match side {
            Side::Bottom => self.fronts.bottom(),
            Side::Top => self.fronts.len() - self.fronts.top(),
        }
    }

    fn floor(&self, side: Side) -> &Cell<usize> {
        match side {
            Side::Bottom => &self.bottom_floor,
            Side::Top => &self.top_floor,
        }
    }

    /// Start tracking the lowest depth `side` reaches from here on.
    /// Returns the enclosing tracker's floor for [`Arena::close_floor`].
    pub(crate) fn open_floor(&self, side: Side) -> usize {
        self.floor(side).replace(self.depth(side))
    }

    /// Stop the tracking started by the matching [`Arena::open_floor`] and
    /// return the lowest depth reached meanwhile.
    pub(crate) fn close_floor(&self, side: Side, outer: usize) -> usize {
        let floor = self.floor(side);
        let lowest = floor.get();
        floor.set(lowest.min(outer));
        lowest
    }

    /// Bytes `side` must consume before its cursor sits on an
    /// `align`-aligned address.
    pub(crate) fn padding(&self, side: Side, align: usize) -> usize {
        match side {
            Side::Bottom => self.fronts.bottom_padding(align),
            Side::Top => self.fronts.top_padding(align),
        }
    }

    /// Reserve `len` bytes on `side`, applying the overflow policy on
    /// failure.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn carve(&self, side: Side, len: usize) -> Result<&mut [u8], ArenaError> {
        let from = self.depth(side);
        let result = match side {
            Side::Bottom => self.fronts.bump_bottom(len),
            Side::Top => self.fronts.bump_top(len),
        };
        match result {
            Ok((_, bytes)) => {
                self.note_push(side, from, from + len);
                Ok(bytes)
            }
            Err(requested) => Err(self.exhausted(requested)),
        }
    }

    fn note_push(&self, side: Side, from: usize, to: usize) {
        let high_water = match side {
            Side::Bottom => &self.bottom_high_water,
            Side::Top => &self.top_high_water,
        };
        if to > high_water.get() {
            high_water.set(to);
        }
        #[cfg(debug_assertions)]
        self.ledger.borrow_mut().record(side, from, to);
        #[cfg(not(debug_assertions))]
        let _ = from;
    }

    fn exhausted(&self, requested: usize) -> ArenaError {
        let available = self.free_size();
        tracing::warn!(requested, available, "arena capacity exceeded");
        let err = ArenaError::CapacityExceeded {
            requested,
            available,
        };
        if self.overflow == OverflowPolicy::Panic {
            panic!("{err}");
        }
        err
    }

    fn release_by(&mut self, side: Side, len: usize) -> Result<(), ArenaError> {
        let committed = self.depth(side);
        let target = committed.checked_sub(len).ok_or(ArenaError::Underflow {
            requested: len,
            committed,
            side,
        })?;
        self.release_to(side, target)
    }

    fn rewind(&mut self, side: Side, depth: usize, arena: u64) -> Result<(), ArenaError> {
        let cursor = self.depth(side);
        if arena != self.id || depth > cursor {
            return Err(ArenaError::InvalidCheckpoint {
                checkpoint: depth,
                cursor,
                side,
            });
        }
        tracing::trace!(side = %side, from = cursor, to = depth, "arena restored");
        self.release_to(side, depth)
    }

    /// Move `side` back to `depth` (which must not exceed the current
    /// depth), poisoning the released bytes if configured.
    fn release_to(&mut self, side: Side, depth: usize) -> Result<(), ArenaError> {
        #[cfg(debug_assertions)]
        if !self.ledger.get_mut().release(side, depth) {
            return Err(ArenaError::LifoViolation {
                side,
                cursor: depth,
            });
        }
        let floor = self.floor(side);
        if depth < floor.get() {
            floor.set(depth);
        }
        let len = self.fronts.len();
        match side {
            Side::Bottom => {
                let current = self.fronts.bottom();
                if let Some(byte) = self.poison {
                    self.fronts.fill(depth, current, byte);
                }
                self.fronts.set_bottom(depth);
            }
            Side::Top => {
                let current = self.fronts.top();
                let target = len - depth;
                if let Some(byte) = self.poison {
                    self.fronts.fill(current, target, byte);
                }
                self.fronts.set_top(target);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("capacity", &self.capacity())
            .field("bottom", &self.depth(Side::Bottom))
            .field("top", &self.depth(Side::Top))
            .field("overflow", &self.overflow)
            .finish()
    }
}
