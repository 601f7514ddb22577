//! Test utilities for Tandem arena development.
//!
//! Provides [`ShadowArena`], a pure model of an arena's two cursors, the
//! [`ArenaOp`] vocabulary with proptest strategies, and [`ModelRun`], which
//! replays operations against a real [`Arena`] and the model side by side
//! and asserts they agree after every step.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{arena_buffer, init_tracing, is_stamped, stamp, POISON};

use proptest::prelude::*;
use tandem_arena::{Arena, Bottom, Checkpoint, Side, Top};

/// Reference model of an arena: one stack of allocation sizes per side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShadowArena {
    capacity: usize,
    bottom: Vec<usize>,
    top: Vec<usize>,
}

impl ShadowArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bottom: Vec::new(),
            top: Vec::new(),
        }
    }

    fn stack(&self, side: Side) -> &Vec<usize> {
        match side {
            Side::Bottom => &self.bottom,
            Side::Top => &self.top,
        }
    }

    fn stack_mut(&mut self, side: Side) -> &mut Vec<usize> {
        match side {
            Side::Bottom => &mut self.bottom,
            Side::Top => &mut self.top,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Committed bytes on `side`.
    pub fn depth(&self, side: Side) -> usize {
        self.stack(side).iter().sum()
    }

    pub fn committed(&self) -> usize {
        self.depth(Side::Bottom) + self.depth(Side::Top)
    }

    pub fn free(&self) -> usize {
        self.capacity - self.committed()
    }

    /// Number of live allocations on `side`.
    pub fn live(&self, side: Side) -> usize {
        self.stack(side).len()
    }

    /// Record a push; returns `false` (and changes nothing) if it cannot fit.
    pub fn push(&mut self, side: Side, len: usize) -> bool {
        if len > self.free() {
            return false;
        }
        self.stack_mut(side).push(len);
        true
    }

    /// Forget the newest allocation on `side`, returning its size.
    pub fn pop_last(&mut self, side: Side) -> Option<usize> {
        self.stack_mut(side).pop()
    }

    /// Keep only the oldest `live` allocations on `side`.
    pub fn truncate(&mut self, side: Side, live: usize) {
        self.stack_mut(side).truncate(live);
    }

    pub fn reset(&mut self) {
        self.bottom.clear();
        self.top.clear();
    }
}

/// One step of a randomised arena workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArenaOp {
    /// Push `len` bytes.
    Push { side: Side, len: usize },
    /// Pop the newest allocation, if any.
    PopLast { side: Side },
    /// Save a checkpoint.
    Save { side: Side },
    /// Restore the newest still-valid checkpoint, if any.
    RestoreLast { side: Side },
    /// Release both sides.
    Reset,
}

pub fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bottom), Just(Side::Top)]
}

/// Ops with push lengths in `0..=max_len`, weighted toward pushes.
pub fn arb_op(max_len: usize) -> impl Strategy<Value = ArenaOp> {
    prop_oneof![
        4 => (arb_side(), 0..=max_len).prop_map(|(side, len)| ArenaOp::Push { side, len }),
        2 => arb_side().prop_map(|side| ArenaOp::PopLast { side }),
        1 => arb_side().prop_map(|side| ArenaOp::Save { side }),
        1 => arb_side().prop_map(|side| ArenaOp::RestoreLast { side }),
        1 => Just(ArenaOp::Reset),
    ]
}

pub fn arb_ops(max_len: usize, max_ops: usize) -> impl Strategy<Value = Vec<ArenaOp>> {
    proptest::collection::vec(arb_op(max_len), 0..max_ops)
}

/// Drives an [`Arena`] and a [`ShadowArena`] in lockstep.
///
/// Checkpoints are kept with the number of live allocations at save time.
/// A pop below that count invalidates the checkpoint, so only
/// checkpoints that are still legal to restore are ever replayed.
#[derive(Debug)]
pub struct ModelRun {
    shadow: ShadowArena,
    bottom_marks: Vec<(Checkpoint<Bottom>, usize)>,
    top_marks: Vec<(Checkpoint<Top>, usize)>,
}

impl ModelRun {
    pub fn new(capacity: usize) -> Self {
        Self {
            shadow: ShadowArena::new(capacity),
            bottom_marks: Vec::new(),
            top_marks: Vec::new(),
        }
    }

    pub fn shadow(&self) -> &ShadowArena {
        &self.shadow
    }

    /// Apply `op` to both the arena and the model, then compare them.
    ///
    /// # Panics
    ///
    /// Panics on any disagreement between the arena and the model.
    pub fn apply(&mut self, arena: &mut Arena<'_>, op: ArenaOp) {
        match op {
            ArenaOp::Push { side, len } => {
                let fits = self.shadow.push(side, len);
                let result = match side {
                    Side::Bottom => arena.push(len).map(|bytes| bytes.len()),
                    Side::Top => arena.push_top(len).map(|bytes| bytes.len()),
                };
                match result {
                    Ok(got) => {
                        assert!(fits, "{op:?} succeeded but the model has {} free", self.shadow.free());
                        assert_eq!(got, len, "{op:?} returned a short region");
                    }
                    Err(err) => assert!(!fits, "{op:?} failed unexpectedly: {err}"),
                }
            }
            ArenaOp::PopLast { side } => {
                if let Some(len) = self.shadow.pop_last(side) {
                    let result = match side {
                        Side::Bottom => arena.pop(len),
                        Side::Top => arena.pop_top(len),
                    };
                    assert_eq!(result, Ok(()), "{op:?} of {len} bytes");
                    self.drop_stale_marks(side);
                }
            }
            ArenaOp::Save { side } => {
                let live = self.shadow.live(side);
                match side {
                    Side::Bottom => self.bottom_marks.push((arena.save(), live)),
                    Side::Top => self.top_marks.push((arena.save_top(), live)),
                }
            }
            ArenaOp::RestoreLast { side } => {
                let restored = match side {
                    Side::Bottom => self
                        .bottom_marks
                        .pop()
                        .map(|(mark, live)| (arena.restore(mark), live)),
                    Side::Top => self
                        .top_marks
                        .pop()
                        .map(|(mark, live)| (arena.restore_top(mark), live)),
                };
                if let Some((result, live)) = restored {
                    assert_eq!(result, Ok(()), "{op:?}");
                    self.shadow.truncate(side, live);
                }
            }
            ArenaOp::Reset => {
                arena.reset();
                self.shadow.reset();
                self.bottom_marks.clear();
                self.top_marks.clear();
            }
        }
        self.check(arena);
    }

    fn drop_stale_marks(&mut self, side: Side) {
        let live = self.shadow.live(side);
        match side {
            Side::Bottom => self.bottom_marks.retain(|&(_, at)| at <= live),
            Side::Top => self.top_marks.retain(|&(_, at)| at <= live),
        }
    }

    /// Assert the arena's cursors match the model.
    pub fn check(&self, arena: &Arena<'_>) {
        let stats = arena.stats();
        assert_eq!(stats.capacity, self.shadow.capacity(), "capacity");
        assert_eq!(stats.bottom, self.shadow.depth(Side::Bottom), "bottom depth");
        assert_eq!(stats.top, self.shadow.depth(Side::Top), "top depth");
        assert_eq!(stats.free, self.shadow.free(), "free bytes");
        assert_eq!(arena.commit_size(), self.shadow.committed(), "committed bytes");
    }
}
