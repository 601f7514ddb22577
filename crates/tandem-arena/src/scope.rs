//! Scoped checkpoints.
//!
//! [`ArenaScope`] saves both cursors when created and restores them when
//! dropped, on every exit path. Allocations made through the scope borrow
//! it, so none of them can outlive the restore.
//!
//! A body may also release below the scope's checkpoints by hand (a pop or
//! a restore to an older checkpoint). The arena tracks the lowest depth
//! each side reaches while the scope is open; once a side has gone below
//! its checkpoint, whatever it holds at drop belongs to the caller and the
//! scope leaves that side alone.

use std::ops::{Deref, DerefMut};

use crate::arena::Arena;
use crate::checkpoint::{Bottom, Checkpoint, Top};
use crate::error::Side;

/// Guard that rewinds an arena to its state at creation.
///
/// Created by [`Arena::scope()`]. Derefs to the arena, so every push,
/// partition and nested [`scope`](Arena::scope) goes through the guard.
#[must_use = "dropping the scope immediately restores the arena"]
pub struct ArenaScope<'s, 'buf> {
    arena: &'s mut Arena<'buf>,
    bottom: Checkpoint<Bottom>,
    top: Checkpoint<Top>,
    /// Floors of the enclosing scope, handed back on drop.
    outer_floors: (usize, usize),
}

impl<'buf> Arena<'buf> {
    /// Open a scope that undoes all allocations made within it.
    pub fn scope(&mut self) -> ArenaScope<'_, 'buf> {
        let bottom = self.save();
        let top = self.save_top();
        let outer_floors = (self.open_floor(Side::Bottom), self.open_floor(Side::Top));
        ArenaScope {
            arena: self,
            bottom,
            top,
            outer_floors,
        }
    }

    /// Run `f` inside a scope and return its result.
    ///
    /// ```
    /// use tandem_arena::Arena;
    ///
    /// let mut buf = [0u8; 256];
    /// let mut arena = Arena::new(&mut buf);
    /// let len = arena.with_scope(|scratch| {
    ///     let text = scratch.push_copy(b"temporary").unwrap();
    ///     text.len()
    /// });
    /// assert_eq!(len, 9);
    /// assert_eq!(arena.commit_size(), 0);
    /// ```
    pub fn with_scope<R>(&mut self, f: impl FnOnce(&mut ArenaScope<'_, 'buf>) -> R) -> R {
        let mut scope = self.scope();
        f(&mut scope)
    }
}

impl ArenaScope<'_, '_> {
    /// The bottom checkpoint this scope restores on drop.
    pub fn bottom_checkpoint(&self) -> Checkpoint<Bottom> {
        self.bottom
    }

    /// The top checkpoint this scope restores on drop.
    pub fn top_checkpoint(&self) -> Checkpoint<Top> {
        self.top
    }
}

impl<'buf> Deref for ArenaScope<'_, 'buf> {
    type Target = Arena<'buf>;

    fn deref(&self) -> &Self::Target {
        self.arena
    }
}

impl DerefMut for ArenaScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.arena
    }
}

impl Drop for ArenaScope<'_, '_> {
    fn drop(&mut self) {
        let (outer_bottom, outer_top) = self.outer_floors;
        if self.arena.close_floor(Side::Bottom, outer_bottom) >= self.bottom.depth() {
            if let Err(err) = self.arena.restore(self.bottom) {
                tracing::warn!(%err, "arena scope failed to restore");
            }
        }
        if self.arena.close_floor(Side::Top, outer_top) >= self.top.depth() {
            if let Err(err) = self.arena.restore_top(self.top) {
                tracing::warn!(%err, "arena scope failed to restore");
            }
        }
    }
}
