//! Per-frame scratch space.
//!
//! [`ScratchRegion`] owns a [`HeapBuffer`] and lends a fresh, empty arena
//! to each frame. Nothing allocated in one frame is reachable from the
//! next, and the backing allocation is reused across frames.

use crate::arena::Arena;
use crate::buffer::HeapBuffer;
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Reusable scratch arena with frame accounting.
///
/// ```
/// use tandem_arena::{kib, ArenaConfig, ScratchRegion};
///
/// let mut scratch = ScratchRegion::new(ArenaConfig::new(kib(1))).unwrap();
/// for _ in 0..3 {
///     scratch.frame(|arena| {
///         let verts = arena.push_array::<[f32; 2]>(16).unwrap();
///         verts.fill([0.0, 1.0]);
///     });
/// }
/// assert_eq!(scratch.frames(), 3);
/// assert_eq!(scratch.peak_commit(), 128);
/// ```
#[derive(Debug)]
pub struct ScratchRegion {
    buffer: HeapBuffer,
    frames: u64,
    peak_commit: usize,
}

impl ScratchRegion {
    /// Allocate the backing buffer described by `config`.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self {
            buffer: HeapBuffer::new(config)?,
            frames: 0,
            peak_commit: 0,
        })
    }

    /// Run one frame against an empty arena spanning the whole buffer.
    pub fn frame<R>(&mut self, f: impl FnOnce(&mut Arena<'_>) -> R) -> R {
        let mut arena = self.buffer.arena();
        let result = f(&mut arena);
        let stats = arena.stats();
        let peak = stats.bottom_high_water + stats.top_high_water;
        self.frames += 1;
        self.peak_commit = self.peak_commit.max(peak);
        result
    }

    /// Number of completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Largest sum of per-side high-water marks seen in any frame.
    pub fn peak_commit(&self) -> usize {
        self.peak_commit
    }

    /// Bytes available to each frame.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
