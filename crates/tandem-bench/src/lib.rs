//! Benchmark workloads for Tandem arenas.
//!
//! Provides frame profiles shared by the criterion benches:
//!
//! - [`reference_profile`]: 64 scratch allocations of 16..=1024 bytes in 1MB
//! - [`stress_profile`]: 1024 scratch allocations of 8..=4096 bytes in 16MB
//! - [`allocation_sizes`]: deterministic size sequence via seed
//! - [`run_frame`]: one scoped frame of top-side scratch pushes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tandem_arena::{mib, Arena, ArenaError};

/// Shape of one simulated frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameProfile {
    /// Scratch pushes per frame.
    pub scratch_allocs: usize,
    /// Smallest push, in bytes.
    pub min_len: usize,
    /// Largest push, in bytes (inclusive).
    pub max_len: usize,
    /// Backing buffer size; fits a whole frame at `max_len` per push.
    pub capacity: usize,
}

/// A light frame: a few dozen small-to-medium scratch buffers.
pub fn reference_profile() -> FrameProfile {
    FrameProfile {
        scratch_allocs: 64,
        min_len: 16,
        max_len: 1024,
        capacity: mib(1),
    }
}

/// A heavy frame: a thousand scratch buffers up to a page each.
pub fn stress_profile() -> FrameProfile {
    FrameProfile {
        scratch_allocs: 1024,
        min_len: 8,
        max_len: 4096,
        capacity: mib(16),
    }
}

/// Generate the push sizes for one frame of `profile`.
///
/// The same seed always yields the same sequence.
pub fn allocation_sizes(profile: &FrameProfile, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let span = (profile.max_len - profile.min_len + 1) as u64;
    (0..profile.scratch_allocs)
        .map(|_| profile.min_len + (rng.next_u64() % span) as usize)
        .collect()
}

/// Push every size on the top side inside a scope and return the bytes
/// pushed. The arena is back to its prior state afterwards.
pub fn run_frame(arena: &mut Arena<'_>, sizes: &[usize]) -> Result<usize, ArenaError> {
    arena.with_scope(|frame| {
        sizes
            .iter()
            .try_fold(0, |total, &len| {
                Ok::<_, ArenaError>(total + frame.push_top(len)?.len())
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_arena::{ArenaConfig, HeapBuffer};

    #[test]
    fn allocation_sizes_stay_in_range() {
        let profile = reference_profile();
        let sizes = allocation_sizes(&profile, 42);
        assert_eq!(sizes.len(), 64);
        for &len in &sizes {
            assert!((16..=1024).contains(&len), "size {len} out of range");
        }
    }

    #[test]
    fn allocation_sizes_deterministic() {
        let profile = stress_profile();
        assert_eq!(allocation_sizes(&profile, 7), allocation_sizes(&profile, 7));
        assert_ne!(allocation_sizes(&profile, 7), allocation_sizes(&profile, 8));
    }

    #[test]
    fn profiles_fit_a_worst_case_frame() {
        for profile in [reference_profile(), stress_profile()] {
            assert!(profile.scratch_allocs * profile.max_len <= profile.capacity);
        }
    }

    #[test]
    fn run_frame_leaves_arena_empty() {
        let profile = reference_profile();
        let sizes = allocation_sizes(&profile, 1);
        let mut buffer = HeapBuffer::new(ArenaConfig::new(profile.capacity)).unwrap();
        let mut arena = buffer.arena();
        let pushed = run_frame(&mut arena, &sizes).unwrap();
        assert_eq!(pushed, sizes.iter().sum::<usize>());
        assert_eq!(arena.commit_size(), 0);
        assert_eq!(arena.stats().top_high_water, pushed);
    }
}
