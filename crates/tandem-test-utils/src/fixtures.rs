//! Reusable arena test fixtures.
//!
//! - [`arena_buffer`]: a heap buffer whose arenas poison released bytes.
//! - [`stamp`] / [`is_stamped`]: tag a region and check the tag survived,
//!   for overlap and disjointness tests.
//! - [`init_tracing`]: route `tracing` output to the test harness.

use tandem_arena::{ArenaConfig, HeapBuffer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Byte written over released regions by [`arena_buffer`] arenas.
pub const POISON: u8 = 0xA5;

/// A buffer of `capacity` bytes whose arenas poison released bytes.
///
/// # Panics
///
/// Panics if `capacity` is not a valid arena capacity.
pub fn arena_buffer(capacity: usize) -> HeapBuffer {
    HeapBuffer::new(ArenaConfig::new(capacity).with_poison(POISON))
        .expect("fixture capacity must be valid")
}

/// Fill `region` with a pattern derived from `tag`.
pub fn stamp(region: &mut [u8], tag: u8) {
    for (i, byte) in region.iter_mut().enumerate() {
        *byte = tag.wrapping_add(i as u8);
    }
}

/// Whether `region` still holds the pattern written by [`stamp`].
pub fn is_stamped(region: &[u8], tag: u8) -> bool {
    region
        .iter()
        .enumerate()
        .all(|(i, &byte)| byte == tag.wrapping_add(i as u8))
}

/// Install a test-writer subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}
