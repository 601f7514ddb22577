//! Owned, aligned backing storage for a root arena.
//!
//! A [`HeapBuffer`] is allocated once, zero-initialised, and never grows.
//! Arenas borrow it through [`HeapBuffer::arena`]; dropping the buffer is
//! the only way its memory goes back to the allocator.

use bytemuck::{Pod, Zeroable};

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Allocation unit of a [`HeapBuffer`]. Fixes the base alignment at 16.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
struct Block([u8; 16]);

const BLOCK: usize = std::mem::size_of::<Block>();

/// Heap-allocated byte buffer sized by an [`ArenaConfig`].
pub struct HeapBuffer {
    blocks: Box<[Block]>,
    len: usize,
    config: ArenaConfig,
}

impl HeapBuffer {
    /// Allocate `config.capacity` zeroed bytes, 16-byte aligned.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let len = config.capacity;
        let blocks = vec![Block::zeroed(); len.div_ceil(BLOCK)].into_boxed_slice();
        tracing::debug!(capacity = len, overflow = ?config.overflow, "arena buffer allocated");
        Ok(Self {
            blocks,
            len,
            config,
        })
    }

    /// Usable length in bytes (the configured capacity).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: validation rejects zero capacity.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The config this buffer was created with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// The buffer's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.len]
    }

    /// The buffer's bytes, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..self.len]
    }

    /// Bind an empty root arena over the whole buffer.
    ///
    /// The arena carries this buffer's overflow and poison policies. Bytes
    /// left by a previous arena are not cleared.
    pub fn arena(&mut self) -> Arena<'_> {
        let bytes = &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..self.len];
        Arena::with_config(bytes, &self.config)
    }
}

impl std::fmt::Debug for HeapBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapBuffer")
            .field("len", &self.len)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{kib, OverflowPolicy};

    #[test]
    fn new_allocates_zeroed_capacity() {
        let buffer = HeapBuffer::new(ArenaConfig::new(100)).unwrap();
        assert_eq!(buffer.len(), 100);
        assert!(!buffer.is_empty());
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn base_is_sixteen_byte_aligned() {
        let buffer = HeapBuffer::new(ArenaConfig::new(33)).unwrap();
        assert_eq!(buffer.as_bytes().as_ptr().addr() % 16, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            HeapBuffer::new(ArenaConfig::new(0)),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn arena_spans_whole_buffer() {
        let mut buffer = HeapBuffer::new(ArenaConfig::new(kib(4))).unwrap();
        let arena = buffer.arena();
        assert_eq!(arena.capacity(), 4096);
        assert_eq!(arena.free_size(), 4096);
    }

    #[test]
    fn writes_through_arena_land_in_buffer() {
        let mut buffer = HeapBuffer::new(ArenaConfig::new(8)).unwrap();
        {
            let arena = buffer.arena();
            arena.push_copy(b"ab").unwrap();
            arena.push_copy_top(b"yz").unwrap();
        }
        assert_eq!(buffer.as_bytes(), b"ab\0\0\0\0yz");
        buffer.as_bytes_mut()[2] = b'c';
        assert_eq!(&buffer.as_bytes()[..3], b"abc");
    }

    #[test]
    fn arena_inherits_buffer_policies() {
        let config = ArenaConfig::new(16).with_overflow(OverflowPolicy::Panic);
        let mut buffer = HeapBuffer::new(config).unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let arena = buffer.arena();
            let _ = arena.push(17);
        }));
        assert!(result.is_err());
    }
}
