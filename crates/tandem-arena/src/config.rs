//! Arena configuration parameters.

use crate::error::ArenaError;

/// `n` kibibytes in bytes.
pub const fn kib(n: usize) -> usize {
    n * 1024
}

/// `n` mebibytes in bytes.
pub const fn mib(n: usize) -> usize {
    kib(n) * 1024
}

/// `n` gibibytes in bytes.
pub const fn gib(n: usize) -> usize {
    mib(n) * 1024
}

/// What a push does when the arena cannot satisfy it.
///
/// The default is [`OverflowPolicy::Error`] in every build profile; debug
/// builds only log the failure at `warn`. Use
/// [`OverflowPolicy::diagnostics`] to panic in debug builds and return
/// errors in release builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Return [`ArenaError::CapacityExceeded`] and leave the arena untouched.
    #[default]
    Error,
    /// Panic at the call site, so an undersized arena fails loudly.
    Panic,
}

impl OverflowPolicy {
    /// [`OverflowPolicy::Panic`] when built with `debug_assertions`,
    /// [`OverflowPolicy::Error`] otherwise.
    pub const fn diagnostics() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Error
        }
    }
}

/// Configuration for a root arena and its backing buffer.
///
/// Validated by [`ArenaConfig::validate`]; [`HeapBuffer::new`](crate::HeapBuffer::new)
/// refuses invalid configs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the backing buffer in bytes.
    ///
    /// Default: 64MB. Must be non-zero and at most [`Self::MAX_CAPACITY`].
    pub capacity: usize,

    /// Behaviour on capacity exhaustion. Inherited by partitions.
    pub overflow: OverflowPolicy,

    /// Byte written over every region released by `pop*` or `restore*`.
    ///
    /// `None` (the default) leaves released bytes untouched.
    pub poison: Option<u8>,
}

impl ArenaConfig {
    /// Default buffer size: 64MB.
    pub const DEFAULT_CAPACITY: usize = mib(64);

    /// Largest capacity a config may request.
    pub const MAX_CAPACITY: usize = isize::MAX as usize / 2;

    /// Create a config for the given capacity with default policies.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            overflow: OverflowPolicy::default(),
            poison: None,
        }
    }

    /// Set the overflow policy.
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Poison released bytes with `byte`.
    pub fn with_poison(mut self, byte: u8) -> Self {
        self.poison = Some(byte);
        self
    }

    /// Check the config for values the arena cannot honour.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity must be non-zero".into(),
            });
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "capacity must be <= {} bytes (got {})",
                    Self::MAX_CAPACITY,
                    self.capacity,
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
