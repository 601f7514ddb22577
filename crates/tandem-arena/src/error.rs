//! Arena-specific error types.

use std::fmt;

use thiserror::Error;

/// Which growth front of an arena an operation applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Grows upward from offset 0.
    Bottom,
    /// Grows downward from the arena's capacity.
    Top,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bottom => write!(f, "bottom"),
            Self::Top => write!(f, "top"),
        }
    }
}

/// Errors that can occur during arena operations.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A push or partition asked for more bytes than are free.
    #[error("arena capacity exceeded: requested {requested} bytes, {available} bytes free")]
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Free bytes between the two cursors at the time of the request.
        available: usize,
    },
    /// A pop released more bytes than the side currently holds.
    #[error("{side} pop of {requested} bytes underflows: only {committed} bytes committed")]
    Underflow {
        /// Number of bytes the caller tried to release.
        requested: usize,
        /// Bytes committed on that side.
        committed: usize,
        /// The side being popped.
        side: Side,
    },
    /// A restore target that cannot belong to the current allocation stack.
    #[error("invalid {side} checkpoint {checkpoint}: cursor is at {cursor}")]
    InvalidCheckpoint {
        /// Side-relative depth recorded in the checkpoint.
        checkpoint: usize,
        /// Side-relative depth of the cursor when restore was attempted.
        cursor: usize,
        /// The side being restored.
        side: Side,
    },
    /// A release that would land inside a live allocation.
    ///
    /// Only produced by builds with `debug_assertions`.
    #[error("{side} release to depth {cursor} splits a live allocation")]
    LifoViolation {
        /// The side being released.
        side: Side,
        /// Side-relative depth the cursor would have moved to.
        cursor: usize,
    },
    /// A typed push found its cursor off the element type's alignment.
    ///
    /// Pad first with [`Arena::align_to`](crate::Arena::align_to) and pop
    /// the padding explicitly afterwards.
    #[error("{side} cursor at depth {depth} is not aligned to {align} bytes")]
    Misaligned {
        /// The side being pushed.
        side: Side,
        /// Side-relative depth of the cursor.
        depth: usize,
        /// Alignment the element type requires.
        align: usize,
    },
    /// An [`ArenaConfig`](crate::ArenaConfig) failed validation.
    #[error("invalid arena config: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A [`ByteSource`](crate::ByteSource) wrote a different number of bytes
    /// than it announced.
    #[error("byte source announced {expected} bytes but produced {actual}")]
    SourceLength {
        /// Length reported by `byte_len()`.
        expected: usize,
        /// Length reported by `read_into()`.
        actual: usize,
    },
}
