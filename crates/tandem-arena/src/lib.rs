//! Fixed-size, dual-ended region allocation for Tandem.
//!
//! An [`Arena`] manages one contiguous byte range with two bump cursors
//! growing toward each other. Allocation is a pointer bump; release is
//! stack-ordered, either by popping a byte count or by restoring a
//! [`Checkpoint`]. Arenas can be carved into child arenas with
//! [`Arena::partition`] to give independent subsystems their own budget.
//!
//! # Architecture
//!
//! ```text
//! HeapBuffer (owned, 16-byte aligned, sized by ArenaConfig)
//! └── Arena (root: bottom cursor ↑, top cursor ↓)
//!     ├── Arena (partition: child of the bottom side)
//!     │   └── ArenaScope (saves both cursors, restores on drop)
//!     └── Arena (partition_top: child of the top side)
//! ScratchRegion (HeapBuffer + fresh Arena per frame)
//! ```
//!
//! # Safety model
//!
//! Regions are `&mut [u8]` borrowed from the arena. Pushing takes `&self`;
//! popping, restoring and resetting take `&mut self`. The borrow checker
//! therefore rejects any release while a region or child arena is still in
//! use. All raw pointer work lives in one private module.
//!
//! # Debug checks
//!
//! Builds with `debug_assertions` keep a ledger of allocation boundaries
//! and reject pops or restores that would split a live allocation with
//! [`ArenaError::LifoViolation`]. Release builds skip the ledger.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod buffer;
pub mod checkpoint;
pub mod config;
pub mod error;
#[cfg(debug_assertions)]
mod ledger;
mod raw;
pub mod scope;
pub mod scratch;
pub mod source;
mod typed;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ArenaStats};
pub use buffer::HeapBuffer;
pub use checkpoint::{Bottom, Checkpoint, Front, Top};
pub use config::{gib, kib, mib, ArenaConfig, OverflowPolicy};
pub use error::{ArenaError, Side};
pub use scope::ArenaScope;
pub use scratch::ScratchRegion;
pub use source::ByteSource;
