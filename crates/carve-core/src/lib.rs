//! Core types and traits for the Carve chunk allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by both chunk layouts: arena offsets and slot
//! indices, the [`Allocation`] handle, diagnostic chunk records, error
//! types, metrics, and the [`ChunkAllocator`] trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chunk;
pub mod error;
pub mod handle;
pub mod id;
pub mod metrics;
pub mod traits;

pub use chunk::{ChunkInfo, ChunkLayout, ChunkRef};
pub use error::{AllocError, FreeError};
pub use handle::Allocation;
pub use id::{ArenaOffset, SlotIndex, Stamp};
pub use metrics::{AllocatorMetrics, ArenaUsage};
pub use traits::ChunkAllocator;
