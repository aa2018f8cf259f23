//! Fixed-arena chunk allocators for Carve.
//!
//! Manages one fixed-size byte arena with explicit chunk bookkeeping:
//! first-fit placement, splitting on allocation, and immediate coalescing
//! on free. Two layouts implement the same [`ChunkAllocator`] contract.
//!
//! # Architecture
//!
//! ```text
//! TableAllocator                      InlineAllocator
//! ├── Arena (Box<[u8]>, data only)    └── Arena (Box<[u8]>)
//! └── DescriptorTable                     └── ChunkHeader per chunk,
//!     ├── Descriptor[max_chunks]              in front of its data,
//!     └── free-slot stack                     linked by offsets
//!
//! ChunkDump: read-only traversal + text report + consistency check
//! ```
//!
//! # Capacity bounds
//!
//! - **Arena bytes:** fixed by [`ArenaConfig::capacity`]. The inline layout
//!   spends [`HEADER_SIZE`] bytes per chunk on metadata.
//! - **Descriptor slots:** fixed by [`ArenaConfig::max_chunks`] (table
//!   layout only). A split needs a free slot; when none is left the request
//!   fails with [`AllocError::DescriptorsExhausted`] even if bytes remain.
//!
//! # Handles
//!
//! Allocations are returned as stamped [`Allocation`] handles rather than
//! raw pointers. `free` looks the handle up by offset and checks its stamp,
//! so double frees, frees of never-allocated offsets and handles from before
//! an `init` are rejected with a [`FreeError`] instead of corrupting the list.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod descriptor;
pub mod dump;
pub mod error;
pub mod header;
pub mod inline;
pub mod table;

// Public re-exports for the primary API surface.
pub use carve_core::{AllocError, Allocation, ChunkAllocator, ChunkLayout, FreeError};
pub use config::ArenaConfig;
pub use dump::ChunkDump;
pub use error::ArenaError;
pub use header::HEADER_SIZE;
pub use inline::InlineAllocator;
pub use table::TableAllocator;
