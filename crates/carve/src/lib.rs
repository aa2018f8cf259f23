//! Carve: first-fit chunk allocators over a single fixed byte arena.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Carve sub-crates. For most users, adding `carve` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use carve::prelude::*;
//!
//! // 1 MiB arena, descriptors in a side table.
//! let mut arena = ArenaConfig::table().build().unwrap();
//!
//! let a = arena.allocate(100).unwrap();
//! let b = arena.allocate(100).unwrap();
//! assert_eq!(b.offset(), ArenaOffset(100));
//!
//! arena.bytes_mut(&a).unwrap()[..5].copy_from_slice(b"hello");
//! assert_eq!(&arena.bytes(&a).unwrap()[..5], b"hello");
//!
//! // Freeing A then B coalesces everything back into one free chunk.
//! arena.free(Some(a)).unwrap();
//! arena.free(Some(b)).unwrap();
//! assert_eq!(arena.chunks().len(), 1);
//!
//! // A second free of the same handle is rejected.
//! assert!(matches!(arena.free(Some(a)), Err(FreeError::StaleHandle { .. })));
//!
//! let dump = ChunkDump::capture(&*arena);
//! assert!(dump.verify().is_ok());
//! println!("{dump}");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `carve-core` | Offsets, handles, chunk info, errors, metrics, `ChunkAllocator` |
//! | [`arena`] | `carve-arena` | Table and inline allocators, config, chunk dump |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`carve-core`).
///
/// Contains the [`types::Allocation`] handle, [`types::ChunkInfo`] records,
/// error types, metrics, and the [`types::ChunkAllocator`] trait.
pub use carve_core as types;

/// Allocator implementations and diagnostics (`carve-arena`).
///
/// [`arena::TableAllocator`] keeps descriptors in a fixed side table,
/// [`arena::InlineAllocator`] stores a header in front of each chunk.
/// [`arena::ChunkDump`] renders and verifies either.
pub use carve_arena as arena;

/// Common imports for typical Carve usage.
///
/// ```rust
/// use carve::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use carve_core::{
        Allocation, AllocatorMetrics, ArenaOffset, ArenaUsage, ChunkAllocator, ChunkInfo,
        ChunkLayout,
    };

    // Errors
    pub use carve_arena::ArenaError;
    pub use carve_core::{AllocError, FreeError};

    // Allocators
    pub use carve_arena::{ArenaConfig, ChunkDump, InlineAllocator, TableAllocator};
}
