//! Benchmark profiles and utilities for Carve allocators.
//!
//! Provides pre-built [`ArenaConfig`] profiles and workloads for benchmarking:
//!
//! - [`reference_profile`]: 1 MiB arena, 201 descriptor slots
//! - [`stress_profile`]: 16 MiB arena, 4097 descriptor slots
//! - [`churn_ops`]: deterministic mixed allocate/free sequence via seed
//! - [`fragmented`]: an allocator with every other chunk freed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use carve_arena::{ArenaConfig, ChunkAllocator, ChunkLayout};
use carve_test_utils::{Op, Workload};

/// Build the reference benchmark profile: 1 MiB arena.
///
/// Uses the default descriptor budget (100 allocations plus remainders).
pub fn reference_profile(layout: ChunkLayout) -> ArenaConfig {
    ArenaConfig::new(layout)
}

/// Build a stress benchmark profile: 16 MiB arena.
///
/// Same shape as [`reference_profile`] with room for ~2K live allocations.
pub fn stress_profile(layout: ChunkLayout) -> ArenaConfig {
    ArenaConfig::new(layout)
        .with_capacity(16 << 20)
        .with_max_chunks(2048 * 2 + 1)
}

/// Generate `n` deterministic operations with request sizes up to 4 KiB.
pub fn churn_ops(seed: u64, n: usize) -> Vec<Op> {
    Workload::new(seed, 4096).ops(n)
}

/// Build an allocator from `config` holding `count` allocations of `size`
/// bytes, with every even-numbered one freed again.
///
/// Leaves alternating free holes ahead of the tail, which is the worst case
/// for a first-fit scan that must step over them.
pub fn fragmented(config: &ArenaConfig, count: usize, size: u32) -> Box<dyn ChunkAllocator> {
    let mut allocator = match config.build() {
        Ok(a) => a,
        Err(e) => panic!("benchmark profile rejected: {e}"),
    };
    let handles: Vec<_> = (0..count).map(|_| allocator.allocate(size)).collect();
    for h in handles.into_iter().step_by(2) {
        if let Err(e) = allocator.free(h) {
            panic!("benchmark setup free rejected: {e}");
        }
    }
    allocator
}
