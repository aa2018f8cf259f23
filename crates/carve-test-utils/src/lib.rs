//! Test utilities for Carve development.
//!
//! Provides an [`AllocationTracker`] model of live allocations, consistency
//! assertions over [`ChunkDump`], the canonical allocate/free
//! [`regression_sequence`], and seeded random workloads in [`workload`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod workload;

use carve_arena::ChunkDump;
use carve_core::{Allocation, ArenaOffset, ChunkAllocator};
use indexmap::IndexMap;

pub use workload::{replay, Op, Workload};

/// Panic with the rendered dump if the allocator's chunk list is broken.
pub fn assert_consistent<A: ChunkAllocator + ?Sized>(allocator: &A) {
    let dump = ChunkDump::capture(allocator);
    if let Err(e) = dump.verify() {
        panic!("{e}\n{dump}");
    }
}

/// Model of the allocations a test currently holds.
///
/// Keyed by offset in insertion order (`IndexMap`), so picking "the n-th
/// live allocation" is deterministic for a given operation sequence.
#[derive(Default)]
pub struct AllocationTracker {
    live: IndexMap<ArenaOffset, Allocation>,
}

impl AllocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh allocation.
    ///
    /// # Panics
    ///
    /// Panics if another tracked allocation already starts at the same
    /// offset: the allocator handed out the same region twice.
    pub fn insert(&mut self, allocation: Allocation) {
        if let Some(prev) = self.live.insert(allocation.offset(), allocation) {
            panic!("offset {} handed out twice: {prev} and {allocation}", allocation.offset());
        }
    }

    /// Stop tracking the allocation at position `index % len`.
    pub fn take(&mut self, index: usize) -> Option<Allocation> {
        if self.live.is_empty() {
            return None;
        }
        let index = index % self.live.len();
        self.live.swap_remove_index(index).map(|(_, a)| a)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Total bytes requested by tracked allocations.
    pub fn live_bytes(&self) -> u64 {
        self.live.values().map(|a| a.len() as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Allocation> {
        self.live.values()
    }

    /// Whether every pair of tracked regions is disjoint.
    pub fn is_disjoint(&self) -> bool {
        let mut regions: Vec<_> = self
            .live
            .values()
            .map(|a| (a.offset().0 as u64, a.end()))
            .collect();
        regions.sort_unstable();
        regions.windows(2).all(|w| w[0].1 <= w[1].0)
    }
}

/// Handles produced by [`regression_sequence`], in call order.
#[derive(Debug)]
pub struct RegressionOutcome {
    pub a: Option<Allocation>,
    pub b: Option<Allocation>,
    pub c: Option<Allocation>,
    pub d: Option<Allocation>,
    /// The 200-byte allocation made after B and C were freed.
    pub merged: Option<Allocation>,
    /// First 50-byte allocation after A was freed.
    pub e: Option<Allocation>,
    /// Second 50-byte allocation after A was freed.
    pub f: Option<Allocation>,
}

/// Run the canonical mixed sequence on a freshly initialised allocator.
///
/// `init`; A, B, C, D = allocate(100); free B; free C; allocate(200);
/// free A; allocate(50) twice. A handle that failed to allocate is freed as
/// `free(None)`, which is a no-op.
///
/// # Panics
///
/// Panics if the allocator rejects the free of a handle it just issued.
pub fn regression_sequence<A: ChunkAllocator + ?Sized>(allocator: &mut A) -> RegressionOutcome {
    allocator.init();
    let a = allocator.allocate(100);
    let b = allocator.allocate(100);
    let c = allocator.allocate(100);
    let d = allocator.allocate(100);
    free_issued(allocator, b);
    free_issued(allocator, c);
    let merged = allocator.allocate(200);
    free_issued(allocator, a);
    let e = allocator.allocate(50);
    let f = allocator.allocate(50);
    RegressionOutcome {
        a,
        b,
        c,
        d,
        merged,
        e,
        f,
    }
}

fn free_issued<A: ChunkAllocator + ?Sized>(allocator: &mut A, allocation: Option<Allocation>) {
    if let Err(e) = allocator.free(allocation) {
        panic!("free of issued handle rejected: {e}");
    }
}
