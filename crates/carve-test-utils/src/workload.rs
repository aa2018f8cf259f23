//! Seeded allocate/free workloads.
//!
//! A [`Workload`] draws operations from a ChaCha8 RNG, so the same seed
//! always yields the same sequence. [`replay`] runs a sequence against any
//! [`ChunkAllocator`] and records where each allocation landed, which makes
//! first-fit placement directly comparable across runs.

use carve_core::{ArenaOffset, ChunkAllocator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::AllocationTracker;

/// One step of a workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Request this many bytes (may be zero).
    Allocate(u32),
    /// Free the live allocation at this position (modulo the live count).
    Free(usize),
}

/// Deterministic generator of [`Op`] sequences.
pub struct Workload {
    rng: ChaCha8Rng,
    max_size: u32,
    free_probability: f64,
}

impl Workload {
    /// Sizes are drawn from `0..=max_size`; roughly 40% of steps free.
    pub fn new(seed: u64, max_size: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_size,
            free_probability: 0.4,
        }
    }

    /// Set the chance that a step frees rather than allocates.
    pub fn free_probability(mut self, p: f64) -> Self {
        self.free_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Draw the next operation. `live` is the number of allocations the
    /// caller currently holds; with none live the step always allocates.
    pub fn next_op(&mut self, live: usize) -> Op {
        if live > 0 && self.rng.random_bool(self.free_probability) {
            Op::Free(self.rng.random_range(0..live))
        } else {
            Op::Allocate(self.rng.random_range(0..=self.max_size))
        }
    }

    /// Draw `n` operations, simulating the live count as if every
    /// allocation succeeded.
    pub fn ops(mut self, n: usize) -> Vec<Op> {
        let mut live = 0usize;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let op = self.next_op(live);
            match op {
                Op::Allocate(0) => {}
                Op::Allocate(_) => live += 1,
                Op::Free(_) => live -= 1,
            }
            out.push(op);
        }
        out
    }
}

/// Run `ops` against `allocator` from its current state.
///
/// Returns, per operation, the offset an allocation landed at (`None` for
/// frees, zero-size requests and failed allocations). Every free targets a
/// live handle, so any rejected free panics.
pub fn replay<A: ChunkAllocator + ?Sized>(
    allocator: &mut A,
    ops: &[Op],
) -> Vec<Option<ArenaOffset>> {
    let mut tracker = AllocationTracker::new();
    ops.iter()
        .map(|&op| match op {
            Op::Allocate(size) => {
                let handle = allocator.allocate(size)?;
                tracker.insert(handle);
                Some(handle.offset())
            }
            Op::Free(index) => {
                if let Some(handle) = tracker.take(index) {
                    if let Err(e) = allocator.free(Some(handle)) {
                        panic!("free of live handle {handle} rejected: {e}");
                    }
                }
                None
            }
        })
        .collect()
}
