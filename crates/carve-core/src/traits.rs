//! The allocator contract shared by both chunk layouts.

use crate::chunk::{ChunkInfo, ChunkLayout};
use crate::error::{AllocError, FreeError};
use crate::handle::Allocation;
use crate::metrics::{AllocatorMetrics, ArenaUsage};

/// A first-fit allocator over one fixed-size byte arena.
///
/// Implementations keep an address-ordered chunk list that partitions the
/// whole arena, split free chunks on allocation and coalesce neighbours on
/// every free. Both layouts honour the same external contract; they differ
/// only in where chunk metadata lives and therefore in
/// [`usable_capacity`](ChunkAllocator::usable_capacity).
///
/// Single-threaded: every mutating operation takes `&mut self`.
pub trait ChunkAllocator {
    /// Which bookkeeping layout this allocator uses.
    fn layout(&self) -> ChunkLayout;

    /// Reset to a single free chunk spanning the arena.
    ///
    /// Discards every binding; handles issued before the reset become stale.
    /// Counters in [`metrics`](ChunkAllocator::metrics) restart from zero.
    fn init(&mut self);

    /// Allocate exactly `size` bytes, reporting why a request failed.
    ///
    /// Returns `Ok(None)` for `size == 0` without touching the chunk list or
    /// arena; only the `zero_size_requests` counter moves. On error the
    /// chunk list and arena are unchanged.
    fn try_allocate(&mut self, size: u32) -> Result<Option<Allocation>, AllocError>;

    /// Allocate exactly `size` bytes, or `None` if no region can be produced.
    ///
    /// Collapses every failure reason of
    /// [`try_allocate`](ChunkAllocator::try_allocate) into `None`.
    fn allocate(&mut self, size: u32) -> Option<Allocation> {
        self.try_allocate(size).ok().flatten()
    }

    /// Release an allocation and coalesce it with free neighbours.
    ///
    /// `None` is a no-op. Unknown or stale handles are rejected without
    /// mutating anything.
    fn free(&mut self, allocation: Option<Allocation>) -> Result<(), FreeError>;

    /// Read-only traversal of the chunk list in arena order.
    fn chunks(&self) -> Vec<ChunkInfo>;

    /// The bytes lent by `allocation`, or `None` if the handle is stale.
    fn bytes(&self, allocation: &Allocation) -> Option<&[u8]>;

    /// Mutable view of the bytes lent by `allocation`, or `None` if stale.
    fn bytes_mut(&mut self, allocation: &Allocation) -> Option<&mut [u8]>;

    /// Total arena size in bytes.
    fn capacity(&self) -> u32;

    /// Largest request a freshly initialised arena can satisfy.
    fn usable_capacity(&self) -> u32;

    /// Operation counters since the last [`init`](ChunkAllocator::init).
    fn metrics(&self) -> &AllocatorMetrics;

    /// Totals over the current chunk list.
    fn usage(&self) -> ArenaUsage {
        ArenaUsage::from_chunks(&self.chunks(), self.capacity())
    }
}
