//! Allocator counters and point-in-time usage figures.
//!
//! [`AllocatorMetrics`] accumulates per-operation counters between `init`
//! calls. [`ArenaUsage`] is computed on demand from a chunk traversal.

use crate::chunk::ChunkInfo;

/// Cumulative operation counters since the last `init`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocatorMetrics {
    /// Successful allocations.
    pub allocations: u64,
    /// Allocations satisfied by a free chunk of exactly the requested size.
    pub exact_fits: u64,
    /// Allocations that took a whole chunk because the leftover could not
    /// hold a header (inline layout only).
    pub padded_fits: u64,
    /// Allocations that split a free chunk.
    pub splits: u64,
    /// Zero-size requests (answered with no allocation).
    pub zero_size_requests: u64,
    /// Requests rejected because no free chunk was large enough.
    pub out_of_space: u64,
    /// Requests rejected because the descriptor table was full.
    pub descriptors_exhausted: u64,
    /// Successful frees.
    pub frees: u64,
    /// Frees that absorbed the following free chunk.
    pub forward_merges: u64,
    /// Frees that merged into the preceding free chunk.
    pub backward_merges: u64,
    /// Frees rejected as unknown or stale.
    pub rejected_frees: u64,
}

/// Totals derived from the current chunk list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaUsage {
    /// Number of chunks in the list.
    pub chunks: usize,
    /// Number of allocated chunks.
    pub allocated_chunks: usize,
    /// Data bytes in allocated chunks.
    pub allocated_bytes: u64,
    /// Data bytes in free chunks.
    pub free_bytes: u64,
    /// Size of the largest free chunk.
    pub largest_free: u32,
    /// Arena bytes not counted as chunk data (inline headers).
    pub overhead_bytes: u64,
}

impl ArenaUsage {
    /// Sum the chunk list against an arena of `capacity` bytes.
    pub fn from_chunks(chunks: &[ChunkInfo], capacity: u32) -> Self {
        let mut usage = Self {
            chunks: chunks.len(),
            ..Self::default()
        };
        for c in chunks {
            if c.allocated {
                usage.allocated_chunks += 1;
                usage.allocated_bytes += c.size as u64;
            } else {
                usage.free_bytes += c.size as u64;
                usage.largest_free = usage.largest_free.max(c.size);
            }
        }
        usage.overhead_bytes =
            (capacity as u64).saturating_sub(usage.allocated_bytes + usage.free_bytes);
        usage
    }

    /// Fraction of free bytes outside the largest free chunk, in `[0, 1]`.
    ///
    /// Zero when all free space is one chunk (or there is none).
    pub fn fragmentation(&self) -> f64 {
        if self.free_bytes == 0 {
            return 0.0;
        }
        1.0 - self.largest_free as f64 / self.free_bytes as f64
    }
}
