//! First-fit allocator with chunk headers stored in the arena.
//!
//! Every chunk, including the first, is a [`ChunkHeader`] followed by its
//! data bytes:
//!
//! ```text
//! 0        16             16+a   32+a            C
//! ┌────────┬──────────────┬──────┬───────────────┐
//! │ hdr A  │   A (alloc)  │ hdr B│   B (free)    │
//! └────────┴──────────────┴──────┴───────────────┘
//! ```
//!
//! No side table exists, so the chunk count is bounded only by arena bytes.
//! Splitting costs [`HEADER_SIZE`] bytes for the remainder's header, and
//! coalescing gives the absorbed header's bytes back as data.

use carve_core::{
    AllocError, Allocation, AllocatorMetrics, ArenaOffset, ChunkAllocator, ChunkInfo, ChunkLayout,
    ChunkRef, FreeError, Stamp,
};

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::header::{data_offset, ChunkHeader, HEADER_SIZE};

/// The first header always sits at the start of the arena. Merges only ever
/// fold a chunk into its predecessor, so the head never moves.
const HEAD: ArenaOffset = ArenaOffset::ZERO;

/// First-fit allocator over one arena, bookkept in inline headers.
pub struct InlineAllocator {
    arena: Arena,
    metrics: AllocatorMetrics,
    /// Last stamp handed out. Survives `init` so pre-reset handles stay stale.
    last_stamp: Stamp,
}

impl InlineAllocator {
    /// Build and initialise an allocator from `config`.
    ///
    /// Uses `capacity` only; the `layout` and `max_chunks` fields are not
    /// consulted.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        ArenaConfig {
            layout: ChunkLayout::Inline,
            ..config.clone()
        }
        .validate()?;
        let mut allocator = Self {
            arena: Arena::new(config.capacity),
            metrics: AllocatorMetrics::default(),
            last_stamp: Stamp::NONE,
        };
        allocator.init();
        Ok(allocator)
    }

    /// Upper bound on list length, used to stop traversals of a corrupt list.
    fn max_chunks(&self) -> usize {
        (self.arena.capacity() / HEADER_SIZE) as usize
    }

    /// Walk header offsets in arena order.
    ///
    /// Stops early on a link that would place a header past the arena end.
    fn headers(&self) -> impl Iterator<Item = (ArenaOffset, ChunkHeader)> + '_ {
        let mut cursor = Some(HEAD);
        let mut remaining = self.max_chunks();
        let capacity = self.arena.capacity() as u64;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let at = cursor?;
            if at.0 as u64 + HEADER_SIZE as u64 > capacity {
                return None;
            }
            let header = self.arena.read_header(at);
            cursor = header.next;
            Some((at, header))
        })
    }

    /// Find the allocated chunk owned by `allocation`.
    ///
    /// Caller offsets are never dereferenced: the chunk is found by walking
    /// the list and comparing data offsets.
    fn locate(&self, allocation: &Allocation) -> Result<(ArenaOffset, ChunkHeader), FreeError> {
        for (at, header) in self.headers() {
            let data = data_offset(at);
            if data == allocation.offset() {
                if !header.is_allocated() || header.stamp != allocation.stamp() {
                    return Err(FreeError::StaleHandle {
                        offset: allocation.offset(),
                        stamp: allocation.stamp(),
                    });
                }
                return Ok((at, header));
            }
            if data > allocation.offset() {
                break;
            }
        }
        Err(FreeError::UnknownAllocation {
            offset: allocation.offset(),
        })
    }

    fn set_prev(&mut self, at: ArenaOffset, prev: Option<ArenaOffset>) {
        let mut header = self.arena.read_header(at);
        header.prev = prev;
        self.arena.write_header(at, &header);
    }

    /// Bind `size` bytes of the free chunk at `at`.
    ///
    /// Splits when the leftover can hold a header and at least one data
    /// byte; otherwise the whole chunk is handed out.
    fn bind(&mut self, at: ArenaOffset, mut header: ChunkHeader, size: u32) -> Allocation {
        let leftover = header.size - size;
        if leftover > HEADER_SIZE {
            let remainder_at = ArenaOffset(at.0 + HEADER_SIZE + size);
            let remainder = ChunkHeader::free(Some(at), header.next, leftover - HEADER_SIZE);
            self.arena.write_header(remainder_at, &remainder);
            if let Some(next) = header.next {
                self.set_prev(next, Some(remainder_at));
            }
            header.next = Some(remainder_at);
            header.size = size;
            self.metrics.splits += 1;
            tracing::debug!(
                header = %at,
                remainder = %remainder_at,
                size,
                remainder_size = remainder.size,
                "split chunk"
            );
        } else if leftover == 0 {
            self.metrics.exact_fits += 1;
        } else {
            self.metrics.padded_fits += 1;
        }

        self.last_stamp = self.last_stamp.next();
        header.stamp = self.last_stamp;
        self.arena.write_header(at, &header);
        let data = data_offset(at);
        self.arena.zero(data, header.size);
        self.metrics.allocations += 1;
        tracing::trace!(layout = "inline", offset = %data, size, "allocated");
        Allocation::new(data, size, header.stamp)
    }
}

impl ChunkAllocator for InlineAllocator {
    fn layout(&self) -> ChunkLayout {
        ChunkLayout::Inline
    }

    fn init(&mut self) {
        let size = self.arena.capacity() - HEADER_SIZE;
        self.arena.write_header(HEAD, &ChunkHeader::free(None, None, size));
        self.metrics = AllocatorMetrics::default();
        tracing::debug!(
            layout = "inline",
            capacity = self.arena.capacity(),
            "arena initialised"
        );
    }

    fn try_allocate(&mut self, size: u32) -> Result<Option<Allocation>, AllocError> {
        if size == 0 {
            self.metrics.zero_size_requests += 1;
            return Ok(None);
        }
        let mut largest_free = 0;
        let mut found = None;
        for (at, header) in self.headers() {
            if header.is_allocated() {
                continue;
            }
            if header.size >= size {
                found = Some((at, header));
                break;
            }
            largest_free = largest_free.max(header.size);
        }
        if let Some((at, header)) = found {
            return Ok(Some(self.bind(at, header, size)));
        }
        self.metrics.out_of_space += 1;
        tracing::debug!(requested = size, largest_free, "allocation failed: out of space");
        Err(AllocError::OutOfSpace {
            requested: size,
            largest_free,
        })
    }

    fn free(&mut self, allocation: Option<Allocation>) -> Result<(), FreeError> {
        let Some(allocation) = allocation else {
            return Ok(());
        };
        let (at, mut header) = match self.locate(&allocation) {
            Ok(found) => found,
            Err(e) => {
                self.metrics.rejected_frees += 1;
                tracing::warn!(%allocation, error = %e, "rejected free");
                return Err(e);
            }
        };
        header.stamp = Stamp::NONE;

        if let Some(next_at) = header.next {
            let next = self.arena.read_header(next_at);
            if !next.is_allocated() {
                header.size += HEADER_SIZE + next.size;
                header.next = next.next;
                if let Some(after) = next.next {
                    self.set_prev(after, Some(at));
                }
                self.metrics.forward_merges += 1;
                tracing::debug!(header = %at, absorbed = %next_at, "coalesced forward");
            }
        }
        self.arena.write_header(at, &header);

        if let Some(prev_at) = header.prev {
            let mut prev = self.arena.read_header(prev_at);
            if !prev.is_allocated() {
                prev.size += HEADER_SIZE + header.size;
                prev.next = header.next;
                self.arena.write_header(prev_at, &prev);
                if let Some(after) = header.next {
                    self.set_prev(after, Some(prev_at));
                }
                self.metrics.backward_merges += 1;
                tracing::debug!(header = %prev_at, absorbed = %at, "coalesced backward");
            }
        }

        self.metrics.frees += 1;
        tracing::trace!(layout = "inline", offset = %allocation.offset(), "freed");
        Ok(())
    }

    fn chunks(&self) -> Vec<ChunkInfo> {
        let capacity = self.arena.capacity() as i64;
        self.headers()
            .map(|(at, header)| {
                let data = data_offset(at);
                let end = data.0 as i64 + header.size as i64;
                let boundary = header.next.map_or(capacity, |n| n.0 as i64);
                ChunkInfo {
                    chunk: ChunkRef::Header(at),
                    offset: data,
                    size: header.size,
                    allocated: header.is_allocated(),
                    prev: header.prev.map(ChunkRef::Header),
                    next: header.next.map(ChunkRef::Header),
                    gap: boundary - end,
                }
            })
            .collect()
    }

    fn bytes(&self, allocation: &Allocation) -> Option<&[u8]> {
        let (_, header) = self.locate(allocation).ok()?;
        if allocation.len() > header.size {
            return None;
        }
        self.arena.slice(allocation.offset(), allocation.len())
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> Option<&mut [u8]> {
        let (_, header) = self.locate(allocation).ok()?;
        if allocation.len() > header.size {
            return None;
        }
        self.arena.slice_mut(allocation.offset(), allocation.len())
    }

    fn capacity(&self) -> u32 {
        self.arena.capacity()
    }

    fn usable_capacity(&self) -> u32 {
        self.arena.capacity() - HEADER_SIZE
    }

    fn metrics(&self) -> &AllocatorMetrics {
        &self.metrics
    }
}
