//! First-fit allocator with descriptors in a side table.
//!
//! Chunk data regions tile the arena back to back; all metadata lives in a
//! [`DescriptorTable`]. The table's slot count is a second hard bound next
//! to the arena size: a split needs one unused slot, so a full table makes
//! allocations fail even when the bytes are there.

use carve_core::{
    AllocError, Allocation, AllocatorMetrics, ArenaOffset, ChunkAllocator, ChunkInfo, ChunkLayout,
    ChunkRef, FreeError, SlotIndex, Stamp,
};
use smallvec::SmallVec;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::descriptor::{Descriptor, DescriptorTable};
use crate::error::ArenaError;

/// First-fit allocator over one arena, bookkept in a descriptor table.
pub struct TableAllocator {
    arena: Arena,
    table: DescriptorTable,
    metrics: AllocatorMetrics,
    /// Last stamp handed out. Survives `init` so pre-reset handles stay stale.
    last_stamp: Stamp,
}

impl TableAllocator {
    /// Build and initialise an allocator from `config`.
    ///
    /// Uses `capacity` and `max_chunks`; the `layout` field is not consulted.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        ArenaConfig {
            layout: ChunkLayout::Table,
            ..config.clone()
        }
        .validate()?;
        let mut allocator = Self {
            arena: Arena::new(config.capacity),
            table: DescriptorTable::new(config.max_chunks),
            metrics: AllocatorMetrics::default(),
            last_stamp: Stamp::NONE,
        };
        allocator.init();
        Ok(allocator)
    }

    /// Fixed number of descriptor slots.
    pub fn max_chunks(&self) -> u32 {
        self.table.capacity()
    }

    /// Number of descriptor slots currently bound to chunks.
    pub fn live_descriptors(&self) -> usize {
        self.table.live()
    }

    /// Find the allocated chunk owned by `allocation`.
    ///
    /// Returns the chunk's slot and the slot preceding it in list order.
    fn locate(
        &self,
        allocation: &Allocation,
    ) -> Result<(SlotIndex, Option<SlotIndex>), FreeError> {
        let mut prev = None;
        for (slot, desc) in self.table.iter() {
            if desc.offset == allocation.offset() {
                if !desc.allocated || desc.stamp != allocation.stamp() {
                    return Err(FreeError::StaleHandle {
                        offset: allocation.offset(),
                        stamp: allocation.stamp(),
                    });
                }
                return Ok((slot, prev));
            }
            if desc.offset > allocation.offset() {
                break;
            }
            prev = Some(slot);
        }
        Err(FreeError::UnknownAllocation {
            offset: allocation.offset(),
        })
    }

    /// Bind `size` bytes of the free chunk in `slot`, splitting off the rest.
    fn bind(&mut self, slot: SlotIndex, size: u32) -> Result<Allocation, AllocError> {
        let chunk = *self.table.get(slot);
        if chunk.size > size {
            let Some(remainder) = self.table.acquire() else {
                self.metrics.descriptors_exhausted += 1;
                tracing::debug!(
                    requested = size,
                    slots = self.table.capacity(),
                    "allocation failed: descriptor table exhausted"
                );
                return Err(AllocError::DescriptorsExhausted {
                    capacity: self.table.capacity(),
                });
            };
            *self.table.get_mut(remainder) = Descriptor::free_chunk(
                ArenaOffset(chunk.offset.0 + size),
                chunk.size - size,
                chunk.next,
            );
            let desc = self.table.get_mut(slot);
            desc.size = size;
            desc.next = Some(remainder);
            self.metrics.splits += 1;
            tracing::debug!(
                %slot,
                %remainder,
                size,
                remainder_size = chunk.size - size,
                "split chunk"
            );
        } else {
            self.metrics.exact_fits += 1;
        }

        self.last_stamp = self.last_stamp.next();
        let stamp = self.last_stamp;
        let desc = self.table.get_mut(slot);
        desc.allocated = true;
        desc.stamp = stamp;
        self.arena.zero(chunk.offset, size);
        self.metrics.allocations += 1;
        tracing::trace!(layout = "table", offset = %chunk.offset, size, "allocated");
        Ok(Allocation::new(chunk.offset, size, stamp))
    }
}

impl ChunkAllocator for TableAllocator {
    fn layout(&self) -> ChunkLayout {
        ChunkLayout::Table
    }

    fn init(&mut self) {
        self.table.reset(self.arena.capacity());
        self.metrics = AllocatorMetrics::default();
        tracing::debug!(
            layout = "table",
            capacity = self.arena.capacity(),
            slots = self.table.capacity(),
            "arena initialised"
        );
    }

    fn try_allocate(&mut self, size: u32) -> Result<Option<Allocation>, AllocError> {
        if size == 0 {
            self.metrics.zero_size_requests += 1;
            return Ok(None);
        }
        let mut largest_free = 0;
        let mut cursor = self.table.head();
        while let Some(slot) = cursor {
            let desc = self.table.get(slot);
            if !desc.allocated {
                if desc.size >= size {
                    return self.bind(slot, size).map(Some);
                }
                largest_free = largest_free.max(desc.size);
            }
            cursor = desc.next;
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
        let (slot, prev) = match self.locate(&allocation) {
            Ok(found) => found,
            Err(e) => {
                self.metrics.rejected_frees += 1;
                tracing::warn!(%allocation, error = %e, "rejected free");
                return Err(e);
            }
        };

        let mut released: SmallVec<[SlotIndex; 2]> = SmallVec::new();
        let desc = self.table.get_mut(slot);
        desc.allocated = false;
        desc.stamp = Stamp::NONE;

        if let Some(next) = self.table.get(slot).next {
            let following = *self.table.get(next);
            if !following.allocated {
                let desc = self.table.get_mut(slot);
                desc.size += following.size;
                desc.next = following.next;
                released.push(next);
                self.metrics.forward_merges += 1;
            }
        }

        if let Some(prev) = prev {
            let current = *self.table.get(slot);
            let preceding = self.table.get_mut(prev);
            if !preceding.allocated {
                preceding.size += current.size;
                preceding.next = current.next;
                released.push(slot);
                self.metrics.backward_merges += 1;
            }
        }

        if !released.is_empty() {
            tracing::debug!(released = ?released.as_slice(), "coalesced free chunks");
        }
        for slot in released {
            self.table.release(slot);
        }
        self.metrics.frees += 1;
        tracing::trace!(layout = "table", offset = %allocation.offset(), "freed");
        Ok(())
    }

    fn chunks(&self) -> Vec<ChunkInfo> {
        let capacity = self.arena.capacity() as i64;
        let mut prev = None;
        self.table
            .iter()
            .map(|(slot, desc)| {
                let end = desc.offset.0 as i64 + desc.size as i64;
                let boundary = desc
                    .next
                    .map_or(capacity, |n| self.table.get(n).offset.0 as i64);
                let info = ChunkInfo {
                    chunk: ChunkRef::Slot(slot),
                    offset: desc.offset,
                    size: desc.size,
                    allocated: desc.allocated,
                    prev: prev.map(ChunkRef::Slot),
                    next: desc.next.map(ChunkRef::Slot),
                    gap: boundary - end,
                };
                prev = Some(slot);
                info
            })
            .collect()
    }

    fn bytes(&self, allocation: &Allocation) -> Option<&[u8]> {
        let (slot, _) = self.locate(allocation).ok()?;
        if allocation.len() > self.table.get(slot).size {
            return None;
        }
        self.arena.slice(allocation.offset(), allocation.len())
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> Option<&mut [u8]> {
        let (slot, _) = self.locate(allocation).ok()?;
        if allocation.len() > self.table.get(slot).size {
            return None;
        }
        self.arena.slice_mut(allocation.offset(), allocation.len())
    }

    fn capacity(&self) -> u32 {
        self.arena.capacity()
    }

    fn usable_capacity(&self) -> u32 {
        self.arena.capacity()
    }

    fn metrics(&self) -> &AllocatorMetrics {
        &self.metrics
    }
}
