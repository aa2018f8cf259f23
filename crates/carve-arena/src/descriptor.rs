//! Fixed-capacity descriptor table: the chunk registry of the table layout.
//!
//! The [`DescriptorTable`] is a slab of [`Descriptor`] slots plus a stack of
//! unused slot indices. Bound slots are chained through `next` in arena
//! order starting from [`DescriptorTable::head`]. The table never grows: once
//! every slot is bound, splitting a chunk is impossible until a free
//! coalesces two chunks and releases a slot.

use carve_core::{ArenaOffset, SlotIndex, Stamp};

/// Metadata for one chunk in the table layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// Offset of the chunk's first data byte.
    pub offset: ArenaOffset,
    /// Data bytes spanned by the chunk.
    pub size: u32,
    /// Whether the chunk is lent to a caller.
    pub allocated: bool,
    /// Owning allocation, or [`Stamp::NONE`] when free.
    pub stamp: Stamp,
    /// Next chunk in arena order.
    pub next: Option<SlotIndex>,
    /// Whether this slot is bound to a live chunk.
    pub in_use: bool,
}

impl Descriptor {
    /// An unbound slot.
    pub const UNUSED: Self = Self {
        offset: ArenaOffset::ZERO,
        size: 0,
        allocated: false,
        stamp: Stamp::NONE,
        next: None,
        in_use: false,
    };

    /// A bound, free chunk.
    pub fn free_chunk(offset: ArenaOffset, size: u32, next: Option<SlotIndex>) -> Self {
        Self {
            offset,
            size,
            allocated: false,
            stamp: Stamp::NONE,
            next,
            in_use: true,
        }
    }
}

/// Slab of descriptor slots with O(1) acquire and release.
pub struct DescriptorTable {
    slots: Vec<Descriptor>,
    /// Unused slot indices. Popped from the back; seeded in descending order
    /// so a fresh table hands out the lowest index first.
    free_slots: Vec<SlotIndex>,
    head: Option<SlotIndex>,
}

impl DescriptorTable {
    /// Create a table of `capacity` unused slots.
    pub fn new(capacity: u32) -> Self {
        Self {
            slots: vec![Descriptor::UNUSED; capacity as usize],
            free_slots: (0..capacity).rev().map(SlotIndex).collect(),
            head: None,
        }
    }

    /// Unbind every slot, then bind one free chunk spanning `arena_len`
    /// bytes from offset zero.
    ///
    /// A zero-capacity table stays empty.
    pub fn reset(&mut self, arena_len: u32) {
        self.slots.fill(Descriptor::UNUSED);
        self.free_slots.clear();
        self.free_slots
            .extend((0..self.slots.len() as u32).rev().map(SlotIndex));
        self.head = self.acquire();
        if let Some(head) = self.head {
            self.slots[head.index()] = Descriptor::free_chunk(ArenaOffset::ZERO, arena_len, None);
        }
    }

    /// Bind an unused slot, or `None` if every slot is taken.
    ///
    /// The returned slot is marked in use with otherwise default contents;
    /// the caller fills it in.
    pub fn acquire(&mut self) -> Option<SlotIndex> {
        let slot = self.free_slots.pop()?;
        self.slots[slot.index()] = Descriptor {
            in_use: true,
            ..Descriptor::UNUSED
        };
        Some(slot)
    }

    /// Return a slot to the unused pool.
    ///
    /// The slot must already be unlinked from the chunk chain.
    pub fn release(&mut self, slot: SlotIndex) {
        debug_assert!(self.slots[slot.index()].in_use, "double release of {slot}");
        debug_assert_ne!(self.head, Some(slot), "releasing the list head");
        self.slots[slot.index()] = Descriptor::UNUSED;
        self.free_slots.push(slot);
    }

    /// The descriptor in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn get(&self, slot: SlotIndex) -> &Descriptor {
        &self.slots[slot.index()]
    }

    /// Mutable access to the descriptor in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn get_mut(&mut self, slot: SlotIndex) -> &mut Descriptor {
        &mut self.slots[slot.index()]
    }

    /// First chunk in arena order.
    pub fn head(&self) -> Option<SlotIndex> {
        self.head
    }

    /// Walk the chunk chain in arena order.
    ///
    /// Stops after `capacity` steps even if the links form a cycle.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &Descriptor)> {
        let mut cursor = self.head;
        let mut remaining = self.slots.len();
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            let slot = cursor?;
            let desc = &self.slots[slot.index()];
            cursor = desc.next;
            Some((slot, desc))
        })
    }

    /// Total number of slots.
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of bound slots.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    /// Number of unused slots.
    pub fn available(&self) -> usize {
        self.free_slots.len()
    }
}
