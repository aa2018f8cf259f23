//! Strongly-typed offsets, slot indices, and ownership stamps.

use std::fmt;

/// Byte offset into the arena.
///
/// Offsets are `u32`: an arena never exceeds `u32::MAX` bytes, and every
/// chunk boundary fits in one machine word of bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaOffset(pub u32);

impl ArenaOffset {
    /// Offset zero, the start of the arena.
    pub const ZERO: Self = Self(0);

    /// The offset as a `usize` index into the arena's byte buffer.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArenaOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for ArenaOffset {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a descriptor slot in a fixed-capacity descriptor table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The slot index as a `usize` for table lookups.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for SlotIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Ownership stamp tying an [`Allocation`](crate::Allocation) to one
/// binding of a chunk.
///
/// Every successful allocation draws a fresh nonzero stamp; the chunk
/// records it until freed. A handle whose stamp no longer matches its
/// chunk is stale. [`Stamp::NONE`] marks a free chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stamp(pub u32);

impl Stamp {
    /// The stamp carried by free chunks.
    pub const NONE: Self = Self(0);

    /// The stamp following this one, skipping [`Stamp::NONE`] on wraparound.
    pub fn next(self) -> Self {
        match self.0.wrapping_add(1) {
            0 => Self(1),
            v => Self(v),
        }
    }

    /// Whether this is the free-chunk stamp.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
