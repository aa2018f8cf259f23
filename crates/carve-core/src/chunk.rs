//! Chunk layouts and the read-only chunk records used for diagnostics.

use std::fmt;

use crate::id::{ArenaOffset, SlotIndex};

/// Where a chunk's bookkeeping lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChunkLayout {
    /// Descriptors in a separate fixed-capacity slot table. Chunk data
    /// regions tile the arena back to back.
    #[default]
    Table,
    /// Headers stored in the arena at the front of each chunk. Each chunk's
    /// data is preceded by its header.
    Inline,
}

impl fmt::Display for ChunkLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Inline => write!(f, "inline"),
        }
    }
}

/// Identity of a chunk's bookkeeping record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkRef {
    /// A descriptor slot in the table layout.
    Slot(SlotIndex),
    /// The arena offset of an inline header.
    Header(ArenaOffset),
}

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "slot {slot}"),
            Self::Header(offset) => write!(f, "hdr {offset}"),
        }
    }
}

/// Snapshot of one chunk, produced by a read-only list traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Bookkeeping identity.
    pub chunk: ChunkRef,
    /// Offset of the first data byte.
    pub offset: ArenaOffset,
    /// Usable data bytes, excluding any header.
    pub size: u32,
    /// Whether the chunk is lent to a caller.
    pub allocated: bool,
    /// The preceding chunk in arena order, if any. Read from the header's
    /// back link in the inline layout, taken from the traversal otherwise.
    pub prev: Option<ChunkRef>,
    /// The following chunk in arena order, if any.
    pub next: Option<ChunkRef>,
    /// Bytes between this chunk's data end and where the next chunk begins
    /// (its header in the inline layout, its data otherwise; the arena end
    /// for the last chunk). Zero in a consistent list, negative on overlap.
    pub gap: i64,
}

impl ChunkInfo {
    /// One past the last data byte.
    pub fn end(&self) -> u64 {
        self.offset.0 as u64 + self.size as u64
    }

    /// Whether the chunk is available for allocation.
    pub fn is_free(&self) -> bool {
        !self.allocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_table() {
        assert_eq!(ChunkLayout::default(), ChunkLayout::Table);
    }

    #[test]
    fn chunk_ref_display() {
        assert_eq!(ChunkRef::Slot(SlotIndex(4)).to_string(), "slot #4");
        assert_eq!(
            ChunkRef::Header(ArenaOffset(16)).to_string(),
            "hdr 0x00000010"
        );
    }

    #[test]
    fn info_end_and_free() {
        let info = ChunkInfo {
            chunk: ChunkRef::Slot(SlotIndex(0)),
            offset: ArenaOffset(100),
            size: 50,
            allocated: false,
            prev: None,
            next: None,
            gap: 0,
        };
        assert_eq!(info.end(), 150);
        assert!(info.is_free());
    }
}
