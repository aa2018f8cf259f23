//! Inline chunk headers.
//!
//! In the inline layout every chunk is preceded by a fixed-size header
//! stored in the arena itself. Links are arena offsets of neighbouring
//! headers, not addresses, so a header can be read and written through the
//! [`Arena`]'s bounds-checked byte API.
//!
//! ```text
//! byte  0        4        8        12       16
//!       ┌────────┬────────┬────────┬────────┐
//!       │  prev  │  next  │  size  │ stamp  │  little-endian u32s
//!       └────────┴────────┴────────┴────────┘
//! ```
//!
//! `prev`/`next` hold `u32::MAX` at the list ends. `stamp` is zero for a free
//! chunk and the owning allocation's stamp otherwise.

use carve_core::{ArenaOffset, Stamp};

use crate::arena::Arena;

/// Bytes occupied by one inline header.
pub const HEADER_SIZE: u32 = 16;

/// Link value marking "no neighbour".
pub(crate) const NIL: u32 = u32::MAX;

/// Decoded inline header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Header offset of the preceding chunk.
    pub prev: Option<ArenaOffset>,
    /// Header offset of the following chunk.
    pub next: Option<ArenaOffset>,
    /// Data bytes after this header.
    pub size: u32,
    /// Owning allocation, or [`Stamp::NONE`] when free.
    pub stamp: Stamp,
}

impl ChunkHeader {
    /// A free header with the given links and size.
    pub fn free(prev: Option<ArenaOffset>, next: Option<ArenaOffset>, size: u32) -> Self {
        Self {
            prev,
            next,
            size,
            stamp: Stamp::NONE,
        }
    }

    /// Whether the chunk is lent to a caller.
    pub fn is_allocated(&self) -> bool {
        !self.stamp.is_none()
    }

    /// Serialise to the on-arena representation.
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        out[0..4].copy_from_slice(&encode_link(self.prev).to_le_bytes());
        out[4..8].copy_from_slice(&encode_link(self.next).to_le_bytes());
        out[8..12].copy_from_slice(&self.size.to_le_bytes());
        out[12..16].copy_from_slice(&self.stamp.0.to_le_bytes());
        out
    }

    /// Parse the on-arena representation.
    pub fn decode(bytes: &[u8; HEADER_SIZE as usize]) -> Self {
        let word =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self {
            prev: decode_link(word(0)),
            next: decode_link(word(4)),
            size: word(8),
            stamp: Stamp(word(12)),
        }
    }
}

fn encode_link(link: Option<ArenaOffset>) -> u32 {
    link.map_or(NIL, |o| o.0)
}

fn decode_link(raw: u32) -> Option<ArenaOffset> {
    (raw != NIL).then_some(ArenaOffset(raw))
}

/// Data offset of the chunk whose header sits at `header`.
pub(crate) fn data_offset(header: ArenaOffset) -> ArenaOffset {
    ArenaOffset(header.0 + HEADER_SIZE)
}

impl Arena {
    /// Read the header stored at `at`.
    ///
    /// # Panics
    ///
    /// Panics if the header would extend past the arena end. Header offsets
    /// come from the allocator's own links, never from callers.
    pub fn read_header(&self, at: ArenaOffset) -> ChunkHeader {
        ChunkHeader::decode(&self.read_array(at))
    }

    /// Store `header` at `at`.
    ///
    /// # Panics
    ///
    /// Panics if the header would extend past the arena end.
    pub fn write_header(&mut self, at: ArenaOffset, header: &ChunkHeader) {
        self.write_array(at, &header.encode());
    }
}
