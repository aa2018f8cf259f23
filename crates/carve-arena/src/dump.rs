//! Read-only chunk list diagnostics.
//!
//! [`ChunkDump`] captures an allocator's chunk list in arena order and
//! renders it as a text table for tests and manual inspection. It doubles
//! as a consistency check: [`ChunkDump::verify`] rejects any list that does
//! not tile the arena exactly, and capturing a list with a gap logs a
//! warning.

use std::fmt;

use carve_core::{ArenaUsage, ChunkAllocator, ChunkInfo, ChunkLayout, ChunkRef};

use crate::error::ArenaError;
use crate::header::HEADER_SIZE;

/// Snapshot of a chunk list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkDump {
    layout: ChunkLayout,
    capacity: u32,
    chunks: Vec<ChunkInfo>,
}

impl ChunkDump {
    /// Traverse `allocator`'s chunk list without mutating it.
    pub fn capture<A: ChunkAllocator + ?Sized>(allocator: &A) -> Self {
        let dump = Self::from_parts(allocator.layout(), allocator.capacity(), allocator.chunks());
        for (index, chunk) in dump.gaps() {
            tracing::warn!(
                index,
                chunk = %chunk.chunk,
                gap = chunk.gap,
                "chunk list gap detected"
            );
        }
        dump
    }

    /// Assemble a dump from an existing traversal.
    pub fn from_parts(layout: ChunkLayout, capacity: u32, chunks: Vec<ChunkInfo>) -> Self {
        Self {
            layout,
            capacity,
            chunks,
        }
    }

    /// Bookkeeping layout of the dumped allocator.
    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// Arena size of the dumped allocator.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Chunks in arena order.
    pub fn chunks(&self) -> &[ChunkInfo] {
        &self.chunks
    }

    /// Chunks with a non-zero gap, with their list positions.
    pub fn gaps(&self) -> impl Iterator<Item = (usize, &ChunkInfo)> {
        self.chunks.iter().enumerate().filter(|(_, c)| c.gap != 0)
    }

    /// Whether any chunk reports a gap or overlap.
    pub fn has_gaps(&self) -> bool {
        self.gaps().next().is_some()
    }

    /// Totals over the dumped list.
    pub fn usage(&self) -> ArenaUsage {
        ArenaUsage::from_chunks(&self.chunks, self.capacity)
    }

    /// Check the list's structural invariants.
    ///
    /// The chunks must tile the arena from its first data offset to its end
    /// with no gap or overlap (accounting for one header per chunk in the
    /// inline layout), each `prev` and `next` link must name the neighbouring
    /// chunk, and no two neighbouring chunks may both be free.
    pub fn verify(&self) -> Result<(), ArenaError> {
        let header = match self.layout {
            ChunkLayout::Table => 0u64,
            ChunkLayout::Inline => HEADER_SIZE as u64,
        };
        if self.chunks.is_empty() {
            return Err(ArenaError::Inconsistent {
                index: 0,
                reason: "chunk list is empty".into(),
            });
        }

        let mut expected = header;
        for (index, chunk) in self.chunks.iter().enumerate() {
            if chunk.offset.0 as u64 != expected {
                return Err(ArenaError::Inconsistent {
                    index,
                    reason: format!(
                        "data starts at {} but {expected} was expected",
                        chunk.offset.0
                    ),
                });
            }
            if chunk.gap != 0 {
                return Err(ArenaError::Inconsistent {
                    index,
                    reason: format!("gap of {} bytes after chunk", chunk.gap),
                });
            }
            let preceding = index.checked_sub(1).map(|i| self.chunks[i].chunk);
            if chunk.prev != preceding {
                return Err(ArenaError::Inconsistent {
                    index,
                    reason: "prev link does not name the preceding chunk".into(),
                });
            }
            let following = self.chunks.get(index + 1);
            if chunk.next != following.map(|f| f.chunk) {
                return Err(ArenaError::Inconsistent {
                    index,
                    reason: "next link does not name the following chunk".into(),
                });
            }
            if let Some(f) = following {
                if chunk.is_free() && f.is_free() {
                    return Err(ArenaError::Inconsistent {
                        index,
                        reason: "two adjacent free chunks left unmerged".into(),
                    });
                }
            }
            expected = chunk.end() + header;
        }

        let end = expected - header;
        if end != self.capacity as u64 {
            return Err(ArenaError::Inconsistent {
                index: self.chunks.len() - 1,
                reason: format!("list ends at {end}, arena ends at {}", self.capacity),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ChunkDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======================= Chunk dump =======================")?;
        writeln!(
            f,
            "layout {}, capacity {} bytes, {} chunks",
            self.layout,
            self.capacity,
            self.chunks.len()
        )?;
        writeln!(
            f,
            "{:>16} {:>10} {:>16} {:>16} {:>10} {:>4}",
            "CHUNK", "OFFSET", "PREVIOUS", "NEXT", "SIZE", "FREE"
        )?;
        let link = |r: Option<ChunkRef>| r.map_or_else(|| "-".to_string(), |r| r.to_string());
        for chunk in &self.chunks {
            writeln!(
                f,
                "{:>16} {:>10} {:>16} {:>16} {:>10} {:>4}",
                chunk.chunk.to_string(),
                chunk.offset.to_string(),
                link(chunk.prev),
                link(chunk.next),
                chunk.size,
                u8::from(chunk.is_free())
            )?;
            if chunk.gap != 0 {
                writeln!(f, "Gap: {:>8} bytes", chunk.gap)?;
            }
        }
        Ok(())
    }
}
