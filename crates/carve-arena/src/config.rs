//! Arena configuration parameters.

use carve_core::{ChunkAllocator, ChunkLayout};

use crate::error::ArenaError;
use crate::header::HEADER_SIZE;
use crate::inline::InlineAllocator;
use crate::table::TableAllocator;

/// Configuration for a chunk allocator.
///
/// Both bounds are fixed at construction: the arena never grows and the
/// descriptor table never gains slots. Validated by
/// [`ArenaConfig::validate`] before any allocator is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the arena in bytes.
    ///
    /// Default: 1_048_576 (1 MiB). The inline layout needs more than
    /// [`HEADER_SIZE`] bytes so the first chunk has room for data.
    pub capacity: u32,

    /// Maximum number of chunks the descriptor table can track at once.
    ///
    /// Default: 201. Every allocation may leave one remainder chunk behind,
    /// so this should be at least twice the expected number of concurrent
    /// allocations. Ignored by the inline layout, whose chunk count is
    /// bounded by arena bytes alone.
    pub max_chunks: u32,

    /// Where chunk metadata lives.
    pub layout: ChunkLayout,
}

impl ArenaConfig {
    /// Default arena size: 1 MiB.
    pub const DEFAULT_CAPACITY: u32 = 1_048_576;

    /// Default descriptor capacity: room for 100 concurrent allocations,
    /// each with a remainder chunk, plus the initial chunk.
    pub const DEFAULT_MAX_CHUNKS: u32 = 100 * 2 + 1;

    /// Default config for the given layout.
    pub fn new(layout: ChunkLayout) -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            max_chunks: Self::DEFAULT_MAX_CHUNKS,
            layout,
        }
    }

    /// Default config for the descriptor-table layout.
    pub fn table() -> Self {
        Self::new(ChunkLayout::Table)
    }

    /// Default config for the inline-header layout.
    pub fn inline() -> Self {
        Self::new(ChunkLayout::Inline)
    }

    /// Replace the arena size.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replace the descriptor capacity.
    pub fn with_max_chunks(mut self, max_chunks: u32) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Check the bounds for the configured layout.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "arena capacity must be at least 1 byte".into(),
            });
        }
        match self.layout {
            ChunkLayout::Table => {
                if self.max_chunks == 0 {
                    return Err(ArenaError::InvalidConfig {
                        reason: "descriptor table needs at least 1 slot".into(),
                    });
                }
            }
            ChunkLayout::Inline => {
                if self.capacity <= HEADER_SIZE {
                    return Err(ArenaError::InvalidConfig {
                        reason: format!(
                            "{}-byte inline arena leaves no room after a {HEADER_SIZE}-byte header",
                            self.capacity
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build an initialised allocator of the configured layout.
    pub fn build(&self) -> Result<Box<dyn ChunkAllocator>, ArenaError> {
        Ok(match self.layout {
            ChunkLayout::Table => Box::new(TableAllocator::new(self)?),
            ChunkLayout::Inline => Box::new(InlineAllocator::new(self)?),
        })
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::table()
    }
}
