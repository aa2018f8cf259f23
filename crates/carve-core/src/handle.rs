//! Allocation handles.
//!
//! An [`Allocation`] is the token `allocate` lends to the caller. It names
//! the data region by arena offset and carries the [`Stamp`] of the binding
//! that produced it, so `free` and byte access can reject stale handles
//! instead of touching whatever chunk now lives at that offset.

use std::fmt;

use crate::id::{ArenaOffset, Stamp};

/// A region of the arena lent to the caller by `allocate`.
///
/// Handles are plain `Copy` tokens. Holding one does not keep the region
/// alive: once passed to `free` (or after the allocator is re-initialised)
/// every copy is stale and is rejected by the allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct Allocation {
    offset: ArenaOffset,
    len: u32,
    stamp: Stamp,
}

impl Allocation {
    /// Create a handle. Allocators call this; callers receive handles from
    /// `allocate` and should not need to build their own.
    pub fn new(offset: ArenaOffset, len: u32, stamp: Stamp) -> Self {
        Self { offset, len, stamp }
    }

    /// Offset of the first data byte.
    pub fn offset(&self) -> ArenaOffset {
        self.offset
    }

    /// Number of bytes requested by the caller.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the handle spans zero bytes. Allocators never hand these out.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ownership stamp of the binding that produced this handle.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// One past the last data byte, widened so it cannot overflow.
    pub fn end(&self) -> u64 {
        self.offset.0 as u64 + self.len as u64
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocation(off={}, len={}, stamp={})",
            self.offset, self.len, self.stamp
        )
    }
}
