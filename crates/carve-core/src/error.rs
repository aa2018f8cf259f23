//! Error types for allocation and release.
//!
//! Zero-size requests and `free(None)` are not errors: they are value-level
//! no-ops. Everything here is recoverable; the caller may free other
//! allocations and retry.

use std::error::Error;
use std::fmt;

use crate::id::{ArenaOffset, Stamp};

/// Reasons an allocation request could not be satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// No free chunk in the list is large enough.
    OutOfSpace {
        /// Bytes requested.
        requested: u32,
        /// Size of the largest free chunk at the time of the request.
        largest_free: u32,
    },
    /// A free chunk was large enough but splitting it needs a descriptor
    /// slot and the table is full. Byte space alone would have sufficed.
    DescriptorsExhausted {
        /// Fixed descriptor capacity of the table.
        capacity: u32,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfSpace {
                requested,
                largest_free,
            } => {
                write!(
                    f,
                    "out of space: requested {requested} bytes, largest free {largest_free} bytes"
                )
            }
            Self::DescriptorsExhausted { capacity } => {
                write!(f, "descriptor table exhausted: all {capacity} slots bound")
            }
        }
    }
}

impl Error for AllocError {}

/// Reasons a `free` was rejected. A rejected free changes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreeError {
    /// No chunk's data region starts at the handle's offset.
    UnknownAllocation {
        /// Offset carried by the rejected handle.
        offset: ArenaOffset,
    },
    /// A chunk starts at the offset but is free, or is bound to a different
    /// allocation (double free, or a handle issued before `init`).
    StaleHandle {
        /// Offset carried by the rejected handle.
        offset: ArenaOffset,
        /// Stamp carried by the rejected handle.
        stamp: Stamp,
    },
}

impl fmt::Display for FreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAllocation { offset } => {
                write!(f, "no allocation starts at offset {offset}")
            }
            Self::StaleHandle { offset, stamp } => {
                write!(f, "stale handle: offset {offset}, stamp {stamp}")
            }
        }
    }
}

impl Error for FreeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_error_display_names_sizes() {
        let e = AllocError::OutOfSpace {
            requested: 300,
            largest_free: 200,
        };
        let msg = e.to_string();
        assert!(msg.contains("300"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn exhaustion_is_distinct_from_out_of_space() {
        let a = AllocError::DescriptorsExhausted { capacity: 3 };
        let b = AllocError::OutOfSpace {
            requested: 1,
            largest_free: 0,
        };
        assert_ne!(a, b);
        assert!(a.to_string().contains("3 slots"));
    }

    #[test]
    fn free_error_display() {
        let e = FreeError::StaleHandle {
            offset: ArenaOffset(16),
            stamp: Stamp(9),
        };
        assert_eq!(e.to_string(), "stale handle: offset 0x00000010, stamp 9");
    }
}
