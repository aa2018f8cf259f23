//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors raised while configuring an allocator or checking its chunk list.
///
/// Allocation and release failures are reported through
/// [`carve_core::AllocError`] and [`carve_core::FreeError`]. An
/// [`ArenaError::Inconsistent`] means the allocator's own bookkeeping is
/// broken; it is never the caller's fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The configuration cannot describe a usable arena.
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },
    /// The chunk list violates a structural invariant.
    Inconsistent {
        /// Position of the offending chunk in list order.
        index: usize,
        /// Which invariant failed.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::Inconsistent { index, reason } => {
                write!(f, "chunk list inconsistent at chunk {index}: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistent_names_the_chunk() {
        let e = ArenaError::Inconsistent {
            index: 3,
            reason: "gap of 8 bytes".into(),
        };
        assert_eq!(
            e.to_string(),
            "chunk list inconsistent at chunk 3: gap of 8 bytes"
        );
    }
}
