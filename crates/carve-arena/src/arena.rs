//! The fixed byte buffer backing every allocation.
//!
//! An [`Arena`] owns no allocation logic, only bounds. It is allocated once,
//! zero-initialised, and never resized. Allocators hand out regions of it
//! by offset.

use carve_core::ArenaOffset;

/// A contiguous, fixed-capacity byte buffer.
pub struct Arena {
    /// Backing storage, allocated to full capacity at creation.
    data: Box<[u8]>,
}

impl Arena {
    /// Create a zeroed arena of `capacity` bytes.
    pub fn new(capacity: u32) -> Self {
        Self {
            data: vec![0u8; capacity as usize].into_boxed_slice(),
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> u32 {
        self.data.len() as u32
    }

    /// Shared view of `len` bytes starting at `offset`.
    ///
    /// Returns `None` if the range does not lie within the arena.
    pub fn slice(&self, offset: ArenaOffset, len: u32) -> Option<&[u8]> {
        let start = offset.index();
        let end = start.checked_add(len as usize)?;
        self.data.get(start..end)
    }

    /// Mutable view of `len` bytes starting at `offset`.
    ///
    /// Returns `None` if the range does not lie within the arena.
    pub fn slice_mut(&mut self, offset: ArenaOffset, len: u32) -> Option<&mut [u8]> {
        let start = offset.index();
        let end = start.checked_add(len as usize)?;
        self.data.get_mut(start..end)
    }

    /// Zero `len` bytes starting at `offset`. Out-of-range requests are
    /// clamped to the arena end.
    pub fn zero(&mut self, offset: ArenaOffset, len: u32) {
        let start = offset.index().min(self.data.len());
        let end = start.saturating_add(len as usize).min(self.data.len());
        self.data[start..end].fill(0);
    }

    /// Copy `N` bytes out of the arena.
    ///
    /// # Panics
    ///
    /// Panics if `offset + N` exceeds the capacity.
    pub fn read_array<const N: usize>(&self, offset: ArenaOffset) -> [u8; N] {
        let start = offset.index();
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[start..start + N]);
        out
    }

    /// Copy `N` bytes into the arena.
    ///
    /// # Panics
    ///
    /// Panics if `offset + N` exceeds the capacity.
    pub fn write_array<const N: usize>(&mut self, offset: ArenaOffset, bytes: &[u8; N]) {
        let start = offset.index();
        self.data[start..start + N].copy_from_slice(bytes);
    }
}
