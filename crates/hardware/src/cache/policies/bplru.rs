//! Bit Pseudo-LRU (BPLRU) Replacement Policy.
//!
//! A one-bit approximation of LRU. The line is split into a left half (`way < ways / 2`) and a
//! right half, and a single bit remembers which half was referenced most recently. That half
//! is protected: the victim is drawn pseudo-randomly from the other one. The evicted way's
//! half becomes the protected half, since the new tag is installed there.
//!
//! A one-way line has no halves to choose between and always evicts way 0.
//!
//! # Performance
//!
//! - **Time Complexity:** `notify_hit()` and `choose_eviction_victim()` are O(1).
//! - **Space Complexity:** One bit plus generator state per line.

use super::ReplacementPolicy;
use super::random::{FALLBACK_SEED, xorshift};

/// One half of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
    /// Ways `0..ways / 2`.
    Left,
    /// Ways `ways / 2..ways`.
    Right,
}

/// BPLRU Policy state for one line.
#[derive(Clone, Debug)]
pub struct BplruPolicy {
    ways: usize,
    /// The most recently referenced half, which is never evicted from.
    protected: Half,
    state: u64,
}

impl BplruPolicy {
    /// Creates a new BPLRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the line.
    /// * `seed` - Initial generator state for picking inside a half.
    pub const fn new(ways: usize, seed: u64) -> Self {
        let state = if seed == 0 { FALLBACK_SEED } else { seed };
        Self {
            ways,
            protected: Half::Left,
            state,
        }
    }

    /// Returns the half currently protected from eviction.
    pub const fn protected(&self) -> Half {
        self.protected
    }

    const fn half_of(&self, way: usize) -> Half {
        if way < self.ways / 2 {
            Half::Left
        } else {
            Half::Right
        }
    }
}

impl ReplacementPolicy for BplruPolicy {
    fn notify_hit(&mut self, way: usize) {
        self.protected = self.half_of(way);
    }

    fn choose_eviction_victim(&mut self) -> usize {
        let split = self.ways / 2;
        if split == 0 {
            return 0;
        }
        let (start, len) = match self.protected {
            Half::Left => (split, self.ways - split),
            Half::Right => (0, split),
        };
        let victim = start + (xorshift(&mut self.state) % len as u64) as usize;
        self.protected = self.half_of(victim);
        victim
    }
}
