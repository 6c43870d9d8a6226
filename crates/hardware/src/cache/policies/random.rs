//! Random Replacement Policy.
//!
//! This policy evicts a pseudo-random entry from the line. It uses a xorshift generator
//! seeded per line, avoiding the overhead of a full RNG while keeping runs reproducible.

use super::ReplacementPolicy;

/// Substituted for a zero seed, which would lock xorshift at zero forever.
pub(super) const FALLBACK_SEED: u64 = 123_456_789;

/// Advances a xorshift generator and returns the new state.
pub(super) const fn xorshift(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}

/// Random Policy state for one line.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    /// Number of ways in the line.
    ways: usize,
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the line.
    /// * `seed` - Initial generator state.
    pub const fn new(ways: usize, seed: u64) -> Self {
        let state = if seed == 0 { FALLBACK_SEED } else { seed };
        Self { ways, state }
    }
}

impl ReplacementPolicy for RandomPolicy {
    /// Access patterns do not affect random selection, so this is a no-op.
    fn notify_hit(&mut self, _way: usize) {}

    /// Generates a pseudo-random number and maps it to a valid way index.
    fn choose_eviction_victim(&mut self) -> usize {
        (xorshift(&mut self.state) % self.ways.max(1) as u64) as usize
    }
}
