//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest entry in a line, regardless of how often or how recently it
//! was referenced. Empty ways are filled in ascending order by the owning line, so a
//! round-robin pointer starting at way 0 always names the oldest entry.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `notify_hit()`: O(1)
//!   - `choose_eviction_victim()`: O(1)
//! - **Space Complexity:** O(1) per line
//! - **Best Case:** Streaming accesses where all blocks have equal importance
//! - **Worst Case:** Workloads with strong temporal locality (may evict hot blocks)

use super::ReplacementPolicy;

/// FIFO Policy state for one line.
#[derive(Clone, Debug)]
pub struct FifoPolicy {
    /// The next way to be evicted.
    next_way: usize,
    /// Number of ways in the line.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the line.
    pub const fn new(ways: usize) -> Self {
        Self { next_way: 0, ways }
    }
}

impl ReplacementPolicy for FifoPolicy {
    /// References do not change insertion order.
    fn notify_hit(&mut self, _way: usize) {}

    /// Returns the round-robin pointer and advances it.
    fn choose_eviction_victim(&mut self) -> usize {
        let victim = self.next_way;
        self.next_way = (self.next_way + 1) % self.ways.max(1);
        victim
    }
}
