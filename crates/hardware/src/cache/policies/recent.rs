//! Recency-based Replacement Policies (LRU and MRU).
//!
//! Each way carries the value of a per-line access clock taken at its last reference. LRU
//! evicts the way with the smallest stamp, MRU the way with the largest.
//!
//! The clock only grows, so aging periodically renumbers the stamps to their rank order once
//! it passes a threshold. Relative order is preserved, so renumbering never changes a victim.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `notify_hit()`: O(1)
//!   - `choose_eviction_victim()`: O(W) where W is the number of ways
//!   - `age()`: O(W log W) when renumbering, O(1) otherwise
//! - **Space Complexity:** O(W) per line
//! - **Best Case (LRU):** Workloads with good temporal locality
//! - **Best Case (MRU):** Cyclic scans slightly larger than the line

use super::ReplacementPolicy;

/// Clock value above which `age()` renumbers the stamps.
pub const RENUMBER_THRESHOLD: u32 = 1 << 20;

/// Which end of the recency order is evicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recency {
    /// Evict the least recently used way.
    Least,
    /// Evict the most recently used way.
    Most,
}

/// LRU / MRU Policy state for one line.
#[derive(Clone, Debug)]
pub struct RecentPolicy {
    stamps: Vec<u32>,
    clock: u32,
    last: Option<usize>,
    evict: Recency,
    threshold: u32,
}

impl RecentPolicy {
    /// Creates a policy that evicts the least recently used way.
    pub fn lru(ways: usize) -> Self {
        Self::with_threshold(ways, Recency::Least, RENUMBER_THRESHOLD)
    }

    /// Creates a policy that evicts the most recently used way.
    pub fn mru(ways: usize) -> Self {
        Self::with_threshold(ways, Recency::Most, RENUMBER_THRESHOLD)
    }

    /// Creates a policy with a custom renumbering threshold.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the line.
    /// * `evict` - Which end of the recency order to evict.
    /// * `threshold` - Clock value above which aging renumbers stamps.
    pub fn with_threshold(ways: usize, evict: Recency, threshold: u32) -> Self {
        Self {
            stamps: vec![0; ways],
            clock: 0,
            last: None,
            evict,
            threshold,
        }
    }

    /// Returns the current stamp of every way.
    pub fn stamps(&self) -> &[u32] {
        &self.stamps
    }

    /// Returns the value the next reference will be stamped with.
    pub const fn clock(&self) -> u32 {
        self.clock
    }

    fn renumber(&mut self) {
        let mut order: Vec<u32> = self.stamps.clone();
        order.sort_unstable();
        order.dedup();
        for stamp in &mut self.stamps {
            // `order` holds every stamp, so the search always succeeds.
            *stamp = order.binary_search(stamp).unwrap_or_default() as u32;
        }
        self.clock = order.len() as u32;
    }
}

impl ReplacementPolicy for RecentPolicy {
    /// Stamps `way` with the clock, unless it already holds the newest stamp.
    fn notify_hit(&mut self, way: usize) {
        if self.last == Some(way) {
            return;
        }
        self.stamps[way] = self.clock;
        self.clock = self.clock.wrapping_add(1);
        self.last = Some(way);
    }

    /// Returns the first way holding the smallest (LRU) or largest (MRU) stamp.
    fn choose_eviction_victim(&mut self) -> usize {
        let mut victim = 0;
        for (way, &stamp) in self.stamps.iter().enumerate().skip(1) {
            let better = match self.evict {
                Recency::Least => stamp < self.stamps[victim],
                Recency::Most => stamp > self.stamps[victim],
            };
            if better {
                victim = way;
            }
        }
        victim
    }

    fn can_age(&self) -> bool {
        true
    }

    /// Renumbers stamps to `0..n` once the clock passes the threshold.
    fn age(&mut self) {
        if self.clock > self.threshold {
            self.renumber();
        }
    }
}
