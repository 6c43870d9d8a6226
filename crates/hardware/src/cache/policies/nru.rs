//! Not Recently Used (NRU) Replacement Policy.
//!
//! Each way carries a reference bit, set on every hit. The victim is the first way whose bit
//! is clear. When a hit would set the last clear bit, all other bits are cleared first, so
//! there is always a candidate. Aging clears every bit once per epoch of `age_after + 1`
//! cycles.
//!
//! This is the bit-per-way approximation hardware uses in place of true LRU.

use super::{AgingClock, ReplacementPolicy};

/// NRU Policy state for one line.
#[derive(Clone, Debug)]
pub struct NruPolicy {
    referenced: Vec<bool>,
    clock: AgingClock,
}

impl NruPolicy {
    /// Creates a new NRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `ways` - The associativity (number of ways) of the line.
    /// * `age_after` - Cycles between reference-bit clears.
    pub fn new(ways: usize, age_after: u32) -> Self {
        Self {
            referenced: vec![false; ways],
            clock: AgingClock::new(age_after),
        }
    }

    /// Returns the reference bit of every way.
    pub fn referenced(&self) -> &[bool] {
        &self.referenced
    }
}

impl ReplacementPolicy for NruPolicy {
    fn notify_hit(&mut self, way: usize) {
        self.referenced[way] = true;
        if self.referenced.iter().all(|&bit| bit) {
            self.referenced.fill(false);
            self.referenced[way] = true;
        }
    }

    fn choose_eviction_victim(&mut self) -> usize {
        self.referenced.iter().position(|&bit| !bit).unwrap_or(0)
    }

    fn can_age(&self) -> bool {
        true
    }

    fn age(&mut self) {
        if self.clock.tick() {
            self.referenced.fill(false);
        }
    }
}
