//! Frequency-based Replacement Policies (LFU, MFU and LFUDA).
//!
//! Each way carries a reference count, incremented on every hit (including the hit that
//! follows an install). LFU evicts the smallest count and MFU the largest, taking the first
//! way on ties. A freshly evicted way restarts from the eviction baseline:
//!
//! - LFU / MFU restart from zero.
//! - LFUDA restarts from the line's minimum count, so a newcomer is not immediately the
//!   cheapest victim against entries that accumulated counts long ago.
//!
//! LFUDA also ages: once per epoch (every `age_after + 1` cycles) it subtracts the minimum
//! count from every way, which keeps counts bounded while preserving their order.

use super::{AgingClock, ReplacementPolicy};

/// Which end of the frequency order is evicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frequency {
    /// Evict the least frequently used way.
    Least,
    /// Evict the most frequently used way.
    Most,
}

/// LFU / MFU / LFUDA Policy state for one line.
#[derive(Clone, Debug)]
pub struct FrequencyPolicy {
    counts: Vec<u32>,
    evict: Frequency,
    /// Present only for LFUDA.
    aging: Option<AgingClock>,
}

impl FrequencyPolicy {
    /// Creates a Least Frequently Used policy.
    pub fn lfu(ways: usize) -> Self {
        Self {
            counts: vec![0; ways],
            evict: Frequency::Least,
            aging: None,
        }
    }

    /// Creates a Most Frequently Used policy.
    pub fn mfu(ways: usize) -> Self {
        Self {
            counts: vec![0; ways],
            evict: Frequency::Most,
            aging: None,
        }
    }

    /// Creates an LFU policy that ages once more than `age_after` cycles have passed.
    pub fn lfuda(ways: usize, age_after: u32) -> Self {
        Self {
            counts: vec![0; ways],
            evict: Frequency::Least,
            aging: Some(AgingClock::new(age_after)),
        }
    }

    /// Returns the reference count of every way.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    fn minimum(&self) -> u32 {
        self.counts.iter().copied().min().unwrap_or(0)
    }
}

impl ReplacementPolicy for FrequencyPolicy {
    fn notify_hit(&mut self, way: usize) {
        self.counts[way] = self.counts[way].saturating_add(1);
    }

    fn choose_eviction_victim(&mut self) -> usize {
        let mut victim = 0;
        for (way, &count) in self.counts.iter().enumerate().skip(1) {
            let better = match self.evict {
                Frequency::Least => count < self.counts[victim],
                Frequency::Most => count > self.counts[victim],
            };
            if better {
                victim = way;
            }
        }

        let baseline = if self.aging.is_some() {
            self.minimum()
        } else {
            0
        };
        if let Some(count) = self.counts.get_mut(victim) {
            *count = baseline;
        }
        victim
    }

    fn can_age(&self) -> bool {
        self.aging.is_some()
    }

    fn age(&mut self) {
        let Some(clock) = self.aging.as_mut() else {
            return;
        };
        if !clock.tick() {
            return;
        }
        let min = self.minimum();
        if min > 0 {
            for count in &mut self.counts {
                *count -= min;
            }
        }
    }
}
