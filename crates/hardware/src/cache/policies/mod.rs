//! Cache Replacement Policies.
//!
//! Implements the algorithms that pick a victim entry when a full cache line must accept a new
//! tag. Every cache line owns its own policy instance, created by a [`ReplacementFactory`], so
//! recency and frequency state is never shared across lines.
//!
//! # Policies
//!
//! - `Lru` / `Mru`: Least / Most Recently Used (access stamps).
//! - `Lfu` / `Mfu`: Least / Most Frequently Used (reference counts).
//! - `Lfuda`: LFU with dynamic aging.
//! - `Fifo`: First-In, First-Out.
//! - `Random`: Pseudo-random selection.
//! - `Nru`: Not Recently Used, with periodic reference-bit clearing.
//! - `Bplru`: Bit Pseudo-LRU (protects the most recently referenced half of the line).

/// Bit Pseudo-LRU replacement policy.
pub mod bplru;

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Frequency-based replacement policies (LFU, MFU, LFUDA).
pub mod frequency;

/// Not Recently Used replacement policy.
pub mod nru;

/// Random replacement policy.
pub mod random;

/// Recency-based replacement policies (LRU, MRU).
pub mod recent;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use bplru::BplruPolicy;
pub use fifo::FifoPolicy;
pub use frequency::FrequencyPolicy;
pub use nru::NruPolicy;
pub use random::RandomPolicy;
pub use recent::RecentPolicy;

use crate::config::ReplacementAlgorithm;

/// Trait for cache replacement policies.
///
/// `way` is a position inside one cache line (`0..associativity`). It is NOT the index field
/// of an address.
pub trait ReplacementPolicy: fmt::Debug + Send + Sync {
    /// Records that `way` was just referenced, either by a hit or by a fresh install.
    fn notify_hit(&mut self, way: usize);

    /// Selects the way to evict.
    ///
    /// Only called when every way of the owning line is present.
    ///
    /// # Returns
    ///
    /// A way index in `0..associativity`.
    fn choose_eviction_victim(&mut self) -> usize;

    /// Reports whether this algorithm decays its state over time.
    fn can_age(&self) -> bool {
        false
    }

    /// Decays recency or frequency state. Called once per finished cycle.
    fn age(&mut self) {}
}

/// Creates one independent [`ReplacementPolicy`] per cache line.
pub trait ReplacementFactory: fmt::Debug + Send + Sync {
    /// Creates a fresh policy for a line of `ways` entries.
    fn create_policy(&self, ways: u16) -> Box<dyn ReplacementPolicy>;

    /// Returns a diagnostic label for the algorithm (e.g., `"LRU"`).
    fn algorithm_name(&self) -> &str;
}

/// Counts cycles and fires once more than `period` ticks have elapsed, i.e. every
/// `period + 1` ticks.
///
/// Shared by the algorithms that age on a fixed epoch (LFUDA and NRU).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgingClock {
    period: u32,
    elapsed: u32,
}

impl AgingClock {
    /// Creates a clock that waits out `period` ticks before firing; a period of 0 fires every
    /// tick.
    pub const fn new(period: u32) -> Self {
        Self { period, elapsed: 0 }
    }

    /// Advances one tick.
    ///
    /// # Returns
    ///
    /// `true` when an epoch boundary was reached.
    pub const fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed > self.period {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Factory for the built-in algorithms.
///
/// Random and BPLRU replacement derive a distinct seed for every policy they create, so lines
/// do not evict in lockstep.
#[derive(Debug)]
pub struct PolicyFactory {
    algorithm: ReplacementAlgorithm,
    age_after: u32,
    seed: u64,
    created: AtomicU64,
}

impl PolicyFactory {
    /// Creates a factory for `algorithm`.
    ///
    /// # Arguments
    ///
    /// * `algorithm` - Which built-in algorithm to instantiate.
    /// * `age_after` - Cycles per aging epoch (LFUDA and NRU).
    /// * `seed` - Base seed for random and BPLRU replacement.
    pub const fn new(algorithm: ReplacementAlgorithm, age_after: u32, seed: u64) -> Self {
        Self {
            algorithm,
            age_after,
            seed,
            created: AtomicU64::new(0),
        }
    }

    /// Returns the algorithm this factory instantiates.
    pub const fn algorithm(&self) -> ReplacementAlgorithm {
        self.algorithm
    }

    fn next_seed(&self) -> u64 {
        let n = self.created.fetch_add(1, Ordering::Relaxed);
        splitmix64(self.seed.wrapping_add(n))
    }
}

impl ReplacementFactory for PolicyFactory {
    fn create_policy(&self, ways: u16) -> Box<dyn ReplacementPolicy> {
        let ways = usize::from(ways);
        match self.algorithm {
            ReplacementAlgorithm::Lru => Box::new(RecentPolicy::lru(ways)),
            ReplacementAlgorithm::Mru => Box::new(RecentPolicy::mru(ways)),
            ReplacementAlgorithm::Lfu => Box::new(FrequencyPolicy::lfu(ways)),
            ReplacementAlgorithm::Mfu => Box::new(FrequencyPolicy::mfu(ways)),
            ReplacementAlgorithm::Lfuda => Box::new(FrequencyPolicy::lfuda(ways, self.age_after)),
            ReplacementAlgorithm::Fifo => Box::new(FifoPolicy::new(ways)),
            ReplacementAlgorithm::Random => Box::new(RandomPolicy::new(ways, self.next_seed())),
            ReplacementAlgorithm::Nru => Box::new(NruPolicy::new(ways, self.age_after)),
            ReplacementAlgorithm::Bplru => Box::new(BplruPolicy::new(ways, self.next_seed())),
        }
    }

    fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }
}

/// Builds a shared factory for one of the built-in algorithms.
///
/// # Arguments
///
/// * `algorithm` - The replacement algorithm.
/// * `age_after` - Cycles per aging epoch (LFUDA and NRU).
/// * `seed` - Base seed for random and BPLRU replacement.
pub fn factory_for(
    algorithm: ReplacementAlgorithm,
    age_after: u32,
    seed: u64,
) -> Arc<dyn ReplacementFactory> {
    Arc::new(PolicyFactory::new(algorithm, age_after, seed))
}

const fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
