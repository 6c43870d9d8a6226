//! Cache access statistics.
//!
//! This module tracks hit and miss counts for the cache simulator. It provides:
//! 1. **Tallies:** Read/write hit/miss counters with derived totals and hit rate.
//! 2. **Transactions:** One tally per CPU-delimited transaction, tagged with its access mode.
//! 3. **Aggregation:** Summing a transaction history, overall or per access mode.
//! 4. **Reporting:** A fixed-width text report in the style of a simulator stats dump.

use std::fmt;

use crate::common::AccessType;

/// Hit/miss counters for cache accesses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryAccessStatistics {
    /// Reads that found their block present.
    pub read_hit: u32,
    /// Reads that had to install their block.
    pub read_miss: u32,
    /// Writes that found their block present.
    pub write_hit: u32,
    /// Writes whose block was absent (installed only under write-allocate).
    pub write_miss: u32,
}

impl MemoryAccessStatistics {
    /// Total hits.
    pub const fn hits(&self) -> u32 {
        self.read_hit + self.write_hit
    }

    /// Total misses.
    pub const fn misses(&self) -> u32 {
        self.read_miss + self.write_miss
    }

    /// Total counted accesses.
    pub const fn accesses(&self) -> u32 {
        self.hits() + self.misses()
    }

    /// Fraction of counted accesses that hit, or `0.0` when nothing was counted.
    pub fn hit_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            n => f64::from(self.hits()) / f64::from(n),
        }
    }

    /// Adds `other` into `self`.
    pub const fn merge(&mut self, other: &Self) {
        self.read_hit += other.read_hit;
        self.read_miss += other.read_miss;
        self.write_hit += other.write_hit;
        self.write_miss += other.write_miss;
    }

    /// Resets every counter to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The statistics gathered between one `begin_transaction` and its `end_transaction`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Counters for this transaction (deduplicated per `(index, tag)`).
    pub stats: MemoryAccessStatistics,
    /// What the CPU was doing when it opened the transaction.
    pub mode: AccessType,
}

impl Transaction {
    /// Creates an empty transaction for `mode`.
    pub const fn new(mode: AccessType) -> Self {
        Self {
            stats: MemoryAccessStatistics {
                read_hit: 0,
                read_miss: 0,
                write_hit: 0,
                write_miss: 0,
            },
            mode,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] read {}/{} write {}/{} (hit/miss)",
            self.mode,
            self.stats.read_hit,
            self.stats.read_miss,
            self.stats.write_hit,
            self.stats.write_miss
        )
    }
}

/// Aggregated statistics over a transaction history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Sum over every transaction.
    pub total: MemoryAccessStatistics,
    /// Sum over instruction-fetch transactions.
    pub instruction: MemoryAccessStatistics,
    /// Sum over data transactions.
    pub data: MemoryAccessStatistics,
    /// Number of transactions summarized.
    pub transactions: usize,
}

/// Sums a transaction history, overall and per access mode.
///
/// # Examples
///
/// ```
/// use cachesim_core::common::AccessType;
/// use cachesim_core::stats::{summarize, Transaction};
///
/// let mut fetch = Transaction::new(AccessType::Instruction);
/// fetch.stats.read_hit = 2;
/// let mut load = Transaction::new(AccessType::Data);
/// load.stats.read_miss = 1;
///
/// let summary = summarize(&[fetch, load]);
/// assert_eq!(summary.total.accesses(), 3);
/// assert_eq!(summary.instruction.hits(), 2);
/// assert_eq!(summary.data.misses(), 1);
/// ```
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary {
        transactions: transactions.len(),
        ..Summary::default()
    };
    for tx in transactions {
        summary.total.merge(&tx.stats);
        match tx.mode {
            AccessType::Instruction => summary.instruction.merge(&tx.stats),
            AccessType::Data => summary.data.merge(&tx.stats),
            AccessType::None => {}
        }
    }
    summary
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    stats: &MemoryAccessStatistics,
) -> fmt::Result {
    writeln!(f, "{name}")?;
    writeln!(f, "  read.hits              {}", stats.read_hit)?;
    writeln!(f, "  read.misses            {}", stats.read_miss)?;
    writeln!(f, "  write.hits             {}", stats.write_hit)?;
    writeln!(f, "  write.misses           {}", stats.write_miss)?;
    writeln!(f, "  hit_rate               {:.2}%", stats.hit_rate() * 100.0)
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "CACHE SIMULATION STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "transactions             {}", self.transactions)?;
        writeln!(f, "----------------------------------------------------------")?;
        write_section(f, "TOTAL", &self.total)?;
        if self.instruction.accesses() > 0 {
            write_section(f, "INSTRUCTION", &self.instruction)?;
        }
        if self.data.accesses() > 0 {
            write_section(f, "DATA", &self.data)?;
        }
        write!(f, "==========================================================")
    }
}
