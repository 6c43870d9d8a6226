//! Statistics Aggregation Tests.

use cachesim_core::common::AccessType;
use cachesim_core::stats::{MemoryAccessStatistics, Transaction, summarize};
use pretty_assertions::assert_eq;

fn tx(mode: AccessType, read_hit: u32, read_miss: u32, write_hit: u32, write_miss: u32) -> Transaction {
    Transaction {
        stats: MemoryAccessStatistics {
            read_hit,
            read_miss,
            write_hit,
            write_miss,
        },
        mode,
    }
}

/// Totals cover every mode; per-mode sums only their own.
#[test]
fn summary_splits_by_mode() {
    let history = [
        tx(AccessType::Instruction, 2, 1, 0, 0),
        tx(AccessType::Data, 0, 1, 1, 1),
        tx(AccessType::None, 1, 0, 0, 0),
    ];
    let summary = summarize(&history);

    assert_eq!(summary.transactions, 3);
    assert_eq!(summary.total, MemoryAccessStatistics {
        read_hit: 3,
        read_miss: 2,
        write_hit: 1,
        write_miss: 1,
    });
    assert_eq!(summary.instruction.accesses(), 3);
    assert_eq!(summary.data.accesses(), 3);
    assert_eq!(summary.total.hits(), 4);
    assert_eq!(summary.total.misses(), 3);
}

/// An empty history summarizes to zeros and a 0% hit rate.
#[test]
fn empty_history() {
    let summary = summarize(&[]);
    assert_eq!(summary.transactions, 0);
    assert_eq!(summary.total.accesses(), 0);
    assert!(summary.to_string().contains("hit_rate               0.00%"));
}

/// Transactions print their mode and tallies.
#[test]
fn transaction_display() {
    let t = tx(AccessType::Instruction, 1, 2, 3, 4);
    assert_eq!(t.to_string(), "[instruction] read 1/2 write 3/4 (hit/miss)");
}

/// The report includes the overall hit rate.
#[test]
fn report_hit_rate() {
    let summary = summarize(&[tx(AccessType::Data, 3, 1, 0, 0)]);
    let report = summary.to_string();
    assert!(report.contains("CACHE SIMULATION STATISTICS"));
    assert!(report.contains("hit_rate               75.00%"));
}
