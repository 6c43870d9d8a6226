//! Transaction State Machine Tests.
//!
//! Verifies the IDLE → OPEN → IDLE protocol, contract-violation panics, the
//! transaction history, and per-transaction `(index, tag)` deduplication.

use cachesim_core::common::AccessType;
use cachesim_core::soc::MemoryDevice;
use pretty_assertions::assert_eq;

use crate::common::harness::{Geometry, transaction};

// ══════════════════════════════════════════════════════════
// 1. Protocol
// ══════════════════════════════════════════════════════════

/// The open tally is visible until the transaction closes.
#[test]
fn current_transaction_while_open() {
    let mut cache = Geometry::small().build();
    assert!(cache.current_transaction().is_none());

    cache.begin_transaction(AccessType::Instruction);
    assert!(cache.in_transaction());
    cache.read_byte(0).unwrap();
    let open = cache.current_transaction().copied().unwrap();
    assert_eq!(open.mode, AccessType::Instruction);
    assert_eq!(open.stats.read_miss, 1);

    cache.end_transaction();
    assert!(!cache.in_transaction());
    assert!(cache.current_transaction().is_none());
    assert_eq!(cache.transactions(), &[open]);
}

/// Modes are recorded in order.
#[test]
fn history_keeps_modes_in_order() {
    let mut cache = Geometry::small().build();
    for mode in [AccessType::Instruction, AccessType::Data, AccessType::None] {
        transaction(&mut cache, mode, |_| ());
    }
    let modes: Vec<_> = cache.transactions().iter().map(|t| t.mode).collect();
    assert_eq!(
        modes,
        vec![AccessType::Instruction, AccessType::Data, AccessType::None]
    );

    cache.clear_transaction_info();
    assert!(cache.transactions().is_empty());
}

#[test]
#[should_panic(expected = "already open")]
fn nested_begin_panics() {
    let mut cache = Geometry::small().build();
    cache.begin_transaction(AccessType::Data);
    cache.begin_transaction(AccessType::Data);
}

#[test]
#[should_panic(expected = "without an open transaction")]
fn end_while_idle_panics() {
    let mut cache = Geometry::small().build();
    cache.end_transaction();
}

#[test]
#[should_panic(expected = "read_byte called outside of a memory transaction")]
fn read_outside_transaction_panics() {
    let mut cache = Geometry::small().build();
    let _ = cache.read_byte(0);
}

#[test]
#[should_panic(expected = "write_byte called outside of a memory transaction")]
fn write_outside_transaction_panics() {
    let mut cache = Geometry::small().build();
    let _ = cache.write_byte(0, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Deduplication
// ══════════════════════════════════════════════════════════

/// The dedup set resets between transactions.
#[test]
fn dedup_is_per_transaction() {
    let mut cache = Geometry::small().build();
    for _ in 0..3 {
        transaction(&mut cache, AccessType::Data, |c| {
            c.read_byte(0x0020).unwrap();
            c.read_byte(0x0021).unwrap();
        });
    }
    let reads: Vec<_> = cache
        .transactions()
        .iter()
        .map(|t| (t.stats.read_miss, t.stats.read_hit))
        .collect();
    assert_eq!(reads, vec![(1, 0), (0, 1), (0, 1)]);
}

/// A bypassed write miss still claims its `(index, tag)` for the transaction.
#[test]
fn write_miss_claims_pair_for_later_reads() {
    let mut cache = Geometry::small().build();
    transaction(&mut cache, AccessType::Data, |c| {
        c.write_byte(0x0030, 1).unwrap();
        c.read_byte(0x0030).unwrap();
    });
    let stats = cache.transactions()[0].stats;
    assert_eq!(stats.write_miss, 1);
    assert_eq!(stats.read_miss, 0);
    assert_eq!(stats.accesses(), 1);
    // The read still installed the block.
    assert!(cache.line(3).is_some_and(|l| l.contains_tag(0)));
}

/// Clearing the cache mid-transaction lets a re-miss on a counted pair count again.
#[test]
fn clear_cache_resets_dedup_in_open_transaction() {
    let mut cache = Geometry::small().build();
    transaction(&mut cache, AccessType::Data, |c| {
        c.read_byte(0x0000).unwrap();
        c.clear_cache();
        c.read_byte(0x0000).unwrap();
        c.read_byte(0x0001).unwrap();
    });
    let stats = cache.transactions()[0].stats;
    assert_eq!(stats.read_miss, 2);
    assert_eq!(stats.read_hit, 0);
}

/// `clear_touched_lines` alone also forgets the counted pairs; the block stays resident.
#[test]
fn clear_touched_lines_resets_dedup() {
    let mut cache = Geometry::small().build();
    transaction(&mut cache, AccessType::Data, |c| {
        c.read_byte(0x0000).unwrap();
        c.clear_touched_lines();
        assert!(c.touched_lines().is_empty());
        c.read_byte(0x0000).unwrap();
    });
    let stats = cache.transactions()[0].stats;
    assert_eq!(stats.read_miss, 1);
    assert_eq!(stats.read_hit, 1);
}

/// Distinct tags in one line each count once.
#[test]
fn distinct_pairs_count_separately() {
    let mut cache = Geometry::small().build();
    transaction(&mut cache, AccessType::Data, |c| {
        for addr in [0x0000, 0x0100, 0x0000, 0x0100] {
            c.read_byte(addr).unwrap();
        }
    });
    let stats = cache.transactions()[0].stats;
    assert_eq!(stats.read_miss, 2);
    assert_eq!(stats.read_hit, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Instruction and cycle boundaries
// ══════════════════════════════════════════════════════════

/// Finishing an instruction clears the history.
#[test]
fn instruction_finished_clears_history() {
    let mut cache = Geometry::small().build();
    transaction(&mut cache, AccessType::Instruction, |c| {
        c.read_byte(0).unwrap();
    });
    cache.on_instruction_finished(0x12);
    assert!(cache.transactions().is_empty());
}

#[test]
#[should_panic(expected = "while a transaction is open")]
fn instruction_finished_inside_transaction_panics() {
    let mut cache = Geometry::small().build();
    cache.begin_transaction(AccessType::Data);
    cache.on_instruction_finished(0);
}

#[test]
#[should_panic(expected = "called twice")]
fn double_cycle_start_panics() {
    let mut cache = Geometry::small().build();
    cache.on_cycle_started();
    cache.on_cycle_started();
}

#[test]
#[should_panic(expected = "without a started cycle")]
fn cycle_finish_without_start_panics() {
    let mut cache = Geometry::small().build();
    cache.on_cycle_finished();
}
