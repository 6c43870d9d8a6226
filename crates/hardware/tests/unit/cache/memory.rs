//! Cache Access Semantics Tests.
//!
//! Verifies read and write modeling against the backing memory: hit/miss
//! classification, write-through, both write-allocation policies, eviction logging,
//! read tracking, and the pure get/set passthrough. The four reference scenarios
//! come first.

use std::collections::BTreeSet;

use cachesim_core::common::{AccessType, ConfigError};
use cachesim_core::config::ReplacementAlgorithm;
use cachesim_core::soc::MemoryDevice;
use cachesim_core::stats::summarize;
use pretty_assertions::assert_eq;

use crate::common::harness::{Geometry, address, read_each, transaction};

// ══════════════════════════════════════════════════════════
// 1. Reference scenarios
// ══════════════════════════════════════════════════════════

/// Three reads to one 2-way line: two fills and one eviction.
#[test]
fn scenario_three_reads_evict_once() {
    let geometry = Geometry::small();
    let mut cache = geometry.build();

    transaction(&mut cache, AccessType::Data, |c| {
        for addr in [0x0000, 0x0100, 0x0200] {
            assert_eq!(c.breakdown_address(addr).index, 0);
            c.read_byte(addr).unwrap();
        }
    });

    let stats = cache.transactions()[0].stats;
    assert_eq!(stats.read_miss, 3);
    assert_eq!(stats.read_hit, 0);
    assert_eq!(cache.evicted_entries(0).len(), 1);
    assert_eq!(cache.evicted_entries(0)[0].tag, 0x00);
    assert_eq!(cache.all_evicted_entries().len(), 1);
}

/// A write-allocate miss followed by a hit, in separate transactions.
#[test]
fn scenario_write_allocate_then_hit() {
    let mut cache = Geometry::small().allocate().build();

    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0000, 1).unwrap());
    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0000, 2).unwrap());

    let total = summarize(cache.transactions()).total;
    assert_eq!(total.write_miss, 1);
    assert_eq!(total.write_hit, 1);
    assert_eq!(cache.get_byte(0x0000), Ok(2));
}

/// A too-narrow geometry is rejected and the old one keeps working.
#[test]
fn scenario_rejected_resize_keeps_geometry() {
    let geometry = Geometry::small();
    let mut cache = geometry.build();
    read_each(&mut cache, &[0x0010]);

    let narrow = Geometry::small().bits(7, 4, 4).configuration();
    assert!(matches!(
        cache.resize_cache(narrow),
        Err(ConfigError::WidthMismatch {
            address_bits: 16,
            ..
        })
    ));

    assert_eq!(cache.geometry(), geometry.configuration().geometry());
    read_each(&mut cache, &[0x0010]);
    let history = cache.transactions();
    assert_eq!(history[1].stats.read_hit, 1);
    assert_eq!(history[1].stats.read_miss, 0);
}

/// Five reads to one `(index, tag)` in one transaction count once.
#[test]
fn scenario_repeated_reads_count_once() {
    let geometry = Geometry::small();
    let mut cache = geometry.build();
    let addr = address(&geometry, 7, 2);

    transaction(&mut cache, AccessType::Data, |c| {
        for offset in 0..5 {
            c.read_byte(addr + offset).unwrap();
        }
    });

    let stats = cache.transactions()[0].stats;
    assert_eq!(stats.read_hit + stats.read_miss, 1);
    assert_eq!(stats.read_miss, 1);
    assert_eq!(
        cache.line(2).map(|line| line.entries()[0].usage),
        Some(5)
    );
}

// ══════════════════════════════════════════════════════════
// 2. Reads
// ══════════════════════════════════════════════════════════

/// Reads return backing data and mark the line touched.
#[test]
fn read_returns_backing_data() {
    let mut cache = Geometry::small().build();
    cache.set_byte(0x0123, 0x5A).unwrap();

    let value = transaction(&mut cache, AccessType::Data, |c| c.read_byte(0x0123).unwrap());
    assert_eq!(value, 0x5A);
    assert_eq!(cache.touched_lines(), &BTreeSet::from([2]));
    assert!(cache.line(2).is_some_and(|line| line.contains_tag(0x01)));
}

/// With read tracking off, reads are not recorded and read-miss evictions are not logged.
#[test]
fn read_tracking_gates_bytes_and_eviction_log() {
    let mut cache = Geometry::small().build();
    assert!(cache.read_tracking_enabled());
    cache.set_read_tracking_enabled(false);

    read_each(&mut cache, &[0x0000, 0x0100, 0x0200]);
    assert!(cache.bytes_read().is_empty());
    assert!(cache.all_evicted_entries().is_empty());
    assert_eq!(cache.line(0).map(|l| l.present_count()), Some(2));

    cache.set_read_tracking_enabled(true);
    read_each(&mut cache, &[0x0300]);
    assert_eq!(cache.bytes_read(), &BTreeSet::from([0x0300]));
    assert_eq!(cache.evicted_entries(0).len(), 1);
}

/// BPLRU in a 2-way line evicts from the half that was not referenced last.
#[test]
fn bplru_evicts_opposite_half() {
    let mut cache = Geometry::small()
        .algorithm(ReplacementAlgorithm::Bplru)
        .build();
    assert_eq!(cache.algorithm_name(), "BPLRU");

    // Fill ways 0 and 1, then re-reference tag 0 in the left half.
    read_each(&mut cache, &[0x0000, 0x0100, 0x0000, 0x0200]);
    assert_eq!(cache.evicted_entries(0)[0].tag, 0x01);

    // Tag 2 now sits in the right half, so the left half loses tag 0.
    read_each(&mut cache, &[0x0300]);
    assert_eq!(cache.evicted_entries(0)[1].tag, 0x00);
}

/// Out-of-range reads propagate the device error after modeling the access.
///
/// Bits above the address width are dropped by decomposition, so the model sees line 0.
#[test]
fn out_of_range_read_propagates() {
    let mut cache = Geometry::small().build();
    let result = transaction(&mut cache, AccessType::Data, |c| c.read_byte(0x1_0000));
    assert!(result.is_err());
    assert_eq!(cache.touched_lines(), &BTreeSet::from([0]));
}

// ══════════════════════════════════════════════════════════
// 3. Writes
// ══════════════════════════════════════════════════════════

/// No-write-allocate misses bypass the line but still write through.
#[test]
fn no_write_allocate_bypasses_cache() {
    let mut cache = Geometry::small().build();
    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0042, 9).unwrap());

    assert_eq!(cache.get_byte(0x0042), Ok(9));
    assert_eq!(cache.line(4).map(|l| l.present_count()), Some(0));
    assert!(cache.touched_lines().is_empty());
    assert_eq!(cache.transactions()[0].stats.write_miss, 1);
    assert_eq!(cache.bytes_written(), BTreeSet::from([0x0042]));
}

/// Write hits update the line under either policy.
#[test]
fn write_hit_after_read_fill() {
    let mut cache = Geometry::small().build();
    read_each(&mut cache, &[0x0050]);
    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0051, 3).unwrap());

    let stats = cache.transactions()[1].stats;
    assert_eq!(stats.write_hit, 1);
    assert_eq!(cache.line(5).map(|l| l.entries()[0].usage), Some(2));
    assert_eq!(cache.get_byte(0x0051), Ok(3));
}

/// Write-allocate evictions are logged even with read tracking disabled.
#[test]
fn write_allocate_eviction_ignores_read_tracking() {
    let mut cache = Geometry::small().allocate().build();
    cache.set_read_tracking_enabled(false);

    for addr in [0x0000, 0x0100, 0x0200] {
        transaction(&mut cache, AccessType::Data, |c| c.write_byte(addr, 1).unwrap());
    }
    assert_eq!(cache.evicted_entries(0).len(), 1);
    assert!(cache.line(0).is_some_and(|l| l.contains_tag(0x02)));
}

// ══════════════════════════════════════════════════════════
// 4. Passthrough and clears
// ══════════════════════════════════════════════════════════

/// get/set never touch the model.
#[test]
fn get_and_set_do_not_model() {
    let mut cache = Geometry::small().build();
    cache.set_byte(0x0000, 1).unwrap();
    cache.set_word(0x0100, 0x0203).unwrap();
    assert_eq!(cache.get_byte(0x0000), Ok(1));
    assert_eq!(cache.get_word(0x0100), Ok(0x0203));

    assert!(cache.touched_lines().is_empty());
    assert!(cache.all_evicted_entries().is_empty());
    assert!(cache.transactions().is_empty());
    assert!(cache.bytes_read().is_empty());
    assert_eq!(cache.line(0).map(|l| l.present_count()), Some(0));
    assert_eq!(cache.bytes_set(), BTreeSet::from([0x0000, 0x0100, 0x0101]));
}

/// Word reads are two modeled byte reads.
#[test]
fn word_read_models_both_bytes() {
    let mut cache = Geometry::small().build();
    cache.set_word(0x000F, 0xABCD).unwrap();
    let word = transaction(&mut cache, AccessType::Data, |c| c.read_word(0x000F).unwrap());
    assert_eq!(word, 0xABCD);
    assert_eq!(cache.touched_lines(), &BTreeSet::from([0, 1]));
    assert_eq!(cache.transactions()[0].stats.read_miss, 2);
}

/// `clear_cache` empties lines but keeps memory contents.
#[test]
fn clear_cache_keeps_memory() {
    let mut cache = Geometry::small().allocate().build();
    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0010, 4).unwrap());
    cache.clear_cache();

    assert_eq!(cache.line(1).map(|l| l.present_count()), Some(0));
    assert!(cache.touched_lines().is_empty());
    assert_eq!(cache.get_byte(0x0010), Ok(4));
}

/// `clear_memory` clears the model and zeroes the backing device.
#[test]
fn clear_memory_clears_both() {
    let mut cache = Geometry::small().allocate().build();
    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0010, 4).unwrap());
    cache.clear_memory();

    assert_eq!(cache.line(1).map(|l| l.present_count()), Some(0));
    assert_eq!(cache.get_byte(0x0010), Ok(0));
    assert!(cache.bytes_written().is_empty());
}

/// `clear_all_byte_caches` forgets every byte- and line-level record.
#[test]
fn clear_all_byte_caches() {
    let mut cache = Geometry::small().allocate().build();
    cache.set_byte(0x0001, 1).unwrap();
    read_each(&mut cache, &[0x0000, 0x0100, 0x0200]);
    transaction(&mut cache, AccessType::Data, |c| c.write_byte(0x0002, 1).unwrap());

    cache.clear_all_byte_caches();
    assert!(cache.bytes_read().is_empty());
    assert!(cache.bytes_written().is_empty());
    assert!(cache.bytes_set().is_empty());
    assert!(cache.touched_lines().is_empty());
    assert!(cache.all_evicted_entries().is_empty());
    assert_eq!(cache.transactions().len(), 4);
}

/// Per-line eviction logs clear independently.
#[test]
fn clear_evicted_entries_per_line() {
    let mut cache = Geometry::small().build();
    read_each(&mut cache, &[0x0000, 0x0100, 0x0200, 0x0010, 0x0110, 0x0210]);
    assert_eq!(cache.all_evicted_entries().len(), 2);

    cache.clear_evicted_entries(0);
    assert!(cache.evicted_entries(0).is_empty());
    assert_eq!(cache.evicted_entries(1).len(), 1);
}

/// Lines beyond the index range do not exist.
#[test]
fn line_lookup_is_bounded() {
    let cache = Geometry::small().build();
    assert_eq!(cache.lines().len(), 16);
    assert!(cache.line(15).is_some());
    assert!(cache.line(16).is_none());
    assert_eq!(cache.algorithm_name(), "LRU");
}
