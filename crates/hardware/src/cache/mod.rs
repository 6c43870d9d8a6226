//! Set-Associative Cache Simulator.
//!
//! This module implements a configurable set-associative cache that decorates a backing
//! [`MemoryDevice`]. The cache never stores payload bytes; it models which blocks *would* be
//! present in real hardware and reports hits, misses and evictions. It provides:
//! 1. **Geometry:** Tag / index / offset widths plus associativity, validated against the
//!    backing device's address width.
//! 2. **Access Modeling:** Write-through writes, with write-allocate or no-write-allocate
//!    behaviour on write misses.
//! 3. **Statistics:** Per-transaction hit/miss tallies, deduplicated per `(index, tag)`.
//! 4. **Inspection:** Touched lines, an eviction log, and the transaction history.
//! 5. **Reconfiguration:** All-or-nothing geometry changes with observer notification.
//! 6. **Aging:** Per-cycle decay of replacement state for algorithms that support it.

/// Cache lines (sets) and entries.
pub mod line;

/// Cache replacement policy implementations (LRU, MRU, LFU, MFU, LFUDA, FIFO, Random, NRU,
/// BPLRU).
pub mod policies;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

pub use self::line::{CacheEntry, CacheLine};
use self::policies::ReplacementFactory;
use crate::common::{AccessType, CacheAddress, ConfigError, MemoryError, address_bits};
use crate::config::WriteAllocationPolicy;
use crate::soc::traits::MemoryDevice;
use crate::stats::{MemoryAccessStatistics, Transaction};

/// Everything needed to (re)build a cache.
#[derive(Clone, Debug)]
pub struct CacheConfiguration {
    /// Tag width in bits.
    pub tag_bits: u16,
    /// Index width in bits; the cache has `2^index_bits` lines.
    pub index_bits: u16,
    /// Offset width in bits.
    pub data_bits: u16,
    /// Entries per line.
    pub associativity: u16,
    /// Behaviour on write misses.
    pub write_allocation: WriteAllocationPolicy,
    /// Creates one replacement policy per line.
    pub factory: Arc<dyn ReplacementFactory>,
}

impl CacheConfiguration {
    /// Checks this configuration against a device whose last address is `max_address`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroAssociativity`] if `associativity` is 0.
    /// - [`ConfigError::WidthMismatch`] if the three widths do not sum to the device's address
    ///   width.
    /// - [`ConfigError::AssociativityTooLarge`] if `2^index_bits < associativity`.
    pub fn validate(&self, max_address: u32) -> Result<(), ConfigError> {
        if self.associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }

        let width = address_bits(max_address);
        let requested =
            u32::from(self.tag_bits) + u32::from(self.index_bits) + u32::from(self.data_bits);
        if requested != u32::from(width) {
            return Err(ConfigError::WidthMismatch {
                tag_bits: self.tag_bits,
                index_bits: self.index_bits,
                data_bits: self.data_bits,
                address_bits: width,
            });
        }

        let sets = 1u64 << self.index_bits;
        if sets < u64::from(self.associativity) {
            return Err(ConfigError::AssociativityTooLarge {
                sets,
                associativity: self.associativity,
            });
        }
        Ok(())
    }

    /// Returns `true` if [`validate`](Self::validate) would accept this configuration.
    pub fn is_safe(&self, max_address: u32) -> bool {
        self.validate(max_address).is_ok()
    }

    /// Returns the plain geometry, without the factory.
    pub const fn geometry(&self) -> CacheGeometry {
        CacheGeometry {
            tag_bits: self.tag_bits,
            index_bits: self.index_bits,
            data_bits: self.data_bits,
            associativity: self.associativity,
            write_allocation: self.write_allocation,
        }
    }
}

/// The shape of a cache, as reported to configuration observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Tag width in bits.
    pub tag_bits: u16,
    /// Index width in bits.
    pub index_bits: u16,
    /// Offset width in bits.
    pub data_bits: u16,
    /// Entries per line.
    pub associativity: u16,
    /// Behaviour on write misses.
    pub write_allocation: WriteAllocationPolicy,
}

impl CacheGeometry {
    /// Number of lines (`2^index_bits`).
    pub const fn line_count(&self) -> usize {
        1usize << self.index_bits
    }

    /// Bytes per block (`2^data_bits`).
    pub const fn block_size(&self) -> u64 {
        1u64 << self.data_bits
    }
}

/// Callback invoked with the new geometry after a successful reconfiguration.
pub type ConfigurationObserver = Box<dyn FnMut(&CacheGeometry)>;

/// A set-associative, write-through cache in front of a backing memory device.
///
/// Modeled accesses (`read_byte` / `write_byte`) must happen inside a transaction opened with
/// [`MemoryDevice::begin_transaction`]. Accesses outside one are a driver bug and panic.
///
/// # Examples
///
/// ```
/// use cachesim_core::cache::CacheMemory;
/// use cachesim_core::common::AccessType;
/// use cachesim_core::config::CacheConfig;
/// use cachesim_core::soc::{MainMemory, MemoryDevice};
///
/// let config = CacheConfig::default().to_configuration();
/// let mut cache = CacheMemory::new(MainMemory::new(64 * 1024), config).unwrap();
///
/// cache.begin_transaction(AccessType::Data);
/// cache.write_byte(0x1234, 0xAB).unwrap();
/// assert_eq!(cache.read_byte(0x1234).unwrap(), 0xAB);
/// cache.end_transaction();
///
/// let tx = cache.transactions()[0];
/// assert_eq!(tx.stats.write_miss, 1);
/// assert_eq!(tx.stats.read_hit, 0); // same (index, tag) already counted
/// ```
pub struct CacheMemory<M: MemoryDevice> {
    backing: M,
    geometry: CacheGeometry,
    factory: Arc<dyn ReplacementFactory>,
    lines: Vec<CacheLine>,

    touched: BTreeSet<u32>,
    evicted: BTreeMap<u32, Vec<CacheEntry>>,
    track_reads: bool,
    bytes_read: BTreeSet<u32>,

    transaction: Transaction,
    in_transaction: bool,
    /// `(index, tag)` pairs already counted in the open transaction.
    transaction_lines: HashSet<(u32, u32)>,
    history: Vec<Transaction>,
    in_cycle: bool,

    observers: Vec<ConfigurationObserver>,
}

impl<M: MemoryDevice> CacheMemory<M> {
    /// Creates a cache in front of `backing`.
    ///
    /// Read tracking starts enabled.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` does not fit `backing`.
    pub fn new(backing: M, config: CacheConfiguration) -> Result<Self, ConfigError> {
        config.validate(backing.max_address())?;
        let lines = build_lines(&config);
        Ok(Self {
            backing,
            geometry: config.geometry(),
            factory: config.factory,
            lines,
            touched: BTreeSet::new(),
            evicted: BTreeMap::new(),
            track_reads: true,
            bytes_read: BTreeSet::new(),
            transaction: Transaction::default(),
            in_transaction: false,
            transaction_lines: HashSet::new(),
            history: Vec::new(),
            in_cycle: false,
            observers: Vec::new(),
        })
    }

    /// Replaces the geometry, write policy and replacement factory.
    ///
    /// On success every line is rebuilt empty with a fresh policy, the touched set, eviction
    /// log and dedup set are cleared, and observers are notified. The transaction history and
    /// the open transaction's tally are kept.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] and leaves the cache completely untouched if `config` does
    /// not fit the backing device.
    pub fn resize_cache(&mut self, config: CacheConfiguration) -> Result<(), ConfigError> {
        if let Err(err) = config.validate(self.backing.max_address()) {
            tracing::warn!(%err, "rejected cache configuration");
            return Err(err);
        }

        self.lines = build_lines(&config);
        self.geometry = config.geometry();
        self.factory = config.factory;
        self.touched.clear();
        self.evicted.clear();
        self.transaction_lines.clear();

        tracing::info!(
            tag_bits = self.geometry.tag_bits,
            index_bits = self.geometry.index_bits,
            data_bits = self.geometry.data_bits,
            associativity = self.geometry.associativity,
            algorithm = self.factory.algorithm_name(),
            "cache reconfigured"
        );

        let geometry = self.geometry;
        for observer in &mut self.observers {
            observer(&geometry);
        }
        Ok(())
    }

    /// Registers a callback run after every successful [`resize_cache`](Self::resize_cache).
    pub fn on_configuration_changed(&mut self, observer: impl FnMut(&CacheGeometry) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Splits `address` using the current geometry.
    pub fn breakdown_address(&self, address: u32) -> CacheAddress {
        CacheAddress::decompose(
            address,
            self.geometry.tag_bits,
            self.geometry.index_bits,
            self.geometry.data_bits,
        )
    }

    /// Returns the current geometry.
    pub const fn geometry(&self) -> CacheGeometry {
        self.geometry
    }

    /// Returns the current write-miss behaviour.
    pub const fn write_allocation(&self) -> WriteAllocationPolicy {
        self.geometry.write_allocation
    }

    /// Returns the line at `index`, if it exists.
    pub fn line(&self, index: u32) -> Option<&CacheLine> {
        self.lines.get(usize::try_from(index).ok()?)
    }

    /// Returns every line in index order.
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Returns the replacement algorithm's diagnostic label.
    pub fn algorithm_name(&self) -> &str {
        self.factory.algorithm_name()
    }

    /// Returns the backing device.
    pub const fn backing(&self) -> &M {
        &self.backing
    }

    /// Returns the backing device mutably.
    ///
    /// Accesses made through this handle bypass the cache model.
    pub const fn backing_mut(&mut self) -> &mut M {
        &mut self.backing
    }

    /// Consumes the cache and returns the backing device.
    pub fn into_backing(self) -> M {
        self.backing
    }

    /// Marks every entry absent and clears the touched set (see
    /// [`clear_touched_lines`](Self::clear_touched_lines)). The backing device is unchanged.
    pub fn clear_cache(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.clear_touched_lines();
    }

    /// Returns the indices of lines touched since the last clear.
    pub const fn touched_lines(&self) -> &BTreeSet<u32> {
        &self.touched
    }

    /// Forgets which lines were touched, and which `(index, tag)` pairs the open transaction
    /// has already counted.
    pub fn clear_touched_lines(&mut self) {
        self.touched.clear();
        self.transaction_lines.clear();
    }

    /// Returns the entries evicted from line `index`, oldest first.
    pub fn evicted_entries(&self, index: u32) -> &[CacheEntry] {
        self.evicted.get(&index).map_or(&[], Vec::as_slice)
    }

    /// Returns the whole eviction log, keyed by line index.
    pub const fn all_evicted_entries(&self) -> &BTreeMap<u32, Vec<CacheEntry>> {
        &self.evicted
    }

    /// Forgets the evictions logged for line `index`.
    pub fn clear_evicted_entries(&mut self, index: u32) {
        let _ = self.evicted.remove(&index);
    }

    /// Forgets every logged eviction.
    pub fn clear_all_evicted_entries(&mut self) {
        self.evicted.clear();
    }

    /// Returns whether modeled reads are recorded (and whether read-miss evictions are logged).
    pub const fn read_tracking_enabled(&self) -> bool {
        self.track_reads
    }

    /// Enables or disables read tracking.
    pub const fn set_read_tracking_enabled(&mut self, enabled: bool) {
        self.track_reads = enabled;
    }

    /// Returns the addresses read while read tracking was enabled.
    pub const fn bytes_read(&self) -> &BTreeSet<u32> {
        &self.bytes_read
    }

    /// Forgets the read-address record.
    pub fn clear_bytes_read(&mut self) {
        self.bytes_read.clear();
    }

    /// Clears every byte-level and line-level record: bytes read, written and set, the touched
    /// set and the eviction log.
    pub fn clear_all_byte_caches(&mut self) {
        self.clear_bytes_read();
        self.clear_bytes_written();
        self.clear_bytes_set();
        self.clear_touched_lines();
        self.clear_all_evicted_entries();
    }

    /// Returns the completed transactions since the last clear, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.history
    }

    /// Returns the open transaction's tally so far, if one is open.
    pub const fn current_transaction(&self) -> Option<&Transaction> {
        if self.in_transaction {
            Some(&self.transaction)
        } else {
            None
        }
    }

    /// Returns whether a transaction is open.
    pub const fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Forgets the transaction history.
    pub fn clear_transaction_info(&mut self) {
        self.history.clear();
    }

    fn assert_in_transaction(&self, operation: &str) {
        assert!(
            self.in_transaction,
            "{operation} called outside of a memory transaction"
        );
    }

    /// Counts an access once per `(index, tag)` within the open transaction.
    fn tally(&mut self, address: CacheAddress, bump: fn(&mut MemoryAccessStatistics)) {
        if self.transaction_lines.insert((address.index, address.tag)) {
            bump(&mut self.transaction.stats);
        }
    }

    fn log_eviction(&mut self, address: CacheAddress, evicted: CacheEntry) {
        tracing::debug!(
            index = address.index,
            evicted_tag = evicted.tag,
            new_tag = address.tag,
            usage = evicted.usage,
            "evicted cache entry"
        );
        self.evicted.entry(address.index).or_default().push(evicted);
    }

    fn line_mut(&mut self, index: u32) -> &mut CacheLine {
        // Decomposition masks the index to `index_bits`, and there are `2^index_bits` lines.
        &mut self.lines[index as usize]
    }
}

fn build_lines(config: &CacheConfiguration) -> Vec<CacheLine> {
    (0..config.geometry().line_count())
        .map(|_| {
            CacheLine::new(
                config.associativity,
                config.factory.create_policy(config.associativity),
            )
        })
        .collect()
}

impl<M: MemoryDevice> MemoryDevice for CacheMemory<M> {
    fn max_address(&self) -> u32 {
        self.backing.max_address()
    }

    /// Clears the cache model and the backing device.
    fn clear_memory(&mut self) {
        self.clear_cache();
        self.backing.clear_memory();
    }

    /// # Panics
    ///
    /// Panics if no transaction is open.
    fn read_byte(&mut self, address: u32) -> Result<u8, MemoryError> {
        self.assert_in_transaction("read_byte");
        if self.track_reads {
            let _ = self.bytes_read.insert(address);
        }

        let ca = self.breakdown_address(address);
        let line = self.line_mut(ca.index);
        if line.contains_tag(ca.tag) {
            line.update(ca);
            tracing::trace!(address, index = ca.index, tag = ca.tag, "read hit");
            self.tally(ca, |s| s.read_hit += 1);
        } else {
            let evicted = line.insert(ca);
            tracing::trace!(address, index = ca.index, tag = ca.tag, "read miss");
            if self.track_reads && evicted.is_present {
                self.log_eviction(ca, evicted);
            }
            self.tally(ca, |s| s.read_miss += 1);
        }
        let _ = self.touched.insert(ca.index);

        self.backing.read_byte(address)
    }

    /// # Panics
    ///
    /// Panics if no transaction is open.
    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.assert_in_transaction("write_byte");

        let ca = self.breakdown_address(address);
        let allocate = self.geometry.write_allocation == WriteAllocationPolicy::WriteAllocate;
        let line = self.line_mut(ca.index);
        if line.contains_tag(ca.tag) {
            line.update(ca);
            tracing::trace!(address, index = ca.index, tag = ca.tag, "write hit");
            let _ = self.touched.insert(ca.index);
            self.tally(ca, |s| s.write_hit += 1);
        } else if allocate {
            let evicted = line.insert(ca);
            tracing::trace!(address, index = ca.index, tag = ca.tag, "write miss, allocated");
            // Logged regardless of read tracking.
            if evicted.is_present {
                self.log_eviction(ca, evicted);
            }
            let _ = self.touched.insert(ca.index);
            self.tally(ca, |s| s.write_miss += 1);
        } else {
            tracing::trace!(address, index = ca.index, tag = ca.tag, "write miss, bypassed");
            self.tally(ca, |s| s.write_miss += 1);
        }

        self.backing.write_byte(address, value)
    }

    fn get_byte(&self, address: u32) -> Result<u8, MemoryError> {
        self.backing.get_byte(address)
    }

    fn set_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.backing.set_byte(address, value)
    }

    /// # Panics
    ///
    /// Panics if a transaction is already open.
    fn begin_transaction(&mut self, mode: AccessType) {
        assert!(
            !self.in_transaction,
            "begin_transaction called while a transaction is already open"
        );
        self.backing.begin_transaction(mode);
        self.transaction = Transaction::new(mode);
        self.transaction_lines.clear();
        self.in_transaction = true;
    }

    /// # Panics
    ///
    /// Panics if no transaction is open.
    fn end_transaction(&mut self) {
        assert!(
            self.in_transaction,
            "end_transaction called without an open transaction"
        );
        self.in_transaction = false;
        self.history.push(self.transaction);
        self.transaction_lines.clear();
        self.backing.end_transaction();
    }

    /// # Panics
    ///
    /// Panics if a cycle is already in progress.
    fn on_cycle_started(&mut self) {
        assert!(!self.in_cycle, "on_cycle_started called twice without finishing the cycle");
        self.in_cycle = true;
        self.backing.on_cycle_started();
    }

    /// Ages replacement state, stopping at the first line whose policy cannot age.
    ///
    /// Every line shares one algorithm, so in practice either all lines age or none do.
    ///
    /// # Panics
    ///
    /// Panics if no cycle was started.
    fn on_cycle_finished(&mut self) {
        assert!(self.in_cycle, "on_cycle_finished called without a started cycle");
        self.in_cycle = false;
        self.backing.on_cycle_finished();

        for line in &mut self.lines {
            let policy = line.policy_mut();
            if !policy.can_age() {
                break;
            }
            policy.age();
        }
    }

    /// Clears the transaction history.
    ///
    /// # Panics
    ///
    /// Panics if a transaction is still open.
    fn on_instruction_finished(&mut self, opcode: u8) {
        assert!(
            !self.in_transaction,
            "on_instruction_finished called while a transaction is open"
        );
        self.history.clear();
        self.backing.on_instruction_finished(opcode);
    }

    fn bytes_written(&self) -> BTreeSet<u32> {
        self.backing.bytes_written()
    }

    fn bytes_set(&self) -> BTreeSet<u32> {
        self.backing.bytes_set()
    }

    fn clear_bytes_written(&mut self) {
        self.backing.clear_bytes_written();
    }

    fn clear_bytes_set(&mut self) {
        self.backing.clear_bytes_set();
    }
}

impl<M: MemoryDevice + fmt::Debug> fmt::Debug for CacheMemory<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheMemory")
            .field("backing", &self.backing)
            .field("geometry", &self.geometry)
            .field("algorithm", &self.factory.algorithm_name())
            .field("touched", &self.touched)
            .field("in_transaction", &self.in_transaction)
            .field("transactions", &self.history.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
