//! Set-associative cache simulator library.
//!
//! This crate models the metadata side of a configurable cache placed in front of a flat,
//! byte-addressable memory, for instructional inspection. It provides the following:
//! 1. **Cache:** Address decomposition, lines with pluggable replacement policies, write-through
//!    with write-allocate or no-write-allocate, atomic reconfiguration and cycle-driven aging.
//! 2. **Statistics:** Per-transaction hit/miss tallies with `(index, tag)` deduplication.
//! 3. **SoC:** The `MemoryDevice` contract and a flat main memory.
//! 4. **Configuration:** JSON-loadable geometry and policy settings.

/// Set-associative cache (configuration, lines, replacement policies).
pub mod cache;
/// Common types (address breakdown, access types, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Memory devices (the device trait and main memory).
pub mod soc;
/// Cache access statistics.
pub mod stats;

/// The cache decorator; construct with `CacheMemory::new`.
pub use crate::cache::{CacheConfiguration, CacheMemory};
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Byte-addressable device contract and the flat RAM implementing it.
pub use crate::soc::{MainMemory, MemoryDevice};
