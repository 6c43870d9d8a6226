//! Error definitions for the cache simulator.
//!
//! This module defines the recoverable failures of the simulator. It provides:
//! 1. **Configuration Errors:** Rejected cache geometries (bit widths that do not cover the
//!    backing device, or associativity that the set count cannot hold).
//! 2. **Memory Errors:** Faults raised by a backing memory device, propagated unchanged through
//!    the cache.
//! 3. **Load Errors:** Failures while reading a JSON configuration file from disk.
//!
//! Contract violations by the driving simulator (nested transactions, accesses outside a
//! transaction) are not represented here; they panic.

use thiserror::Error;

/// Reasons a cache configuration is rejected.
///
/// Returned by [`CacheConfiguration::validate`](crate::cache::CacheConfiguration::validate),
/// [`CacheMemory::new`](crate::cache::CacheMemory::new) and
/// [`CacheMemory::resize_cache`](crate::cache::CacheMemory::resize_cache). A rejected
/// configuration never modifies an existing cache.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The tag, index and offset widths do not add up to the device's address width.
    #[error(
        "tag ({tag_bits}) + index ({index_bits}) + offset ({data_bits}) bits must equal the \
         {address_bits}-bit address width of the backing memory"
    )]
    WidthMismatch {
        /// Requested tag width.
        tag_bits: u16,
        /// Requested index width.
        index_bits: u16,
        /// Requested offset width.
        data_bits: u16,
        /// Address width of the backing device.
        address_bits: u16,
    },

    /// There are fewer sets than ways, so `2^index_bits < associativity`.
    #[error("{sets} cache lines cannot hold an associativity of {associativity}")]
    AssociativityTooLarge {
        /// Number of sets (`2^index_bits`).
        sets: u64,
        /// Requested associativity.
        associativity: u16,
    },

    /// An associativity of zero leaves no way to install an entry.
    #[error("associativity must be at least 1")]
    ZeroAssociativity,
}

/// Faults raised by a memory device.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    /// The address lies beyond the last byte of the device.
    #[error("address {address:#06x} is beyond the last address {max_address:#06x}")]
    OutOfRange {
        /// The faulting address.
        address: u32,
        /// The highest valid address of the device.
        max_address: u32,
    },
}

/// Failures while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON or does not match the configuration schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
