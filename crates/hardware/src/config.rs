//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline memory size and cache geometry.
//! 2. **Structures:** Hierarchical config for the backing memory and the cache.
//! 3. **Enums:** Write-allocation policy and replacement algorithm types.
//!
//! Configuration is supplied as JSON (see [`Config::from_json_file`]) or built with
//! `Config::default()`.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::cache::CacheConfiguration;
use crate::cache::policies::factory_for;
use crate::common::ConfigLoadError;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration document.
mod defaults {
    /// Size of the backing memory (64 KiB, a 16-bit address space).
    pub const MEMORY_SIZE: usize = 64 * 1024;

    /// Default tag width in bits.
    pub const TAG_BITS: u16 = 9;

    /// Default index width in bits (8 cache lines).
    pub const INDEX_BITS: u16 = 3;

    /// Default offset width in bits (16-byte blocks).
    pub const DATA_BITS: u16 = 4;

    /// Default associativity (4 ways per line).
    pub const ASSOCIATIVITY: u16 = 4;

    /// Default number of cycles between aging epochs for LFUDA and NRU.
    pub const AGE_AFTER: u32 = 16;

    /// Default seed for random and BPLRU replacement.
    pub const SEED: u64 = 123_456_789;
}

/// What happens to the cache on a write miss.
///
/// The cache is always write-through; this only decides whether the missed block is
/// installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum WriteAllocationPolicy {
    /// Install the block on a write miss.
    #[serde(alias = "write_allocate")]
    WriteAllocate,
    /// Bypass the cache on a write miss.
    #[default]
    #[serde(alias = "no_write_allocate")]
    NoWriteAllocate,
}

/// Cache replacement algorithms.
///
/// Specifies the algorithm used to select which cache entry to evict
/// when a new tag must be installed in a full cache line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementAlgorithm {
    /// Least Recently Used.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Most Recently Used.
    #[serde(alias = "Mru")]
    Mru,
    /// Least Frequently Used.
    #[serde(alias = "Lfu")]
    Lfu,
    /// Least Frequently Used with Dynamic Aging.
    #[serde(alias = "Lfuda")]
    Lfuda,
    /// Most Frequently Used.
    #[serde(alias = "Mfu")]
    Mfu,
    /// First In First Out (round-robin).
    #[serde(alias = "Fifo")]
    Fifo,
    /// Random victim selection.
    #[serde(alias = "Random")]
    Random,
    /// Not Recently Used, with periodic clearing of the reference bits.
    #[serde(alias = "Nru")]
    Nru,
    /// Bit Pseudo-LRU: evicts a random way from the half not referenced most recently.
    #[serde(alias = "Bplru")]
    Bplru,
}

impl ReplacementAlgorithm {
    /// Every algorithm, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Lru,
        Self::Mru,
        Self::Lfu,
        Self::Lfuda,
        Self::Mfu,
        Self::Fifo,
        Self::Random,
        Self::Nru,
        Self::Bplru,
    ];

    /// Returns the label reported by [`ReplacementFactory::algorithm_name`](crate::cache::policies::ReplacementFactory::algorithm_name).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lru => "LRU",
            Self::Mru => "MRU",
            Self::Lfu => "LFU",
            Self::Lfuda => "LFUDA",
            Self::Mfu => "MFU",
            Self::Fifo => "FIFO",
            Self::Random => "Random",
            Self::Nru => "NRU",
            Self::Bplru => "BPLRU",
        }
    }
}

impl fmt::Display for ReplacementAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{Config, ReplacementAlgorithm, WriteAllocationPolicy};
///
/// let json = r#"{
///     "memory": { "size_bytes": 65536 },
///     "cache": {
///         "tag_bits": 8,
///         "index_bits": 4,
///         "data_bits": 4,
///         "associativity": 2,
///         "write_allocation": "WriteAllocate",
///         "policy": "FIFO"
///     }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.cache.index_bits, 4);
/// assert_eq!(config.cache.policy, ReplacementAlgorithm::Fifo);
/// assert_eq!(config.cache.write_allocation, WriteAllocationPolicy::WriteAllocate);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Backing memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Cache geometry and policies
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Parses a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::Parse`] for malformed or mistyped documents.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::Io`] if the file cannot be read and
    /// [`ConfigLoadError::Parse`] if its contents are invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Backing memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Number of addressable bytes
    #[serde(default = "MemoryConfig::default_size_bytes")]
    pub size_bytes: usize,
}

impl MemoryConfig {
    /// Returns the default memory size in bytes.
    fn default_size_bytes() -> usize {
        defaults::MEMORY_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::MEMORY_SIZE,
        }
    }
}

/// Configuration for the cache.
///
/// Widths must add up to the backing memory's address width; this is checked when the
/// configuration is applied, not when it is parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Tag width in bits
    #[serde(default = "CacheConfig::default_tag_bits")]
    pub tag_bits: u16,

    /// Index width in bits (the cache has `2^index_bits` lines)
    #[serde(default = "CacheConfig::default_index_bits")]
    pub index_bits: u16,

    /// Offset width in bits
    #[serde(default = "CacheConfig::default_data_bits")]
    pub data_bits: u16,

    /// Number of entries per line
    #[serde(default = "CacheConfig::default_associativity")]
    pub associativity: u16,

    /// Behaviour on write misses
    #[serde(default)]
    pub write_allocation: WriteAllocationPolicy,

    /// Replacement algorithm
    #[serde(default)]
    pub policy: ReplacementAlgorithm,

    /// Cycles between aging epochs (LFUDA and NRU only)
    #[serde(default = "CacheConfig::default_age_after")]
    pub age_after: u32,

    /// Seed for random and BPLRU replacement
    #[serde(default = "CacheConfig::default_seed")]
    pub seed: u64,
}

impl CacheConfig {
    /// Returns the default tag width.
    fn default_tag_bits() -> u16 {
        defaults::TAG_BITS
    }

    /// Returns the default index width.
    fn default_index_bits() -> u16 {
        defaults::INDEX_BITS
    }

    /// Returns the default offset width.
    fn default_data_bits() -> u16 {
        defaults::DATA_BITS
    }

    /// Returns the default associativity.
    fn default_associativity() -> u16 {
        defaults::ASSOCIATIVITY
    }

    /// Returns the default aging epoch length.
    fn default_age_after() -> u32 {
        defaults::AGE_AFTER
    }

    /// Returns the default random seed.
    fn default_seed() -> u64 {
        defaults::SEED
    }

    /// Builds the runtime configuration, including the replacement factory.
    pub fn to_configuration(&self) -> CacheConfiguration {
        CacheConfiguration {
            tag_bits: self.tag_bits,
            index_bits: self.index_bits,
            data_bits: self.data_bits,
            associativity: self.associativity,
            write_allocation: self.write_allocation,
            factory: factory_for(self.policy, self.age_after, self.seed),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tag_bits: defaults::TAG_BITS,
            index_bits: defaults::INDEX_BITS,
            data_bits: defaults::DATA_BITS,
            associativity: defaults::ASSOCIATIVITY,
            write_allocation: WriteAllocationPolicy::default(),
            policy: ReplacementAlgorithm::default(),
            age_after: defaults::AGE_AFTER,
            seed: defaults::SEED,
        }
    }
}
