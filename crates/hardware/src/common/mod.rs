//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Address Breakdown:** Splitting raw addresses into tag, index and offset fields.
//! 2. **Memory Access:** Definitions for categorizing memory transactions.
//! 3. **Error Handling:** Configuration, memory and load error types.

/// Cache address decomposition (tag, index, offset).
pub mod addr;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{CacheAddress, address_bits, low_mask};
pub use data::AccessType;
pub use error::{ConfigError, ConfigLoadError, MemoryError};
