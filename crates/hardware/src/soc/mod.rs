//! System Components.
//!
//! This module organizes the memory devices that make up the simulated system: the device
//! contract shared by RAM and cache, and the flat main memory used as a backing store.

/// Main memory implementation.
pub mod memory;

/// Memory device trait definitions.
pub mod traits;

pub use memory::MainMemory;
pub use traits::MemoryDevice;
