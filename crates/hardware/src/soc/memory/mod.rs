//! Flat System Memory.
//!
//! This module implements the main byte store that sits behind the cache. It provides:
//! 1. **Storage:** A zero-initialised byte vector addressed from 0 to `size - 1`.
//! 2. **Change Tracking:** The sets of addresses written by the program or set by a loader.
//! 3. **Loading:** Bulk placement of object code without modeled side effects.

use std::collections::BTreeSet;

use crate::common::MemoryError;
use crate::config::MemoryConfig;
use crate::soc::traits::MemoryDevice;

/// Main memory device.
#[derive(Clone, Debug)]
pub struct MainMemory {
    data: Vec<u8>,
    bytes_written: BTreeSet<u32>,
    bytes_set: BTreeSet<u32>,
}

impl MainMemory {
    /// Creates a zero-filled memory of `size` bytes.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of addressable bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            bytes_written: BTreeSet::new(),
            bytes_set: BTreeSet::new(),
        }
    }

    /// Creates a memory sized by `config`.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.size_bytes)
    }

    /// Returns the number of addressable bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Copies `bytes` into memory starting at `offset`, as a series of `set_byte` calls.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if the image does not fit; nothing is written in
    /// that case.
    pub fn load(&mut self, offset: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        let end = offset as usize + bytes.len();
        if end > self.data.len() {
            return Err(MemoryError::OutOfRange {
                address: end.saturating_sub(1) as u32,
                max_address: self.max_address(),
            });
        }
        for (address, byte) in (offset..).zip(bytes) {
            self.set_byte(address, *byte)?;
        }
        Ok(())
    }

    fn check(&self, address: u32) -> Result<usize, MemoryError> {
        let idx = address as usize;
        if idx < self.data.len() {
            Ok(idx)
        } else {
            Err(MemoryError::OutOfRange {
                address,
                max_address: self.max_address(),
            })
        }
    }
}

impl MemoryDevice for MainMemory {
    fn max_address(&self) -> u32 {
        u32::try_from(self.data.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    fn clear_memory(&mut self) {
        self.data.fill(0);
        self.bytes_written.clear();
        self.bytes_set.clear();
    }

    fn read_byte(&mut self, address: u32) -> Result<u8, MemoryError> {
        self.get_byte(address)
    }

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        let idx = self.check(address)?;
        self.data[idx] = value;
        let _ = self.bytes_written.insert(address);
        Ok(())
    }

    fn get_byte(&self, address: u32) -> Result<u8, MemoryError> {
        let idx = self.check(address)?;
        Ok(self.data[idx])
    }

    fn set_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        let idx = self.check(address)?;
        self.data[idx] = value;
        let _ = self.bytes_set.insert(address);
        Ok(())
    }

    fn bytes_written(&self) -> BTreeSet<u32> {
        self.bytes_written.clone()
    }

    fn bytes_set(&self) -> BTreeSet<u32> {
        self.bytes_set.clone()
    }

    fn clear_bytes_written(&mut self) {
        self.bytes_written.clear();
    }

    fn clear_bytes_set(&mut self) {
        self.bytes_set.clear();
    }
}
