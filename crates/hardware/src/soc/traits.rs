//! Memory device trait.
//!
//! This module defines the `MemoryDevice` trait implemented by every byte store in the simulator,
//! including the cache, which decorates another device. It provides:
//! 1. **Modeled Access:** `read_byte` / `write_byte`, which may have side effects such as cache
//!    fills or evictions.
//! 2. **Bypass Access:** `get_byte` / `set_byte`, which never perturb modeled state and are meant
//!    for inspectors and loaders.
//! 3. **Lifecycle Hooks:** Transaction, cycle and instruction boundaries driven by the CPU.
//! 4. **Change Tracking:** The sets of addresses written or set since the last clear.
//!
//! Words are big-endian and are built from two byte operations.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::common::{AccessType, MemoryError};

/// Trait for flat, byte-addressable memory devices.
///
/// Read / write are the "real" operations a simulated program performs; get / set are for the
/// user interface and loaders, and must not trigger modeled side effects.
pub trait MemoryDevice {
    /// Returns the highest valid address of this device.
    fn max_address(&self) -> u32;

    /// Resets every byte to zero and clears change tracking.
    fn clear_memory(&mut self);

    /// Reads one byte as part of program execution.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `address` exceeds [`max_address`](Self::max_address).
    fn read_byte(&mut self, address: u32) -> Result<u8, MemoryError>;

    /// Writes one byte as part of program execution.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `address` exceeds [`max_address`](Self::max_address).
    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError>;

    /// Reads one byte without modeled side effects.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `address` exceeds [`max_address`](Self::max_address).
    fn get_byte(&self, address: u32) -> Result<u8, MemoryError>;

    /// Writes one byte without modeled side effects.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfRange`] if `address` exceeds [`max_address`](Self::max_address).
    fn set_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError>;

    /// Reads a big-endian word as two modeled byte reads.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte read.
    fn read_word(&mut self, address: u32) -> Result<u16, MemoryError> {
        let hi = self.read_byte(address)?;
        let lo = self.read_byte(address.wrapping_add(1))?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Writes a big-endian word as two modeled byte writes.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte write.
    fn write_word(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        let [hi, lo] = value.to_be_bytes();
        self.write_byte(address, hi)?;
        self.write_byte(address.wrapping_add(1), lo)
    }

    /// Reads a big-endian word without modeled side effects.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte get.
    fn get_word(&self, address: u32) -> Result<u16, MemoryError> {
        let hi = self.get_byte(address)?;
        let lo = self.get_byte(address.wrapping_add(1))?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Writes a big-endian word without modeled side effects.
    ///
    /// # Errors
    ///
    /// Propagates the first failing byte set.
    fn set_word(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        let [hi, lo] = value.to_be_bytes();
        self.set_byte(address, hi)?;
        self.set_byte(address.wrapping_add(1), lo)
    }

    /// Opens a statistics transaction (usually one per instruction step).
    fn begin_transaction(&mut self, _mode: AccessType) {}

    /// Closes the open statistics transaction.
    fn end_transaction(&mut self) {}

    /// Called by the driver before the accesses of one cycle.
    fn on_cycle_started(&mut self) {}

    /// Called by the driver after the accesses of one cycle.
    fn on_cycle_finished(&mut self) {}

    /// Called by the driver after an instruction has been fully executed.
    fn on_instruction_finished(&mut self, _opcode: u8) {}

    /// Returns the addresses written (via `write_byte`) since the last clear.
    fn bytes_written(&self) -> BTreeSet<u32>;

    /// Returns the addresses set (via `set_byte`) since the last clear.
    fn bytes_set(&self) -> BTreeSet<u32>;

    /// Forgets the written-address record.
    fn clear_bytes_written(&mut self);

    /// Forgets the set-address record.
    fn clear_bytes_set(&mut self);
}

/// Shared handle to a device, so an inspector and a cache can hold the same backing store.
///
/// Each call borrows the cell for its own duration only. Holding a borrow across a call panics,
/// which is the single-threaded equivalent of a data race.
impl<D: MemoryDevice + ?Sized> MemoryDevice for Rc<RefCell<D>> {
    fn max_address(&self) -> u32 {
        self.borrow().max_address()
    }

    fn clear_memory(&mut self) {
        self.borrow_mut().clear_memory();
    }

    fn read_byte(&mut self, address: u32) -> Result<u8, MemoryError> {
        self.borrow_mut().read_byte(address)
    }

    fn write_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.borrow_mut().write_byte(address, value)
    }

    fn get_byte(&self, address: u32) -> Result<u8, MemoryError> {
        self.borrow().get_byte(address)
    }

    fn set_byte(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        self.borrow_mut().set_byte(address, value)
    }

    fn read_word(&mut self, address: u32) -> Result<u16, MemoryError> {
        self.borrow_mut().read_word(address)
    }

    fn write_word(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        self.borrow_mut().write_word(address, value)
    }

    fn get_word(&self, address: u32) -> Result<u16, MemoryError> {
        self.borrow().get_word(address)
    }

    fn set_word(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        self.borrow_mut().set_word(address, value)
    }

    fn begin_transaction(&mut self, mode: AccessType) {
        self.borrow_mut().begin_transaction(mode);
    }

    fn end_transaction(&mut self) {
        self.borrow_mut().end_transaction();
    }

    fn on_cycle_started(&mut self) {
        self.borrow_mut().on_cycle_started();
    }

    fn on_cycle_finished(&mut self) {
        self.borrow_mut().on_cycle_finished();
    }

    fn on_instruction_finished(&mut self, opcode: u8) {
        self.borrow_mut().on_instruction_finished(opcode);
    }

    fn bytes_written(&self) -> BTreeSet<u32> {
        self.borrow().bytes_written()
    }

    fn bytes_set(&self) -> BTreeSet<u32> {
        self.borrow().bytes_set()
    }

    fn clear_bytes_written(&mut self) {
        self.borrow_mut().clear_bytes_written();
    }

    fn clear_bytes_set(&mut self) {
        self.borrow_mut().clear_bytes_set();
    }
}
