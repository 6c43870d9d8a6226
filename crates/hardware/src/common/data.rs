//! Memory Access Types.
//!
//! This module defines the classification of memory transactions used throughout the simulator.
//! These types are used for the following:
//! 1. **Transaction Tagging:** Each transaction opened on a memory device records what kind of
//!    access the driver is performing.
//! 2. **Statistics Tracking:** Separating instruction-fetch hit rates from data hit rates.

use serde::Deserialize;
use std::fmt;

/// Kind of access performed inside one memory transaction.
///
/// Drivers open a transaction with one of these modes around each group of accesses that
/// belong to a single simulated instruction step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Untyped access (e.g., microcode-driven memory cycles).
    #[default]
    None,

    /// Instruction fetch access.
    ///
    /// Occurs when the driver reads the instruction specifier and operand.
    Instruction,

    /// Data access.
    ///
    /// Occurs when an instruction loads or stores its operand.
    Data,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Instruction => write!(f, "instruction"),
            Self::Data => write!(f, "data"),
        }
    }
}
