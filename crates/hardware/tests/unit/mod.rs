//! # Unit Components
//!
//! This module serves as the central hub for the tests of each simulator component,
//! from pure address arithmetic up to the full cache decorator.



/// Unit tests for the cache: policies, lines, access semantics, transactions,
/// reconfiguration and aging.
pub mod cache;

/// Unit tests for memory devices.
///
/// This module organizes tests for the flat main memory and shared device handles.
pub mod soc;

/// Unit tests for statistics aggregation and reporting.
pub mod stats;
