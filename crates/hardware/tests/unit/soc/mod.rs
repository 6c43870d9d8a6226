//! Unit tests for memory devices.
