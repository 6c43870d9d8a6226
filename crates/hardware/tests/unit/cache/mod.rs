//! Unit tests for the cache.




/// Read / write semantics and the reference scenarios.
pub mod memory;




/// Transaction state machine and deduplicated statistics.
pub mod transactions;
