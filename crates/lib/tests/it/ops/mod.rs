//! Operation integration tests
//!
//! Tests the merge algebra through whole mutation sequences, batch decoding
//! and the process-wide registry.

mod batch_tests;
mod merge_tests;
