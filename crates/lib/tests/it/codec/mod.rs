//! Codec integration tests
//!
//! Covers decode idempotence, encode/decode round-trips for every value kind
//! and the handling of entity graphs during encode.

mod decode_tests;
mod encode_tests;
