//! Traversal integration tests
