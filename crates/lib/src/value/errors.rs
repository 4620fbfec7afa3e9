//! Error types for value conversions.

use thiserror::Error;

/// Errors raised when a [`Value`](super::Value) is read as a specific kind.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ValueError {
    /// The value is of a different kind than requested
    #[error("Value type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl ValueError {
    /// Check if this error is a type mismatch
    pub fn is_type_error(&self) -> bool {
        matches!(self, ValueError::TypeMismatch { .. })
    }
}

// Conversion from ValueError to the main Error type
impl From<ValueError> for crate::Error {
    fn from(err: ValueError) -> Self {
        crate::Error::Value(err)
    }
}
