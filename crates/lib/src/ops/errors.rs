//! Error types for operations.
//!
//! Merge and estimate failures describe an impossible sequence of local
//! mutations on one field. Decode failures describe a known operation tag
//! carrying a payload of the wrong shape.

use thiserror::Error;

/// Structured error types for operation merge, estimate and decode.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OpError {
    /// `op` cannot follow `previous` on the same field
    #[error("Operation {op} is invalid after previous operation {previous}")]
    InvalidOperationSequence {
        op: &'static str,
        previous: &'static str,
    },

    /// A relation change was queued after the field was deleted
    #[error("You can't modify a relation after deleting it")]
    RelationAfterUnset,

    /// Related entities of two different classes were combined
    #[error("Related object must be of class {expected}, but {actual} was passed in")]
    RelationClassMismatch { expected: String, actual: String },

    /// An entity without an id was passed to a relation operation
    #[error("You can't add an unsaved object of class '{class_name}' to a relation")]
    UnsavedRelationTarget { class_name: String },

    /// An increment was applied over a non-numeric value
    #[error("Cannot increment a non-numeric value of type {found}")]
    NonNumericIncrement { found: &'static str },

    /// An array operation was applied over a non-array value
    #[error("{op} expects an array value, found {found}")]
    ExpectedArray {
        op: &'static str,
        found: &'static str,
    },

    /// A registered operation tag carried a payload of the wrong shape
    #[error("Malformed {tag} operation: {reason}")]
    MalformedOperation { tag: String, reason: String },
}

impl OpError {
    /// Check if this error comes from merging or estimating operations
    pub fn is_merge_error(&self) -> bool {
        matches!(
            self,
            OpError::InvalidOperationSequence { .. }
                | OpError::RelationAfterUnset
                | OpError::NonNumericIncrement { .. }
                | OpError::ExpectedArray { .. }
        )
    }

    /// Check if this error concerns relation targets
    pub fn is_relation_error(&self) -> bool {
        matches!(
            self,
            OpError::RelationAfterUnset
                | OpError::RelationClassMismatch { .. }
                | OpError::UnsavedRelationTarget { .. }
        )
    }

    /// Check if this error comes from decoding a wire operation
    pub fn is_decode_error(&self) -> bool {
        matches!(self, OpError::MalformedOperation { .. })
    }

    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            OpError::NonNumericIncrement { .. } | OpError::ExpectedArray { .. }
        )
    }
}

// Conversion from OpError to the main Error type
impl From<OpError> for crate::Error {
    fn from(err: OpError) -> Self {
        crate::Error::Op(err)
    }
}
