//! Error types for the value codec.
//!
//! Every failure here is a structural problem with the value being encoded;
//! retrying the same encode would fail the same way.

use thiserror::Error;

/// Structured error types for encoding values to their wire form.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CodecError {
    /// An entity appeared where only non-entity values are permitted
    #[error("Entities are not allowed here (found entity of class '{class_name}')")]
    EntitiesNotAllowedHere { class_name: String },

    /// An entity with unsaved changes cannot be referenced by pointer or embedded
    #[error("Tried to save an object with a pointer to a new, unsaved object of class '{class_name}'")]
    UnsavedForwardReference { class_name: String },

    /// An attachment has no confirmed remote location yet
    #[error("Tried to save an object containing an unsaved file '{name}'")]
    UnsavedAttachment { name: String },
}

impl CodecError {
    /// Check if this error is caused by an entity that has not been saved
    pub fn is_unsaved_reference(&self) -> bool {
        matches!(self, CodecError::UnsavedForwardReference { .. })
    }

    /// Check if this error is caused by an attachment that has not been uploaded
    pub fn is_unsaved_attachment(&self) -> bool {
        matches!(self, CodecError::UnsavedAttachment { .. })
    }

    /// Check if this error is caused by an entity in an entity-free context
    pub fn is_disallowed_entity(&self) -> bool {
        matches!(self, CodecError::EntitiesNotAllowedHere { .. })
    }

    /// Get the class name if this error concerns an entity
    pub fn class_name(&self) -> Option<&str> {
        match self {
            CodecError::EntitiesNotAllowedHere { class_name }
            | CodecError::UnsavedForwardReference { class_name } => Some(class_name),
            CodecError::UnsavedAttachment { .. } => None,
        }
    }
}

// Conversion from CodecError to the main Error type
impl From<CodecError> for crate::Error {
    fn from(err: CodecError) -> Self {
        crate::Error::Codec(err)
    }
}
