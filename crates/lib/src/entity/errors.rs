//! Error types for entity field access.

use thiserror::Error;

/// Structured error types for reading entity fields as a specific kind.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EntityError {
    /// The field holds something other than a relation
    #[error("Field '{key}' is not a relation (found {found})")]
    NotARelation { key: String, found: &'static str },
}

impl EntityError {
    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, EntityError::NotARelation { .. })
    }

    /// Get the field name this error concerns
    pub fn key(&self) -> &str {
        match self {
            EntityError::NotARelation { key, .. } => key,
        }
    }
}

// Conversion from EntityError to the main Error type
impl From<EntityError> for crate::Error {
    fn from(err: EntityError) -> Self {
        crate::Error::Entity(err)
    }
}
