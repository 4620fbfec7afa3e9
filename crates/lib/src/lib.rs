//!
//! Opwire: the object wire codec and pending-operation algebra of a
//! document-store client.
//! This library converts typed, possibly cyclic, value graphs to and from the
//! tagged JSON the remote store speaks, and tracks local field changes that
//! the store has not confirmed yet.
//!
//! ## Core Concepts
//!
//! * **Values (`value::Value`)**: The closed set of field values: plain JSON kinds plus dates, geo points, entities, attachments, relations and access lists.
//! * **Entities (`entity::Entity`)**: Shared handles to stored records. Entities can reference each other in cycles.
//! * **Codec (`codec`)**: `encode` turns values into their tagged wire form; `decode` interprets tagged wire maps back into values.
//! * **Operations (`ops::Operation`)**: Local changes to one field (set, unset, increment, array edits, relation edits) that merge into a single net change per field and estimate the field's next value.
//! * **Operation Registry (`ops::OpRegistry`)**: Maps wire `__op` tags to decoders; the built-in tags are installed on first use.
//! * **Pending Operations (`ops::PendingOps`)**: The per-entity queue of unconfirmed field operations.
//! * **Traversal (`traverse`)**: Cycle-safe, depth-first walks over value graphs.

pub mod codec;
pub mod constants;
pub mod entity;
pub mod ops;
pub mod traverse;
pub mod value;

/// Re-export the core types for easier access.
pub use entity::Entity;
pub use ops::{OpRegistry, Operation};
pub use value::Value;

/// Result type used throughout the opwire library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the opwire library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured value conversion errors from the value module
    #[error(transparent)]
    Value(value::ValueError),

    /// Structured encoding errors from the codec module
    #[error(transparent)]
    Codec(codec::CodecError),

    /// Structured merge, estimate and decode errors from the ops module
    #[error(transparent)]
    Op(ops::OpError),

    /// Structured field access errors from the entity module
    #[error(transparent)]
    Entity(entity::EntityError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Value(_) => "value",
            Error::Codec(_) => "codec",
            Error::Op(_) => "ops",
            Error::Entity(_) => "entity",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is codec-related.
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Error::Codec(_))
    }

    /// Check if this error is caused by an entity or attachment that was never saved.
    pub fn is_unsaved_error(&self) -> bool {
        match self {
            Error::Codec(codec_err) => {
                codec_err.is_unsaved_reference() || codec_err.is_unsaved_attachment()
            }
            Error::Op(op_err) => matches!(op_err, ops::OpError::UnsavedRelationTarget { .. }),
            _ => false,
        }
    }

    /// Check if this error is operation-related.
    pub fn is_op_error(&self) -> bool {
        matches!(self, Error::Op(_))
    }

    /// Check if this error is an operation merge or estimate failure.
    pub fn is_merge_error(&self) -> bool {
        match self {
            Error::Op(op_err) => op_err.is_merge_error(),
            _ => false,
        }
    }

    /// Check if this error concerns relation targets.
    pub fn is_relation_error(&self) -> bool {
        match self {
            Error::Op(op_err) => op_err.is_relation_error(),
            _ => false,
        }
    }

    /// Check if this error is a malformed wire operation.
    pub fn is_decode_error(&self) -> bool {
        match self {
            Error::Op(op_err) => op_err.is_decode_error(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Value(value_err) => value_err.is_type_error(),
            Error::Op(op_err) => op_err.is_type_error(),
            Error::Entity(entity_err) => entity_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::Serialize(_))
    }
}
