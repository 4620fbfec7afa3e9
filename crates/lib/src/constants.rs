//! Constants used throughout the opwire library.
//!
//! This module provides central definitions for the wire vocabulary: the
//! discriminator keys, the composite value tags and the operation tags
//! exchanged with the remote store.

/// Discriminator key carried by every tagged composite value.
pub const TYPE_KEY: &str = "__type";

/// Discriminator key carried by every encoded operation.
pub const OP_KEY: &str = "__op";

/// Key holding an entity's class on `Pointer`, `Object` and `Relation` values.
pub const CLASS_NAME_KEY: &str = "className";

/// Key holding an entity's id on `Pointer` and `Object` values.
pub const OBJECT_ID_KEY: &str = "objectId";

/// Server-assigned creation timestamp of an entity.
pub const CREATED_AT_KEY: &str = "createdAt";

/// Server-assigned modification timestamp of an entity.
pub const UPDATED_AT_KEY: &str = "updatedAt";

/// Field name whose value always decodes as an access list.
pub const ACL_KEY: &str = "ACL";

// Composite value tags
pub const TYPE_DATE: &str = "Date";
pub const TYPE_GEO_POINT: &str = "GeoPoint";
pub const TYPE_POINTER: &str = "Pointer";
pub const TYPE_OBJECT: &str = "Object";
pub const TYPE_RELATION: &str = "Relation";
pub const TYPE_FILE: &str = "File";

// Operation tags
pub const OP_DELETE: &str = "Delete";
pub const OP_INCREMENT: &str = "Increment";
pub const OP_ADD: &str = "Add";
pub const OP_ADD_UNIQUE: &str = "AddUnique";
pub const OP_REMOVE: &str = "Remove";
pub const OP_ADD_RELATION: &str = "AddRelation";
pub const OP_REMOVE_RELATION: &str = "RemoveRelation";
pub const OP_BATCH: &str = "Batch";

/// Every operation tag registered by default, in registration order.
pub const BUILTIN_OPS: [&str; 8] = [
    OP_DELETE,
    OP_INCREMENT,
    OP_ADD,
    OP_ADD_UNIQUE,
    OP_REMOVE,
    OP_ADD_RELATION,
    OP_REMOVE_RELATION,
    OP_BATCH,
];
