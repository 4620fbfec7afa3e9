//! Leaf value holders: geo points, attachments, relations, access lists,
//! patterns and pointers.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A named binary attachment.
///
/// An attachment can only be encoded once the remote store has confirmed a
/// location for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: Option<String>,
}

impl Attachment {
    /// An attachment that has not been uploaded yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    /// An attachment with a confirmed remote location.
    pub fn uploaded(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.url.is_some()
    }
}

/// A many-to-many reference field.
///
/// The related entities are never materialized here; the relation only knows
/// its target class and the ids with unconfirmed membership changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelationRef {
    /// Class of the related entities, once known
    pub target_class: Option<String>,
    /// Field of the owning entity holding this relation
    pub key: Option<String>,
    /// Ids added locally and not yet confirmed
    pub pending_adds: IndexSet<String>,
    /// Ids removed locally and not yet confirmed
    pub pending_removes: IndexSet<String>,
}

impl RelationRef {
    pub fn new(key: Option<String>, target_class: Option<String>) -> Self {
        Self {
            target_class,
            key,
            ..Default::default()
        }
    }
}

/// Opaque access-control data, passed through the codec untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessList(serde_json::Map<String, serde_json::Value>);

impl AccessList {
    pub fn new(entries: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(entries)
    }

    pub fn as_json(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Map<String, serde_json::Value> {
        self.0
    }
}

/// A regular-expression-like value.
///
/// Only the source travels over the wire; flags are local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flags: flags.into(),
        }
    }
}

/// A reference to a saved entity by class and id, without field data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub class_name: String,
    pub object_id: String,
}

impl Pointer {
    pub fn new(class_name: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            object_id: object_id.into(),
        }
    }
}
