//! Fixed-shape tagged wire values.
//!
//! `Object` is open-ended and built by hand in [`super::encode`]; every other
//! `__type` has a fixed shape that serde produces directly.

use serde::Serialize;

use crate::{Result, value::Pointer};

#[derive(Debug, Serialize)]
#[serde(tag = "__type", rename_all_fields = "camelCase")]
pub(crate) enum Tagged<'a> {
    Date {
        iso: String,
    },
    GeoPoint {
        latitude: f64,
        longitude: f64,
    },
    Pointer {
        class_name: &'a str,
        object_id: &'a str,
    },
    Relation {
        class_name: Option<&'a str>,
    },
    File {
        name: &'a str,
        url: &'a str,
    },
}

impl Tagged<'_> {
    pub(crate) fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Pointer {
    /// The `{"__type": "Pointer", className, objectId}` wire form.
    pub fn to_wire(&self) -> Result<serde_json::Value> {
        Tagged::Pointer {
            class_name: &self.class_name,
            object_id: &self.object_id,
        }
        .to_json()
    }
}
