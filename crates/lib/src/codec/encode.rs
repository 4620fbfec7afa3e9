//! Conversion of in-memory values to their tagged wire form.

use tracing::debug;

use super::{CodecError, date::format_date, wire::Tagged};
use crate::{
    Result,
    entity::{Entity, EntityKey},
    value::{Value, number_to_json},
};

/// Converts a value into its wire representation.
///
/// `seen` selects how entities are written:
///
/// - `None`: every entity is written as a pointer.
/// - `Some(path)`: a fetched entity that is not dirty and not already on
///   `path` is embedded in full (`__type: "Object"`), with itself appended to
///   the path for its own fields. Entities already on the path, or without
///   fetched data, are written as pointers. A dirty entity fails with
///   [`CodecError::UnsavedForwardReference`].
///
/// The path is scoped to the branch being encoded, so two sibling references
/// to the same clean entity are both embedded while a reference back up the
/// path collapses to a pointer. This is what makes cyclic graphs terminate.
///
/// With `disallow_entities` set, any entity fails with
/// [`CodecError::EntitiesNotAllowedHere`].
///
/// # Errors
///
/// Returns a [`CodecError`] for disallowed, unsaved or dirty entities and for
/// attachments without a remote url.
pub fn encode(
    value: &Value,
    seen: Option<&[EntityKey]>,
    disallow_entities: bool,
) -> Result<serde_json::Value> {
    match value {
        Value::Entity(entity) => encode_entity(entity, seen, disallow_entities),
        Value::AccessList(acl) => Ok(serde_json::Value::Object(acl.as_json().clone())),
        Value::Date(date) => Tagged::Date {
            iso: format_date(date),
        }
        .to_json(),
        Value::GeoPoint(point) => Tagged::GeoPoint {
            latitude: point.latitude,
            longitude: point.longitude,
        }
        .to_json(),
        Value::Array(items) => items
            .iter()
            .map(|item| encode(item, seen, disallow_entities))
            .collect::<Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        Value::Pattern(pattern) => Ok(serde_json::Value::String(pattern.source.clone())),
        Value::Relation(relation) => Tagged::Relation {
            class_name: relation.target_class.as_deref(),
        }
        .to_json(),
        Value::Op(op) => op.to_wire(),
        Value::Attachment(file) => {
            let url = file
                .url
                .as_deref()
                .ok_or_else(|| CodecError::UnsavedAttachment {
                    name: file.name.clone(),
                })?;
            Tagged::File {
                name: &file.name,
                url,
            }
            .to_json()
        }
        Value::Map(map) => {
            let mut output = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                output.insert(key.clone(), encode(item, seen, disallow_entities)?);
            }
            Ok(serde_json::Value::Object(output))
        }
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => Ok(number_to_json(*n)),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
    }
}

fn encode_entity(
    entity: &Entity,
    seen: Option<&[EntityKey]>,
    disallow_entities: bool,
) -> Result<serde_json::Value> {
    if disallow_entities {
        return Err(CodecError::EntitiesNotAllowedHere {
            class_name: entity.class_name(),
        }
        .into());
    }

    let path = match seen {
        Some(path) if !path.contains(&entity.key()) && entity.has_fetched_data() => path,
        _ => return entity.to_pointer()?.to_wire(),
    };

    if entity.is_dirty() {
        return Err(CodecError::UnsavedForwardReference {
            class_name: entity.class_name(),
        }
        .into());
    }

    debug!(
        class_name = %entity.class_name(),
        depth = path.len(),
        "Embedding clean entity in full"
    );
    let mut next = Vec::with_capacity(path.len() + 1);
    next.extend_from_slice(path);
    next.push(entity.key());
    entity.to_full_wire(&next)
}
