//! Conversion of tagged wire values back into the value model.

use tracing::warn;

use super::date::parse_date;
use crate::{
    constants::{
        ACL_KEY, CLASS_NAME_KEY, OBJECT_ID_KEY, OP_KEY, TYPE_DATE, TYPE_FILE, TYPE_GEO_POINT,
        TYPE_KEY, TYPE_OBJECT, TYPE_POINTER, TYPE_RELATION,
    },
    entity::Entity,
    ops::OpRegistry,
    value::{AccessList, Attachment, GeoPoint, RelationRef, Value, ValueMap},
};

/// Decodes a raw JSON wire value.
///
/// Equivalent to `decode(key, Value::from_json(wire))`.
pub fn decode_json(key: Option<&str>, wire: serde_json::Value) -> Value {
    decode(key, Value::from_json(wire))
}

/// Interprets tagged maps in `value`, recursively.
///
/// `key` is the field name the value was read from, if any; it decides
/// whether a map is an access list and names decoded relations.
///
/// Decoding never fails: unrecognized or malformed operations and unparseable
/// dates degrade to [`Value::Null`]. Typed values pass through unchanged, so
/// `decode(k, decode(k, x)) == decode(k, x)`.
pub fn decode(key: Option<&str>, value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(|v| decode(None, v)).collect()),
        Value::Map(map) => decode_map(key, map),
        other => other,
    }
}

fn decode_map(key: Option<&str>, mut map: ValueMap) -> Value {
    if map.contains_key(OP_KEY) {
        return decode_op(map);
    }

    let tag = map.get(TYPE_KEY).and_then(Value::as_str).map(str::to_owned);
    match tag.as_deref() {
        Some(TYPE_POINTER) => {
            let class_name = string_field(&map, CLASS_NAME_KEY).unwrap_or_default();
            let id = string_field(&map, OBJECT_ID_KEY).unwrap_or_default();
            return Value::Entity(Entity::pointer(class_name, id));
        }
        Some(TYPE_OBJECT) => {
            map.shift_remove(TYPE_KEY);
            let class_name = match map.shift_remove(CLASS_NAME_KEY) {
                Some(Value::String(class_name)) => class_name,
                _ => String::new(),
            };
            return Value::Entity(Entity::from_server_data(class_name, map));
        }
        Some(TYPE_DATE) => {
            let iso = string_field(&map, "iso").unwrap_or_default();
            return match parse_date(&iso) {
                Some(date) => Value::Date(date),
                None => {
                    warn!(iso = %iso, "Unparseable date on the wire, decoding as null");
                    Value::Null
                }
            };
        }
        Some(TYPE_GEO_POINT) => {
            let coord = |name: &str| map.get(name).and_then(Value::as_f64).unwrap_or_default();
            return Value::GeoPoint(GeoPoint::new(coord("latitude"), coord("longitude")));
        }
        _ => {}
    }

    if key == Some(ACL_KEY) {
        return match Value::Map(map).to_plain_json() {
            Some(serde_json::Value::Object(entries)) => Value::AccessList(AccessList::new(entries)),
            _ => {
                warn!("Access list contains non-JSON values, keeping it empty");
                Value::AccessList(AccessList::default())
            }
        };
    }

    match tag.as_deref() {
        Some(TYPE_RELATION) => Value::Relation(RelationRef::new(
            key.map(str::to_owned),
            string_field(&map, CLASS_NAME_KEY),
        )),
        Some(TYPE_FILE) => Value::Attachment(Attachment {
            name: string_field(&map, "name").unwrap_or_default(),
            url: string_field(&map, "url"),
        }),
        _ => Value::Map(
            map.into_iter()
                .map(|(k, v)| {
                    let decoded = decode(Some(&k), v);
                    (k, decoded)
                })
                .collect(),
        ),
    }
}

fn decode_op(map: ValueMap) -> Value {
    match OpRegistry::global().decode(&map) {
        Ok(Some(op)) => Value::Op(Box::new(op)),
        Ok(None) => {
            warn!(
                op = %map.get(OP_KEY).map(ToString::to_string).unwrap_or_default(),
                "Unrecognized operation tag, decoding as null"
            );
            Value::Null
        }
        Err(e) => {
            warn!(error = %e, "Malformed operation on the wire, decoding as null");
            Value::Null
        }
    }
}

fn string_field(map: &ValueMap, name: &str) -> Option<String> {
    map.get(name).and_then(Value::as_str).map(str::to_owned)
}
