use opwire::{
    Entity, Error, Value,
    codec::{CodecError, encode},
    value::ValueMap,
};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_mutual_reference_terminates() {
    let (a, _b) = mutual_pair();
    let encoded = encode(&Value::from(&a), Some(&[]), false).unwrap();

    assert_eq!(encoded["__type"], "Object");
    assert_eq!(encoded["objectId"], "a");
    assert_eq!(encoded["next"]["__type"], "Object");
    assert_eq!(encoded["next"]["objectId"], "b");
    assert_eq!(
        encoded["next"]["next"],
        json!({"__type": "Pointer", "className": "Node", "objectId": "a"})
    );
}

#[test]
fn test_siblings_are_each_embedded() {
    let shared = fetched("Tag", "t1", json!({"name": "rust"}));
    let value = Value::Array(vec![Value::from(&shared), Value::from(&shared)]);
    let encoded = encode(&value, Some(&[]), false).unwrap();
    assert_eq!(encoded[0]["__type"], "Object");
    assert_eq!(encoded[1]["__type"], "Object");
    assert_eq!(encoded[1]["name"], "rust");
}

#[test]
fn test_without_seen_path_entities_are_pointers() {
    let (a, _b) = mutual_pair();
    let encoded = encode(&Value::from(&a), None, false).unwrap();
    assert_eq!(
        encoded,
        json!({"__type": "Pointer", "className": "Node", "objectId": "a"})
    );
}

#[test]
fn test_unfetched_entity_is_pointer_even_when_embedding() {
    let stub = Entity::pointer("Dog", "d1");
    let encoded = encode(&Value::from(&stub), Some(&[]), false).unwrap();
    assert_eq!(encoded["__type"], "Pointer");
}

#[test]
fn test_dirty_nested_entity_is_unsaved_forward_reference() {
    let parent = fetched("Owner", "o1", json!({}));
    let child = Entity::new("Pet");
    parent.set("pet", &child).unwrap();
    parent.finish_save(ValueMap::new()).unwrap();
    child.set("name", "Fido").unwrap();

    let err = encode(&Value::from(&parent), Some(&[]), false).unwrap_err();
    match err {
        Error::Codec(CodecError::UnsavedForwardReference { class_name }) => {
            assert_eq!(class_name, "Pet");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unsaved_entity_has_no_pointer() {
    let err = encode(&Value::from(Entity::new("Pet")), None, false).unwrap_err();
    assert!(err.is_unsaved_error());
    assert_eq!(err.module(), "codec");
}

#[test]
fn test_disallow_entities_in_nested_map() {
    let mut map = ValueMap::new();
    map.insert("inner".into(), Value::Array(vec![Entity::pointer("Dog", "d1").into()]));
    let err = encode(&Value::Map(map), None, true).unwrap_err();
    assert!(matches!(
        err,
        Error::Codec(CodecError::EntitiesNotAllowedHere { .. })
    ));
}

#[test]
fn test_integral_numbers_stay_integral() {
    let value = Value::Array(vec![Value::from(3), Value::from(2.5), Value::from(-0.0)]);
    assert_eq!(encode(&value, None, false).unwrap(), json!([3, 2.5, 0]));
}
