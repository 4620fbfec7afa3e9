use opwire::{
    Operation, Value,
    codec::{decode, decode_json},
};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_decode_is_idempotent() {
    for sample in wire_samples() {
        let once = decode_json(None, sample.clone());
        let twice = decode(None, once.clone());
        assert_eq!(once, twice, "decode not idempotent for {sample}");
    }
}

#[test]
fn test_decode_is_idempotent_under_acl_key() {
    let once = decode_json(Some("ACL"), json!({"role:admin": {"write": true}}));
    assert!(matches!(once, Value::AccessList(_)));
    assert_eq!(decode(Some("ACL"), once.clone()), once);
}

#[test]
fn test_embedded_object_fields_are_decoded() {
    let value = decode_json(
        None,
        json!({
            "__type": "Object",
            "className": "Post",
            "objectId": "p1",
            "createdAt": "2012-01-01T10:00:00.000Z",
            "author": {"__type": "Pointer", "className": "User", "objectId": "u1"},
            "location": {"__type": "GeoPoint", "latitude": 1, "longitude": 2},
            "ACL": {"*": {"read": true}}
        }),
    );
    let post = value.as_entity().expect("object decodes to an entity");
    assert_eq!(post.class_name(), "Post");
    assert_eq!(post.id().as_deref(), Some("p1"));
    assert!(post.created_at().is_some());
    assert!(!post.is_dirty());

    let author = post.get("author").unwrap();
    let author = author.as_entity().unwrap();
    assert_eq!(author.id().as_deref(), Some("u1"));
    assert!(!author.has_fetched_data());

    assert_eq!(post.get("location"), Some(geo(1.0, 2.0)));
    assert!(matches!(post.get("ACL"), Some(Value::AccessList(_))));
}

#[test]
fn test_operations_inside_documents() {
    let value = decode_json(
        None,
        json!({
            "count": {"__op": "Increment", "amount": 5},
            "gone": {"__op": "Delete"},
            "mystery": {"__op": "Teleport"},
            "broken": {"__op": "Add", "objects": 3}
        }),
    );
    let map = value.as_map().unwrap();
    assert_eq!(map["count"].as_op(), Some(&Operation::Increment(5.0)));
    assert_eq!(map["gone"].as_op(), Some(&Operation::Unset));
    assert!(map["mystery"].is_null());
    assert!(map["broken"].is_null());
}

#[test]
fn test_map_order_is_preserved() {
    let value = decode_json(None, json!({"z": 1, "a": 2, "m": 3}));
    let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}
