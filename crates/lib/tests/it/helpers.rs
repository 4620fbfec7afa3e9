//! Shared fixtures for the integration tests.

use opwire::{
    Entity, Value,
    value::{GeoPoint, ValueMap},
};
use serde_json::json;

/// Lift a JSON object into a field map, panicking on anything else.
pub fn wire_map(json: serde_json::Value) -> ValueMap {
    match Value::from_json(json) {
        Value::Map(map) => map,
        other => panic!("expected a JSON object, got {other:?}"),
    }
}

/// A fetched, clean entity with the given id and wire fields.
pub fn fetched(class_name: &str, id: &str, fields: serde_json::Value) -> Entity {
    let entity = Entity::pointer(class_name, id);
    entity
        .finish_fetch(wire_map(fields), true)
        .expect("fetching into a clean entity cannot fail");
    entity
}

/// Two fetched entities referencing each other through `next`.
pub fn mutual_pair() -> (Entity, Entity) {
    let a = fetched("Node", "a", json!({"label": "A"}));
    let b = fetched("Node", "b", json!({"label": "B"}));
    a.set("next", &b).unwrap();
    b.set("next", &a).unwrap();
    a.finish_save(ValueMap::new()).unwrap();
    b.finish_save(ValueMap::new()).unwrap();
    (a, b)
}

/// A sample of wire documents covering every tagged kind.
pub fn wire_samples() -> Vec<serde_json::Value> {
    vec![
        json!(null),
        json!(true),
        json!(12.5),
        json!("text"),
        json!([1, "two", [3]]),
        json!({"nested": {"deep": [null]}}),
        json!({"__type": "Date", "iso": "2011-08-21T18:02:52.249Z"}),
        json!({"__type": "Date", "iso": "not a date"}),
        json!({"__type": "GeoPoint", "latitude": 37.5, "longitude": -122.25}),
        json!({"__type": "Pointer", "className": "Dog", "objectId": "d1"}),
        json!({"__type": "Object", "className": "Dog", "objectId": "d2", "name": "Rex"}),
        json!({"__type": "Relation", "className": "User"}),
        json!({"__type": "File", "name": "a.png", "url": "https://files.example/a.png"}),
        json!({"__op": "Increment", "amount": 1}),
        json!({"__op": "AddUnique", "objects": ["a", "a", "b"]}),
        json!({"__op": "Unknown"}),
        json!({"ACL": {"*": {"read": true}}, "where": {"__type": "GeoPoint", "latitude": 1, "longitude": 2}}),
    ]
}

pub fn geo(latitude: f64, longitude: f64) -> Value {
    Value::GeoPoint(GeoPoint::new(latitude, longitude))
}
