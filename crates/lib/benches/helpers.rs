//! Shared helpers for benchmark tests

use opwire::{Entity, Value, value::ValueMap};
use serde_json::json;

/// Builds a wire document with `count` fields covering the tagged kinds.
pub fn wire_document(count: usize) -> serde_json::Value {
    let mut fields = serde_json::Map::with_capacity(count);
    for i in 0..count {
        let value = match i % 5 {
            0 => json!({"__type": "Date", "iso": "2011-08-21T18:02:52.249Z"}),
            1 => json!({"__type": "GeoPoint", "latitude": i, "longitude": -(i as f64)}),
            2 => json!({"__type": "Pointer", "className": "Dog", "objectId": format!("d{i}")}),
            3 => json!([i, "text", {"nested": true}]),
            _ => json!(format!("value_{i}")),
        };
        fields.insert(format!("field_{i}"), value);
    }
    serde_json::Value::Object(fields)
}

/// A chain of `length` fetched entities, each pointing at the next, with the
/// last pointing back at the first.
pub fn entity_ring(length: usize) -> Vec<Entity> {
    let entities: Vec<Entity> = (0..length)
        .map(|i| {
            let entity = Entity::pointer("Node", format!("n{i}"));
            let mut data = ValueMap::new();
            data.insert("index".to_string(), Value::from(i as f64));
            entity
                .finish_fetch(data, true)
                .expect("Failed to install fetched data");
            entity
        })
        .collect();

    for (i, entity) in entities.iter().enumerate() {
        let next = &entities[(i + 1) % length];
        entity.set("next", next).expect("Failed to set link");
        entity
            .finish_save(ValueMap::new())
            .expect("Failed to confirm link");
    }
    entities
}
