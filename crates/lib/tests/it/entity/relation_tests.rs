use opwire::{Entity, Error, Value, ops::OpError};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_relation_changes_flush_as_batch() {
    let user = fetched("User", "u0", json!({}));
    user.add_relation(
        "friends",
        &[Entity::pointer("User", "u1").into(), Entity::pointer("User", "u2").into()],
    )
    .unwrap();
    user.remove_relation("friends", &[Entity::pointer("User", "u3").into()])
        .unwrap();

    let wire = user.pending_wire().unwrap();
    assert_eq!(wire["friends"]["__op"], "Batch");
    assert_eq!(wire["friends"]["ops"][0]["objects"][1]["objectId"], "u2");
    assert_eq!(wire["friends"]["ops"][1]["__op"], "RemoveRelation");
}

#[test]
fn test_relation_estimate_tracks_pending_ids() {
    let user = fetched("User", "u0", json!({}));
    user.add_relation("friends", &[Value::from("u1"), Value::from("u2")])
        .unwrap();
    user.remove_relation("friends", &[Value::from("u1")]).unwrap();

    let relation = user.relation("friends").unwrap();
    assert_eq!(relation.key.as_deref(), Some("friends"));
    assert!(!relation.pending_adds.contains("u1"));
    assert!(relation.pending_adds.contains("u2"));
    assert!(relation.pending_removes.contains("u1"));
}

#[test]
fn test_decoded_relation_backfills_class() {
    let user = fetched(
        "User",
        "u0",
        json!({"friends": {"__type": "Relation", "className": null}}),
    );
    user.add_relation("friends", &[Entity::pointer("User", "u1").into()])
        .unwrap();
    let relation = user.relation("friends").unwrap();
    assert_eq!(relation.target_class.as_deref(), Some("User"));
    assert_eq!(relation.key.as_deref(), Some("friends"));
    assert!(relation.pending_adds.is_empty());
    assert!(user.pending().get("friends").is_some());
}

#[test]
fn test_relation_after_unset_fails() {
    let user = fetched("User", "u0", json!({}));
    user.unset("friends").unwrap();
    let err = user
        .add_relation("friends", &[Value::from("u1")])
        .unwrap_err();
    assert!(matches!(err, Error::Op(OpError::RelationAfterUnset)));
    assert!(err.is_relation_error());
}

#[test]
fn test_relation_rejects_unsaved_and_mixed_targets() {
    let user = fetched("User", "u0", json!({}));
    let err = user
        .add_relation("friends", &[Entity::new("User").into()])
        .unwrap_err();
    assert!(err.is_unsaved_error());

    user.add_relation("friends", &[Entity::pointer("User", "u1").into()])
        .unwrap();
    let err = user
        .add_relation("friends", &[Entity::pointer("Dog", "d1").into()])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Op(OpError::RelationClassMismatch { .. })
    ));
    assert!(!user.relation("friends").unwrap().pending_adds.contains("d1"));
}

#[test]
fn test_relation_over_plain_field_fails() {
    let user = fetched("User", "u0", json!({"friends": 3}));
    assert!(user.relation("friends").is_err());
    assert!(user.add_relation("friends", &[Value::from("u1")]).is_err());
}
