use opwire::{OpRegistry, Operation, Value};
use serde_json::json;

fn items(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

/// Folding one by one and decoding the same sequence as a batch agree.
fn assert_batch_equivalent(ops: Vec<Operation>) {
    let mut folded: Option<Operation> = None;
    for op in &ops {
        folded = Some(op.merge_with_previous(folded.as_ref()).unwrap());
    }

    let wire: Vec<serde_json::Value> = ops.iter().map(|op| op.to_wire().unwrap()).collect();
    let batch = OpRegistry::global()
        .decode_json(json!({"__op": "Batch", "ops": wire}))
        .unwrap();

    assert_eq!(batch, folded);
}

#[test]
fn test_increments() {
    assert_batch_equivalent(vec![
        Operation::increment(1.0),
        Operation::increment(2.5),
        Operation::increment(-0.5),
    ]);
}

#[test]
fn test_array_ops() {
    assert_batch_equivalent(vec![Operation::add(items(&["a"])), Operation::add(items(&["b"]))]);
    assert_batch_equivalent(vec![
        Operation::add_unique(items(&["a", "b"])),
        Operation::add_unique(items(&["b", "c"])),
        Operation::remove(items(&["a"])),
    ]);
}

#[test]
fn test_delete_sequences() {
    assert_batch_equivalent(vec![Operation::Unset, Operation::increment(4.0)]);
    assert_batch_equivalent(vec![
        Operation::Unset,
        Operation::add(items(&["x"])),
        Operation::remove(items(&["x"])),
    ]);
    assert_batch_equivalent(vec![Operation::remove(items(&["x"])), Operation::Unset]);
}

#[test]
fn test_relation_add_then_remove() {
    let adds = opwire::ops::RelationOp::from_ids(Some("User".into()), ["u1", "u2"], Vec::<String>::new());
    let removes = opwire::ops::RelationOp::from_ids(Some("User".into()), Vec::<String>::new(), ["u1"]);
    assert_batch_equivalent(vec![Operation::Relation(adds), Operation::Relation(removes)]);
}

#[test]
fn test_nested_batches() {
    let inner = json!({"__op": "Batch", "ops": [
        {"__op": "Increment", "amount": 1},
        {"__op": "Increment", "amount": 1}
    ]});
    let outer = OpRegistry::global()
        .decode_json(json!({"__op": "Batch", "ops": [inner, {"__op": "Increment", "amount": 3}]}))
        .unwrap();
    assert_eq!(outer, Some(Operation::Increment(5.0)));
}

#[test]
fn test_invalid_sequence_inside_batch_fails() {
    let err = OpRegistry::global()
        .decode_json(json!({"__op": "Batch", "ops": [
            {"__op": "Add", "objects": [1]},
            {"__op": "Increment", "amount": 1}
        ]}))
        .unwrap_err();
    assert!(err.is_merge_error());
}
