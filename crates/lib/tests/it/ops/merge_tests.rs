use opwire::{
    Entity, Error, Operation, Value,
    ops::{OpError, RelationOp},
};

use crate::helpers::geo;

fn fold(ops: &[Operation]) -> opwire::Result<Option<Operation>> {
    let mut folded: Option<Operation> = None;
    for op in ops {
        folded = Some(op.merge_with_previous(folded.as_ref())?);
    }
    Ok(folded)
}

fn items(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

#[test]
fn test_increment_merge_and_estimate() {
    let merged = Operation::increment(3.0)
        .merge_with_previous(Some(&Operation::increment(4.0)))
        .unwrap();
    assert_eq!(merged, Operation::Increment(7.0));
    assert_eq!(
        merged.estimate(Some(&Value::from(10)), "score").unwrap(),
        Some(Value::from(17))
    );
}

#[test]
fn test_add_unique_from_empty() {
    let merged = fold(&[
        Operation::add_unique(items(&["a", "b"])),
        Operation::add_unique(items(&["b", "c"])),
    ])
    .unwrap()
    .unwrap();
    assert_eq!(merged, Operation::add_unique(items(&["a", "b", "c"])));
    assert_eq!(
        merged.estimate(None, "tags").unwrap(),
        Some(Value::Array(items(&["a", "b", "c"])))
    );
    assert_eq!(
        merged
            .estimate(Some(&Value::Array(vec![])), "tags")
            .unwrap(),
        Some(Value::Array(items(&["a", "b", "c"])))
    );
}

#[test]
fn test_remove_absorbed_by_unset() {
    let merged = Operation::remove(items(&["x"]))
        .merge_with_previous(Some(&Operation::Unset))
        .unwrap();
    assert_eq!(merged, Operation::Unset);
    assert_eq!(merged.estimate(Some(&Value::from(1)), "k").unwrap(), None);
}

#[test]
fn test_relation_merge_retracts_earlier_add() {
    let earlier = RelationOp::from_ids(Some("User".into()), ["1", "2"], Vec::<String>::new());
    let later = RelationOp::from_ids(Some("User".into()), Vec::<String>::new(), ["1"]);
    let merged = Operation::Relation(later)
        .merge_with_previous(Some(&Operation::Relation(earlier)))
        .unwrap();

    let Operation::Relation(merged) = merged else {
        panic!("expected a relation operation");
    };
    assert_eq!(merged.adds().iter().collect::<Vec<_>>(), ["2"]);
    assert_eq!(merged.removes().iter().collect::<Vec<_>>(), ["1"]);
}

#[test]
fn test_relation_class_conflict() {
    let cats = Operation::relation(&[Entity::pointer("Cat", "c1").into()], &[]).unwrap();
    let dogs = Operation::relation(&[Entity::pointer("Dog", "d1").into()], &[]).unwrap();
    let err = dogs.merge_with_previous(Some(&cats)).unwrap_err();
    match err {
        Error::Op(OpError::RelationClassMismatch { expected, actual }) => {
            assert_eq!(expected, "Cat");
            assert_eq!(actual, "Dog");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_set_then_array_ops_collapse_to_set() {
    let merged = fold(&[
        Operation::set(Value::Array(items(&["a"]))),
        Operation::add(items(&["b"])),
        Operation::add_unique(items(&["a", "c"])),
        Operation::remove(items(&["b"])),
    ])
    .unwrap()
    .unwrap();
    assert_eq!(merged, Operation::Set(Value::Array(items(&["a", "c"]))));
}

#[test]
fn test_unset_then_increment_is_set() {
    let merged = fold(&[
        Operation::increment(9.0),
        Operation::Unset,
        Operation::increment(2.0),
    ])
    .unwrap();
    assert_eq!(merged, Some(Operation::set(2)));
}

#[test]
fn test_composite_items_are_never_the_same_item() {
    let map = |n: i32| {
        let mut map = opwire::value::ValueMap::new();
        map.insert("n".into(), Value::from(n));
        Value::Map(map)
    };
    let op = Operation::add_unique([map(1), map(1), map(2)]);
    let Operation::AddUnique(set) = &op else {
        unreachable!()
    };
    assert_eq!(set.len(), 3);

    let estimated = Operation::add_unique([map(1)])
        .estimate(Some(&Value::Array(vec![map(1)])), "k")
        .unwrap();
    assert_eq!(estimated, Some(Value::Array(vec![map(1), map(1)])));

    let estimated = Operation::remove([map(1)])
        .estimate(Some(&Value::Array(vec![map(1), map(2)])), "k")
        .unwrap();
    assert_eq!(estimated, Some(Value::Array(vec![map(1), map(2)])));

    let point = geo(1.0, 2.0);
    let estimated = Operation::remove([point.clone()])
        .estimate(Some(&Value::Array(vec![point.clone()])), "k")
        .unwrap();
    assert_eq!(estimated, Some(Value::Array(vec![point])));
}

#[test]
fn test_invalid_sequences() {
    let cases = [
        (Operation::increment(1.0), Operation::add(items(&["a"]))),
        (Operation::add(items(&["a"])), Operation::increment(1.0)),
        (
            Operation::remove(items(&["a"])),
            Operation::Relation(RelationOp::from_ids(None, ["x"], Vec::<String>::new())),
        ),
    ];
    for (op, previous) in cases {
        let err = op.merge_with_previous(Some(&previous)).unwrap_err();
        assert!(err.is_merge_error(), "{} after {}", op.kind(), previous.kind());
    }
}
