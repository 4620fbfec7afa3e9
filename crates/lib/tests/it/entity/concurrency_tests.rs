use std::thread;

use opwire::{Entity, Value, value::ValueMap};
use serde_json::json;

use crate::helpers::*;

const THREADS: usize = 8;
const PER_THREAD: usize = 200;

#[test]
fn test_concurrent_add_unique_keeps_every_item() {
    let log = Entity::new("Log");
    thread::scope(|scope| {
        for t in 0..THREADS {
            let log = &log;
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    log.add_unique("items", [Value::from(format!("{t}-{i}"))])
                        .unwrap();
                }
            });
        }
    });

    let items = log.get("items").unwrap();
    assert_eq!(items.as_array().unwrap().len(), THREADS * PER_THREAD);
    let wire = log.pending_wire().unwrap();
    assert_eq!(
        wire["items"]["objects"].as_array().unwrap().len(),
        THREADS * PER_THREAD
    );
}

#[test]
fn test_concurrent_increments_sum() {
    let counter = fetched("Counter", "c1", json!({"n": 0}));
    thread::scope(|scope| {
        for _ in 0..THREADS {
            let counter = counter.clone();
            scope.spawn(move || {
                for _ in 0..PER_THREAD {
                    counter.increment("n", 1.0).unwrap();
                }
            });
        }
    });
    assert_eq!(counter.get("n"), Some(Value::from((THREADS * PER_THREAD) as f64)));
}

#[test]
fn test_saves_interleaved_with_mutations_lose_nothing() {
    let counter = fetched("Counter", "c1", json!({"n": 0}));
    thread::scope(|scope| {
        let writer = counter.clone();
        scope.spawn(move || {
            for _ in 0..PER_THREAD {
                writer.increment("n", 1.0).unwrap();
            }
        });
        let saver = counter.clone();
        scope.spawn(move || {
            for _ in 0..PER_THREAD {
                saver.finish_save(ValueMap::new()).unwrap();
            }
        });
    });
    counter.finish_save(ValueMap::new()).unwrap();
    assert!(!counter.is_dirty());
    assert_eq!(counter.get("n"), Some(Value::from(PER_THREAD as f64)));
}
