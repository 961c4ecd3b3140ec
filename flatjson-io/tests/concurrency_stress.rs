//! Shared-instance stress tests: every operation is serialized by the instance lock

use std::sync::Arc;
use std::thread;

use flatjson_io::{CacheKind, FlatIndex, Value};
use serde_json::json;

/// Test data generator for concurrency stress testing
struct TestDataGenerator {
    record_count: usize,
}

impl TestDataGenerator {
    fn new(record_count: usize) -> Self {
        Self { record_count }
    }

    fn document(&self) -> serde_json::Value {
        let levels = ["debug", "info", "warn", "error"];
        let records: Vec<serde_json::Value> = (0..self.record_count)
            .map(|i| {
                json!({
                    "id": i,
                    "level": levels[i % levels.len()],
                    "user": format!("user_{}", i % 100),
                    "tags": [i % 3, i % 5],
                })
            })
            .collect();
        json!({ "records": records, "count": self.record_count })
    }
}

#[test]
fn test_parallel_queries_on_one_instance() {
    let generator = TestDataGenerator::new(500);
    let index = Arc::new(FlatIndex::new());
    let text = index
        .build_from_string(&generator.document().to_string())
        .unwrap();
    index.open_from_string(&text, false).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for i in (t..500).step_by(8) {
                    let id = index.get_value(&format!("records/{}/id", i), Value::Null);
                    assert_eq!(id, Value::Int(i as i64));
                    assert!(index.has_path(&format!("records/{}/tags/1", i)));
                    assert_eq!(index.get_size(&format!("records/{}", i)).unwrap(), 4);
                    if i % 50 == 0 {
                        index.clear_cache(CacheKind::Value);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("query thread panicked");
    }
    assert_eq!(index.get_size("records").unwrap(), 500);
}

#[test]
fn test_reopen_while_querying() {
    let index = Arc::new(FlatIndex::new());
    let first = index.build_from_string(r#"{"v":1,"k":[0]}"#).unwrap();
    let second = index.build_from_string(r#"{"v":2,"k":[0]}"#).unwrap();
    index.open_from_string(&first, false).unwrap();

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for round in 0..200 {
                let text = if round % 2 == 0 { &second } else { &first };
                index.open_from_string(text, false).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..500 {
                    // Each open is atomic under the lock, so a document is always loaded.
                    let v = index.try_get_value("v").unwrap();
                    assert!(v == Value::Int(1) || v == Value::Int(2), "{v:?}");
                    assert_eq!(index.get_size("k").unwrap(), 1);
                }
            })
        })
        .collect();

    writer.join().expect("writer panicked");
    for reader in readers {
        reader.join().expect("reader panicked");
    }
}

#[test]
fn test_instances_are_independent() {
    let a = FlatIndex::new();
    let b = FlatIndex::new();
    let text = a.build_from_string("[1]").unwrap();
    a.open_from_string(&text, false).unwrap();
    assert!(a.is_data_loaded());
    assert!(!b.is_data_loaded());

    a.get_value("0", Value::Null);
    assert!(a.has_in_cache(CacheKind::Value, "0"));
    assert!(!b.has_in_cache(CacheKind::Value, "0"));
}
