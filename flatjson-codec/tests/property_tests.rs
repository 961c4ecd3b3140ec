//! Property-based tests for encoding and path resolution

use std::collections::BTreeMap;

use flatjson_codec::{encode_value, materialize_document, KeyPath, Resolver, Value};
use flatjson_format::line::LineRef;
use proptest::prelude::*;

// Empty keys are not addressable by path, so generated keys are non-empty.
const KEY: &str = "[a-z0-9/\\\\]{1,4}";

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f64..1.0e6f64).prop_map(Value::Float),
        "[a-z/\\\\\" ]{0,6}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map(KEY, inner, 0..5).prop_map(Value::Object),
        ]
    })
}

fn arb_root() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(arb_value(), 0..5).prop_map(Value::Array),
        prop::collection::btree_map(KEY, arb_value(), 0..5).prop_map(Value::Object),
    ]
}

/// Walk raw path segments through a materialized value.
fn navigate<'v>(root: &'v Value, path: &KeyPath) -> Option<&'v Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn child_count(value: &Value) -> Option<usize> {
    match value {
        Value::Object(map) => Some(map.len()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

proptest! {
    #[test]
    fn prop_materialize_restores_document(root in arb_root()) {
        let doc = encode_value(&root).unwrap();
        prop_assert_eq!(materialize_document(&doc.lines, doc.root).unwrap(), root);
    }

    #[test]
    fn prop_jump_counts_cover_exactly_the_subtree(root in arb_root()) {
        let doc = encode_value(&root).unwrap();
        let parsed: Vec<LineRef<'_>> = doc
            .lines
            .iter()
            .enumerate()
            .map(|(i, l)| LineRef::parse(l, i).unwrap())
            .collect();

        for (i, line) in parsed.iter().enumerate() {
            if let Some(count) = line.jump() {
                prop_assert!(count > 0);
                for inner in &parsed[i + 1..=i + count] {
                    prop_assert!(inner.depth > line.depth);
                }
                if let Some(next) = parsed.get(i + count + 1) {
                    prop_assert!(next.depth <= line.depth);
                }
            }
        }
    }

    #[test]
    fn prop_queries_agree_with_materialized_value(root in arb_root()) {
        let doc = encode_value(&root).unwrap();
        let resolver = Resolver::new(&doc.lines, doc.root);
        let root_slice = resolver.container_slice(&KeyPath::root()).unwrap();
        prop_assert_eq!(resolver.size(&root_slice).unwrap(), child_count(&root).unwrap());

        let paths = resolver.sub_paths(&KeyPath::root(), &root_slice).unwrap();
        prop_assert_eq!(paths.len(), doc.lines.len());

        for text in &paths {
            let path = KeyPath::parse(text).unwrap();
            let expected = navigate(&root, &path);
            prop_assert!(expected.is_some(), "{} missing from document", text);
            let expected = expected.unwrap();

            prop_assert!(resolver.exists(&path));
            prop_assert_eq!(&resolver.value(&path).unwrap(), expected);

            match child_count(expected) {
                Some(n) => {
                    let slice = resolver.container_slice(&path).unwrap();
                    prop_assert_eq!(resolver.size(&slice).unwrap(), n);
                    prop_assert_eq!(resolver.keys(&slice).unwrap().len(), n);
                }
                None => prop_assert!(resolver.container_slice(&path).is_err()),
            }
        }
    }

    #[test]
    fn prop_missing_keys_do_not_resolve(
        map in prop::collection::btree_map("[a-z]{1,3}", any::<i64>().prop_map(Value::Int), 1..6),
        probe in "[a-z]{1,4}",
    ) {
        let doc = encode_value(&Value::Object(map.clone())).unwrap();
        let resolver = Resolver::new(&doc.lines, doc.root);
        let path = KeyPath::parse(&probe).unwrap();
        prop_assert_eq!(resolver.exists(&path), map.contains_key(&probe));
    }
}

#[test]
fn test_deep_nesting_round_trip() {
    let mut value = Value::Int(7);
    for i in 0..100 {
        value = if i % 2 == 0 {
            Value::Array(vec![value])
        } else {
            Value::Object(BTreeMap::from([("k".to_string(), value)]))
        };
    }
    let doc = encode_value(&value).unwrap();
    assert_eq!(doc.lines.len(), 100);
    assert_eq!(materialize_document(&doc.lines, doc.root).unwrap(), value);
}
