//! Property tests over the FlatIndex query surface

use flatjson_io::{FlatIndex, Value};
use proptest::prelude::*;
use serde_json::json;

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i32>().prop_map(serde_json::Value::from),
        "[a-z ]{0,5}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_root() -> impl Strategy<Value = serde_json::Value> {
    prop::collection::btree_map("[a-z]{1,3}", arb_json(), 0..5)
        .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
}

fn open(doc: &serde_json::Value) -> FlatIndex {
    let index = FlatIndex::new();
    let text = index.build_from_string(&doc.to_string()).unwrap();
    index.open_from_string(&text, false).unwrap();
    index
}

proptest! {
    #[test]
    fn prop_root_value_round_trips(doc in arb_root()) {
        let index = open(&doc);
        let value = index.get_value("", Value::Null);
        prop_assert_eq!(serde_json::Value::from(value), doc);
    }

    #[test]
    fn prop_has_path_agrees_with_get_value(doc in arb_root(), probe in "[a-z]{1,3}(/[a-z0-9]{1,2}){0,2}") {
        let index = open(&doc);
        let sentinel = Value::from(json!({"__sentinel__": true}));
        let found = index.get_value(&probe, sentinel.clone()) != sentinel;
        prop_assert_eq!(index.has_path(&probe), found);
    }

    #[test]
    fn prop_size_matches_keys_for_every_container(doc in arb_root()) {
        let index = open(&doc);
        for path in index.get_sub_paths("").unwrap() {
            if let Ok(size) = index.get_size(&path) {
                prop_assert_eq!(index.get_keys(&path).unwrap().len(), size);
            }
        }
    }

    #[test]
    fn prop_cached_and_uncached_answers_match(doc in arb_root()) {
        let cached = open(&doc);
        let uncached = open(&doc);
        uncached.set_cache_flags(flatjson_io::CacheFlags::NONE);

        for path in cached.get_sub_paths("").unwrap() {
            for _ in 0..2 {
                prop_assert_eq!(
                    cached.get_value(&path, Value::Null),
                    uncached.get_value(&path, Value::Null)
                );
                prop_assert_eq!(cached.has_path(&path), uncached.has_path(&path));
            }
        }
    }
}
