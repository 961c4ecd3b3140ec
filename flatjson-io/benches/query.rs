use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flatjson_io::{CacheKind, FlatIndex, Value};
use serde_json::json;

fn create_index(records: usize) -> FlatIndex {
    let doc = json!({
        "records": (0..records)
            .map(|i| json!({ "id": i, "name": format!("item{}", i), "tags": ["a", i % 9] }))
            .collect::<Vec<_>>()
    });
    let index = FlatIndex::new();
    let text = index.build_from_string(&doc.to_string()).unwrap();
    index.open_from_string(&text, false).unwrap();
    index
}

fn bench_get_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_value");

    for records in [1000, 10000] {
        let index = create_index(records);
        let path = format!("records/{}/name", records - 1);

        group.bench_with_input(BenchmarkId::new("uncached", records), &path, |b, path| {
            index.set_cache_enabled(CacheKind::Value, false);
            b.iter(|| black_box(index.get_value(black_box(path), Value::Null)));
        });

        group.bench_with_input(BenchmarkId::new("cached", records), &path, |b, path| {
            index.set_cache_enabled(CacheKind::Value, true);
            b.iter(|| black_box(index.get_value(black_box(path), Value::Null)));
        });
    }

    group.finish();
}

fn bench_sub_paths(c: &mut Criterion) {
    let index = create_index(1000);
    index.set_cache_enabled(CacheKind::SubPaths, false);
    c.bench_function("sub_paths_1000", |b| {
        b.iter(|| black_box(index.get_sub_paths(black_box("records")).unwrap()));
    });
}

criterion_group!(benches, bench_get_value, bench_sub_paths);
criterion_main!(benches);
