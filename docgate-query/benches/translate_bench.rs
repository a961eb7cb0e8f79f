//! Benchmarks for filter parsing and end-to-end translation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use docgate_query::{DialectKind, FilterParser, FilterRequest, FilterTranslator};
use serde_json::{Value, json};

/// A filter with `count` ANDed equality siblings.
fn wide_filter(count: usize) -> Value {
    let mut map = serde_json::Map::new();
    for i in 0..count {
        map.insert(format!("field_{}", i), json!(i));
    }
    Value::Object(map)
}

/// A filter nested `depth` levels deep through `$and`.
fn deep_filter(depth: usize) -> Value {
    let mut filter = json!({"leaf": true});
    for _ in 0..depth {
        filter = json!({"$and": [filter, {"status": "active"}]});
    }
    filter
}

fn typical_request() -> FilterRequest {
    FilterRequest::from_json(&json!({
        "filter": {
            "$or": [{"category": "a"}, {"price": {"$gt": 100}}],
            "status": {"$in": ["active", "pending"]},
            "name": {"$regex": "^Al", "$options": "i"}
        },
        "options": {"sort": {"price": -1}, "limit": 20, "skip": 40}
    }))
    .expect("valid request")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let parser = FilterParser::new();

    for count in [1, 10, 50] {
        let filter = wide_filter(count);
        group.bench_with_input(BenchmarkId::new("wide", count), &filter, |b, f| {
            b.iter(|| parser.parse_value(black_box(f)))
        });
    }

    for depth in [2, 8, 24] {
        let filter = deep_filter(depth);
        group.bench_with_input(BenchmarkId::new("deep", depth), &filter, |b, f| {
            b.iter(|| parser.parse_value(black_box(f)))
        });
    }

    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    let request = typical_request();

    for kind in DialectKind::ALL {
        let translator = FilterTranslator::for_kind(kind);
        group.bench_with_input(BenchmarkId::new("typical", kind), &request, |b, r| {
            b.iter(|| translator.translate(black_box(r)))
        });
    }

    group.finish();
}

fn bench_positional(c: &mut Criterion) {
    let translator = FilterTranslator::for_kind(DialectKind::Postgres);
    let mut request = FilterRequest::default();
    if let Value::Object(map) = wide_filter(25) {
        request.filter = map;
    }
    let result = translator.translate(&request).expect("translates");

    c.bench_function("to_positional_25", |b| {
        b.iter(|| result.to_positional(black_box(translator.dialect())))
    });
}

criterion_group!(benches, bench_parse, bench_translate, bench_positional);
criterion_main!(benches);
