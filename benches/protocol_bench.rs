//! Performance benchmarks for frame decode/encode

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hubwatch::protocol;
use serde_json::json;

fn decode_benchmark(c: &mut Criterion) {
    let single = r#"["facesensor-2",{"a":1}]"#;
    let batch = r#"[["facesensor-2",{"a":1}],["thermo-1",{"t":20}],["door-3",{"open":false}]]"#;
    let malformed = "not json";

    let mut group = c.benchmark_group("decode_update");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_pair", |b| {
        b.iter(|| {
            let update = protocol::decode_update(black_box(single));
            black_box(update).unwrap();
        })
    });

    group.bench_function("batch", |b| {
        b.iter(|| {
            let update = protocol::decode_update(black_box(batch));
            black_box(update).unwrap();
        })
    });

    group.bench_function("malformed", |b| {
        b.iter(|| {
            let err = protocol::decode_update(black_box(malformed));
            black_box(err).unwrap_err();
        })
    });

    group.finish();
}

fn encode_benchmark(c: &mut Criterion) {
    let values = json!({"検出": ["次郎", "ポチ"]});

    let mut group = c.benchmark_group("encode_update");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encode", |b| {
        b.iter(|| {
            let frame = protocol::encode_update(black_box("facesensor-2"), black_box(&values));
            black_box(frame);
        })
    });

    group.bench_function("probe", |b| {
        b.iter(|| {
            black_box(protocol::probe_update());
        })
    });

    group.finish();
}

criterion_group!(benches, decode_benchmark, encode_benchmark);
criterion_main!(benches);
