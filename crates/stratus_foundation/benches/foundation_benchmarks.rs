//! Benchmarks for the Stratus foundation layer.
//!
//! Run with: `cargo bench --package stratus_foundation`

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use stratus_foundation::{AttrMap, ContextId, Reference, Value, attrs, merge_maps};

fn bench_value_clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("value/clone");

    group.bench_function("string", |b| {
        let v = Value::from("10.0.0.0/16");
        b.iter(|| black_box(v.clone()));
    });

    group.bench_function("map_32", |b| {
        let map: AttrMap = (0..32)
            .map(|i| (format!("field_{i}").into(), Value::Int(i)))
            .collect();
        let v = Value::Map(map);
        b.iter(|| black_box(v.clone()));
    });

    group.finish();
}

fn bench_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference");
    let ctx = ContextId::next();

    group.bench_function("mint", |b| {
        b.iter(|| black_box(Reference::mint(ctx, "aws_vpc", "main", "id")));
    });

    group.bench_function("render", |b| {
        let r = Reference::mint(ctx, "aws_db_instance", "orders", "endpoint");
        b.iter(|| black_box(r.render()));
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let base = attrs! {
        "instance_type" => "t3.micro",
        "auto_scaling" => attrs! { "min" => 1, "max" => 2, "desired" => 1 },
        "monitoring" => attrs! { "enabled" => false, "retention_days" => 7 },
    };
    let overlay = attrs! {
        "auto_scaling" => attrs! { "max" => 10 },
        "monitoring" => attrs! { "enabled" => true },
    };

    c.bench_function("merge/profile_overlay", |b| {
        b.iter(|| black_box(merge_maps(&base, &overlay)));
    });
}

criterion_group!(benches, bench_value_clone, bench_reference, bench_merge);
criterion_main!(benches);
