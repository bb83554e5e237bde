//! Benchmarks for end-to-end synthesis and document serialization.
//!
//! Run with: `cargo bench --package stratus_runtime`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use stratus_compose::Environment;
use stratus_foundation::{AttrMap, attrs};
use stratus_runtime::{Session, SynthConfig, to_json, to_msgpack};

// =============================================================================
// Helper Functions
// =============================================================================

fn session() -> Session {
    Session::new(SynthConfig::new()).unwrap()
}

fn full_application(environment: Environment) -> AttrMap {
    attrs! {
        "domain_name" => "shop.example.com",
        "environment" => environment.as_str(),
        "enable_caching" => true,
        "enable_cdn" => true,
        "monitoring" => attrs! { "enabled" => true },
    }
}

// =============================================================================
// Synthesis
// =============================================================================

fn bench_synthesize(c: &mut Criterion) {
    let session = session();
    let mut group = c.benchmark_group("synthesize");

    for environment in Environment::ALL {
        let raw = full_application(environment);
        group.bench_with_input(
            BenchmarkId::new("web_application", environment),
            &raw,
            |b, raw| b.iter(|| session.synthesize("web_application", "shop", black_box(raw))),
        );
    }

    group.finish();
}

// =============================================================================
// Serialization
// =============================================================================

fn bench_serialize(c: &mut Criterion) {
    let synthesis = session()
        .synthesize("web_application", "shop", &full_application(Environment::Production))
        .unwrap();
    let document = synthesis.document();
    let mut group = c.benchmark_group("serialize");

    group.bench_function("json", |b| b.iter(|| to_json(black_box(document))));
    group.bench_function("msgpack", |b| b.iter(|| to_msgpack(black_box(document))));

    group.finish();
}

criterion_group!(benches, bench_synthesize, bench_serialize);
criterion_main!(benches);
