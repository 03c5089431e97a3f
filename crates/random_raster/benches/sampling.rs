mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use random_raster::distribution::registry::sampler_for;
use random_raster::prelude::*;
use serde_json::json;

const DRAWS: u64 = 16_384;

fn cases() -> Vec<(&'static str, PixelType, serde_json::Value)> {
    vec![
        ("uniform_integer", PixelType::Int16, json!({ "a": -100, "b": 100 })),
        ("binomial", PixelType::Int32, json!({ "t": 10_000, "p": 0.3 })),
        ("poisson", PixelType::Int32, json!({ "mean": 4.0 })),
        ("poisson", PixelType::Int32, json!({ "mean": 400.0 })),
        ("discrete", PixelType::Byte, json!({ "weights": [1, 2, 3, 4, 5, 6, 7, 8] })),
        ("normal", PixelType::Float32, json!({ "mean": 0.0, "stddev": 1.0 })),
        ("gamma", PixelType::Float64, json!({ "alpha": 0.5 })),
        ("student_t", PixelType::Float64, json!({ "n": 5.0 })),
        (
            "piecewise_linear",
            PixelType::Float64,
            json!({ "intervals": [0, 1, 2, 3], "densities": [0, 2, 1, 0] }),
        ),
    ]
}

fn sampler(name: &str, pixel_type: PixelType, params: &serde_json::Value) -> Sampler {
    let doc = common::descriptor_json(1, pixel_type.name(), name, params.clone());
    let descriptor = parse_descriptor(doc.as_bytes()).expect("bench descriptor");
    sampler_for(name)
        .expect("known distribution")
        .build(&descriptor.parameters, pixel_type)
        .expect("valid parameters")
}

fn sampling_distribution_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/sample_at");
    group.throughput(common::pixels_throughput(DRAWS as usize));

    for (name, pixel_type, params) in cases() {
        let s = sampler(name, pixel_type, &params);
        let id = format!("{name}/{params}");
        group.bench_with_input(BenchmarkId::from_parameter(id), &s, |b, s| {
            b.iter(|| {
                let mut acc = 0.0;
                for i in 0..DRAWS {
                    acc += s.sample_at(SampleContext::new(common::SEED, i)).as_f64();
                }
                black_box(acc);
            });
        });
    }

    group.finish();
}

fn sampling_stream_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/value_at");
    group.throughput(common::pixels_throughput(DRAWS as usize));
    group.bench_function("value_at", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for i in 0..DRAWS {
                acc ^= value_at(common::SEED, i);
            }
            black_box(acc);
        });
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampling_distribution_benches, sampling_stream_benches
}
criterion_main!(benches);
