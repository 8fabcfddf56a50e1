use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flight_annotator::algorithms::{align_to_reference, interpolation, ReferencePolicy, ResampleStrategy};
use flight_annotator::core::{Series, SourceId};
use std::hint::black_box;

fn synthetic_series(name: &str, len: usize, step: i64) -> Series {
    let timestamps: Vec<i64> = (0..len as i64).map(|i| i * step).collect();
    let values: Vec<f64> = (0..len).map(|i| (i as f64 * 0.01).sin()).collect();
    Series::new(SourceId::new("bench", name), timestamps, values).unwrap()
}

/// A ten-minute flight: IMU at 250 Hz, attitude at 50 Hz, GPS at 5 Hz.
fn synthetic_flight() -> Vec<Series> {
    vec![
        synthetic_series("imu", 150_000, 4_000),
        synthetic_series("attitude", 30_000, 20_000),
        synthetic_series("gps", 3_000, 200_000),
    ]
}

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolation");

    let source = synthetic_series("imu", 150_000, 4_000);
    let targets: Vec<i64> = (0..30_000).map(|i| i * 20_000 + 7).collect();

    group.bench_function("linear", |b| {
        b.iter(|| interpolation::linear(black_box(&targets), source.timestamps(), source.values()));
    });
    group.bench_function("bucket_mean", |b| {
        b.iter(|| {
            interpolation::bucket_mean(black_box(&targets), source.timestamps(), source.values())
        });
    });
    group.bench_function("hold", |b| {
        b.iter(|| interpolation::hold(black_box(&targets), source.timestamps(), source.values()));
    });

    group.finish();
}

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("alignment");
    group.sample_size(20);

    let flight = synthetic_flight();
    let reference = ReferencePolicy::MedianClosest.select(&flight).unwrap();

    for strategy in [ResampleStrategy::Interpolate, ResampleStrategy::BlockAggregate] {
        group.bench_with_input(
            BenchmarkId::new("align_to_reference", format!("{:?}", strategy)),
            &strategy,
            |b, strategy| {
                b.iter(|| align_to_reference(black_box(&flight), reference, strategy.resampler()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_interpolation, bench_alignment);
criterion_main!(benches);
