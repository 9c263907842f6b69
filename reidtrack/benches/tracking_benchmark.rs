//! Benchmarks for proximity tracking and identity resolution

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use reidtrack::{
    IdentityResolver, MemoryCounter, MemoryRecordSink, ProximityTracker, Region, RegionTracker,
    SessionConfig, TrackerConfig, TrackingRegion,
};
use std::hint::black_box;

fn create_test_detections(n_detections: usize, n_frames: usize) -> Vec<Vec<TrackingRegion>> {
    (0..n_frames)
        .map(|frame| {
            (0..n_detections)
                .map(|i| {
                    let x = (frame * 3 + i * 60) as i32;
                    let y = (frame * 2 + i * 30) as i32;
                    TrackingRegion::new(Region::new(x, x + 40, y, y + 50), 0.8)
                })
                .collect()
        })
        .collect()
}

fn bench_proximity_update(c: &mut Criterion) {
    let detections = create_test_detections(20, 10);

    c.bench_function("proximity_update_20_detections", |b| {
        b.iter_batched(
            || ProximityTracker::new(TrackerConfig::default()).unwrap(),
            |mut tracker| {
                for (i, frame) in detections.iter().enumerate() {
                    let _dead = tracker.process(black_box(frame), i as u64).unwrap();
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_proximity_various_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity_various_detection_counts");

    for &n_detections in &[5, 10, 20, 50, 100] {
        let detections = create_test_detections(n_detections, 10);

        group.bench_with_input(
            BenchmarkId::new("detections", n_detections),
            &detections,
            |b, detections| {
                b.iter_batched(
                    || ProximityTracker::new(TrackerConfig::default()).unwrap(),
                    |mut tracker| {
                        for (i, frame) in detections.iter().enumerate() {
                            let _dead = tracker.process(black_box(frame), i as u64).unwrap();
                        }
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_resolver_update(c: &mut Criterion) {
    let frames: Vec<Vec<Array1<f32>>> = (0..10)
        .map(|frame| {
            (0..10)
                .map(|i| Array1::from_elem(128, i as f32 + frame as f32 * 0.001))
                .collect()
        })
        .collect();

    c.bench_function("resolver_update_10_vectors", |b| {
        b.iter_batched(
            || {
                IdentityResolver::new(
                    SessionConfig::default(),
                    Box::new(MemoryCounter::default()),
                    Box::new(MemoryRecordSink::default()),
                )
                .unwrap()
            },
            |mut resolver| {
                for vectors in &frames {
                    let _report = resolver.process(black_box(vectors.clone()), 1).unwrap();
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_proximity_update,
    bench_proximity_various_sizes,
    bench_resolver_update
);
criterion_main!(benches);
