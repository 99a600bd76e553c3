//! Benchmarks for the compressor's level detector.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::envelope::{db_to_linear, linear_to_db, EnvelopeFollower};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.02).sin()).collect();

        // Detector only
        let mut follower = EnvelopeFollower::new(48_000.0, 0.003, 0.25);
        group.bench_with_input(BenchmarkId::new("follow", size), &size, |b, _| {
            b.iter(|| {
                let mut last = 0.0;
                for &x in &input {
                    last = follower.next(black_box(x.abs()));
                }
                last
            })
        });

        // Detector plus the dB round trip a compressor does per sample
        let mut follower = EnvelopeFollower::new(48_000.0, 0.003, 0.25);
        group.bench_with_input(BenchmarkId::new("follow_db", size), &size, |b, _| {
            b.iter(|| {
                let mut gain = 0.0;
                for &x in &input {
                    let level_db = linear_to_db(follower.next(x.abs()));
                    gain = db_to_linear(black_box(-(level_db + 24.0).max(0.0) * 0.75));
                }
                gain
            })
        });
    }

    group.finish();
}
