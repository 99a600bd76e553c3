//! Benchmarks for waveshaping curves.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::distortion::{shape, DistortionCurve};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.8).collect();

        for (name, curve) in [
            ("soft", DistortionCurve::SoftClip),
            ("tanh", DistortionCurve::Tanh),
            ("hard", DistortionCurve::HardClip),
            ("foldback", DistortionCurve::Foldback),
        ] {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    for sample in buffer.iter_mut() {
                        *sample = shape(*sample, black_box(8.0), curve);
                    }
                })
            });
        }
    }

    group.finish();
}
