//! Benchmarks for dry/wet blending and hot-swap crossfades.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::{
    mix::{blend_dry_wet, crossfade},
    LinearRamp,
};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let dry: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let wet_source: Vec<f32> = (0..size).map(|i| (i as f32 * 0.13).cos()).collect();

        let mut wet = wet_source.clone();
        group.bench_with_input(BenchmarkId::new("dry_wet", size), &size, |b, _| {
            b.iter(|| {
                wet.copy_from_slice(&wet_source);
                for (w, &d) in wet.iter_mut().zip(black_box(&dry)) {
                    *w = blend_dry_wet(d, *w, black_box(0.35));
                }
            })
        });

        let mut wet = wet_source.clone();
        group.bench_with_input(BenchmarkId::new("crossfade", size), &size, |b, _| {
            b.iter(|| {
                wet.copy_from_slice(&wet_source);
                let mut ramp = LinearRamp::new(0.0);
                ramp.set_target(1.0, 480);
                crossfade(black_box(&dry), black_box(&mut wet), ramp)
            })
        });
    }

    group.finish();
}
