//! Benchmarks for RBJ biquads and phaser allpass stages.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::filter::{AllpassStage, Biquad, EqShape};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, shape, gain_db) in [
            ("peaking", EqShape::Peaking, 6.0),
            ("high_shelf", EqShape::HighShelf, 3.0),
            ("low_pass", EqShape::LowPass, 0.0),
        ] {
            let mut filter = Biquad::with_design(1, 48_000.0, shape, 1_000.0, 0.707, gain_db);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.process_channel(0, black_box(&mut buffer));
                })
            });
        }

        // Design cost matters for swept EQ automation
        group.bench_with_input(BenchmarkId::new("redesign", size), &size, |b, _| {
            let mut filter = Biquad::new(1, 48_000.0);
            b.iter(|| {
                for i in 0..size {
                    let freq = 200.0 + i as f32;
                    filter.set(EqShape::Peaking, black_box(freq), 1.0, 4.0);
                }
            })
        });

        // Four-stage phaser cascade
        let mut stages = [AllpassStage::default(); 4];
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("allpass_x4", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    let a = AllpassStage::coefficient(black_box(800.0), 48_000.0);
                    for stage in stages.iter_mut() {
                        *sample = stage.process(a, *sample);
                    }
                }
            })
        });
    }

    group.finish();
}
