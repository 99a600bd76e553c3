//! Benchmarks for the granular pitch shifter core.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::grain::GrainShifter;

use crate::BLOCK_SIZES;

pub fn bench_grain(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/grain");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.06).sin() * 0.5).collect();

        // Cost grows with overlap: more grains are summed per output sample
        for (name, grain, overlap) in [
            ("2048_half", 2048, 0.5),
            ("2048_three_quarter", 2048, 0.75),
            ("512_half", 512, 0.5),
        ] {
            let mut shifter = GrainShifter::new(grain, overlap, 7.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    shifter.process_buffer(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
