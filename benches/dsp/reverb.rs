//! Benchmarks for the Schroeder reverb core.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::reverb::SchroederReverb;

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();

        for (name, room, decay) in [("small", 0.2, 0.3), ("large", 1.0, 1.0)] {
            let mut reverb = SchroederReverb::new(48_000.0, 0.0);
            reverb.set_room_size(room);
            reverb.set_decay(decay);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    for sample in buffer.iter_mut() {
                        *sample = reverb.process(black_box(*sample));
                    }
                })
            });
        }
    }

    group.finish();
}
