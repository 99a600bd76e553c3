//! Benchmarks for the test-tone oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::oscillator::{OscillatorWaveform, ToneOscillator};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in [
            ("sine", OscillatorWaveform::Sine),
            ("saw", OscillatorWaveform::Saw),
            ("square", OscillatorWaveform::Square),
        ] {
            let mut osc = ToneOscillator::new(440.0, 0.5, 48_000.0, waveform);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
