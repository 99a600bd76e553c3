//! Delay line throughput: feedback echoes and modulated fractional reads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::dsp::DelayLine;

use crate::BLOCK_SIZES;

/// Echo lengths at 48 kHz: slapback, vocal echo, and the longest delay setting.
const ECHO_MS: [u32; 3] = [80, 375, 2_000];

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

        for ms in ECHO_MS {
            let offset = ms as usize * 48;
            let mut line = DelayLine::with_max_ms(2_000.0, 48_000.0);
            let mut block = input.clone();
            group.bench_with_input(BenchmarkId::new(format!("echo_{ms}ms"), size), &size, |b, _| {
                b.iter(|| {
                    block.copy_from_slice(&input);
                    for x in block.iter_mut() {
                        let echo = line.read(black_box(offset));
                        line.write(*x + echo * 0.4);
                        *x += echo;
                    }
                })
            });
        }

        // chorus-style sweep around 15 ms
        let mut line = DelayLine::with_max_ms(50.0, 48_000.0);
        input.iter().for_each(|&x| line.write(x));
        group.bench_with_input(BenchmarkId::new("swept_read", size), &size, |b, _| {
            b.iter(|| {
                (0..size)
                    .map(|i| {
                        let offset = 720.0 + (i as f32 * 0.02).sin() * 96.0;
                        line.read_interpolated(black_box(offset))
                    })
                    .sum::<f32>()
            })
        });
    }

    group.finish();
}
