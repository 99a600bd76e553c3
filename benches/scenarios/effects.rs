//! Benchmarks for each built-in effect at its default settings.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::{AudioBlock, EffectKind, EffectRegistry, EngineConfig, ParameterSet};

use crate::BLOCK_SIZES;

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effects");
    let registry = EffectRegistry::with_builtin();

    for &size in BLOCK_SIZES {
        let config = EngineConfig::new(48_000.0, 2, size);
        let left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.057).sin() * 0.5).collect();
        let right: Vec<f32> = (0..size).map(|i| (i as f32 * 0.061).sin() * 0.5).collect();
        let input = AudioBlock::from_channels(&[left, right]);

        for kind in EffectKind::ALL {
            let Ok(built) = registry.construct(kind, &ParameterSet::new(), &config) else {
                continue;
            };
            let mut node = built.node;
            let mut block = input.clone();
            group.bench_with_input(BenchmarkId::new(kind.id(), size), &size, |b, _| {
                b.iter(|| {
                    block.copy_from(&input);
                    node.process(black_box(&mut block));
                })
            });
        }
    }

    group.finish();
}
