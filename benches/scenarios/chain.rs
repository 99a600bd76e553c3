//! Benchmarks for complete vocal chains.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vocal_fx::{AudioBlock, AudioEffectsProcessor, EffectKind, EngineConfig, ParameterSet};

use crate::BLOCK_SIZES;

fn processor(size: usize, chain: &[(EffectKind, ParameterSet)]) -> AudioEffectsProcessor {
    let config = EngineConfig::new(48_000.0, 2, size).with_crossfade_ms(0.0);
    let mut fx = match AudioEffectsProcessor::new(config) {
        Ok(fx) => fx,
        Err(err) => panic!("bench config rejected: {err}"),
    };
    for (kind, params) in chain {
        if let Err(err) = fx.add_effect(*kind, params) {
            panic!("failed to add {kind}: {err}");
        }
    }
    fx
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    for &size in BLOCK_SIZES {
        let tone: Vec<f32> = (0..size).map(|i| (i as f32 * 0.0577).sin() * 0.4).collect();
        let input = AudioBlock::from_channels(&[tone.clone(), tone]);
        let mut output = AudioBlock::new(2, size);

        // === VOCAL POLISH ===
        // enhancer → eq → compressor → reverb, a typical lead vocal bus
        let mut polish = processor(
            size,
            &[
                (EffectKind::VocalEnhancer, ParameterSet::new()),
                (
                    EffectKind::ParametricEq,
                    ParameterSet::new()
                        .with("shape", "high_pass")
                        .with("frequency_hz", 90.0),
                ),
                (EffectKind::Compressor, ParameterSet::new()),
                (EffectKind::Reverb, ParameterSet::new().with("mix", 0.2)),
            ],
        );
        group.bench_with_input(BenchmarkId::new("polish", size), &size, |b, _| {
            b.iter(|| {
                let _ = polish.process(black_box(&input), &mut output);
            })
        });

        // === HARMONIZER ===
        // pitch shift a fifth up, blended, then widened and delayed
        let mut harmonizer = processor(
            size,
            &[
                (
                    EffectKind::PitchShift,
                    ParameterSet::new().with("semitones", 7.0).with("mix", 0.5),
                ),
                (EffectKind::StereoWidener, ParameterSet::new()),
                (EffectKind::Delay, ParameterSet::new()),
            ],
        );
        group.bench_with_input(BenchmarkId::new("harmonizer", size), &size, |b, _| {
            b.iter(|| {
                let _ = harmonizer.process(black_box(&input), &mut output);
            })
        });

        // === MODULATION STACK ===
        let mut modulation = processor(
            size,
            &[
                (EffectKind::Chorus, ParameterSet::new()),
                (EffectKind::Phaser, ParameterSet::new()),
                (EffectKind::Flanger, ParameterSet::new()),
                (EffectKind::Tremolo, ParameterSet::new()),
            ],
        );
        group.bench_with_input(BenchmarkId::new("modulation", size), &size, |b, _| {
            b.iter(|| {
                let _ = modulation.process(black_box(&input), &mut output);
            })
        });

        // === CROSSFADING ===
        // a slot permanently mid-toggle pays for the scratch copy and blend
        let config = EngineConfig::new(48_000.0, 2, size).with_crossfade_ms(10.0);
        if let Ok(mut toggling) = AudioEffectsProcessor::new(config) {
            if let Ok(handle) = toggling.add_effect(EffectKind::Distortion, &ParameterSet::new()) {
                let mut enabled = true;
                group.bench_with_input(BenchmarkId::new("toggle", size), &size, |b, _| {
                    b.iter(|| {
                        enabled = !enabled;
                        let _ = toggling.set_enabled(handle, enabled);
                        let _ = toggling.process(black_box(&input), &mut output);
                    })
                });
            }
        }
    }

    group.finish();
}
