//! Feed-forward peak compressor with a quadratic soft knee.

/*
Compression
===========

A compressor turns loud passages down. The detector measures the level, the
gain computer decides how far above the threshold it is and how much to pull
it back:

    x ──┬──────────────────────────────────→ (×) ──→ y
        │                                     ↑
        └──→ |x| ──→ [ follower ] ──→ dB ──→ [ gain computer ] ──→ + makeup

Static curve (output level vs input level, in dB):

    out │                 ╱ ratio 1:1
        │              ╱ ___────  ratio R:1
        │           ╱_──
        │        ╱─╯  ← knee (width `knee_db`, centred on threshold)
        │     ╱
        └──────────────────── in
                 threshold

With over = level - threshold:

    2·over < -knee          no reduction
    |2·over| <= knee        (1/R - 1) · (over + knee/2)² / (2·knee)
    2·over >  knee          (1/R - 1) · over

Stereo detection is linked: the louder channel drives one shared gain so the
image does not wander.
*/

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::envelope::{db_to_linear, linear_to_db, EnvelopeFollower},
    params::{ParamSpec, ParamUnit, ParameterSet},
    MAX_BLOCK_SIZE,
};

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("threshold_db", -60.0, 0.0, -24.0, ParamUnit::Decibels),
    ParamSpec::number("ratio", 1.0, 20.0, 4.0, ParamUnit::Ratio),
    ParamSpec::number("knee_db", 0.0, 24.0, 6.0, ParamUnit::Decibels),
    ParamSpec::number("attack_ms", 0.1, 200.0, 3.0, ParamUnit::Milliseconds),
    ParamSpec::number("release_ms", 5.0, 2000.0, 250.0, ParamUnit::Milliseconds),
    ParamSpec::number("makeup_db", 0.0, 24.0, 0.0, ParamUnit::Decibels),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorParams {
    pub threshold_db: f32,
    pub ratio: f32,
    pub knee_db: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub makeup_db: f32,
}

impl CompressorParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            threshold_db: set.number("threshold_db"),
            ratio: set.number("ratio"),
            knee_db: set.number("knee_db"),
            attack_ms: set.number("attack_ms"),
            release_ms: set.number("release_ms"),
            makeup_db: set.number("makeup_db"),
        }
    }

    /// Gain change in dB (<= 0) for a detector level in dB.
    pub fn gain_reduction_db(&self, level_db: f32) -> f32 {
        let slope = 1.0 / self.ratio.max(1.0) - 1.0;
        let over = level_db - self.threshold_db;
        let knee = self.knee_db.max(0.0);

        if 2.0 * over < -knee {
            0.0
        } else if knee > 0.0 && 2.0 * over.abs() <= knee {
            let x = over + knee * 0.5;
            slope * x * x / (2.0 * knee)
        } else {
            slope * over
        }
    }
}

/// Detector, gain computer and per-frame gain scratch. Shared with the vocal
/// enhancer.
pub struct CompressorCore {
    params: CompressorParams,
    follower: EnvelopeFollower,
    gains: Vec<f32>,
}

impl CompressorCore {
    pub fn new(params: CompressorParams, sample_rate: f32) -> Self {
        Self {
            params,
            follower: EnvelopeFollower::new(
                sample_rate,
                params.attack_ms * 0.001,
                params.release_ms * 0.001,
            ),
            gains: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn set_params(&mut self, params: CompressorParams) {
        self.params = params;
        self.follower
            .set_times(params.attack_ms * 0.001, params.release_ms * 0.001);
    }

    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    pub fn process(&mut self, block: &mut AudioBlock) {
        let frames = block.frames();
        let chunk = self.gains.len();
        let mut start = 0;
        while start < frames {
            let end = (start + chunk).min(frames);
            self.process_range(block, start, end);
            start = end;
        }
    }

    fn process_range(&mut self, block: &mut AudioBlock, start: usize, end: usize) {
        let gains = &mut self.gains[..end - start];

        // linked peak detection
        gains.fill(0.0);
        for channel in block.channels_iter() {
            for (peak, &x) in gains.iter_mut().zip(&channel[start..end]) {
                *peak = peak.max(x.abs());
            }
        }

        let makeup_db = self.params.makeup_db;
        for g in gains.iter_mut() {
            let level_db = linear_to_db(self.follower.next(*g));
            *g = db_to_linear(self.params.gain_reduction_db(level_db) + makeup_db);
        }

        for channel in block.channels_iter_mut() {
            for (x, &g) in channel[start..end].iter_mut().zip(gains.iter()) {
                *x *= g;
            }
        }
    }

    pub fn reset(&mut self) {
        self.follower.reset();
    }
}

pub struct Compressor {
    core: CompressorCore,
}

impl Compressor {
    pub fn new(params: CompressorParams, config: &EngineConfig) -> Self {
        Self {
            core: CompressorCore::new(params, config.sample_rate),
        }
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(CompressorParams::from_set(set), config))
    }
}

impl EffectNode for Compressor {
    fn kind(&self) -> EffectKind {
        EffectKind::Compressor
    }

    fn process(&mut self, block: &mut AudioBlock) {
        self.core.process(block);
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Compressor(params) = params {
            self.core.set_params(*params);
        }
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
