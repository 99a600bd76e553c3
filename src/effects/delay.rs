//! Single-tap feedback delay.
//!
//! ```text
//! x ──┬────────────────────────────────(×(1-mix))──→ (+) ──→ y
//!     └──→ (+) ──→ [ delay line ] ──┬──(×mix)──────────┘
//!           ↑                       │
//!           └────── (×feedback) ────┘
//! ```
//!
//! The delay time glides through a one-pole smoother, so sweeping it
//! produces a tape-like pitch bend instead of zipper noise.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{mix::blend_dry_wet, DelayLine, OnePole},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const MAX_TIME_MS: f32 = 2000.0;
const TIME_GLIDE_S: f32 = 0.05;

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("time_ms", 1.0, MAX_TIME_MS, 250.0, ParamUnit::Milliseconds),
    ParamSpec::number("feedback", 0.0, 0.95, 0.4, ParamUnit::Ratio).feedback(),
    ParamSpec::number("mix", 0.0, 1.0, 0.35, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    pub time_ms: f32,
    pub feedback: f32,
    pub mix: f32,
}

impl DelayParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            time_ms: set.number("time_ms"),
            feedback: set.number("feedback"),
            mix: set.number("mix"),
        }
    }
}

pub struct Delay {
    lines: Vec<DelayLine>,
    time: OnePole,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
}

impl Delay {
    pub fn new(params: DelayParams, config: &EngineConfig) -> Self {
        let sample_rate = config.sample_rate;
        let time_samples = params.time_ms * 0.001 * sample_rate;
        let mut delay = Self {
            lines: (0..config.channels)
                .map(|_| DelayLine::with_max_ms(MAX_TIME_MS, sample_rate))
                .collect(),
            time: OnePole::new(time_samples, TIME_GLIDE_S, sample_rate),
            feedback: 0.0,
            mix: 0.0,
            sample_rate,
        };
        delay.apply(params);
        delay
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(DelayParams::from_set(set), config))
    }

    fn apply(&mut self, params: DelayParams) {
        self.time.set_target(params.time_ms * 0.001 * self.sample_rate);
        self.feedback = params.feedback.clamp(0.0, 0.95);
        self.mix = params.mix.clamp(0.0, 1.0);
    }
}

impl EffectNode for Delay {
    fn kind(&self) -> EffectKind {
        EffectKind::Delay
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let start = self.time;
        let mut end = start;

        for (channel, line) in block.channels_iter_mut().zip(self.lines.iter_mut()) {
            let mut time = start;
            for sample in channel.iter_mut() {
                let dry = *sample;
                let delayed = line.read_interpolated(time.next());
                line.write(dry + delayed * self.feedback);
                *sample = blend_dry_wet(dry, delayed, self.mix);
            }
            end = time;
        }

        self.time = end;
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Delay(params) = params {
            self.apply(*params);
        }
    }

    fn reset(&mut self) {
        self.lines.iter_mut().for_each(DelayLine::reset);
        self.time.jump(self.time.target());
    }
}
