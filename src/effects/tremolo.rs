//! Tremolo: periodic amplitude modulation.
//!
//! ```text
//! gain = 1 - depth · (1 - sin(phase)) / 2
//! ```
//!
//! The gain swings between `1 - depth` (sine at -1) and 1.0 (sine at +1), so
//! the effect only ever turns the signal down.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::Lfo,
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("rate_hz", 0.1, 20.0, 5.0, ParamUnit::Hertz),
    ParamSpec::number("depth", 0.0, 1.0, 0.5, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TremoloParams {
    pub rate_hz: f32,
    pub depth: f32,
}

impl TremoloParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            rate_hz: set.number("rate_hz"),
            depth: set.number("depth"),
        }
    }
}

pub struct Tremolo {
    // Full-scale sine; depth is applied in the gain formula
    lfo: Lfo,
    depth: f32,
}

impl Tremolo {
    pub fn new(params: TremoloParams, config: &EngineConfig) -> Self {
        Self {
            lfo: Lfo::sine(config.sample_rate, params.rate_hz, 1.0),
            depth: params.depth.clamp(0.0, 1.0),
        }
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(TremoloParams::from_set(set), config))
    }

    #[inline]
    fn gain(depth: f32, wave: f32) -> f32 {
        1.0 - depth * (1.0 - wave) * 0.5
    }
}

impl EffectNode for Tremolo {
    fn kind(&self) -> EffectKind {
        EffectKind::Tremolo
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let start = self.lfo;
        let mut end = start;

        for channel in block.channels_iter_mut() {
            let mut lfo = start;
            for sample in channel.iter_mut() {
                *sample *= Self::gain(self.depth, lfo.next_value());
            }
            end = lfo;
        }

        self.lfo = end;
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Tremolo(params) = params {
            self.lfo.set_rate(params.rate_hz);
            self.depth = params.depth.clamp(0.0, 1.0);
        }
    }

    fn reset(&mut self) {
        self.lfo.reset();
    }
}
