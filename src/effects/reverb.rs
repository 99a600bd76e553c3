//! Reverb node: one Schroeder core per channel, the right one slightly
//! longer so the two tails decorrelate.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{mix::blend_dry_wet, reverb::SchroederReverb},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

/// Extra delay per channel index, about 23 samples at 44.1 kHz.
const STEREO_SPREAD_MS: f32 = 0.52;

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("room_size", 0.0, 1.0, 0.5, ParamUnit::Ratio),
    ParamSpec::number("decay", 0.0, 1.0, 0.5, ParamUnit::Ratio),
    ParamSpec::number("damping", 0.0, 1.0, 0.5, ParamUnit::Ratio),
    ParamSpec::number("mix", 0.0, 1.0, 0.3, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    pub room_size: f32,
    pub decay: f32,
    pub damping: f32,
    pub mix: f32,
}

impl ReverbParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            room_size: set.number("room_size"),
            decay: set.number("decay"),
            damping: set.number("damping"),
            mix: set.number("mix"),
        }
    }
}

pub struct Reverb {
    cores: Vec<SchroederReverb>,
    mix: f32,
}

impl Reverb {
    pub fn new(params: ReverbParams, config: &EngineConfig) -> Self {
        let mut reverb = Self {
            cores: (0..config.channels)
                .map(|ch| SchroederReverb::new(config.sample_rate, ch as f32 * STEREO_SPREAD_MS))
                .collect(),
            mix: 0.0,
        };
        reverb.apply(params);
        reverb
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(ReverbParams::from_set(set), config))
    }

    fn apply(&mut self, params: ReverbParams) {
        for core in &mut self.cores {
            core.set_room_size(params.room_size);
            core.set_decay(params.decay);
            core.set_damping(params.damping);
        }
        self.mix = params.mix.clamp(0.0, 1.0);
    }
}

impl EffectNode for Reverb {
    fn kind(&self) -> EffectKind {
        EffectKind::Reverb
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let mix = self.mix;
        for (channel, core) in block.channels_iter_mut().zip(self.cores.iter_mut()) {
            for sample in channel.iter_mut() {
                let wet = core.process(*sample);
                *sample = blend_dry_wet(*sample, wet, mix);
            }
        }
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Reverb(params) = params {
            self.apply(*params);
        }
    }

    fn reset(&mut self) {
        self.cores.iter_mut().for_each(SchroederReverb::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reverb(mix: f32) -> Reverb {
        Reverb::new(
            ReverbParams {
                room_size: 0.5,
                decay: 0.5,
                damping: 0.5,
                mix,
            },
            &EngineConfig::new(44_100.0, 2, 512),
        )
    }

    #[test]
    fn impulse_leaves_a_tail() {
        let mut fx = reverb(1.0);
        let mut block = AudioBlock::new(2, 8_192);
        block.channel_mut(0)[0] = 1.0;
        block.channel_mut(1)[0] = 1.0;
        fx.process(&mut block);
        let tail = &block.channel(0)[4_000..];
        assert!(tail.iter().any(|x| x.abs() > 1e-3));
    }

    #[test]
    fn stereo_tails_differ() {
        let mut fx = reverb(1.0);
        let mut block = AudioBlock::new(2, 8_192);
        block.channel_mut(0)[0] = 1.0;
        block.channel_mut(1)[0] = 1.0;
        fx.process(&mut block);
        assert_ne!(block.channel(0), block.channel(1));
    }

    #[test]
    fn reset_silences_the_tail() {
        let mut fx = reverb(1.0);
        let mut block = AudioBlock::new(2, 4_096);
        block.fill(0.5);
        fx.process(&mut block);
        fx.reset();
        block.silence();
        fx.process(&mut block);
        assert_eq!(block.peak(), 0.0);
    }
}
