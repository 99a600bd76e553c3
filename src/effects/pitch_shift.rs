//! Granular pitch shifter node. The grain engine lives in `dsp::grain`; this
//! node adds per-channel state, a latency-matched dry path and the wet/dry mix.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{
        grain::{GrainShifter, MAX_GRAIN_SIZE, MIN_GRAIN_SIZE},
        mix::blend_dry_wet,
        DelayLine,
    },
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("semitones", -24.0, 24.0, 0.0, ParamUnit::Semitones),
    ParamSpec::integer("grain_size", MIN_GRAIN_SIZE as f32, MAX_GRAIN_SIZE as f32, 2048.0)
        .with_unit(ParamUnit::Samples),
    ParamSpec::number("overlap", 0.25, 0.875, 0.5, ParamUnit::Ratio),
    ParamSpec::number("mix", 0.0, 1.0, 1.0, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchShiftParams {
    pub semitones: f32,
    pub grain_size: usize,
    pub overlap: f32,
    pub mix: f32,
}

impl PitchShiftParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            semitones: set.number("semitones"),
            grain_size: set.number("grain_size") as usize,
            overlap: set.number("overlap"),
            mix: set.number("mix"),
        }
    }
}

struct ShifterChannel {
    shifter: GrainShifter,
    dry: DelayLine,
}

pub struct PitchShift {
    channels: Vec<ShifterChannel>,
    mix: f32,
}

impl PitchShift {
    pub fn new(params: PitchShiftParams, config: &EngineConfig) -> Self {
        Self {
            channels: (0..config.channels)
                .map(|_| ShifterChannel {
                    shifter: GrainShifter::new(params.grain_size, params.overlap, params.semitones),
                    dry: DelayLine::new(MAX_GRAIN_SIZE + 4),
                })
                .collect(),
            mix: params.mix.clamp(0.0, 1.0),
        }
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(PitchShiftParams::from_set(set), config))
    }
}

impl EffectNode for PitchShift {
    fn kind(&self) -> EffectKind {
        EffectKind::PitchShift
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let mix = self.mix;
        for (channel, state) in block.channels_iter_mut().zip(self.channels.iter_mut()) {
            let latency = state.shifter.latency();
            for sample in channel.iter_mut() {
                let input = *sample;
                let wet = state.shifter.process(input);
                let dry = state.dry.read(latency);
                state.dry.write(input);
                *sample = blend_dry_wet(dry, wet, mix);
            }
        }
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::PitchShift(p) = params {
            for state in &mut self.channels {
                state.shifter.set_grain(p.grain_size, p.overlap);
                state.shifter.set_semitones(p.semitones);
            }
            self.mix = p.mix.clamp(0.0, 1.0);
        }
    }

    fn reset(&mut self) {
        for state in &mut self.channels {
            state.shifter.reset();
            state.dry.reset();
        }
    }

    fn latency_frames(&self) -> usize {
        self.channels
            .first()
            .map(|state| state.shifter.latency())
            .unwrap_or(0)
    }
}
