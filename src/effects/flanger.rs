//! Flanger: one short modulated delay tap with feedback.
//!
//! The tap sweeps upward from `delay_ms` by up to 10 ms at full depth, always
//! inside a 1..20 ms window. Negative feedback inverts the resonances, giving
//! the hollower "negative flange" sound.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{lfo::bipolar_to_unipolar, mix::blend_dry_wet, DelayLine, Lfo},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

const MIN_DELAY_MS: f32 = 1.0;
const MAX_DELAY_MS: f32 = 20.0;
const SWEEP_MS: f32 = 10.0;
const MAX_FEEDBACK: f32 = 0.95;

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("rate_hz", 0.05, 5.0, 0.25, ParamUnit::Hertz),
    ParamSpec::number("depth", 0.0, 1.0, 0.7, ParamUnit::Ratio),
    ParamSpec::number("delay_ms", MIN_DELAY_MS, 10.0, 2.0, ParamUnit::Milliseconds),
    ParamSpec::number("feedback", -MAX_FEEDBACK, MAX_FEEDBACK, 0.5, ParamUnit::Ratio).feedback(),
    ParamSpec::number("mix", 0.0, 1.0, 0.5, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlangerParams {
    pub rate_hz: f32,
    pub depth: f32,
    pub delay_ms: f32,
    pub feedback: f32,
    pub mix: f32,
}

impl FlangerParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            rate_hz: set.number("rate_hz"),
            depth: set.number("depth"),
            delay_ms: set.number("delay_ms"),
            feedback: set.number("feedback"),
            mix: set.number("mix"),
        }
    }
}

pub struct Flanger {
    lines: Vec<DelayLine>,
    lfo: Lfo,
    delay_ms: f32,
    depth: f32,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
}

impl Flanger {
    pub fn new(params: FlangerParams, config: &EngineConfig) -> Self {
        let mut flanger = Self {
            lines: (0..config.channels)
                .map(|_| DelayLine::with_max_ms(MAX_DELAY_MS + 1.0, config.sample_rate))
                .collect(),
            lfo: Lfo::sine(config.sample_rate, params.rate_hz, 1.0),
            delay_ms: MIN_DELAY_MS,
            depth: 0.0,
            feedback: 0.0,
            mix: 0.0,
            sample_rate: config.sample_rate,
        };
        flanger.apply(params);
        flanger
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(FlangerParams::from_set(set), config))
    }

    fn apply(&mut self, params: FlangerParams) {
        self.lfo.set_rate(params.rate_hz);
        self.depth = params.depth.clamp(0.0, 1.0);
        self.delay_ms = params.delay_ms;
        self.feedback = params.feedback.clamp(-MAX_FEEDBACK, MAX_FEEDBACK);
        self.mix = params.mix.clamp(0.0, 1.0);
    }

    /// Tap position in samples for one LFO value.
    #[inline]
    fn tap(delay_ms: f32, depth: f32, wave: f32, sample_rate: f32) -> f32 {
        let ms = delay_ms + SWEEP_MS * depth * bipolar_to_unipolar(wave);
        ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS) * 0.001 * sample_rate
    }
}

impl EffectNode for Flanger {
    fn kind(&self) -> EffectKind {
        EffectKind::Flanger
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let start = self.lfo;
        let mut end = start;
        let (delay_ms, depth) = (self.delay_ms, self.depth);
        let (feedback, mix) = (self.feedback, self.mix);

        for (channel, line) in block.channels_iter_mut().zip(self.lines.iter_mut()) {
            let mut lfo = start;
            for sample in channel.iter_mut() {
                let dry = *sample;
                let tap = Self::tap(delay_ms, depth, lfo.next_value(), self.sample_rate);
                let delayed = line.read_interpolated(tap);
                line.write(dry + delayed * feedback);
                *sample = blend_dry_wet(dry, delayed, mix);
            }
            end = lfo;
        }

        self.lfo = end;
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Flanger(params) = params {
            self.apply(*params);
        }
    }

    fn reset(&mut self) {
        self.lines.iter_mut().for_each(DelayLine::reset);
        self.lfo.reset();
    }
}
