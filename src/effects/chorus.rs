//! Multi-voice chorus.
//!
//! Up to four taps read the same delay line around 20 ms, each swept by the
//! shared LFO at an evenly spread phase offset. The taps are averaged and
//! blended with the dry signal.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{mix::blend_dry_wet, DelayLine, Lfo},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

const BASE_DELAY_MS: f32 = 20.0;
/// Sweep at depth 1.0, either side of the base delay.
const SWEEP_MS: f32 = 5.0;
pub const MAX_VOICES: usize = 4;

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("rate_hz", 0.05, 5.0, 1.5, ParamUnit::Hertz),
    ParamSpec::number("depth", 0.0, 1.0, 0.5, ParamUnit::Ratio),
    ParamSpec::integer("voices", 1.0, MAX_VOICES as f32, 3.0),
    ParamSpec::number("mix", 0.0, 1.0, 0.5, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusParams {
    pub rate_hz: f32,
    pub depth: f32,
    pub voices: usize,
    pub mix: f32,
}

impl ChorusParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            rate_hz: set.number("rate_hz"),
            depth: set.number("depth"),
            voices: set.number("voices") as usize,
            mix: set.number("mix"),
        }
    }
}

pub struct Chorus {
    lines: Vec<DelayLine>,
    lfo: Lfo,
    voices: usize,
    mix: f32,
    base: f32,
    sweep: f32,
}

impl Chorus {
    pub fn new(params: ChorusParams, config: &EngineConfig) -> Self {
        let max_ms = BASE_DELAY_MS + SWEEP_MS + 1.0;
        let mut chorus = Self {
            lines: (0..config.channels)
                .map(|_| DelayLine::with_max_ms(max_ms, config.sample_rate))
                .collect(),
            lfo: Lfo::sine(config.sample_rate, params.rate_hz, params.depth),
            voices: 1,
            mix: 0.0,
            base: config.ms_to_samples(BASE_DELAY_MS),
            sweep: config.ms_to_samples(SWEEP_MS),
        };
        chorus.apply(params);
        chorus
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(ChorusParams::from_set(set), config))
    }

    fn apply(&mut self, params: ChorusParams) {
        self.lfo.set_rate(params.rate_hz);
        self.lfo.set_depth(params.depth);
        self.voices = params.voices.clamp(1, MAX_VOICES);
        self.mix = params.mix.clamp(0.0, 1.0);
    }
}

impl EffectNode for Chorus {
    fn kind(&self) -> EffectKind {
        EffectKind::Chorus
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let start = self.lfo;
        let mut end = start;
        let voices = self.voices;
        let spread = 1.0 / voices as f32;

        for (channel, line) in block.channels_iter_mut().zip(self.lines.iter_mut()) {
            let mut lfo = start;
            for sample in channel.iter_mut() {
                let dry = *sample;
                let mut wet = 0.0;
                for voice in 0..voices {
                    let m = lfo.value_at(voice as f32 * spread);
                    wet += line.read_interpolated(self.base + self.sweep * m);
                }
                line.write(dry);
                lfo.advance();
                *sample = blend_dry_wet(dry, wet * spread, self.mix);
            }
            end = lfo;
        }

        self.lfo = end;
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Chorus(params) = params {
            self.apply(*params);
        }
    }

    fn reset(&mut self) {
        self.lines.iter_mut().for_each(DelayLine::reset);
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::sine_tone;

    fn chorus(voices: usize, depth: f32, mix: f32) -> Chorus {
        Chorus::new(
            ChorusParams {
                rate_hz: 1.5,
                depth,
                voices,
                mix,
            },
            &EngineConfig::new(48_000.0, 2, 512),
        )
    }

    #[test]
    fn wet_signal_arrives_after_base_delay() {
        let mut fx = chorus(1, 0.0, 1.0);
        let mut block = AudioBlock::new(2, 2048);
        block.channel_mut(0)[0] = 1.0;
        fx.process(&mut block);

        // 20ms at 48kHz
        let out = block.channel(0);
        assert!(out[..959].iter().all(|x| x.abs() < 1e-6));
        assert!((out[960] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn output_stays_bounded_with_all_voices() {
        let mut fx = chorus(4, 1.0, 0.5);
        let tone = sine_tone(220.0, 1.0, 48_000.0, 48_000);
        let mut block = AudioBlock::from_channels(&[tone.clone(), tone]);
        fx.process(&mut block);
        assert!(block.is_finite());
        assert!(block.peak() <= 1.0 + 1e-4);
    }

    #[test]
    fn channels_share_one_sweep() {
        let mut fx = chorus(3, 0.8, 0.5);
        let tone = sine_tone(330.0, 0.5, 48_000.0, 4_096);
        let mut block = AudioBlock::from_channels(&[tone.clone(), tone]);
        fx.process(&mut block);
        assert_eq!(block.channel(0), block.channel(1));
    }

    #[test]
    fn reset_restarts_lfo() {
        let mut fx = chorus(2, 0.5, 0.5);
        let mut block = AudioBlock::new(2, 1000);
        fx.process(&mut block);
        assert!(fx.lfo.phase() > 0.0);
        fx.reset();
        assert_eq!(fx.lfo.phase(), 0.0);
    }
}
