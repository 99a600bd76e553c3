//! One band of parametric EQ. Stack several instances for more bands.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::filter::{Biquad, EqShape},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("frequency_hz", 20.0, 20_000.0, 1_000.0, ParamUnit::Hertz),
    ParamSpec::number("q", 0.1, 18.0, 0.707, ParamUnit::None),
    ParamSpec::number("gain_db", -24.0, 24.0, 0.0, ParamUnit::Decibels),
    ParamSpec::choice("shape", EqShape::NAMES, 0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricEqParams {
    pub frequency_hz: f32,
    pub q: f32,
    pub gain_db: f32,
    pub shape: EqShape,
}

impl ParametricEqParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            frequency_hz: set.number("frequency_hz"),
            q: set.number("q"),
            gain_db: set.number("gain_db"),
            shape: EqShape::from_name(set.choice("shape")),
        }
    }
}

pub struct ParametricEq {
    filter: Biquad,
}

impl ParametricEq {
    pub fn new(params: ParametricEqParams, config: &EngineConfig) -> Self {
        Self {
            filter: Biquad::with_design(
                config.channels,
                config.sample_rate,
                params.shape,
                params.frequency_hz,
                params.q,
                params.gain_db,
            ),
        }
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(ParametricEqParams::from_set(set), config))
    }
}

impl EffectNode for ParametricEq {
    fn kind(&self) -> EffectKind {
        EffectKind::ParametricEq
    }

    fn process(&mut self, block: &mut AudioBlock) {
        for (index, channel) in block.channels_iter_mut().enumerate() {
            self.filter.process_channel(index, channel);
        }
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::ParametricEq(p) = params {
            self.filter.set(p.shape, p.frequency_hz, p.q, p.gain_db);
        }
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::sine_tone;

    fn steady_peak(eq: &mut ParametricEq, freq: f32) -> f32 {
        let mut block = AudioBlock::from_mono(&sine_tone(freq, 0.5, 48_000.0, 9_600));
        eq.reset();
        eq.process(&mut block);
        block.channel(0)[4_800..]
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn boost_raises_center_frequency() {
        let params = ParametricEqParams {
            frequency_hz: 1_000.0,
            q: 1.0,
            gain_db: 6.0,
            shape: EqShape::Peaking,
        };
        let mut eq = ParametricEq::new(params, &EngineConfig::new(48_000.0, 1, 512));
        // +6 dB doubles the amplitude
        assert!((steady_peak(&mut eq, 1_000.0) - 1.0).abs() < 0.02);
        assert!((steady_peak(&mut eq, 60.0) - 0.5).abs() < 0.02);
    }

    #[test]
    fn shape_choice_decodes() {
        let set = ParameterSet::defaults(SCHEMA).with("shape", "high_pass");
        assert_eq!(ParametricEqParams::from_set(&set).shape, EqShape::HighPass);
    }

    #[test]
    fn update_switches_response() {
        let mut eq = ParametricEq::new(
            ParametricEqParams::from_set(&ParameterSet::defaults(SCHEMA)),
            &EngineConfig::new(48_000.0, 1, 512),
        );
        assert!((steady_peak(&mut eq, 100.0) - 0.5).abs() < 0.01);

        eq.update_parameters(&EffectParams::ParametricEq(ParametricEqParams {
            frequency_hz: 2_000.0,
            q: 0.707,
            gain_db: 0.0,
            shape: EqShape::HighPass,
        }));
        assert!(steady_peak(&mut eq, 100.0) < 0.01);
    }
}
