//! Waveshaping distortion. Stateless: every output sample depends only on the
//! matching input sample.

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{
        distortion::{shape, DistortionCurve},
        mix::blend_dry_wet,
    },
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const SCHEMA: &[ParamSpec] = &[
    ParamSpec::number("drive", 1.0, 50.0, 4.0, ParamUnit::Ratio),
    ParamSpec::choice("curve", DistortionCurve::NAMES, 0),
    ParamSpec::number("level", 0.0, 1.0, 0.7, ParamUnit::Ratio),
    ParamSpec::number("mix", 0.0, 1.0, 1.0, ParamUnit::Ratio),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    pub drive: f32,
    pub curve: DistortionCurve,
    pub level: f32,
    pub mix: f32,
}

impl DistortionParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            drive: set.number("drive"),
            curve: DistortionCurve::from_name(set.choice("curve")),
            level: set.number("level"),
            mix: set.number("mix"),
        }
    }
}

pub struct Distortion {
    params: DistortionParams,
}

impl Distortion {
    pub fn new(params: DistortionParams, _config: &EngineConfig) -> Self {
        Self { params }
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(DistortionParams::from_set(set), config))
    }
}

impl EffectNode for Distortion {
    fn kind(&self) -> EffectKind {
        EffectKind::Distortion
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let DistortionParams {
            drive,
            curve,
            level,
            mix,
        } = self.params;

        for sample in block.samples_mut() {
            let wet = shape(*sample, drive, curve) * level;
            *sample = blend_dry_wet(*sample, wet, mix);
        }
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::Distortion(params) = params {
            self.params = *params;
        }
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distortion(curve: DistortionCurve) -> Distortion {
        Distortion::new(
            DistortionParams {
                drive: 10.0,
                curve,
                level: 1.0,
                mix: 1.0,
            },
            &EngineConfig::default(),
        )
    }

    #[test]
    fn hard_clip_limits_peaks() {
        let mut fx = distortion(DistortionCurve::HardClip);
        let mut block = AudioBlock::from_mono(&[0.05, 0.5, -0.5, -0.01]);
        fx.process(&mut block);
        for (out, expected) in block.channel(0).iter().zip([0.5, 1.0, -1.0, -0.1]) {
            assert!((out - expected).abs() < 1e-6, "{out} != {expected}");
        }
    }

    #[test]
    fn same_input_same_output() {
        let mut fx = distortion(DistortionCurve::SoftClip);
        let mut a = AudioBlock::from_mono(&[0.3, -0.2, 0.7]);
        let mut b = a.clone();
        fx.process(&mut a);
        fx.process(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_mix_is_dry() {
        let mut fx = distortion(DistortionCurve::Foldback);
        fx.update_parameters(&EffectParams::Distortion(DistortionParams {
            drive: 30.0,
            curve: DistortionCurve::Foldback,
            level: 1.0,
            mix: 0.0,
        }));
        let input = [0.1, 0.2, -0.9];
        let mut block = AudioBlock::from_mono(&input);
        fx.process(&mut block);
        assert_eq!(block.channel(0), &input);
    }
}
