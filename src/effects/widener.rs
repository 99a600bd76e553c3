//! Stereo widener based on a short differential delay.

/*
Mid / Side
==========

    mid  = (L + R) / 2          what a mono speaker plays
    side = (L - R) / 2          what makes the image wide

    L = mid + side
    R = mid - side

Delaying the right channel a few milliseconds makes L and R less alike, which
the ear hears as width (the Haas effect). Summing the delayed channel into
mono would comb-filter it, so only the side signal is rebuilt from the delayed
difference; mid passes untouched:

    side' = (1 - width) · side + width · (L[n] - R[n - d]) / 2        d = width · 5 ms

Mono blocks have no side, so they pass through.
*/

use super::{EffectKind, EffectNode, EffectParams};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::{DelayLine, OnePole},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const MAX_DELAY_MS: f32 = 5.0;
const WIDTH_GLIDE_S: f32 = 0.02;

pub const SCHEMA: &[ParamSpec] = &[ParamSpec::number("width", 0.0, 1.0, 0.5, ParamUnit::Ratio)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoWidenerParams {
    pub width: f32,
}

impl StereoWidenerParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            width: set.number("width"),
        }
    }
}

pub struct StereoWidener {
    right: DelayLine,
    width: OnePole,
    max_delay: f32,
}

impl StereoWidener {
    pub fn new(params: StereoWidenerParams, config: &EngineConfig) -> Self {
        let mut width = OnePole::new(0.0, WIDTH_GLIDE_S, config.sample_rate);
        width.jump(params.width.clamp(0.0, 1.0));
        Self {
            right: DelayLine::with_max_ms(MAX_DELAY_MS, config.sample_rate),
            width,
            max_delay: config.ms_to_samples(MAX_DELAY_MS),
        }
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(StereoWidenerParams::from_set(set), config))
    }
}

impl EffectNode for StereoWidener {
    fn kind(&self) -> EffectKind {
        EffectKind::StereoWidener
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let Some((left, right)) = block.stereo_mut() else {
            return;
        };

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let width = self.width.next();
            self.right.write(*r);
            // read(1) is the sample just written
            let delayed = self.right.read_interpolated(1.0 + width * self.max_delay);

            let mid = (*l + *r) * 0.5;
            let side = (*l - *r) * 0.5;
            let side = (1.0 - width) * side + width * (*l - delayed) * 0.5;

            *l = mid + side;
            *r = mid - side;
        }
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::StereoWidener(params) = params {
            self.width.set_target(params.width.clamp(0.0, 1.0));
        }
    }

    fn reset(&mut self) {
        self.right.reset();
        self.width.jump(self.width.target());
    }
}
