//! Vocal enhancer: a fixed compressor → EQ sub-chain tuned for voice.
//!
//! ```text
//! x ──→ [ comp -18 dB 3:1, 1/80 ms ] ──→ [ -3 dB @ 200 Hz ] ──→ [ +4 dB @ 3 kHz ] ──→ [ +2 dB shelf @ 8 kHz ] ──→ y
//!          tames peaks                     less mud              presence               air
//! ```
//!
//! `intensity` scales the three EQ gains; the compressor settings are fixed.

use super::{
    compressor::{CompressorCore, CompressorParams},
    EffectKind, EffectNode, EffectParams,
};
use crate::{
    block::AudioBlock,
    config::EngineConfig,
    dsp::filter::{Biquad, EqShape},
    params::{ParamSpec, ParamUnit, ParameterSet},
};

pub const SCHEMA: &[ParamSpec] = &[ParamSpec::number(
    "intensity",
    0.0,
    1.0,
    1.0,
    ParamUnit::Ratio,
)];

const COMPRESSION: CompressorParams = CompressorParams {
    threshold_db: -18.0,
    ratio: 3.0,
    knee_db: 6.0,
    attack_ms: 1.0,
    release_ms: 80.0,
    makeup_db: 0.0,
};

/// (shape, frequency, q, gain at full intensity)
const BANDS: [(EqShape, f32, f32, f32); 3] = [
    (EqShape::Peaking, 200.0, 1.0, -3.0),
    (EqShape::Peaking, 3_000.0, 1.0, 4.0),
    (EqShape::HighShelf, 8_000.0, 0.707, 2.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VocalEnhancerParams {
    pub intensity: f32,
}

impl VocalEnhancerParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        Self {
            intensity: set.number("intensity"),
        }
    }
}

pub struct VocalEnhancer {
    compressor: CompressorCore,
    bands: [Biquad; 3],
}

impl VocalEnhancer {
    pub fn new(params: VocalEnhancerParams, config: &EngineConfig) -> Self {
        let band = || Biquad::new(config.channels, config.sample_rate);
        let mut enhancer = Self {
            compressor: CompressorCore::new(COMPRESSION, config.sample_rate),
            bands: [band(), band(), band()],
        };
        enhancer.set_intensity(params.intensity);
        enhancer
    }

    pub fn build(set: &ParameterSet, config: &EngineConfig) -> Box<dyn EffectNode> {
        Box::new(Self::new(VocalEnhancerParams::from_set(set), config))
    }

    fn set_intensity(&mut self, intensity: f32) {
        let intensity = intensity.clamp(0.0, 1.0);
        for (filter, &(shape, freq, q, gain_db)) in self.bands.iter_mut().zip(BANDS.iter()) {
            filter.set(shape, freq, q, gain_db * intensity);
        }
    }
}

impl EffectNode for VocalEnhancer {
    fn kind(&self) -> EffectKind {
        EffectKind::VocalEnhancer
    }

    fn process(&mut self, block: &mut AudioBlock) {
        self.compressor.process(block);
        for filter in &mut self.bands {
            for (index, channel) in block.channels_iter_mut().enumerate() {
                filter.process_channel(index, channel);
            }
        }
    }

    fn update_parameters(&mut self, params: &EffectParams) {
        if let EffectParams::VocalEnhancer(params) = params {
            self.set_intensity(params.intensity);
        }
    }

    fn reset(&mut self) {
        self.compressor.reset();
        self.bands.iter_mut().for_each(Biquad::reset);
    }
}
