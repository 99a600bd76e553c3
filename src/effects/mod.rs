//! Effect nodes: the processing units a signal chain is built from.
//!
//! Every effect type is a variant of the closed [`EffectKind`] enum and
//! publishes a static parameter schema. Instances are boxed [`EffectNode`]
//! trait objects owned by the chain on the audio thread; parameter changes
//! reach them as an [`EffectParams`] value, decoded on the control thread
//! from an already validated [`ParameterSet`].
//!
//! ```text
//!   ParameterSet ──validate──→ ParameterSet ──decode──→ EffectParams ──→ node.update_parameters
//!     (raw)                     (complete)                (Copy, typed)       (audio thread)
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    block::AudioBlock,
    error::{FxError, Result},
    params::{ParamSpec, ParameterSet},
};

pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod eq;
pub mod flanger;
pub mod phaser;
pub mod pitch_shift;
pub mod reverb;
pub mod tremolo;
pub mod vocal_enhancer;
pub mod widener;

pub use chorus::{Chorus, ChorusParams};
pub use compressor::{Compressor, CompressorParams};
pub use delay::{Delay, DelayParams};
pub use distortion::{Distortion, DistortionParams};
pub use eq::{ParametricEq, ParametricEqParams};
pub use flanger::{Flanger, FlangerParams};
pub use phaser::{Phaser, PhaserParams};
pub use pitch_shift::{PitchShift, PitchShiftParams};
pub use reverb::{Reverb, ReverbParams};
pub use tremolo::{Tremolo, TremoloParams};
pub use vocal_enhancer::{VocalEnhancer, VocalEnhancerParams};
pub use widener::{StereoWidener, StereoWidenerParams};

/// A processing unit in the chain.
///
/// `process` runs on the audio thread: it must not allocate, block or panic,
/// and it must leave the block's shape untouched. Everything an effect needs
/// is allocated by its constructor.
pub trait EffectNode: Send {
    fn kind(&self) -> EffectKind;

    /// Transform `block` in place.
    fn process(&mut self, block: &mut AudioBlock);

    /// Apply new parameter values. Parameters for a different kind are ignored.
    fn update_parameters(&mut self, params: &EffectParams);

    /// Clear delay lines, envelopes and oscillator phase.
    fn reset(&mut self);

    /// Output lag behind the input, in frames.
    fn latency_frames(&self) -> usize {
        0
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Reverb,
    Delay,
    Compressor,
    ParametricEq,
    Chorus,
    Distortion,
    Phaser,
    Tremolo,
    Flanger,
    PitchShift,
    VocalEnhancer,
    StereoWidener,
}

impl EffectKind {
    pub const ALL: [EffectKind; 12] = [
        EffectKind::Reverb,
        EffectKind::Delay,
        EffectKind::Compressor,
        EffectKind::ParametricEq,
        EffectKind::Chorus,
        EffectKind::Distortion,
        EffectKind::Phaser,
        EffectKind::Tremolo,
        EffectKind::Flanger,
        EffectKind::PitchShift,
        EffectKind::VocalEnhancer,
        EffectKind::StereoWidener,
    ];

    /// Canonical identifier, as accepted by [`EffectKind::from_id`].
    pub fn id(self) -> &'static str {
        match self {
            EffectKind::Reverb => "reverb",
            EffectKind::Delay => "delay",
            EffectKind::Compressor => "compressor",
            EffectKind::ParametricEq => "parametric_eq",
            EffectKind::Chorus => "chorus",
            EffectKind::Distortion => "distortion",
            EffectKind::Phaser => "phaser",
            EffectKind::Tremolo => "tremolo",
            EffectKind::Flanger => "flanger",
            EffectKind::PitchShift => "pitch_shift",
            EffectKind::VocalEnhancer => "vocal_enhancer",
            EffectKind::StereoWidener => "stereo_widener",
        }
    }

    /// Parse an identifier. Case, `-` and spaces are ignored, and a few common
    /// aliases are accepted (`eq`, `pitch`, `granular_pitch_shifter`, `widener`...).
    pub fn from_id(id: &str) -> Result<Self> {
        let normalized: String = id
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        let kind = match normalized.as_str() {
            "reverb" => EffectKind::Reverb,
            "delay" | "echo" => EffectKind::Delay,
            "compressor" | "comp" => EffectKind::Compressor,
            "parametric_eq" | "parametriceq" | "eq" => EffectKind::ParametricEq,
            "chorus" => EffectKind::Chorus,
            "distortion" | "drive" => EffectKind::Distortion,
            "phaser" => EffectKind::Phaser,
            "tremolo" => EffectKind::Tremolo,
            "flanger" => EffectKind::Flanger,
            "pitch_shift" | "pitchshift" | "pitch" | "pitch_shifter"
            | "granular_pitch_shifter" => EffectKind::PitchShift,
            "vocal_enhancer" | "vocalenhancer" | "enhancer" => EffectKind::VocalEnhancer,
            "stereo_widener" | "stereowidener" | "widener" => EffectKind::StereoWidener,
            _ => return Err(FxError::UnknownEffectType(id.to_string())),
        };
        Ok(kind)
    }

    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            EffectKind::Reverb => reverb::SCHEMA,
            EffectKind::Delay => delay::SCHEMA,
            EffectKind::Compressor => compressor::SCHEMA,
            EffectKind::ParametricEq => eq::SCHEMA,
            EffectKind::Chorus => chorus::SCHEMA,
            EffectKind::Distortion => distortion::SCHEMA,
            EffectKind::Phaser => phaser::SCHEMA,
            EffectKind::Tremolo => tremolo::SCHEMA,
            EffectKind::Flanger => flanger::SCHEMA,
            EffectKind::PitchShift => pitch_shift::SCHEMA,
            EffectKind::VocalEnhancer => vocal_enhancer::SCHEMA,
            EffectKind::StereoWidener => widener::SCHEMA,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Typed parameters for one effect, decoded from a validated set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectParams {
    Reverb(ReverbParams),
    Delay(DelayParams),
    Compressor(CompressorParams),
    ParametricEq(ParametricEqParams),
    Chorus(ChorusParams),
    Distortion(DistortionParams),
    Phaser(PhaserParams),
    Tremolo(TremoloParams),
    Flanger(FlangerParams),
    PitchShift(PitchShiftParams),
    VocalEnhancer(VocalEnhancerParams),
    StereoWidener(StereoWidenerParams),
}

impl EffectParams {
    /// Decode a complete, validated set. Missing entries read as 0.
    pub fn decode(kind: EffectKind, set: &ParameterSet) -> Self {
        match kind {
            EffectKind::Reverb => EffectParams::Reverb(ReverbParams::from_set(set)),
            EffectKind::Delay => EffectParams::Delay(DelayParams::from_set(set)),
            EffectKind::Compressor => EffectParams::Compressor(CompressorParams::from_set(set)),
            EffectKind::ParametricEq => {
                EffectParams::ParametricEq(ParametricEqParams::from_set(set))
            }
            EffectKind::Chorus => EffectParams::Chorus(ChorusParams::from_set(set)),
            EffectKind::Distortion => EffectParams::Distortion(DistortionParams::from_set(set)),
            EffectKind::Phaser => EffectParams::Phaser(PhaserParams::from_set(set)),
            EffectKind::Tremolo => EffectParams::Tremolo(TremoloParams::from_set(set)),
            EffectKind::Flanger => EffectParams::Flanger(FlangerParams::from_set(set)),
            EffectKind::PitchShift => EffectParams::PitchShift(PitchShiftParams::from_set(set)),
            EffectKind::VocalEnhancer => {
                EffectParams::VocalEnhancer(VocalEnhancerParams::from_set(set))
            }
            EffectKind::StereoWidener => {
                EffectParams::StereoWidener(StereoWidenerParams::from_set(set))
            }
        }
    }

    /// The schema defaults, decoded.
    pub fn defaults(kind: EffectKind) -> Self {
        Self::decode(kind, &ParameterSet::defaults(kind.schema()))
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectParams::Reverb(_) => EffectKind::Reverb,
            EffectParams::Delay(_) => EffectKind::Delay,
            EffectParams::Compressor(_) => EffectKind::Compressor,
            EffectParams::ParametricEq(_) => EffectKind::ParametricEq,
            EffectParams::Chorus(_) => EffectKind::Chorus,
            EffectParams::Distortion(_) => EffectKind::Distortion,
            EffectParams::Phaser(_) => EffectKind::Phaser,
            EffectParams::Tremolo(_) => EffectKind::Tremolo,
            EffectParams::Flanger(_) => EffectKind::Flanger,
            EffectParams::PitchShift(_) => EffectKind::PitchShift,
            EffectParams::VocalEnhancer(_) => EffectKind::VocalEnhancer,
            EffectParams::StereoWidener(_) => EffectKind::StereoWidener,
        }
    }

    /// Latency a node built with these parameters reports.
    pub fn latency_frames(&self) -> usize {
        match self {
            EffectParams::PitchShift(p) => p.grain_size,
            _ => 0,
        }
    }
}
