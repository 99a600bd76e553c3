pub mod analysis; // Spectral and level measurements
pub mod block;
pub mod chain; // Ordered effect slots and control messages
pub mod config;
pub mod dsp;
pub mod effects;
pub mod error;
pub mod params;
pub mod processor; // Control/audio façade
pub mod registry;

pub use block::AudioBlock;
pub use config::{EngineConfig, ValidationMode};
pub use effects::{EffectKind, EffectNode, EffectParams};
pub use error::{FxError, Result};
pub use params::{ParamReport, ParamValue, ParameterSet};
pub use processor::{
    AudioEffectsProcessor, EffectHandle, EffectsController, EffectsRenderer, EngineEvent,
};
pub use registry::EffectRegistry;

pub const MAX_BLOCK_SIZE: usize = 4096;
pub const MAX_CHANNELS: usize = 2;
/// Upper bound on simultaneously loaded effects (slot storage is reserved up front).
pub const MAX_EFFECTS: usize = 32;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
