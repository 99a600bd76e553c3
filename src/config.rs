//! Engine-wide settings negotiated once, before any effect is built.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{FxError, Result},
    MAX_BLOCK_SIZE, MAX_CHANNELS,
};

/// What happens when a parameter write falls outside its declared range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Clamp to the nearest bound, log a warning and continue.
    #[default]
    Clamp,
    /// Reject the write with `FxError::InvalidParameter`.
    Strict,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub channels: usize,
    /// Frames per block. Every block handed to `process` must have exactly this many.
    pub block_size: usize,
    /// Length of the click-free fade applied when effects are inserted, removed or toggled.
    pub crossfade_ms: f32,
    pub validation: ValidationMode,
    pub command_capacity: usize,
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            channels: 2,
            block_size: 512,
            crossfade_ms: 10.0,
            validation: ValidationMode::Clamp,
            command_capacity: 256,
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn new(sample_rate: f32, channels: usize, block_size: usize) -> Self {
        Self {
            sample_rate,
            channels,
            block_size,
            ..Self::default()
        }
    }

    pub fn with_crossfade_ms(mut self, ms: f32) -> Self {
        self.crossfade_ms = ms;
        self
    }

    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    pub fn strict(self) -> Self {
        self.with_validation(ValidationMode::Strict)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && (8_000.0..=192_000.0).contains(&self.sample_rate)) {
            return Err(FxError::InvalidConfig(format!(
                "sample rate {} outside 8000..=192000 Hz",
                self.sample_rate
            )));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(FxError::InvalidConfig(format!(
                "{} channels requested, supported 1..={MAX_CHANNELS}",
                self.channels
            )));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(FxError::InvalidConfig(format!(
                "block size {} outside 1..={MAX_BLOCK_SIZE}",
                self.block_size
            )));
        }
        if !(self.crossfade_ms.is_finite() && self.crossfade_ms >= 0.0) {
            return Err(FxError::InvalidConfig(format!(
                "crossfade {} ms must be a non-negative number",
                self.crossfade_ms
            )));
        }
        if self.command_capacity == 0 || self.event_capacity == 0 {
            return Err(FxError::InvalidConfig("queue capacities must be non-zero".into()));
        }
        Ok(())
    }

    /// Crossfade length in frames.
    pub fn crossfade_frames(&self) -> usize {
        (self.crossfade_ms * 0.001 * self.sample_rate).round() as usize
    }

    #[inline]
    pub fn ms_to_samples(&self, ms: f32) -> f32 {
        ms * 0.001 * self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_oversized_block() {
        let config = EngineConfig::new(48_000.0, 2, MAX_BLOCK_SIZE + 1);
        assert!(matches!(config.validate(), Err(FxError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_too_many_channels() {
        let config = EngineConfig::new(48_000.0, MAX_CHANNELS + 1, 256);
        assert!(config.validate().is_err());
    }

    #[test]
    fn crossfade_frames_follow_sample_rate() {
        let config = EngineConfig::new(44_100.0, 1, 256).with_crossfade_ms(10.0);
        assert_eq!(config.crossfade_frames(), 441);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "sample_rate": 44100.0, "validation": "Strict" }"#).unwrap();
        assert_eq!(config.sample_rate, 44_100.0);
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.block_size, EngineConfig::default().block_size);
    }
}
