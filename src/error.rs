use thiserror::Error;

use crate::effects::EffectKind;

pub type Result<T> = std::result::Result<T, FxError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    #[error("unknown effect type `{0}`")]
    UnknownEffectType(String),

    #[error("effect type `{0}` is already registered")]
    DuplicateEffectType(EffectKind),

    #[error("invalid parameter `{name}` for {effect}: {reason}")]
    InvalidParameter {
        effect: EffectKind,
        name: String,
        reason: String,
    },

    /// Feedback at or above unity. Never passed through: the value is clamped
    /// to `limit` and this error is recorded in the parameter report.
    #[error("unstable `{name}` = {value} for {effect}, clamped to {limit}")]
    UnstableConfiguration {
        effect: EffectKind,
        name: &'static str,
        value: f32,
        limit: f32,
    },

    #[error(
        "buffer shape mismatch: expected {expected_channels}ch x {expected_frames} frames, \
         got {channels}ch x {frames} frames"
    )]
    BufferShapeMismatch {
        expected_channels: usize,
        expected_frames: usize,
        channels: usize,
        frames: usize,
    },

    #[error("no effect with handle #{0}")]
    UnknownHandle(u64),

    #[error("signal chain is full ({0} effects)")]
    ChainFull(usize),

    #[error("control queue is full, try again after the audio thread catches up")]
    QueueFull,

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
