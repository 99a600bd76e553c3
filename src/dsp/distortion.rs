//! Static waveshaping curves for the distortion effect.

/*
Waveshaping
===========

Every curve maps the driven sample through a fixed transfer function:

    y = f(drive · x)

    soft      x / (1 + |x|)       slow knee, mostly low harmonics
    tanh      tanh(x)             rounder knee than soft
    hard      clamp(x, -t, t)     flat top, strong odd harmonics
    foldback  reflect at ±t       bright and metallic

Curves keep no history, so they cost the same per sample at any drive and
need no reset. All four are odd, which keeps the output free of DC for
symmetric input.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistortionCurve {
    #[default]
    SoftClip,
    Tanh,
    HardClip,
    Foldback,
}

impl DistortionCurve {
    pub const NAMES: &'static [&'static str] = &["soft", "tanh", "hard", "foldback"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "tanh" => Self::Tanh,
            "hard" => Self::HardClip,
            "foldback" => Self::Foldback,
            _ => Self::SoftClip,
        }
    }
}

/// Apply `curve` to one sample.
#[inline]
pub fn shape(sample: f32, drive: f32, curve: DistortionCurve) -> f32 {
    match curve {
        DistortionCurve::SoftClip => soft_clip(sample, drive),
        DistortionCurve::Tanh => (sample * drive).tanh(),
        DistortionCurve::HardClip => hard_clip(sample, drive, 1.0),
        DistortionCurve::Foldback => foldback(sample, drive, 1.0),
    }
}

#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

#[inline]
pub fn hard_clip(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    x.clamp(-threshold, threshold)
}

/// Triangle fold with period `4 · threshold`, evaluated in closed form.
/// Non-finite input folds to silence.
#[inline]
pub fn foldback(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    if !x.is_finite() {
        return 0.0;
    }
    if x.abs() <= threshold {
        return x;
    }
    let period = 4.0 * threshold;
    threshold - ((x + threshold).rem_euclid(period) - 2.0 * threshold).abs()
}
