//! Low-level DSP primitives used by the effect nodes.
//!
//! These components allocate only when constructed and are realtime-safe
//! afterwards, making them safe to embed directly inside effect structs. They
//! intentionally stay focused on the signal-processing math so the effect
//! layer can handle parameters, channels and mixing.

/// Circular delay line with integer and interpolated reads.
pub mod delay;
/// Memoryless waveshaping curves.
pub mod distortion;
/// Attack/release peak follower and dB helpers.
pub mod envelope;
/// RBJ biquads and first-order all-pass stages.
pub mod filter;
/// Windowed overlap-add pitch shifting.
pub mod grain;
/// Linear and cubic Hermite interpolation.
pub mod interpolate;
/// Low frequency oscillator for modulation effects.
pub mod lfo;
/// Dry/wet mixing and crossfades.
pub mod mix;
/// Test-tone oscillator.
pub mod oscillator;
/// Schroeder comb/all-pass reverb core.
pub mod reverb;
/// One-pole smoothing and linear fade ramps.
pub mod smooth;

pub use delay::DelayLine;
pub use lfo::{Lfo, LfoWaveform};
pub use smooth::{LinearRamp, OnePole};
