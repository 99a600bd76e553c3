//! Second-order (biquad) and first-order all-pass filters.

use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| shape      | passes               | gain_db used | typical use               |
| ---------- | -------------------- | ------------ | ------------------------- |
| peaking    | all, bell at center  | yes          | vocal dips / presence     |
| low shelf  | all, tilt below f    | yes          | warmth / mud control      |
| high shelf | all, tilt above f    | yes          | air                       |
| low pass   | below cutoff         | no           | de-harsh                  |
| high pass  | above cutoff         | no           | rumble removal            |

Coefficients follow the RBJ Audio EQ Cookbook; the structure is transposed
Direct Form II (two state variables per channel).
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EqShape {
    #[default]
    Peaking,
    LowShelf,
    HighShelf,
    LowPass,
    HighPass,
}

impl EqShape {
    pub const NAMES: &'static [&'static str] =
        &["peaking", "low_shelf", "high_shelf", "low_pass", "high_pass"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "low_shelf" => Self::LowShelf,
            "high_shelf" => Self::HighShelf,
            "low_pass" => Self::LowPass,
            "high_pass" => Self::HighPass,
            _ => Self::Peaking,
        }
    }
}

/// Normalized biquad coefficients (a0 = 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    pub fn design(shape: EqShape, frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let frequency = frequency.clamp(10.0, sample_rate * 0.49);
        let q = q.max(0.05);
        let w0 = 2.0 * PI * frequency / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        let a = 10.0_f32.powf(gain_db / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match shape {
            EqShape::Peaking => (
                1.0 + alpha * a,
                -2.0 * cos_w0,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w0,
                1.0 - alpha / a,
            ),
            EqShape::LowShelf => {
                let sq = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + sq),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - sq),
                    (a + 1.0) + (a - 1.0) * cos_w0 + sq,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - sq,
                )
            }
            EqShape::HighShelf => {
                let sq = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + sq),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - sq),
                    (a + 1.0) - (a - 1.0) * cos_w0 + sq,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - sq,
                )
            }
            EqShape::LowPass => {
                let b1 = 1.0 - cos_w0;
                (b1 * 0.5, b1, b1 * 0.5, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            EqShape::HighPass => {
                let b1 = -(1.0 + cos_w0);
                (-b1 * 0.5, b1, -b1 * 0.5, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Magnitude response in dB at `frequency`.
    pub fn magnitude_db(&self, frequency: f32, sample_rate: f32) -> f32 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (s1, c1) = w.sin_cos();
        let (s2, c2) = (2.0 * w).sin_cos();
        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);
        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt();
        20.0 * (num / den).log10()
    }
}

/// One channel of biquad state.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    z1: f32,
    z2: f32,
}

impl BiquadState {
    #[inline]
    pub fn process(&mut self, c: &BiquadCoefficients, x: f32) -> f32 {
        let y = c.b0 * x + self.z1;
        self.z1 = c.b1 * x - c.a1 * y + self.z2;
        self.z2 = c.b2 * x - c.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A biquad band with per-channel state.
pub struct Biquad {
    coefficients: BiquadCoefficients,
    states: Vec<BiquadState>,
    sample_rate: f32,
}

impl Biquad {
    pub fn new(channels: usize, sample_rate: f32) -> Self {
        Self {
            coefficients: BiquadCoefficients::IDENTITY,
            states: vec![BiquadState::default(); channels],
            sample_rate,
        }
    }

    pub fn with_design(
        channels: usize,
        sample_rate: f32,
        shape: EqShape,
        frequency: f32,
        q: f32,
        gain_db: f32,
    ) -> Self {
        let mut filter = Self::new(channels, sample_rate);
        filter.set(shape, frequency, q, gain_db);
        filter
    }

    /// Recompute coefficients. State is kept so live sweeps don't click.
    pub fn set(&mut self, shape: EqShape, frequency: f32, q: f32, gain_db: f32) {
        self.coefficients = BiquadCoefficients::design(shape, frequency, q, gain_db, self.sample_rate);
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    pub fn process_channel(&mut self, channel: usize, buffer: &mut [f32]) {
        let c = self.coefficients;
        if let Some(state) = self.states.get_mut(channel) {
            for sample in buffer.iter_mut() {
                *sample = state.process(&c, *sample);
            }
        }
    }

    pub fn reset(&mut self) {
        self.states.iter_mut().for_each(BiquadState::reset);
    }
}

/*
First-order all-pass
====================

    y[n] = a·x[n] + x[n-1] - a·y[n-1]

Unity gain at every frequency; the phase shift passes -90° at the break
frequency fc, where

    a = (tan(π·fc/fs) - 1) / (tan(π·fc/fs) + 1)

Stacking N stages and mixing with the dry signal produces N/2 notches. A phaser
sweeps fc with an LFO.
*/

#[derive(Debug, Clone, Copy, Default)]
pub struct AllpassStage {
    x1: f32,
    y1: f32,
}

impl AllpassStage {
    #[inline]
    pub fn coefficient(frequency: f32, sample_rate: f32) -> f32 {
        let t = (PI * frequency.clamp(10.0, sample_rate * 0.45) / sample_rate).tan();
        (t - 1.0) / (t + 1.0)
    }

    #[inline]
    pub fn process(&mut self, a: f32, x: f32) -> f32 {
        let y = a * x + self.x1 - a * self.y1;
        self.x1 = x;
        self.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
