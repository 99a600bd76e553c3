//! Low Frequency Oscillator driving the modulation effects.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio rates (~0.05 Hz to ~20 Hz). It
does not make sound itself; it moves a parameter of another process:

    Tremolo   LFO → output gain
    Chorus    LFO → read offset of several delay taps
    Flanger   LFO → read offset of one short delay with feedback
    Phaser    LFO → center frequency of an all-pass cascade


Phase
-----

Phase is kept in cycles, wrapped to [0, 1). Each sample advances it by

    increment = rate_hz / sample_rate        (cycles per sample)

which is the same as 2π·rate/sample_rate in radians. Phase persists across
blocks so the sweep is continuous; only `reset()` moves it back to 0.


Output
------

The raw waveform is bipolar (-1..+1). The modulation value handed to an effect
is scaled by depth:

    m = depth · waveform(phase)        depth ∈ [0, 1]

Effects that need a one-sided swing (gain, delay offsets) convert with
`bipolar_to_unipolar`.

    SINE      smooth sweep, the default for tremolo / chorus / flanger
    TRIANGLE  constant-speed sweep, popular on phasers
    SQUARE    hard switching between extremes
    SAW       rising ramp then snap back
*/

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoWaveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Saw,
}

impl LfoWaveform {
    pub const NAMES: &'static [&'static str] = &["sine", "triangle", "square", "saw"];

    pub fn from_name(name: &str) -> Self {
        match name {
            "triangle" => Self::Triangle,
            "square" => Self::Square,
            "saw" => Self::Saw,
            _ => Self::Sine,
        }
    }

    /// Bipolar waveform value for a phase in cycles.
    #[inline]
    pub fn value(self, phase: f32) -> f32 {
        match self {
            Self::Sine => (phase * TAU).sin(),
            Self::Triangle => {
                // 0 → +1 → 0 → -1 → 0, same zero crossings as sine
                let p = phase * 4.0;
                if p < 1.0 {
                    p
                } else if p < 3.0 {
                    2.0 - p
                } else {
                    p - 4.0
                }
            }
            Self::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Self::Saw => phase * 2.0 - 1.0,
        }
    }
}

/// Plain data, so a stereo effect can copy it per channel and keep the sweeps
/// in lockstep.
#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    phase: f32,
    increment: f32,
    rate_hz: f32,
    depth: f32,
    waveform: LfoWaveform,
    sample_rate: f32,
}

impl Lfo {
    pub fn new(sample_rate: f32, rate_hz: f32, depth: f32, waveform: LfoWaveform) -> Self {
        let mut lfo = Self {
            phase: 0.0,
            increment: 0.0,
            rate_hz: 0.0,
            depth: 0.0,
            waveform,
            sample_rate,
        };
        lfo.set_rate(rate_hz);
        lfo.set_depth(depth);
        lfo
    }

    pub fn sine(sample_rate: f32, rate_hz: f32, depth: f32) -> Self {
        Self::new(sample_rate, rate_hz, depth, LfoWaveform::Sine)
    }

    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate_hz = rate_hz.max(0.0);
        self.increment = self.rate_hz / self.sample_rate;
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    pub fn rate(&self) -> f32 {
        self.rate_hz
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Modulation value at the current phase, `depth · waveform(phase + offset)`.
    ///
    /// `offset` is in cycles; chorus taps use it to spread their sweeps.
    #[inline]
    pub fn value_at(&self, offset: f32) -> f32 {
        let phase = (self.phase + offset).fract();
        self.depth * self.waveform.value(phase)
    }

    /// Current modulation value, then advance one sample.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let m = self.value_at(0.0);
        self.advance();
        m
    }

    #[inline]
    pub fn advance(&mut self) {
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Calculate samples per LFO period.
///
/// # Example
/// ```
/// use vocal_fx::dsp::lfo::samples_per_period;
/// let samples = samples_per_period(5.0, 48000.0);
/// assert_eq!(samples, 9600.0); // 5 Hz at 48kHz = 9600 samples
/// ```
#[inline]
pub fn samples_per_period(frequency_hz: f32, sample_rate: f32) -> f32 {
    sample_rate / frequency_hz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bipolar_to_unipolar() {
        assert!((bipolar_to_unipolar(-1.0) - 0.0).abs() < 1e-6);
        assert!((bipolar_to_unipolar(0.0) - 0.5).abs() < 1e-6);
        assert!((bipolar_to_unipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn waveforms_stay_bipolar() {
        for waveform in [
            LfoWaveform::Sine,
            LfoWaveform::Triangle,
            LfoWaveform::Square,
            LfoWaveform::Saw,
        ] {
            for i in 0..1000 {
                let v = waveform.value(i as f32 / 1000.0);
                assert!(
                    (-1.0..=1.0).contains(&v),
                    "{waveform:?} produced {v} at step {i}"
                );
            }
        }
    }

    #[test]
    fn triangle_matches_sine_quadrants() {
        assert!((LfoWaveform::Triangle.value(0.25) - 1.0).abs() < 1e-6);
        assert!((LfoWaveform::Triangle.value(0.5)).abs() < 1e-6);
        assert!((LfoWaveform::Triangle.value(0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn depth_scales_output() {
        let mut lfo = Lfo::sine(48_000.0, 5.0, 0.5);
        let peak = (0..9600).map(|_| lfo.next_value().abs()).fold(0.0f32, f32::max);
        assert!((peak - 0.5).abs() < 1e-3);
    }

    #[test]
    fn phase_completes_one_cycle_per_period() {
        let mut lfo = Lfo::sine(48_000.0, 5.0, 1.0);
        let period = samples_per_period(5.0, 48_000.0) as usize;
        for _ in 0..period {
            lfo.advance();
        }
        let p = lfo.phase();
        assert!(p < 1e-3 || p > 1.0 - 1e-3, "phase after one period: {p}");
    }

    #[test]
    fn phase_persists_until_reset() {
        let mut lfo = Lfo::sine(1_000.0, 1.0, 1.0);
        for _ in 0..250 {
            lfo.advance();
        }
        assert!((lfo.value_at(0.0) - 1.0).abs() < 1e-3);
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
    }
}
