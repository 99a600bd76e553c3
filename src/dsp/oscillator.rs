//! Test-tone oscillator used by the demo binary, benches and tests.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Saw,
    Square,
}

impl OscillatorWaveform {
    pub const NAMES: &'static [&'static str] = &["sine", "saw", "square"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(Self::Sine),
            "saw" => Some(Self::Saw),
            "square" => Some(Self::Square),
            _ => None,
        }
    }
}

/// Naive (non band-limited) oscillator. Fine for test material.
pub struct ToneOscillator {
    phase: f32,
    increment: f32,
    amplitude: f32,
    waveform: OscillatorWaveform,
}

impl ToneOscillator {
    pub fn new(frequency: f32, amplitude: f32, sample_rate: f32, waveform: OscillatorWaveform) -> Self {
        Self {
            phase: 0.0,
            increment: frequency / sample_rate,
            amplitude,
            waveform,
        }
    }

    pub fn sine(frequency: f32, amplitude: f32, sample_rate: f32) -> Self {
        Self::new(frequency, amplitude, sample_rate, OscillatorWaveform::Sine)
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let value = match self.waveform {
            OscillatorWaveform::Sine => (self.phase * TAU).sin(),
            OscillatorWaveform::Saw => self.phase * 2.0 - 1.0,
            OscillatorWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        value * self.amplitude
    }

    pub fn render(&mut self, destination: &mut [f32]) {
        for sample in destination.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

/// `frames` samples of a sine starting at phase 0.
pub fn sine_tone(frequency: f32, amplitude: f32, sample_rate: f32, frames: usize) -> Vec<f32> {
    let mut out = vec![0.0; frames];
    ToneOscillator::sine(frequency, amplitude, sample_rate).render(&mut out);
    out
}
