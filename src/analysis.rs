//! Offline measurements on rendered audio: spectra, dominant pitch, levels.
//!
//! These allocate and plan FFTs, so they belong in tests, benches and tools,
//! never in an audio callback.

use std::f32::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

/// Hann window of `len` points.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f32;
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos()))
        .collect()
}

/// Magnitudes of the positive-frequency bins of the Hann-windowed,
/// mean-removed signal, zero-padded to `fft_len`.
///
/// Bin `k` sits at `k * sample_rate / fft_len` Hz.
pub fn magnitude_spectrum(samples: &[f32], fft_len: usize) -> Vec<f32> {
    let fft_len = fft_len.max(samples.len()).max(2);
    let mean = if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f32>() / samples.len() as f32
    };

    let window = hann_window(samples.len());
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .zip(&window)
        .map(|(&x, &w)| Complex::new((x - mean) * w, 0.0))
        .collect();
    buffer.resize(fft_len, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_len);
    fft.process(&mut buffer);

    buffer[..fft_len / 2].iter().map(|c| c.norm()).collect()
}

/// Frequency of the strongest spectral peak, in Hz.
///
/// The peak bin is refined with parabolic interpolation over log magnitudes,
/// which is accurate to a small fraction of a bin for Hann-windowed tones.
/// DC is ignored. Returns 0 for silence.
pub fn dominant_frequency(samples: &[f32], sample_rate: f32) -> f32 {
    // zero-pad for finer bins before interpolating
    let fft_len = (samples.len() * 4).next_power_of_two();
    let spectrum = magnitude_spectrum(samples, fft_len);
    if spectrum.len() < 3 {
        return 0.0;
    }

    let Some((peak, &magnitude)) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.total_cmp(b.1))
    else {
        return 0.0;
    };
    if magnitude <= f32::EPSILON {
        return 0.0;
    }

    let offset = if peak + 1 < spectrum.len() {
        let ln = |m: f32| m.max(1e-12).ln();
        let (a, b, c) = (ln(spectrum[peak - 1]), ln(spectrum[peak]), ln(spectrum[peak + 1]));
        let denom = a - 2.0 * b + c;
        if denom.abs() > f32::EPSILON {
            (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        }
    } else {
        0.0
    };

    (peak as f32 + offset) * sample_rate / fft_len as f32
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Peak level of each consecutive `window`-sample chunk.
pub fn envelope(samples: &[f32], window: usize) -> Vec<f32> {
    samples.chunks(window.max(1)).map(peak).collect()
}

/// Largest jump between neighbouring samples. A crude click detector.
pub fn max_step(samples: &[f32]) -> f32 {
    samples
        .windows(2)
        .fold(0.0f32, |acc, w| acc.max((w[1] - w[0]).abs()))
}
