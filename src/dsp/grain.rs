//! Granular pitch shifting by windowed overlap-add.

/*
Granular Pitch Shifting
=======================

Playing a recording faster raises its pitch but also shortens it. A granular
shifter keeps the duration by chopping the input into short overlapping grains
and resampling each grain on its own:

    input    ──────────────────────────────────────────────▶ time
                 [  grain k  ]
                       [ grain k+1 ]
                             [ grain k+2 ]
                 ├─ hop ─┤

Every `hop` samples, once a full grain of history is available, one grain is
built:

  1. read `grain_size · ratio` source samples ending at the newest input,
     stepping by `ratio` (ratio = 2^(semitones/12)), so the grain holds
     `grain_size` output samples at the new pitch
  2. multiply by a periodic Hann window

         w[i] = 0.5 · (1 - cos(2π·i / grain_size))

  3. scale by 2·hop/grain_size and add into the output accumulator

With hop = grain_size/2 two Hann windows always sum to exactly 1.0, so at
ratio 1.0 the output is the input delayed by `grain_size` samples. Smaller
hops (higher overlap) stack more windows and the 2·hop/grain_size factor
brings the sum back to unity.

Fractional source positions use 4-point Hermite interpolation.


Phase Alignment
---------------

Reading every grain at a fixed offset from "now" lets the phase of a steady
tone jump by ω·hop·(1 - ratio) from one grain to the next. The overlap-add
then smears a tone into lines spaced sample_rate/hop apart, and the loudest
line is rarely the wanted pitch.

Instead each grain starts where the previous grain would have continued, as
far as the signal allows:

    target     = previous start + hop · ratio
    candidates = target - m          for m in first..first + search

`first` is the smallest shift that keeps the grain causal. The candidate
whose opening segment best matches the segment at `target` (normalized
cross-correlation) wins; ties go to the smallest shift. At ratio 1.0 the
target itself is causal and matches perfectly, so nothing moves.


Latency
-------

A grain reads `grain_size · ratio` samples back from "now" and is written
starting one sample in the future, so the pipeline is exactly `grain_size`
samples late. Until the first grain lands the output is silence.


Buffers
-------

    history      ring of the last MAX_GRAIN_SIZE·5 input samples, enough for
                 the longest read (8192 · 4 at +24 semitones) plus the
                 alignment search
    accumulator  ring of MAX_GRAIN_SIZE output samples, cleared as read
    window       precomputed for the current grain size

    reference,   scratch copies for the alignment search
    candidates

All of them are allocated once at the maximum size.
*/

use std::f64::consts::TAU;

use super::interpolate::hermite;

pub const MIN_GRAIN_SIZE: usize = 256;
pub const MAX_GRAIN_SIZE: usize = 8192;
const HISTORY_LEN: usize = MAX_GRAIN_SIZE * 5;
/// +24 semitones.
const MAX_RATIO: f32 = 4.0;
/// Samples compared when aligning a grain.
const CORRELATION_LEN: usize = 256;
/// Longest backward shift tried when aligning a grain.
const MAX_SEARCH: usize = 1024;
/// Correlation gain a larger shift needs before it replaces a smaller one.
const ALIGN_MARGIN: f32 = 1e-4;

/// Hop in samples for a grain size and overlap ratio.
#[inline]
pub fn hop_size(grain_size: usize, overlap: f32) -> usize {
    (((1.0 - overlap) * grain_size as f32).round() as usize).max(1)
}

#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    2.0_f32.powf(semitones / 12.0)
}

/// One channel of granular pitch shifting.
pub struct GrainShifter {
    history: Vec<f32>,
    written: u64,
    accumulator: Vec<f32>,
    read_pos: usize,
    window: Vec<f32>,
    grain_size: usize,
    hop: usize,
    hop_counter: usize,
    ratio: f32,
    norm: f32,
    last_start: Option<f64>,
    reference: Vec<f32>,
    candidates: Vec<f32>,
}

impl GrainShifter {
    pub fn new(grain_size: usize, overlap: f32, semitones: f32) -> Self {
        let mut shifter = Self {
            history: vec![0.0; HISTORY_LEN],
            written: 0,
            accumulator: vec![0.0; MAX_GRAIN_SIZE],
            read_pos: 0,
            window: vec![0.0; MAX_GRAIN_SIZE],
            grain_size: 0,
            hop: 1,
            hop_counter: 0,
            ratio: 1.0,
            norm: 1.0,
            last_start: None,
            reference: vec![0.0; CORRELATION_LEN],
            candidates: vec![0.0; MAX_SEARCH + CORRELATION_LEN],
        };
        shifter.set_grain(grain_size, overlap);
        shifter.set_semitones(semitones);
        shifter
    }

    /// Change grain size and overlap. Recomputes the window only when the
    /// size changes.
    pub fn set_grain(&mut self, grain_size: usize, overlap: f32) {
        let grain_size = grain_size.clamp(MIN_GRAIN_SIZE, MAX_GRAIN_SIZE);
        if grain_size != self.grain_size {
            self.grain_size = grain_size;
            let n = grain_size as f64;
            for (i, w) in self.window[..grain_size].iter_mut().enumerate() {
                *w = (0.5 * (1.0 - (TAU * i as f64 / n).cos())) as f32;
            }
        }
        self.hop = hop_size(grain_size, overlap.clamp(0.0, 0.95)).min(grain_size);
        self.hop_counter = self.hop_counter.min(self.hop - 1);
        self.norm = 2.0 * self.hop as f32 / grain_size as f32;
    }

    pub fn set_semitones(&mut self, semitones: f32) {
        self.ratio = semitones_to_ratio(semitones).clamp(1.0 / MAX_RATIO, MAX_RATIO);
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn grain_size(&self) -> usize {
        self.grain_size
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Output lag behind the input, in samples.
    pub fn latency(&self) -> usize {
        self.grain_size
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.history[(self.written % HISTORY_LEN as u64) as usize] = input;
        self.written += 1;

        let output = self.accumulator[self.read_pos];
        self.accumulator[self.read_pos] = 0.0;
        self.read_pos = (self.read_pos + 1) % MAX_GRAIN_SIZE;

        self.hop_counter += 1;
        if self.hop_counter >= self.hop {
            self.hop_counter = 0;
            if self.written >= self.grain_size as u64 {
                self.emit_grain();
            }
        }

        output
    }

    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.accumulator.fill(0.0);
        self.written = 0;
        self.read_pos = 0;
        self.hop_counter = 0;
        self.last_start = None;
    }

    fn emit_grain(&mut self) {
        let ratio = self.ratio as f64;
        let nominal = self.written as f64 - self.grain_size as f64 * ratio;
        let start = match self.last_start {
            Some(previous) => self.align(previous + self.hop as f64 * ratio, nominal),
            None => nominal,
        };
        self.last_start = Some(start);
        let gain = self.norm;

        for i in 0..self.grain_size {
            let position = start + i as f64 * ratio;
            let base = position.floor();
            let frac = (position - base) as f32;
            let k = base as i64;
            let sample = hermite(
                self.sample_at(k - 1),
                self.sample_at(k),
                self.sample_at(k + 1),
                self.sample_at(k + 2),
                frac,
            );
            let slot = (self.read_pos + i) % MAX_GRAIN_SIZE;
            self.accumulator[slot] += sample * self.window[i] * gain;
        }
    }

    /// Source start closest to `target` in phase, no later than `nominal`.
    fn align(&mut self, target: f64, nominal: f64) -> f64 {
        let len = self.hop.min(CORRELATION_LEN);
        let search = (self.grain_size / 2).min(MAX_SEARCH);
        let first = (target - nominal).ceil() as i64;
        let base = target.floor() as i64;
        // oldest sample any candidate segment touches
        let lowest = base - (first + search as i64 - 1);

        for j in 0..len {
            let sample = self.sample_at(base + j as i64);
            self.reference[j] = sample;
        }
        for j in 0..search + len - 1 {
            let sample = self.sample_at(lowest + j as i64);
            self.candidates[j] = sample;
        }

        let reference = &self.reference[..len];
        let reference_energy: f32 = reference.iter().map(|x| x * x).sum();
        if reference_energy <= f32::EPSILON {
            return target - first as f64;
        }

        let mut best_shift = first;
        let mut best_score = f32::MIN;
        for step in 0..search {
            let shift = first + step as i64;
            let offset = search - 1 - step;
            let segment = &self.candidates[offset..offset + len];

            let (dot, energy) = segment
                .iter()
                .zip(reference)
                .fold((0.0f32, 0.0f32), |(dot, energy), (&c, &r)| {
                    (dot + c * r, energy + c * c)
                });
            let score = dot / (reference_energy * energy).sqrt().max(1e-12);
            if score > best_score + ALIGN_MARGIN {
                best_score = score;
                best_shift = shift;
            }
        }

        target - best_shift as f64
    }

    /// Input sample at absolute stream index. Future indices read the newest
    /// sample; anything before the stream start or already overwritten is 0.
    #[inline]
    fn sample_at(&self, index: i64) -> f32 {
        let newest = self.written as i64 - 1;
        let index = index.min(newest);
        if index < 0 || newest - index >= HISTORY_LEN as i64 {
            return 0.0;
        }
        self.history[(index as u64 % HISTORY_LEN as u64) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_windows_at_half_overlap_sum_to_unity() {
        let shifter = GrainShifter::new(1024, 0.5, 0.0);
        let hop = shifter.hop();
        assert_eq!(hop, 512);
        for i in 0..hop {
            let sum = (shifter.window[i] + shifter.window[i + hop]) * shifter.norm;
            assert!((sum - 1.0).abs() < 1e-5, "window sum {sum} at {i}");
        }
    }

    #[test]
    fn silent_until_first_grain() {
        let mut shifter = GrainShifter::new(512, 0.5, 0.0);
        for n in 0..512 {
            assert_eq!(shifter.process(1.0), 0.0, "sample {n}");
        }
    }

    #[test]
    fn unity_ratio_is_delayed_identity() {
        let n = 512;
        let mut shifter = GrainShifter::new(n, 0.5, 0.0);
        let input: Vec<f32> = (0..8000).map(|i| ((i * 37) % 101) as f32 / 101.0 - 0.5).collect();
        let output: Vec<f32> = input.iter().map(|&x| shifter.process(x)).collect();

        let settled = n + shifter.hop();
        for t in settled..input.len() {
            assert!(
                (output[t] - input[t - n]).abs() < 1e-4,
                "mismatch at {t}: {} vs {}",
                output[t],
                input[t - n]
            );
        }
    }

    #[test]
    fn higher_overlap_keeps_unity_gain() {
        let n = 1024;
        let mut shifter = GrainShifter::new(n, 0.75, 0.0);
        let output: Vec<f32> = (0..6000).map(|_| shifter.process(0.5)).collect();
        for &y in &output[n * 2..] {
            assert!((y - 0.5).abs() < 1e-3, "dc level drifted: {y}");
        }
    }

    #[test]
    fn ratio_is_clamped_to_two_octaves() {
        let shifter = GrainShifter::new(2048, 0.5, 48.0);
        assert_eq!(shifter.ratio(), MAX_RATIO);
    }

    #[test]
    fn grain_size_is_clamped() {
        let mut shifter = GrainShifter::new(10, 0.5, 0.0);
        assert_eq!(shifter.grain_size(), MIN_GRAIN_SIZE);
        shifter.set_grain(100_000, 0.5);
        assert_eq!(shifter.grain_size(), MAX_GRAIN_SIZE);
        assert_eq!(shifter.latency(), MAX_GRAIN_SIZE);
    }

    #[test]
    fn octave_up_is_phase_continuous() {
        use crate::analysis::dominant_frequency;
        use crate::dsp::oscillator::sine_tone;

        let mut shifter = GrainShifter::new(2048, 0.5, 12.0);
        let mut signal = sine_tone(440.0, 0.5, 44_100.0, 44_100);
        shifter.process_buffer(&mut signal);

        let found = dominant_frequency(&signal[8_192..], 44_100.0);
        assert!((found - 880.0).abs() < 4.4, "dominant {found} Hz");
    }

    #[test]
    fn extreme_shift_stays_bounded() {
        let mut shifter = GrainShifter::new(8192, 0.875, 24.0);
        for i in 0..50_000 {
            let x = (i as f32 * 0.05).sin();
            let y = shifter.process(x);
            assert!(y.is_finite() && y.abs() < 2.0);
        }
    }
}
