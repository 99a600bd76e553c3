//! Schroeder reverb core: parallel damped combs into series all-passes.

/*
Topology
========

    x ──┬─→ comb ─┐
        ├─→ comb ─┤
        ├─→ comb ─┼─→ Σ · ¼ ─→ allpass ─→ allpass ─→ y
        └─→ comb ─┘

The combs give the tail its length; the all-passes thicken it without
changing its spectrum.

    comb        lp  = lp · damp + x[n - d] · (1 - damp)
                y   = x[n - d]            (stored: x + lp · g)

    allpass     y   = -g · x + v[n - d]
                v   = x + g · y

Comb feedback never reaches 1.0, so every loop decays. Delay lines are sized
for the largest room when built; the room size only moves the read offset.
*/

use super::delay::DelayLine;

/// Comb tunings in ms at the middle room size.
const COMB_TUNING_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_TUNING_MS: [f32; 2] = [5.0, 1.7];
const ALLPASS_GAIN: f32 = 0.5;

/// Room size 0 and 1 scale the comb tunings by these factors.
const ROOM_SCALE: (f32, f32) = (0.5, 1.5);
/// Comb feedback at decay 0.
const MIN_COMB_FEEDBACK: f32 = 0.7;
pub const MAX_COMB_FEEDBACK: f32 = 0.98;

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    (ms * 0.001 * sample_rate) as usize
}

/// Feedback comb with a one-pole lowpass in the loop.
pub struct CombFilter {
    line: DelayLine,
    delay: usize,
    feedback: f32,
    damp: f32,
    lowpass: f32,
}

impl CombFilter {
    /// `capacity` is the longest delay `set_delay` will accept.
    pub fn new(capacity: usize, delay: usize) -> Self {
        let line = DelayLine::new(capacity + 1);
        let mut comb = Self {
            delay: 1,
            line,
            feedback: 0.5,
            damp: 0.5,
            lowpass: 0.0,
        };
        comb.set_delay(delay);
        comb
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_COMB_FEEDBACK);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    pub fn set_delay(&mut self, delay: usize) {
        self.delay = delay.clamp(1, self.line.capacity() - 1);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.line.read(self.delay);
        self.lowpass = self.lowpass * self.damp + delayed * (1.0 - self.damp);
        self.line.write(input + self.lowpass * self.feedback);
        delayed
    }

    pub fn reset(&mut self) {
        self.line.reset();
        self.lowpass = 0.0;
    }
}

/// Schroeder all-pass: flat magnitude, smeared phase.
pub struct AllpassFilter {
    line: DelayLine,
    delay: usize,
    gain: f32,
}

impl AllpassFilter {
    pub fn new(delay: usize) -> Self {
        let delay = delay.max(1);
        Self {
            line: DelayLine::new(delay + 1),
            delay,
            gain: ALLPASS_GAIN,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.line.read(self.delay) - self.gain * input;
        self.line.write(input + self.gain * output);
        output
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

/// Mono reverb tail. Run one per channel.
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
    sample_rate: f32,
    spread_ms: f32,
}

impl SchroederReverb {
    /// `spread_ms` is added to every delay; give each channel a different
    /// spread so the tails decorrelate.
    pub fn new(sample_rate: f32, spread_ms: f32) -> Self {
        let combs = COMB_TUNING_MS.map(|ms| {
            let longest = ms_to_samples(ms * ROOM_SCALE.1 + spread_ms, sample_rate);
            CombFilter::new(longest, longest)
        });
        let allpasses =
            ALLPASS_TUNING_MS.map(|ms| AllpassFilter::new(ms_to_samples(ms + spread_ms, sample_rate)));

        let mut reverb = Self {
            combs,
            allpasses,
            sample_rate,
            spread_ms,
        };
        reverb.set_room_size(0.5);
        reverb.set_decay(0.5);
        reverb
    }

    /// 0 is a small room, 1 a large hall.
    pub fn set_room_size(&mut self, size: f32) {
        let (small, large) = ROOM_SCALE;
        let scale = small + size.clamp(0.0, 1.0) * (large - small);
        for (comb, ms) in self.combs.iter_mut().zip(COMB_TUNING_MS) {
            comb.set_delay(ms_to_samples(ms * scale + self.spread_ms, self.sample_rate));
        }
    }

    /// Maps 0..1 onto comb feedback `MIN_COMB_FEEDBACK..MAX_COMB_FEEDBACK`.
    pub fn set_decay(&mut self, decay: f32) {
        let feedback =
            MIN_COMB_FEEDBACK + decay.clamp(0.0, 1.0) * (MAX_COMB_FEEDBACK - MIN_COMB_FEEDBACK);
        self.combs.iter_mut().for_each(|c| c.set_feedback(feedback));
    }

    pub fn set_damping(&mut self, damp: f32) {
        self.combs.iter_mut().for_each(|c| c.set_damp(damp));
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let summed: f32 = self.combs.iter_mut().map(|c| c.process(input)).sum();
        self.allpasses
            .iter_mut()
            .fold(summed * 0.25, |signal, allpass| allpass.process(signal))
    }

    pub fn reset(&mut self) {
        self.combs.iter_mut().for_each(CombFilter::reset);
        self.allpasses.iter_mut().for_each(AllpassFilter::reset);
    }
}
