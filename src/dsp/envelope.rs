use crate::MIN_TIME;

/*
Envelope Follower
=================

A dynamics processor needs to know "how loud is it right now". The follower
tracks the peak level of the input with two different speeds:

  attack    how fast the estimate rises when the signal gets louder
  release   how fast it falls when the signal gets quieter

Each is a one-pole smoother:

    coeff = exp(-1 / (time_seconds * sample_rate))
    env   = coeff * env + (1 - coeff) * |x|

A time constant of T seconds reaches ~63% of a step after T seconds.


Shape
-----

    |x|      ▁▁▁▁███████████▁▁▁▁▁▁▁▁▁▁
    env      ▁▁▁▁╱‾‾‾‾‾‾‾‾‾‾╲▁▁▁▁▁▁▁▁▁
                 ↑ attack     ↑ release (usually much slower)

The coefficients are computed when times change, never per sample.
*/

#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: f32, attack_s: f32, release_s: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
        };
        follower.set_times(attack_s, release_s);
        follower
    }

    pub fn set_times(&mut self, attack_s: f32, release_s: f32) {
        self.attack_coeff = time_to_coeff(attack_s, self.sample_rate);
        self.release_coeff = time_to_coeff(release_s, self.sample_rate);
    }

    /// Feed one detector sample (already rectified), return the new envelope.
    #[inline]
    pub fn next(&mut self, level: f32) -> f32 {
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * level;
        self.envelope
    }

    pub fn level(&self) -> f32 {
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

#[inline]
fn time_to_coeff(seconds: f32, sample_rate: f32) -> f32 {
    (-1.0 / (seconds.max(MIN_TIME) * sample_rate)).exp()
}

/// Linear amplitude to dB. Silence maps to -120 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 1e-6 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
