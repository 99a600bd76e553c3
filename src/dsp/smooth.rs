//! Parameter smoothing and fade ramps.

/*
Smoothing
=========

Jumping a parameter from one value to another inside a block produces a
discontinuity you can hear: a click for gains, a "zipper" for delay times.
Two tools cover every case in this crate:

  OnePole      exponential glide, never quite arrives; good for continuous
               controls like delay time that may be moved again at any moment

                 value += (target - value) * (1 - coeff)

  LinearRamp   straight line over a fixed number of samples, then stops
               exactly on target; used for crossfades where "done" matters
               (a removed effect can only be dropped once its fade hits 0)

    OnePole     ‾‾‾‾╲___                 LinearRamp   ‾‾‾‾╲
                     ‾‾‾‾‾‾‾‾───                         ╲
                                                          ╲____
*/

use crate::MIN_TIME;

#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    value: f32,
    target: f32,
    coeff: f32,
}

impl OnePole {
    pub fn new(initial: f32, time_s: f32, sample_rate: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            coeff: (-1.0 / (time_s.max(MIN_TIME) * sample_rate)).exp(),
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Skip the glide.
    pub fn jump(&mut self, value: f32) {
        self.value = value;
        self.target = value;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.value = self.target + (self.value - self.target) * self.coeff;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

/// Linear ramp between 0.0 and 1.0 style gain values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    value: f32,
    target: f32,
    step: f32,
}

impl LinearRamp {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            step: 0.0,
        }
    }

    /// Head for `target` over `frames` samples. Zero frames jumps immediately.
    pub fn set_target(&mut self, target: f32, frames: usize) {
        self.target = target;
        if frames == 0 {
            self.value = target;
            self.step = 0.0;
        } else {
            self.step = (target - self.value) / frames as f32;
        }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.step != 0.0 {
            self.value += self.step;
            let arrived = (self.step > 0.0 && self.value >= self.target)
                || (self.step < 0.0 && self.value <= self.target);
            if arrived {
                self.value = self.target;
                self.step = 0.0;
            }
        }
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.step != 0.0
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
