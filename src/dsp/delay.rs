//! Circular delay line shared by the delay, flanger, chorus and widener effects.

/*
Delay Lines
===========

A delay line remembers the last N samples in a circular buffer. Writing
advances a single index; reading looks back `d` samples from the newest one.

    write_pos ──┐
                ▼
    [ s5 s6 s7 s0 s1 s2 s3 s4 ]        newest = s7 (1 sample ago)
                                       read(3) = s5

Modulated effects (chorus, flanger) move the read offset continuously, so the
offset is fractional and we interpolate between neighbours. Integer reads are
exact.

Bounds
------

The read offset is clamped to [1, capacity - 2]:
  - below 1 would read a sample that has not been written yet (underrun)
  - the upper bound keeps the interpolation neighbour inside the buffer

Capacity is fixed at construction. Nothing here allocates after `new`.
*/

use super::interpolate::lerp;

pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Allocates `capacity` samples (minimum 4).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(4)],
            write_pos: 0,
        }
    }

    /// Capacity large enough for `max_ms` at `sample_rate`, plus interpolation headroom.
    pub fn with_max_ms(max_ms: f32, sample_rate: f32) -> Self {
        Self::new((max_ms * 0.001 * sample_rate).ceil() as usize + 4)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Longest usable delay in samples.
    #[inline]
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Sample written `delay` writes ago (`read(1)` is the newest).
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Fractional read with linear interpolation. Offset is clamped to the safe range.
    #[inline]
    pub fn read_interpolated(&self, delay: f32) -> f32 {
        let delay = delay.clamp(1.0, self.max_delay());
        let whole = delay.floor();
        let frac = delay - whole;
        let d = whole as usize;
        lerp(self.read(d), self.read(d + 1), frac)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_read_returns_past_sample() {
        let mut line = DelayLine::new(16);
        for i in 0..10 {
            line.write(i as f32);
        }
        assert_eq!(line.read(1), 9.0);
        assert_eq!(line.read(4), 6.0);
    }

    #[test]
    fn interpolated_read_blends_neighbours() {
        let mut line = DelayLine::new(16);
        for i in 0..10 {
            line.write(i as f32);
        }
        // 2.5 samples back sits between 8 (read(2)) and 7 (read(3))
        assert!((line.read_interpolated(2.5) - 7.5).abs() < 1e-6);
    }

    #[test]
    fn offset_below_one_is_clamped() {
        let mut line = DelayLine::new(8);
        line.write(0.25);
        line.write(0.75);
        assert_eq!(line.read_interpolated(-3.0), 0.75);
        assert_eq!(line.read(0), 0.75);
    }

    #[test]
    fn wraps_around_capacity() {
        let mut line = DelayLine::new(4);
        for i in 0..11 {
            line.write(i as f32);
        }
        assert_eq!(line.read(1), 10.0);
        assert_eq!(line.read(3), 8.0);
    }
}
