//! Dry/wet mixing and crossfading primitives.

/*
Dry / Wet Mixing
================

Most effects here run "in parallel" with the untouched signal:

    dry ──┬──────────────────────┐
          │                      (×(1-mix)) ──→ (+) ──→ out
          └──→ [ effect ] ──wet──(×mix)─────────┘

  mix = 0.0  →  effect inaudible
  mix = 1.0  →  effect only

The weights always sum to 1.0, so a 50% mix of two full-scale signals that
are in phase still peaks at 1.0. Linear weights dip in perceived loudness in
the middle when dry and wet are uncorrelated; for effect mixes that dip is
masked by the effect itself and not worth the trig.


Crossfades
----------

When an effect is inserted, removed or bypassed the chain fades between its
input (dry) and output (wet) instead of switching instantly:

    gain  1.0 ────╲                 (removal)
                   ╲
          0.0       ╲────────
                 ├ fade ┤

The same gain ramp must be applied to every channel of a block, so
`crossfade` takes a ramp by value and returns where it ended. The caller
stores the result only once all channels are done.
*/

use super::smooth::LinearRamp;

/// Linear dry/wet blend of one sample. `mix` 0 is dry, 1 is wet.
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Crossfade `wet` toward or away from `dry` following `ramp`, in place.
///
/// The ramp value is the wet gain. Returns the ramp after `wet.len()` steps.
#[inline]
pub fn crossfade(dry: &[f32], wet: &mut [f32], mut ramp: LinearRamp) -> LinearRamp {
    debug_assert_eq!(dry.len(), wet.len());

    for (wet_sample, &dry_sample) in wet.iter_mut().zip(dry.iter()) {
        let gain = ramp.next();
        *wet_sample = blend_dry_wet(dry_sample, *wet_sample, gain);
    }
    ramp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_weights_sum_to_one() {
        assert_eq!(blend_dry_wet(0.8, -0.4, 0.0), 0.8);
        assert_eq!(blend_dry_wet(0.8, -0.4, 1.0), -0.4);
        assert!((blend_dry_wet(0.8, -0.4, 0.25) - 0.5).abs() < 1e-6);
        // equal inputs pass unchanged at any mix
        assert!((blend_dry_wet(0.3, 0.3, 0.7) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn crossfade_moves_from_dry_to_wet() {
        let dry = [1.0; 8];
        let mut wet = [0.0; 8];
        let mut ramp = LinearRamp::new(1.0);
        ramp.set_target(0.0, 4);

        let end = crossfade(&dry, &mut wet, ramp);

        assert_eq!(wet[0], 0.25);
        assert_eq!(wet[3], 1.0);
        assert_eq!(wet[7], 1.0);
        assert!(!end.is_active());
        assert_eq!(end.value(), 0.0);
    }

    #[test]
    fn crossfade_is_monotonic_across_calls() {
        let dry = [0.0; 16];
        let mut ramp = LinearRamp::new(0.0);
        ramp.set_target(1.0, 32);

        let mut first = [1.0; 16];
        ramp = crossfade(&dry, &mut first, ramp);
        let mut second = [1.0; 16];
        ramp = crossfade(&dry, &mut second, ramp);

        assert!(first.windows(2).all(|w| w[1] > w[0]));
        assert!(second[0] > first[15]);
        assert_eq!(second[15], 1.0);
        assert_eq!(ramp.value(), 1.0);
    }
}
