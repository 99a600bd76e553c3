//! Fractional sample interpolation.
//!
//! Nearest-neighbour reads alias audibly once a read position starts moving,
//! so every modulated or resampled read goes through one of these.

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 4-point, 3rd-order Hermite (Catmull-Rom) interpolation between `x0` and `x1`.
///
/// `xm1` and `x2` are the outer neighbours; `t` is in [0, 1). At `t = 0` the
/// result is exactly `x0`.
#[inline]
pub fn hermite(xm1: f32, x0: f32, x1: f32, x2: f32, t: f32) -> f32 {
    let c1 = 0.5 * (x1 - xm1);
    let c2 = xm1 - 2.5 * x0 + 2.0 * x1 - 0.5 * x2;
    let c3 = 0.5 * (x2 - xm1) + 1.5 * (x0 - x1);
    ((c3 * t + c2) * t + c1) * t + x0
}
