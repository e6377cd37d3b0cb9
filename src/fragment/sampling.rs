//! Random sampling helpers for fragment placement.

use std::f32::consts::TAU;
use std::ops::RangeInclusive;

use glam::Vec3;
use rand::Rng;

/// Uniformly distributed direction on the unit sphere.
pub fn unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Offset uniformly distributed in the volume of a ball of `radius`.
pub fn offset_in_ball<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    if radius <= 0.0 || !radius.is_finite() {
        return Vec3::ZERO;
    }
    let u: f32 = rng.gen_range(0.0..=1.0);
    unit_vector(rng) * radius * u.cbrt()
}

/// Uniform integer in the range; reversed bounds are swapped.
pub fn count_in<R: Rng + ?Sized>(rng: &mut R, range: &RangeInclusive<u32>) -> u32 {
    let (lo, hi) = ordered(*range.start(), *range.end());
    rng.gen_range(lo..=hi)
}

/// Uniform float in the range; reversed bounds are swapped.
pub fn size_in<R: Rng + ?Sized>(rng: &mut R, range: &RangeInclusive<f32>) -> f32 {
    let (lo, hi) = ordered(*range.start(), *range.end());
    if !(lo.is_finite() && hi.is_finite()) {
        return 0.0;
    }
    if lo == hi {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
