//! Random sampling helpers shared by the skeleton builder, tube mesher and
//! placement sampler.
//!
//! Every helper takes the generator explicitly. Callers decide between
//! ambient randomness (`rand::rng()`) and a seeded `StdRng` for
//! reproducible output.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::Rng;

use crate::curve::initial_normal;

/// Uniform sample in `[-1, 1]`.
#[inline]
pub fn signed_unit(rng: &mut impl Rng) -> f32 {
  rng.random::<f32>() * 2.0 - 1.0
}

/// `value ± amount`, uniformly.
#[inline]
pub fn jitter(value: f32, amount: f32, rng: &mut impl Rng) -> f32 {
  value + amount * signed_unit(rng)
}

/// `value ± amount`, clamped to `[0, 1]`.
#[inline]
pub fn jitter_fraction(value: f32, amount: f32, rng: &mut impl Rng) -> f32 {
  jitter(value, amount, rng).clamp(0.0, 1.0)
}

/// Random unit vector perpendicular to `axis`.
pub fn random_perpendicular(axis: Vec3, rng: &mut impl Rng) -> Vec3 {
  let spin = Quat::from_axis_angle(axis, rng.random::<f32>() * TAU);
  spin * initial_normal(axis)
}

/// Direction tilted `angle` away from `axis` and then rotated `phase` around it.
///
/// With `phase = base + TAU * k / count` this fans `count` siblings evenly
/// around `axis`.
pub fn cone_direction(axis: Vec3, angle: f32, phase: f32) -> Vec3 {
  let tilt = Quat::from_axis_angle(initial_normal(axis), angle);
  let fan = Quat::from_axis_angle(axis, phase);
  (fan * (tilt * axis)).normalize_or_zero()
}

/// Uniform sample inside the unit ball (rejection sampling).
pub fn unit_ball(rng: &mut impl Rng) -> Vec3 {
  loop {
    let p = Vec3::new(signed_unit(rng), signed_unit(rng), signed_unit(rng));
    if p.length_squared() <= 1.0 {
      return p;
    }
  }
}
