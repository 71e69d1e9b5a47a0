//! Leaf and flower placement sampling along a terminal branch.
//!
//! Each placement is a 4×4 transform whose translation is a point on the
//! branch curve and whose rotation takes the template's +Y ([`PLACEMENT_UP`])
//! to a direction tilted off the local tangent:
//!
//! ```text
//!            dir_k = fan(TAU·k/count) · tilt(angle) · tangent
//!              ╲
//!               ╲  angle
//!   ─────────────●──────────► tangent      ● = curve sample
//! ```
//!
//! A random spin about the template's own up axis is applied first, so
//! identical billboards do not all face the same way.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use rand::Rng;

use crate::constants::PLACEMENT_UP;
use crate::curve::{CatmullRomCurve, Frame};
use crate::sampling::{jitter, jitter_fraction};
use crate::species::PlacementRule;

/// Sample `rule.count` placement transforms along `curve`.
///
/// `frames` are the tube's per-ring frames (`samples + 1` entries for
/// parameters `i / samples`); each placement snaps to the nearest ring.
/// Returns an empty list when `frames` is empty.
pub fn build_placements(
  rule: &PlacementRule,
  curve: &CatmullRomCurve,
  frames: &[Frame],
  scale: f32,
  rng: &mut impl Rng,
) -> Vec<Mat4> {
  if frames.is_empty() || rule.count == 0 {
    return Vec::new();
  }
  let samples = frames.len() - 1;
  let phase = rng.random::<f32>() * TAU;

  (0..rule.count)
    .map(|k| {
      let u = jitter_fraction(rule.position, rule.position_jitter, rng);
      let index = if samples == 0 {
        0
      } else {
        ((u * samples as f32).round() as usize).min(samples)
      };
      let frame = frames[index];
      let position = if samples == 0 {
        curve.point_at(0.0)
      } else {
        curve.point_at(index as f32 / samples as f32)
      };

      let angle = jitter(rule.angle, rule.angle_jitter, rng);
      let fan = phase + TAU * k as f32 / rule.count as f32;
      let direction = placement_direction(&frame, angle, fan);
      let spin = rng.random::<f32>() * TAU;

      Mat4::from_scale_rotation_translation(
        Vec3::splat(scale),
        orientation(direction, spin),
        position,
      )
    })
    .collect()
}

/// Tangent tilted by `angle` about the frame normal, then rotated `fan`
/// about the tangent.
pub fn placement_direction(frame: &Frame, angle: f32, fan: f32) -> Vec3 {
  let tilted = Quat::from_axis_angle(frame.normal, angle) * frame.tangent;
  let fanned = Quat::from_axis_angle(frame.tangent, fan) * tilted;
  fanned.try_normalize().unwrap_or(frame.tangent)
}

/// Rotation taking [`PLACEMENT_UP`] to `direction`, after a spin about
/// [`PLACEMENT_UP`].
pub fn orientation(direction: Vec3, spin: f32) -> Quat {
  let direction = direction.try_normalize().unwrap_or(PLACEMENT_UP);
  Quat::from_rotation_arc(PLACEMENT_UP, direction) * Quat::from_axis_angle(PLACEMENT_UP, spin)
}

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;
