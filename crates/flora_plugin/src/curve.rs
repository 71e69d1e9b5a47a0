//! Catmull-Rom curves and rotation-minimizing frames.
//!
//! Branch paths are short control-point lists (typically 3 points: start,
//! jittered mid, drooped end). The curve interpolates them smoothly and
//! provides, at any parameter, a position, a unit tangent, and a local frame
//! used to orient tube rings and leaf placements.
//!
//! # Frame Propagation
//!
//! ```text
//!   t0 ──► t1 ──► t2 ──► ...        tangents (finite difference)
//!   n0     n1     n2                normals
//!   │      ▲      ▲
//!   │      └ rotate n0 about (t0 × t1) by angle(t0, t1)
//!   └ perpendicular to t0 along its smallest component axis
//! ```
//!
//! Parallel transport keeps consecutive normals as close as possible, so the
//! ring vertices of a tube do not twist around the path.

use glam::{Quat, Vec3};

use crate::constants::{ARC_LENGTH_DIVISIONS, DEFAULT_AXIS, DEGENERATE_LENGTH_SQ, TANGENT_DELTA};

/// Local orthonormal basis at one curve sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
  /// Unit tangent (direction of travel).
  pub tangent: Vec3,
  /// Unit normal, perpendicular to the tangent.
  pub normal: Vec3,
  /// Unit binormal, `tangent × normal`.
  pub binormal: Vec3,
}

/// Uniform Catmull-Rom curve through an ordered list of control points.
///
/// End segments use mirrored phantom points so the curve passes through the
/// first and last control points.
#[derive(Clone, Debug, PartialEq)]
pub struct CatmullRomCurve {
  points: Vec<Vec3>,
}

impl CatmullRomCurve {
  /// Create a curve. Returns `None` for fewer than 2 control points.
  pub fn new(points: Vec<Vec3>) -> Option<Self> {
    if points.len() < 2 {
      return None;
    }
    Some(Self { points })
  }

  /// Create a curve from a path of any length.
  ///
  /// A single point becomes a zero-length segment and an empty path
  /// collapses to the origin; both yield the default-axis tangent.
  pub fn from_path(path: &[Vec3]) -> Self {
    let mut points = path.to_vec();
    match points.len() {
      0 => points = vec![Vec3::ZERO; 2],
      1 => points.push(points[0]),
      _ => {}
    }
    Self { points }
  }

  /// Control points.
  pub fn points(&self) -> &[Vec3] {
    &self.points
  }

  /// Interpolated position at `u` in `[0, 1]` (clamped).
  pub fn point_at(&self, u: f32) -> Vec3 {
    let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
    let last = self.points.len() - 1;
    let p = last as f32 * u;
    let mut index = p.floor() as usize;
    let mut weight = p - index as f32;

    if index >= last {
      index = last - 1;
      weight = 1.0;
    }

    let p1 = self.points[index];
    let p2 = self.points[index + 1];
    let p0 = if index > 0 {
      self.points[index - 1]
    } else {
      p1 * 2.0 - p2
    };
    let p3 = if index + 2 <= last {
      self.points[index + 2]
    } else {
      p2 * 2.0 - p1
    };

    catmull_rom(p0, p1, p2, p3, weight)
  }

  /// Unit tangent at `u` by symmetric finite difference.
  ///
  /// Falls back to [`DEFAULT_AXIS`] when the curve is degenerate around `u`.
  pub fn tangent_at(&self, u: f32) -> Vec3 {
    let u0 = (u - TANGENT_DELTA).max(0.0);
    let u1 = (u + TANGENT_DELTA).min(1.0);
    let delta = self.point_at(u1) - self.point_at(u0);
    if delta.length_squared() <= DEGENERATE_LENGTH_SQ {
      return self.chord_direction();
    }
    delta.normalize()
  }

  /// Unit tangent at sample `index` of `samples` uniform segments.
  pub fn tangent_at_index(&self, index: usize, samples: usize) -> Vec3 {
    let samples = samples.max(1);
    self.tangent_at(index.min(samples) as f32 / samples as f32)
  }

  /// Approximate arc length, summing `divisions` chords.
  pub fn length(&self, divisions: usize) -> f32 {
    let divisions = divisions.max(1);
    let mut length = 0.0;
    let mut previous = self.point_at(0.0);
    for i in 1..=divisions {
      let current = self.point_at(i as f32 / divisions as f32);
      length += previous.distance(current);
      previous = current;
    }
    length
  }

  /// Arc length with the default subdivision count.
  pub fn approx_length(&self) -> f32 {
    self.length(ARC_LENGTH_DIVISIONS)
  }

  /// Rotation-minimizing frames at parameters `i / samples`, `i in 0..=samples`.
  pub fn compute_frames(&self, samples: usize) -> Vec<Frame> {
    let samples = samples.max(1);
    let tangents: Vec<Vec3> = (0..=samples)
      .map(|i| self.tangent_at_index(i, samples))
      .collect();
    propagate_frames(&tangents)
  }

  /// Direction from first to last control point, or the default axis.
  fn chord_direction(&self) -> Vec3 {
    let first = self.points[0];
    let last = self.points[self.points.len() - 1];
    (last - first).try_normalize().unwrap_or(DEFAULT_AXIS)
  }
}

/// Uniform Catmull-Rom segment between `p1` and `p2`.
#[inline]
fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
  let v0 = (p2 - p0) * 0.5;
  let v1 = (p3 - p1) * 0.5;
  let t2 = t * t;
  let t3 = t2 * t;
  (p1 * 2.0 - p2 * 2.0 + v0 + v1) * t3 + (p1 * -3.0 + p2 * 3.0 - v0 * 2.0 - v1) * t2 + v0 * t + p1
}

/// Vector perpendicular to `tangent`, chosen along its smallest component.
pub fn initial_normal(tangent: Vec3) -> Vec3 {
  let abs = tangent.abs();
  let axis = if abs.x <= abs.y && abs.x <= abs.z {
    Vec3::X
  } else if abs.y <= abs.z {
    Vec3::Y
  } else {
    Vec3::Z
  };
  let side = tangent.cross(axis).try_normalize().unwrap_or(Vec3::X);
  tangent.cross(side).try_normalize().unwrap_or(Vec3::Z)
}

/// Parallel-transport an initial normal along a tangent sequence.
///
/// Degenerate tangents are replaced by the previous tangent (or the default
/// axis at the start) so every frame is finite and orthonormal.
pub fn propagate_frames(tangents: &[Vec3]) -> Vec<Frame> {
  let mut frames: Vec<Frame> = Vec::with_capacity(tangents.len());
  let mut previous_tangent = DEFAULT_AXIS;

  for (i, raw) in tangents.iter().enumerate() {
    let tangent = raw.try_normalize().unwrap_or(previous_tangent);
    let normal = if i == 0 {
      initial_normal(tangent)
    } else {
      let prev = frames[i - 1];
      let axis = prev.tangent.cross(tangent);
      let transported = if axis.length_squared() > DEGENERATE_LENGTH_SQ {
        let theta = prev.tangent.dot(tangent).clamp(-1.0, 1.0).acos();
        Quat::from_axis_angle(axis.normalize(), theta) * prev.normal
      } else {
        prev.normal
      };
      // Re-orthogonalize against drift.
      let ortho = transported - tangent * transported.dot(tangent);
      ortho.try_normalize().unwrap_or_else(|| initial_normal(tangent))
    };
    let binormal = tangent.cross(normal).try_normalize().unwrap_or(Vec3::X);
    frames.push(Frame {
      tangent,
      normal,
      binormal,
    });
    previous_tangent = tangent;
  }

  frames
}

#[cfg(test)]
#[path = "curve_test.rs"]
mod curve_test;
