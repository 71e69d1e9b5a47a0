//! View frustum as six inward-facing planes.
//!
//! Planes are extracted from a combined view-projection matrix with the
//! Gribb/Hartmann row method, for the `[0, 1]` clip depth range glam's
//! `perspective_*` and `orthographic_*` constructors produce:
//!
//! ```text
//!   left   = r3 + r0      right = r3 - r0
//!   bottom = r3 + r1      top   = r3 - r1
//!   near   = r2           far   = r3 - r2
//! ```
//!
//! A point is inside when `normal · p + d >= 0` for every plane.
//!
//! Infinite projections (`perspective_infinite_rh` and its reverse-Z form)
//! collapse one row combination to `(0, 0, 0, w)` with `w > 0`. Such a
//! plane bounds nothing and is stored as [`Plane::UNBOUNDED`].

use glam::{Mat4, Vec3, Vec4};

use super::bounds::{Aabb3, Sphere};

/// Plane `normal · p + d = 0` with unit normal pointing into the frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  pub normal: Vec3,
  pub d: f32,
}

impl Plane {
  /// Plane every point is inside of.
  pub const UNBOUNDED: Self = Self {
    normal: Vec3::ZERO,
    d: f32::INFINITY,
  };

  /// Normalize from raw `(a, b, c, d)` coefficients.
  ///
  /// A zero normal with positive `d` is [`Plane::UNBOUNDED`]; any other
  /// zero normal stays zero and the plane is degenerate.
  fn from_coefficients(v: Vec4) -> Self {
    let length = v.truncate().length();
    if length > 1e-6 && length.is_finite() {
      Self {
        normal: v.truncate() / length,
        d: v.w / length,
      }
    } else if length.is_finite() && v.w > 0.0 {
      Self::UNBOUNDED
    } else {
      Self {
        normal: Vec3::ZERO,
        d: v.w,
      }
    }
  }

  /// Whether this plane admits every point.
  #[inline]
  pub fn is_unbounded(&self) -> bool {
    self.normal == Vec3::ZERO && self.d == f32::INFINITY
  }

  /// Signed distance, positive on the inside.
  #[inline]
  pub fn signed_distance(&self, point: Vec3) -> f32 {
    self.normal.dot(point) + self.d
  }
}

/// Six-plane camera frustum: left, right, bottom, top, near, far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
  pub planes: [Plane; 6],
}

impl Frustum {
  /// Extract the frustum of `projection * view`.
  pub fn from_view_projection(view_projection: Mat4) -> Self {
    let r0 = view_projection.row(0);
    let r1 = view_projection.row(1);
    let r2 = view_projection.row(2);
    let r3 = view_projection.row(3);

    Self {
      planes: [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(Plane::from_coefficients),
    }
  }

  /// Copy with every plane pushed outward by `margin` world units.
  pub fn expanded(&self, margin: f32) -> Self {
    let mut planes = self.planes;
    for plane in &mut planes {
      plane.d += margin;
    }
    Self { planes }
  }

  /// Any bounded plane lacks a usable normal, or no plane bounds anything.
  pub fn is_degenerate(&self) -> bool {
    let invalid = self
      .planes
      .iter()
      .filter(|p| !p.is_unbounded())
      .any(|p| !p.d.is_finite() || !(p.normal.length_squared() > 0.5));
    invalid || self.planes.iter().all(Plane::is_unbounded)
  }

  /// Point inside or on every plane.
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
  }

  /// Sphere not entirely behind any plane (conservative).
  #[inline]
  pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
    self
      .planes
      .iter()
      .all(|p| p.signed_distance(sphere.center) >= -sphere.radius)
  }

  /// Box not entirely behind any plane (positive-vertex test, conservative).
  #[inline]
  pub fn intersects_aabb(&self, aabb: &Aabb3) -> bool {
    self.planes.iter().all(|p| {
      let positive = Vec3::select(p.normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
      p.signed_distance(positive) >= 0.0
    })
  }
}

#[cfg(test)]
#[path = "frustum_test.rs"]
mod frustum_test;
