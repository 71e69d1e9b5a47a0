//! CameraView - the per-frame camera snapshot the LOD manager classifies
//! against.

use glam::{Mat4, Vec3};

use crate::constants::DEGENERATE_LENGTH_SQ;
use crate::octree::Frustum;

/// Camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
  /// `projection * world_inverse`, [0, 1] clip depth.
  pub view_projection: Mat4,
  /// World-space camera position, used for LOD distances.
  pub position: Vec3,
}

impl CameraView {
  /// From a projection matrix and the camera's world-inverse (view) matrix.
  pub fn new(projection: Mat4, world_inverse: Mat4, position: Vec3) -> Self {
    Self {
      view_projection: projection * world_inverse,
      position,
    }
  }

  /// From a projection matrix and the camera's world transform.
  pub fn from_world(projection: Mat4, camera_world: Mat4) -> Self {
    Self::new(projection, camera_world.inverse(), camera_world.w_axis.truncate())
  }

  /// Right-handed perspective camera at `eye` looking at `target`.
  ///
  /// Falls back to +Z as the up vector when looking straight up or down.
  pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
    let forward = target - eye;
    let up = if forward.cross(Vec3::Y).length_squared() <= DEGENERATE_LENGTH_SQ {
      Vec3::Z
    } else {
      Vec3::Y
    };
    Self::new(
      Mat4::perspective_rh(fov_y, aspect, near, far),
      Mat4::look_at_rh(eye, target, up),
      eye,
    )
  }

  /// Six-plane frustum of this view.
  pub fn frustum(&self) -> Frustum {
    Frustum::from_view_projection(self.view_projection)
  }

  /// Distance from the camera to `point`.
  #[inline]
  pub fn distance_to(&self, point: Vec3) -> f32 {
    self.position.distance(point)
  }
}

#[cfg(test)]
mod tests {
  use std::f32::consts::FRAC_PI_2;

  use super::*;

  #[test]
  fn test_look_at_sees_target() {
    let camera = CameraView::look_at(Vec3::new(0.0, 5.0, 20.0), Vec3::ZERO, FRAC_PI_2, 1.0, 0.1, 100.0);
    let frustum = camera.frustum();
    assert!(frustum.contains_point(Vec3::ZERO));
    assert!(!frustum.contains_point(Vec3::new(0.0, 5.0, 40.0)));
    assert_eq!(camera.position, Vec3::new(0.0, 5.0, 20.0));
  }

  #[test]
  fn test_look_straight_down_is_finite() {
    let camera = CameraView::look_at(Vec3::new(0.0, 30.0, 0.0), Vec3::ZERO, FRAC_PI_2, 1.0, 0.1, 100.0);
    assert!(camera.view_projection.is_finite());
    assert!(camera.frustum().contains_point(Vec3::ZERO));
  }

  #[test]
  fn test_from_world_matches_look_at() {
    let eye = Vec3::new(3.0, 4.0, 10.0);
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(1.0, 1.5, 0.1, 50.0);
    let a = CameraView::new(projection, view, eye);
    let b = CameraView::from_world(projection, view.inverse());
    assert!(a.view_projection.abs_diff_eq(b.view_projection, 1e-4));
    assert!(a.position.abs_diff_eq(b.position, 1e-4));
  }

  #[test]
  fn test_distance_to() {
    let camera = CameraView::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO);
    assert_eq!(camera.distance_to(Vec3::new(3.0, 4.0, 0.0)), 5.0);
  }
}
