use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use super::*;

/// Camera at the origin looking down -Z, 90° vertical FOV, square aspect.
fn camera() -> Frustum {
  let projection = Mat4::perspective_rh(FRAC_PI_2, 1.0, 0.5, 100.0);
  let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
  Frustum::from_view_projection(projection * view)
}

#[test]
fn test_planes_are_normalized() {
  for plane in camera().planes {
    assert!((plane.normal.length() - 1.0).abs() < 1e-5);
  }
  assert!(!camera().is_degenerate());
}

#[test]
fn test_contains_point() {
  let f = camera();
  assert!(f.contains_point(Vec3::new(0.0, 0.0, -10.0)));
  assert!(f.contains_point(Vec3::new(5.0, -5.0, -10.0)));
  // behind the camera
  assert!(!f.contains_point(Vec3::new(0.0, 0.0, 10.0)));
  // closer than the near plane
  assert!(!f.contains_point(Vec3::new(0.0, 0.0, -0.1)));
  // beyond far
  assert!(!f.contains_point(Vec3::new(0.0, 0.0, -150.0)));
  // outside the 45° half-angle
  assert!(!f.contains_point(Vec3::new(11.0, 0.0, -10.0)));
}

/// Near and far planes sit at the projection's clip distances.
#[test]
fn test_near_far_distances() {
  let f = camera();
  let near = f.planes[4];
  let far = f.planes[5];
  assert!(near.signed_distance(Vec3::new(0.0, 0.0, -0.5)).abs() < 1e-3);
  assert!(far.signed_distance(Vec3::new(0.0, 0.0, -100.0)).abs() < 1e-2);
}

#[test]
fn test_expanded_admits_edge_points() {
  let f = camera();
  let outside = Vec3::new(11.0, 0.0, -10.0);
  assert!(!f.contains_point(outside));
  assert!(f.expanded(2.0).contains_point(outside));
  assert!(!f.expanded(0.1).contains_point(Vec3::new(20.0, 0.0, -10.0)));
}

#[test]
fn test_sphere_intersection() {
  let f = camera();
  assert!(f.intersects_sphere(&Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0)));
  // straddles the right plane
  assert!(f.intersects_sphere(&Sphere::new(Vec3::new(10.5, 0.0, -10.0), 1.0)));
  assert!(!f.intersects_sphere(&Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0)));
}

#[test]
fn test_aabb_intersection() {
  let f = camera();
  let inside = Aabb3::new(Vec3::new(-1.0, -1.0, -11.0), Vec3::new(1.0, 1.0, -9.0));
  let straddle = Aabb3::new(Vec3::new(8.0, -1.0, -11.0), Vec3::new(14.0, 1.0, -9.0));
  let behind = Aabb3::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0));
  let huge = Aabb3::new(Vec3::splat(-500.0), Vec3::splat(500.0));

  assert!(f.intersects_aabb(&inside));
  assert!(f.intersects_aabb(&straddle));
  assert!(!f.intersects_aabb(&behind));
  assert!(f.intersects_aabb(&huge));
}

#[test]
fn test_zero_matrix_is_degenerate() {
  assert!(Frustum::from_view_projection(Mat4::ZERO).is_degenerate());
}

fn infinite_camera(projection: Mat4) -> Frustum {
  let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
  Frustum::from_view_projection(projection * view)
}

/// Infinite far planes bound nothing; the other five still cull.
#[test]
fn test_infinite_far_plane() {
  for (name, projection) in [
    ("infinite", Mat4::perspective_infinite_rh(FRAC_PI_2, 1.0, 0.5)),
    ("infinite_reverse", Mat4::perspective_infinite_reverse_rh(FRAC_PI_2, 1.0, 0.5)),
  ] {
    let f = infinite_camera(projection);
    assert!(!f.is_degenerate(), "{name}");
    assert_eq!(f.planes.iter().filter(|p| p.is_unbounded()).count(), 1, "{name}");

    assert!(f.contains_point(Vec3::new(0.0, 0.0, -10.0)), "{name}");
    assert!(f.contains_point(Vec3::new(0.0, 0.0, -1.0e6)), "{name}");
    assert!(!f.contains_point(Vec3::new(0.0, 0.0, 10.0)), "{name}");
    assert!(!f.contains_point(Vec3::new(0.0, 0.0, -0.1)), "{name}");
    assert!(!f.contains_point(Vec3::new(11.0, 0.0, -10.0)), "{name}");

    let ahead = Aabb3::new(Vec3::new(-1.0, -1.0, -900.0), Vec3::new(1.0, 1.0, -800.0));
    let behind = Aabb3::new(Vec3::new(-1.0, -1.0, 5.0), Vec3::new(1.0, 1.0, 7.0));
    assert!(f.intersects_aabb(&ahead), "{name}");
    assert!(!f.intersects_aabb(&behind), "{name}");
    assert!(f.expanded(2.0).contains_point(Vec3::new(11.0, 0.0, -10.0)), "{name}");
  }
}

#[test]
fn test_unbounded_plane() {
  let plane = Plane::UNBOUNDED;
  assert!(plane.is_unbounded());
  assert!(plane.signed_distance(Vec3::new(1.0e9, -3.0, 7.0)) >= 0.0);
  assert!(!camera().planes[0].is_unbounded());
}
