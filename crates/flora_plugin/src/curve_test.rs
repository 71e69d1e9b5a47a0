use glam::Vec3;

use super::*;

fn bent() -> CatmullRomCurve {
  CatmullRomCurve::new(vec![
    Vec3::ZERO,
    Vec3::new(0.5, 2.0, 0.0),
    Vec3::new(2.0, 3.0, 1.0),
  ])
  .unwrap()
}

fn assert_orthonormal(frame: &Frame) {
  assert!((frame.tangent.length() - 1.0).abs() < 1e-4, "tangent not unit: {:?}", frame);
  assert!((frame.normal.length() - 1.0).abs() < 1e-4, "normal not unit: {:?}", frame);
  assert!((frame.binormal.length() - 1.0).abs() < 1e-4, "binormal not unit: {:?}", frame);
  assert!(frame.tangent.dot(frame.normal).abs() < 1e-3);
  assert!(frame.tangent.dot(frame.binormal).abs() < 1e-3);
  assert!(frame.normal.dot(frame.binormal).abs() < 1e-3);
}

#[test]
fn test_requires_two_points() {
  assert!(CatmullRomCurve::new(vec![]).is_none());
  assert!(CatmullRomCurve::new(vec![Vec3::ONE]).is_none());
  assert!(CatmullRomCurve::new(vec![Vec3::ZERO, Vec3::ONE]).is_some());
}

/// The curve passes through every control point at uniform parameters.
#[test]
fn test_interpolates_control_points() {
  let curve = bent();
  assert!((curve.point_at(0.0) - Vec3::ZERO).length() < 1e-5);
  assert!((curve.point_at(0.5) - Vec3::new(0.5, 2.0, 0.0)).length() < 1e-5);
  assert!((curve.point_at(1.0) - Vec3::new(2.0, 3.0, 1.0)).length() < 1e-5);
}

#[test]
fn test_parameter_is_clamped() {
  let curve = bent();
  assert_eq!(curve.point_at(-3.0), curve.point_at(0.0));
  assert_eq!(curve.point_at(7.0), curve.point_at(1.0));
  assert_eq!(curve.point_at(f32::NAN), curve.point_at(0.0));
}

#[test]
fn test_straight_line_tangent() {
  let curve = CatmullRomCurve::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0)]).unwrap();
  for i in 0..=10 {
    let t = curve.tangent_at(i as f32 / 10.0);
    assert!((t - Vec3::Z).length() < 1e-3, "tangent {t:?} at sample {i}");
  }
  assert!((curve.approx_length() - 4.0).abs() < 1e-3);
}

/// Coincident control points must not leak NaN into tangents or frames.
#[test]
fn test_degenerate_curve_falls_back_to_default_axis() {
  let curve = CatmullRomCurve::new(vec![Vec3::ONE; 3]).unwrap();
  assert_eq!(curve.tangent_at(0.5), DEFAULT_AXIS);

  let frames = curve.compute_frames(4);
  assert_eq!(frames.len(), 5);
  for frame in &frames {
    assert!(frame.normal.is_finite());
    assert!(frame.binormal.is_finite());
    assert_orthonormal(frame);
  }
}

#[test]
fn test_frames_are_orthonormal() {
  let frames = bent().compute_frames(12);
  assert_eq!(frames.len(), 13);
  for frame in &frames {
    assert_orthonormal(frame);
  }
}

/// Consecutive normals stay close: no sudden flips along a smooth curve.
#[test]
fn test_frames_do_not_twist() {
  let frames = bent().compute_frames(32);
  for pair in frames.windows(2) {
    assert!(
      pair[0].normal.dot(pair[1].normal) > 0.9,
      "normal jumped between samples: {:?} -> {:?}",
      pair[0].normal,
      pair[1].normal
    );
  }
}

#[test]
fn test_initial_normal_is_perpendicular() {
  for tangent in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(1.0, 2.0, 3.0).normalize()] {
    let n = initial_normal(tangent);
    assert!(n.dot(tangent).abs() < 1e-5);
    assert!((n.length() - 1.0).abs() < 1e-5);
  }
}

#[test]
fn test_propagate_replaces_zero_tangents() {
  let frames = propagate_frames(&[Vec3::ZERO, Vec3::X, Vec3::ZERO]);
  assert_eq!(frames[0].tangent, DEFAULT_AXIS);
  assert_eq!(frames[2].tangent, Vec3::X);
  for frame in &frames {
    assert_orthonormal(frame);
  }
}

#[test]
fn test_from_path_pads_short_input() {
  let single = CatmullRomCurve::from_path(&[Vec3::ONE]);
  assert_eq!(single.points().len(), 2);
  assert_eq!(single.tangent_at(0.5), DEFAULT_AXIS);

  let empty = CatmullRomCurve::from_path(&[]);
  assert_eq!(empty.point_at(0.3), Vec3::ZERO);
}
