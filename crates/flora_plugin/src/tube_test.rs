use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;

fn straight(length: f32) -> CatmullRomCurve {
  CatmullRomCurve::new(vec![Vec3::ZERO, Vec3::Y * (length * 0.5), Vec3::Y * length]).unwrap()
}

fn input(curve: &CatmullRomCurve, length: u32, radial: u32) -> TubeInput<'_> {
  TubeInput {
    curve,
    base_radius: 0.5,
    length_segments: length,
    radial_segments: radial,
    shrink_per_segment: 0.05,
    sample_jitter: 0.0,
  }
}

fn rng() -> StdRng {
  StdRng::seed_from_u64(9)
}

#[test]
fn test_vertex_and_index_counts() {
  let curve = straight(3.0);
  for (length, radial) in [(1, 3), (4, 6), (7, 12)] {
    let tube = build_tube(&input(&curve, length, radial), &mut rng());
    assert_eq!(tube.mesh.vertex_count(), tube_vertex_count(length, radial));
    assert_eq!(tube.mesh.triangle_count(), (length * radial * 2) as usize);
    assert_eq!(tube.ring_count(), length as usize + 1);
    assert!(tube.mesh.indices_in_range());
  }
}

#[test]
fn test_uvs_span_unit_square() {
  let curve = straight(2.0);
  let tube = build_tube(&input(&curve, 4, 8), &mut rng());

  assert_eq!(tube.mesh.uvs[0], [0.0, 0.0]);
  assert_eq!(*tube.mesh.uvs.last().unwrap(), [1.0, 1.0]);
  for uv in &tube.mesh.uvs {
    assert!((0.0..=1.0).contains(&uv[0]));
    assert!((0.0..=1.0).contains(&uv[1]));
  }
}

/// Ring radius shrinks linearly along the straight tube.
#[test]
fn test_rings_taper() {
  let curve = straight(4.0);
  let tube = build_tube(&input(&curve, 4, 8), &mut rng());
  let stride = 9;

  for ring in 0..=4usize {
    let expected = 0.5 - ring as f32 * 0.05;
    let center = curve.point_at(ring as f32 / 4.0);
    for j in 0..stride {
      let p = Vec3::from_array(tube.mesh.positions[ring * stride + j]);
      assert!(
        ((p - center).length() - expected).abs() < 1e-4,
        "ring {ring} vertex {j}"
      );
    }
  }
}

#[test]
fn test_radius_clamped_positive() {
  let curve = straight(1.0);
  let mut params = input(&curve, 5, 4);
  params.shrink_per_segment = 10.0;
  let tube = build_tube(&params, &mut rng());

  for i in 1..=5 {
    assert_eq!(ring_radius(0.5, 10.0, i), MIN_RADIUS);
  }
  assert!(tube.mesh.positions.iter().flatten().all(|c| c.is_finite()));
}

#[test]
fn test_ring_radius_rejects_nan() {
  assert_eq!(ring_radius(f32::NAN, 0.1, 2), MIN_RADIUS);
  assert_eq!(ring_radius(1.0, 0.25, 2), 0.5);
}

/// Every triangle faces away from the tube axis.
#[test]
fn test_winding_faces_outward() {
  let curve = straight(2.0);
  let tube = build_tube(&input(&curve, 3, 6), &mut rng());
  let mesh = &tube.mesh;

  for tri in mesh.indices.chunks(3) {
    let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(mesh.positions[i as usize]));
    let face = (b - a).cross(c - a);
    let centroid = (a + b + c) / 3.0;
    let outward = Vec3::new(centroid.x, 0.0, centroid.z);
    assert!(face.dot(outward) > 0.0, "inward triangle {tri:?}");
  }
}

#[test]
fn test_normals_are_unit_and_radial() {
  let curve = straight(2.0);
  let tube = build_tube(&input(&curve, 2, 5), &mut rng());
  for (p, n) in tube.mesh.positions.iter().zip(&tube.mesh.normals) {
    let n = Vec3::from_array(*n);
    assert!((n.length() - 1.0).abs() < 1e-4);
    assert!(n.y.abs() < 1e-4);
    let radial = Vec3::new(p[0], 0.0, p[2]).normalize();
    assert!(n.dot(radial) > 0.999);
  }
}

/// Jitter moves ring centers along the tangent only, within the bound.
#[test]
fn test_sample_jitter_bounded_along_tangent() {
  let curve = straight(2.0);
  let mut params = input(&curve, 4, 6);
  params.sample_jitter = 0.05;
  let tube = build_tube(&params, &mut rng());
  let stride = 7;

  for ring in 0..=4usize {
    let center: Vec3 = tube.mesh.positions[ring * stride..ring * stride + stride - 1]
      .iter()
      .map(|p| Vec3::from_array(*p))
      .sum::<Vec3>()
      / (stride - 1) as f32;
    let nominal = curve.point_at(ring as f32 / 4.0);
    let offset = center - nominal;
    assert!(offset.x.abs() < 1e-4 && offset.z.abs() < 1e-4);
    assert!(offset.y.abs() <= 0.05 * 2.0 + 1e-3);
  }
}

#[test]
fn test_tessellation_minimums() {
  let curve = straight(1.0);
  let tube = build_tube(&input(&curve, 0, 1), &mut rng());
  assert_eq!(tube.mesh.vertex_count(), tube_vertex_count(1, 3));
}

#[test]
fn test_degenerate_curve_stays_finite() {
  let curve = CatmullRomCurve::new(vec![Vec3::ONE; 3]).unwrap();
  let tube = build_tube(&input(&curve, 3, 5), &mut rng());
  assert!(tube.mesh.positions.iter().flatten().all(|c| c.is_finite()));
  assert!(tube.mesh.normals.iter().flatten().all(|c| c.is_finite()));
}
