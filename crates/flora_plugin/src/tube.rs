//! Tube mesher: turns one branch path into a tapering cylindrical surface.
//!
//! # Ring Layout
//!
//! ```text
//!   ring L   o──o──o──o──o        v = 1
//!            │ ╲│ ╲│ ╲│ ╲│
//!   ring i+1 o──o──o──o──o
//!            │ ╲│ ╲│ ╲│ ╲│        2 triangles per radial step
//!   ring i   o──o──o──o──o
//!            ...
//!   ring 0   o──o──o──o──o        v = 0
//!          u=0            u=1     (seam vertex duplicated)
//! ```
//!
//! Ring `i` sits at curve parameter `i / length_segments`, nudged along the
//! tangent by up to `sample_jitter * path_length`. Its radius is
//! `base_radius - i * shrink_per_segment`, never below [`MIN_RADIUS`].
//! Vertices are spread around the rotation-minimizing frame of the sample,
//! so consecutive rings do not twist.

use std::f32::consts::TAU;

use glam::Mat4;
use rand::Rng;

use crate::constants::MIN_RADIUS;
use crate::curve::{CatmullRomCurve, Frame};
use crate::sampling::signed_unit;
use crate::types::MeshData;

/// Inputs for one tube.
#[derive(Clone, Copy, Debug)]
pub struct TubeInput<'a> {
  pub curve: &'a CatmullRomCurve,
  pub base_radius: f32,
  pub length_segments: u32,
  pub radial_segments: u32,
  /// Radius lost per ring.
  pub shrink_per_segment: f32,
  /// Ring jitter along the tangent, as a fraction of path length.
  pub sample_jitter: f32,
}

/// Geometry of one branch plus its placement side channels.
#[derive(Clone, Debug, Default)]
pub struct BranchMesh {
  pub mesh: MeshData,
  /// One frame per ring, reused for placement sampling.
  pub frames: Vec<Frame>,
  /// Leaf placements sprouting from this branch.
  pub leaves: Vec<Mat4>,
  /// Flower placements sprouting from this branch.
  pub flowers: Vec<Mat4>,
}

impl BranchMesh {
  /// Ring count (`length_segments + 1`).
  pub fn ring_count(&self) -> usize {
    self.frames.len()
  }
}

/// Vertex count of a tube with the given tessellation.
#[inline]
pub fn tube_vertex_count(length_segments: u32, radial_segments: u32) -> usize {
  (length_segments as usize + 1) * (radial_segments as usize + 1)
}

/// Radius of ring `ring`, clamped to [`MIN_RADIUS`].
#[inline]
pub fn ring_radius(base_radius: f32, shrink_per_segment: f32, ring: u32) -> f32 {
  let radius = base_radius - ring as f32 * shrink_per_segment;
  if radius.is_finite() {
    radius.max(MIN_RADIUS)
  } else {
    MIN_RADIUS
  }
}

/// Build the tube mesh for one branch.
///
/// Tessellation below 1 length segment or 3 radial segments is raised to
/// that minimum.
pub fn build_tube(input: &TubeInput, rng: &mut impl Rng) -> BranchMesh {
  let length_segments = input.length_segments.max(1);
  let radial_segments = input.radial_segments.max(3);
  let rings = length_segments + 1;
  let stride = radial_segments + 1;

  let frames = input.curve.compute_frames(length_segments as usize);
  let path_length = input.curve.approx_length();
  let max_offset = input.sample_jitter.max(0.0) * path_length;

  let mut mesh = MeshData::with_capacity(
    tube_vertex_count(length_segments, radial_segments),
    (length_segments * radial_segments * 6) as usize,
  );

  for (i, frame) in frames.iter().enumerate().take(rings as usize) {
    let v = i as f32 / length_segments as f32;
    let offset = if max_offset > 0.0 {
      max_offset * signed_unit(rng)
    } else {
      0.0
    };
    let center = input.curve.point_at(v) + frame.tangent * offset;
    let radius = ring_radius(input.base_radius, input.shrink_per_segment, i as u32);

    for j in 0..stride {
      let u = j as f32 / radial_segments as f32;
      let (sin, cos) = (u * TAU).sin_cos();
      let normal = (frame.normal * cos + frame.binormal * sin).normalize_or(frame.normal);
      mesh.push_vertex(center + normal * radius, normal, [u, v]);
    }
  }

  // Outward winding: (a, d, b) and (d, c, b) with binormal = tangent × normal.
  for i in 0..length_segments {
    for j in 0..radial_segments {
      let a = i * stride + j;
      let b = (i + 1) * stride + j;
      let c = b + 1;
      let d = a + 1;
      mesh.push_triangle(a, d, b);
      mesh.push_triangle(d, c, b);
    }
  }

  BranchMesh {
    mesh,
    frames,
    leaves: Vec::new(),
    flowers: Vec::new(),
  }
}

#[cfg(test)]
#[path = "tube_test.rs"]
mod tube_test;

