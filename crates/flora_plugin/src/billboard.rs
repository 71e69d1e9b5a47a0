//! Shared leaf and flower template geometry.
//!
//! Templates are unit-sized with their base at the origin and grow along
//! +Y, the axis placement transforms align to the sampled direction.
//! Scale comes from the placement matrix, never from the template.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};

use crate::species::{FlowerShape, FlowerStyle, LeafShape, LeafStyle};
use crate::types::{MeshData, MinMaxAABB};

/// Petals per flower.
const PETALS: u32 = 5;

/// Leaf template for `style.shape`.
pub fn leaf_template(style: &LeafStyle) -> MeshData {
  let mut mesh = MeshData::new();
  match style.shape {
    LeafShape::Plane => push_quad(&mut mesh, Vec3::X, Vec3::Z),
    LeafShape::Cross => {
      push_quad(&mut mesh, Vec3::X, Vec3::Z);
      push_quad(&mut mesh, Vec3::Z, -Vec3::X);
    }
    LeafShape::Diamond => push_diamond(&mut mesh),
  }
  mesh
}

/// Flower template for `style.shape`.
pub fn flower_template(style: &FlowerStyle) -> MeshData {
  let lift = match style.shape {
    FlowerShape::Star => 0.0,
    FlowerShape::Cup => 0.35,
  };

  let mut mesh = MeshData::new();
  let center = mesh.push_vertex(Vec3::ZERO, Vec3::Y, [0.5, 0.5]);
  for petal in 0..PETALS {
    let theta = TAU * petal as f32 / PETALS as f32;
    let half = TAU / (PETALS as f32 * 4.0);
    let left = radial(theta - half) * 0.25;
    let tip = radial(theta) * 0.5 + Vec3::Y * lift;
    let right = radial(theta + half) * 0.25;

    let normal = (left - tip).cross(right - tip).try_normalize().unwrap_or(Vec3::Y);
    let uv = |p: Vec3| [0.5 + p.x, 0.5 + p.z];
    let l = mesh.push_vertex(left, normal, uv(left));
    let t = mesh.push_vertex(tip, normal, uv(tip));
    let r = mesh.push_vertex(right, normal, uv(right));
    mesh.push_triangle(center, r, t);
    mesh.push_triangle(center, t, l);
  }
  mesh
}

/// Crossed-quad stand-in for a whole plant, covering `bounds`.
///
/// Width is the larger horizontal extent, height the vertical extent,
/// centered on the bounds' XZ center with its base at `bounds.min.y`.
/// Empty bounds give an empty mesh.
pub fn impostor_template(bounds: &MinMaxAABB) -> MeshData {
  if !bounds.is_valid() {
    return MeshData::new();
  }
  let (min, max) = (Vec3::from_array(bounds.min), Vec3::from_array(bounds.max));
  let size = max - min;
  let width = size.x.max(size.z).max(f32::EPSILON);
  let height = size.y.max(f32::EPSILON);
  let base = Vec3::new((min.x + max.x) * 0.5, min.y, (min.z + max.z) * 0.5);

  let mut mesh = MeshData::new();
  push_quad(&mut mesh, Vec3::X, Vec3::Z);
  push_quad(&mut mesh, Vec3::Z, -Vec3::X);
  mesh.transformed(&Mat4::from_scale_rotation_translation(
    Vec3::new(width, height, width),
    Quat::IDENTITY,
    base,
  ))
}

#[inline]
fn radial(theta: f32) -> Vec3 {
  let (sin, cos) = theta.sin_cos();
  Vec3::new(cos, 0.0, sin)
}

/// Upright unit quad spanning `width_axis` in `[-0.5, 0.5]` and +Y in
/// `[0, 1]`, facing `normal`.
fn push_quad(mesh: &mut MeshData, width_axis: Vec3, normal: Vec3) {
  let h = width_axis * 0.5;
  let a = mesh.push_vertex(-h, normal, [0.0, 0.0]);
  let b = mesh.push_vertex(h, normal, [1.0, 0.0]);
  let c = mesh.push_vertex(h + Vec3::Y, normal, [1.0, 1.0]);
  let d = mesh.push_vertex(-h + Vec3::Y, normal, [0.0, 1.0]);
  mesh.push_triangle(a, b, c);
  mesh.push_triangle(a, c, d);
}

fn push_diamond(mesh: &mut MeshData) {
  let normal = Vec3::Z;
  let base = mesh.push_vertex(Vec3::ZERO, normal, [0.5, 0.0]);
  let right = mesh.push_vertex(Vec3::new(0.3, 0.5, 0.0), normal, [0.8, 0.5]);
  let tip = mesh.push_vertex(Vec3::Y, normal, [0.5, 1.0]);
  let left = mesh.push_vertex(Vec3::new(-0.3, 0.5, 0.0), normal, [0.2, 0.5]);
  mesh.push_triangle(base, right, tip);
  mesh.push_triangle(base, tip, left);
}
