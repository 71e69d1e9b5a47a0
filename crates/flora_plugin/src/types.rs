//! Core data types for generated vegetation geometry.

use glam::{Mat3, Mat4, Vec3};

/// 4×4 transform placing one leaf, flower or plant instance.
pub type PlacementTransform = Mat4;

/// Identifier of one placed plant instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl InstanceId {
  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Axis-aligned bounding box of mesh vertices.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Create AABB from min/max corners.
  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Expand AABB to include another AABB.
  #[inline]
  pub fn union(&mut self, other: &MinMaxAABB) {
    if other.is_valid() {
      self.encapsulate(other.min);
      self.encapsulate(other.max);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Indexed triangle mesh: the geometry construction primitive handed to the
/// host renderer.
///
/// Attribute arrays are parallel: `positions[i]`, `normals[i]` and `uvs[i]`
/// describe vertex `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
  /// Vertex positions.
  pub positions: Vec<[f32; 3]>,

  /// Unit vertex normals.
  pub normals: Vec<[f32; 3]>,

  /// Texture coordinates.
  pub uvs: Vec<[f32; 2]>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshData {
  pub fn new() -> Self {
    Self::default()
  }

  /// Pre-allocate room for `vertices` vertices and `indices` indices.
  pub fn with_capacity(vertices: usize, indices: usize) -> Self {
    Self {
      positions: Vec::with_capacity(vertices),
      normals: Vec::with_capacity(vertices),
      uvs: Vec::with_capacity(vertices),
      indices: Vec::with_capacity(indices),
      bounds: MinMaxAABB::empty(),
    }
  }

  /// Push one vertex and grow the bounds. Returns its index.
  #[inline]
  pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
    let index = self.positions.len() as u32;
    let p = position.to_array();
    self.positions.push(p);
    self.normals.push(normal.to_array());
    self.uvs.push(uv);
    self.bounds.encapsulate(p);
    index
  }

  /// Push one triangle.
  #[inline]
  pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
    self.indices.extend_from_slice(&[a, b, c]);
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.positions.clear();
    self.normals.clear();
    self.uvs.clear();
    self.indices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  /// Number of vertices in the mesh.
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Append another mesh, shifting its indices by this mesh's current
  /// vertex count.
  pub fn append(&mut self, other: &MeshData) {
    let offset = self.positions.len() as u32;
    self.positions.extend_from_slice(&other.positions);
    self.normals.extend_from_slice(&other.normals);
    self.uvs.extend_from_slice(&other.uvs);
    self.indices.extend(other.indices.iter().map(|&i| i + offset));
    self.bounds.union(&other.bounds);
  }

  /// Copy of this mesh with every vertex transformed by `matrix`.
  ///
  /// Normals use the inverse-transpose so non-uniform scale keeps them
  /// perpendicular to the surface.
  pub fn transformed(&self, matrix: &Mat4) -> MeshData {
    let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();
    let mut out = MeshData::with_capacity(self.positions.len(), self.indices.len());
    for ((p, n), uv) in self.positions.iter().zip(&self.normals).zip(&self.uvs) {
      let position = matrix.transform_point3(Vec3::from_array(*p));
      let normal = (normal_matrix * Vec3::from_array(*n))
        .try_normalize()
        .unwrap_or(Vec3::from_array(*n));
      out.push_vertex(position, normal, *uv);
    }
    out.indices.extend_from_slice(&self.indices);
    out
  }

  /// Merge many meshes into one, shifting indices by the running vertex
  /// count of the meshes before each one.
  pub fn merge<'a>(meshes: impl IntoIterator<Item = &'a MeshData>) -> MeshData {
    let mut merged = MeshData::new();
    for mesh in meshes {
      merged.append(mesh);
    }
    merged
  }

  /// Check every index references an existing vertex.
  pub fn indices_in_range(&self) -> bool {
    let count = self.positions.len() as u32;
    self.indices.iter().all(|&i| i < count)
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
