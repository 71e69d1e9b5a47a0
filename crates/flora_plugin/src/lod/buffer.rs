//! InstancedDrawBuffer - per-mesh, per-level instance matrices.
//!
//! Grow-only: an upload that fits overwrites the first `count` slots and
//! shrinks the logical count; one that does not fit replaces the storage
//! with a new allocation sized to the request. The superseded storage is
//! dropped, never pooled or read again.

use glam::Mat4;

/// What an upload did to the buffer's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUpdate {
  /// Existing storage reused.
  Overwritten,
  /// Storage replaced with a larger allocation.
  Reallocated,
}

/// GPU-facing instance transform array for one mesh at one level.
#[derive(Clone, Debug, Default)]
pub struct InstancedDrawBuffer {
  matrices: Vec<Mat4>,
  count: usize,
  reallocations: u32,
}

impl InstancedDrawBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the live instances with `instances`.
  pub fn upload(&mut self, instances: &[Mat4]) -> BufferUpdate {
    let count = instances.len();
    if count <= self.matrices.len() {
      self.matrices[..count].copy_from_slice(instances);
      self.count = count;
      BufferUpdate::Overwritten
    } else {
      self.matrices = instances.to_vec();
      self.count = count;
      self.reallocations += 1;
      BufferUpdate::Reallocated
    }
  }

  /// Live instance count (what the draw call uses).
  #[inline]
  pub fn count(&self) -> usize {
    self.count
  }

  /// Allocated slots.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.matrices.len()
  }

  /// Live instances.
  #[inline]
  pub fn instances(&self) -> &[Mat4] {
    &self.matrices[..self.count]
  }

  /// Number of uploads that needed a new allocation.
  pub fn reallocations(&self) -> u32 {
    self.reallocations
  }
}
