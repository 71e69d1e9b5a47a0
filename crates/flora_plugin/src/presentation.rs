//! InstanceSink - callback interface for engine bridges.
//!
//! The LOD manager hands each frame's instance buffers to a sink instead of
//! talking to a GPU API, so the host renderer (or a test) decides what a
//! "draw" means.

use glam::Mat4;

use crate::lod::{InstancedDrawBuffer, MeshHandle, SpeciesId};

/// Receives one instanced draw per (species, level, mesh) per frame.
///
/// `buffer.count()` is the live instance count; it may be zero, in which
/// case the host should draw nothing for that mesh this frame.
///
/// # Example
///
/// ```ignore
/// struct WgpuSink<'a> { pass: &'a mut RenderPass, meshes: &'a MeshTable }
///
/// impl InstanceSink for WgpuSink<'_> {
///   fn submit(&mut self, _species: SpeciesId, _level: usize, mesh: MeshHandle,
///             buffer: &InstancedDrawBuffer) {
///     self.meshes.draw_instanced(self.pass, mesh, buffer.instances());
///   }
/// }
/// ```
pub trait InstanceSink {
  fn submit(&mut self, species: SpeciesId, level: usize, mesh: MeshHandle, buffer: &InstancedDrawBuffer);
}

/// No-op implementation for benchmarks and headless operation.
pub struct NullSink;

impl InstanceSink for NullSink {
  fn submit(&mut self, _species: SpeciesId, _level: usize, _mesh: MeshHandle, _buffer: &InstancedDrawBuffer) {
    // No-op
  }
}

/// One captured draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
  pub species: SpeciesId,
  pub level: usize,
  pub mesh: MeshHandle,
  pub instances: Vec<Mat4>,
}

/// Sink that copies every submission, for tests and offline inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
  pub submissions: Vec<Submission>,
}

impl RecordingSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn clear(&mut self) {
    self.submissions.clear();
  }

  /// Total instances submitted for `species`.
  pub fn instance_count(&self, species: SpeciesId) -> usize {
    self
      .submissions
      .iter()
      .filter(|s| s.species == species)
      .map(|s| s.instances.len())
      .sum()
  }

  /// Submissions for one level of one species.
  pub fn level(&self, species: SpeciesId, level: usize) -> impl Iterator<Item = &Submission> {
    self
      .submissions
      .iter()
      .filter(move |s| s.species == species && s.level == level)
  }
}

impl InstanceSink for RecordingSink {
  fn submit(&mut self, species: SpeciesId, level: usize, mesh: MeshHandle, buffer: &InstancedDrawBuffer) {
    self.submissions.push(Submission {
      species,
      level,
      mesh,
      instances: buffer.instances().to_vec(),
    });
  }
}
