//! LodInstanceManager - per-frame culling, LOD bucketing and buffer upload.
//!
//! Each registered species owns an octree of instance transforms, a sorted
//! list of [`LevelBucket`]s and one [`InstancedDrawBuffer`] per (level, mesh).
//!
//! ```text
//! render(camera, sink)
//!   frustum = camera.frustum().expanded(margin)
//!   per species (rayon when parallel_species):
//!     octree.query_frustum(frustum)       read-only
//!     bucket by select_level(distance)    fresh FrameBatches
//!   per species, serial:
//!     upload each level into its buffers  grow-only
//!     sink.submit(species, level, mesh, buffer)
//! ```
//!
//! Classification never shares scratch state between species, so the
//! parallel path produces the same batches as the serial one.

use glam::Mat4;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use super::buffer::{BufferUpdate, InstancedDrawBuffer};
use super::camera::CameraView;
use super::level::{select_level, sort_levels, LevelBucket, MeshHandle};
use crate::constants::{DEFAULT_FRUSTUM_MARGIN, DEFAULT_OCTREE_CAPACITY, DEFAULT_OCTREE_MAX_DEPTH};
#[cfg(feature = "metrics")]
use crate::metrics::LodMetrics;
use crate::octree::{Aabb3, Frustum, Octree, OctreeEntry};
use crate::population::{generate_transforms, HeightField, PlacementStrategy};
use crate::presentation::InstanceSink;
use crate::types::InstanceId;

/// Handle of a registered species.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct SpeciesId(pub u32);

impl SpeciesId {
  #[inline]
  pub fn index(&self) -> usize {
    self.0 as usize
  }
}

/// Manager tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
  /// Outward push of every frustum plane, so instances whose origin is just
  /// off-screen but whose crown is visible are kept.
  pub frustum_margin: f32,
  /// Classify species on the rayon pool.
  pub parallel_species: bool,
  pub octree_capacity: usize,
  pub octree_max_depth: u32,
}

impl Default for LodConfig {
  fn default() -> Self {
    Self {
      frustum_margin: DEFAULT_FRUSTUM_MARGIN,
      parallel_species: true,
      octree_capacity: DEFAULT_OCTREE_CAPACITY,
      octree_max_depth: DEFAULT_OCTREE_MAX_DEPTH,
    }
  }
}

/// One frame's visible transforms of one species, indexed by level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameBatches {
  pub levels: Vec<Vec<Mat4>>,
}

impl FrameBatches {
  fn with_levels(count: usize) -> Self {
    Self {
      levels: vec![Vec::new(); count],
    }
  }

  /// Visible count per level.
  pub fn counts(&self) -> Vec<usize> {
    self.levels.iter().map(Vec::len).collect()
  }

  pub fn total(&self) -> usize {
    self.levels.iter().map(Vec::len).sum()
  }
}

/// Per-species outcome of one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesFrame {
  pub species: SpeciesId,
  pub visible_per_level: Vec<usize>,
}

/// Outcome of one [`LodInstanceManager::render`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
  pub species: Vec<SpeciesFrame>,
  pub visible: usize,
  pub reallocations: usize,
  pub overwrites: usize,
  pub elapsed_us: u64,
}

/// Everything the manager keeps for one species.
#[derive(Debug)]
struct SpeciesLod {
  name: String,
  octree: Octree,
  levels: Vec<LevelBucket>,
  /// `buffers[level][mesh]`, parallel to `levels[level].meshes`.
  buffers: Vec<Vec<InstancedDrawBuffer>>,
}

impl SpeciesLod {
  /// Cull and bucket this species' instances.
  fn classify(&self, frustum: &Frustum, camera: &CameraView) -> FrameBatches {
    let mut batches = FrameBatches::with_levels(self.levels.len());
    if self.levels.is_empty() {
      return batches;
    }

    let mut visible: Vec<OctreeEntry> = Vec::new();
    self.octree.query_frustum_into(frustum, &mut visible);
    for entry in &visible {
      let level = select_level(&self.levels, camera.distance_to(entry.position()));
      batches.levels[level].push(entry.transform);
    }
    batches
  }
}

/// Owns every species' octree, LOD buckets and instance buffers.
#[derive(Debug)]
pub struct LodInstanceManager {
  config: LodConfig,
  species: Vec<SpeciesLod>,
  next_instance: u64,
  #[cfg(feature = "metrics")]
  metrics: LodMetrics,
}

impl Default for LodInstanceManager {
  fn default() -> Self {
    Self::new(LodConfig::default())
  }
}

impl LodInstanceManager {
  pub fn new(config: LodConfig) -> Self {
    Self {
      config,
      species: Vec::new(),
      next_instance: 0,
      #[cfg(feature = "metrics")]
      metrics: LodMetrics::new(),
    }
  }

  pub fn config(&self) -> &LodConfig {
    &self.config
  }

  /// Register a species with an empty octree over `bounds`.
  ///
  /// Levels are sorted by threshold. A species with no levels is accepted
  /// and never submits anything.
  pub fn register_species(
    &mut self,
    name: impl Into<String>,
    bounds: Aabb3,
    mut levels: Vec<LevelBucket>,
  ) -> SpeciesId {
    sort_levels(&mut levels);
    let buffers = levels
      .iter()
      .map(|level| vec![InstancedDrawBuffer::new(); level.meshes.len()])
      .collect();
    let id = SpeciesId(self.species.len() as u32);
    let name = name.into();

    #[cfg(feature = "tracing")]
    tracing::debug!(species = %name, id = id.0, levels = levels.len(), "registered species");

    self.species.push(SpeciesLod {
      name,
      octree: Octree::with_max_depth(bounds, self.config.octree_capacity, self.config.octree_max_depth),
      levels,
      buffers,
    });
    id
  }

  pub fn species_count(&self) -> usize {
    self.species.len()
  }

  pub fn species_name(&self, species: SpeciesId) -> Option<&str> {
    self.species.get(species.index()).map(|s| s.name.as_str())
  }

  /// Sorted levels of a species.
  pub fn levels(&self, species: SpeciesId) -> Option<&[LevelBucket]> {
    self.species.get(species.index()).map(|s| s.levels.as_slice())
  }

  pub fn octree(&self, species: SpeciesId) -> Option<&Octree> {
    self.species.get(species.index()).map(|s| &s.octree)
  }

  /// Instances indexed for a species (0 for unknown ids).
  pub fn instance_count(&self, species: SpeciesId) -> usize {
    self.octree(species).map_or(0, Octree::len)
  }

  /// Draw buffer of `mesh_index` at `level`.
  pub fn buffer(&self, species: SpeciesId, level: usize, mesh_index: usize) -> Option<&InstancedDrawBuffer> {
    self
      .species
      .get(species.index())?
      .buffers
      .get(level)?
      .get(mesh_index)
  }

  #[cfg(feature = "metrics")]
  pub fn metrics(&self) -> &LodMetrics {
    &self.metrics
  }

  #[cfg(feature = "metrics")]
  pub fn metrics_mut(&mut self) -> &mut LodMetrics {
    &mut self.metrics
  }

  /// Allocate a fresh instance id.
  pub fn next_instance_id(&mut self) -> InstanceId {
    let id = InstanceId(self.next_instance);
    self.next_instance += 1;
    id
  }

  /// Index one instance. Returns `false` for an unknown species or a
  /// transform outside the species bounds.
  pub fn insert(&mut self, species: SpeciesId, id: InstanceId, transform: Mat4) -> bool {
    let Some(lod) = self.species.get_mut(species.index()) else {
      return false;
    };
    let inserted = lod.octree.insert(id, transform);
    #[cfg(feature = "metrics")]
    {
      if inserted && crate::metrics::is_enabled() {
        self.metrics.indexed_instances += 1;
      }
    }
    inserted
  }

  /// Generate up to `count` transforms with `strategy` and index them.
  /// Returns how many were inserted.
  pub fn populate(
    &mut self,
    species: SpeciesId,
    count: usize,
    strategy: &PlacementStrategy,
    ground: &dyn HeightField,
    rng: &mut impl Rng,
  ) -> usize {
    if species.index() >= self.species.len() {
      return 0;
    }
    let transforms = generate_transforms(strategy, count, ground, rng);
    let mut inserted = 0;
    for transform in transforms {
      let id = self.next_instance_id();
      if self.insert(species, id, transform) {
        inserted += 1;
      }
    }

    #[cfg(feature = "tracing")]
    tracing::info!(species = species.0, requested = count, inserted, "populated species");
    inserted
  }

  /// Cull and bucket every species without touching buffers.
  pub fn classify(&self, camera: &CameraView) -> Vec<FrameBatches> {
    let frustum = self.frame_frustum(camera);
    if self.config.parallel_species {
      self
        .species
        .par_iter()
        .map(|lod| lod.classify(&frustum, camera))
        .collect()
    } else {
      self.species.iter().map(|lod| lod.classify(&frustum, camera)).collect()
    }
  }

  fn frame_frustum(&self, camera: &CameraView) -> Frustum {
    let frustum = camera.frustum();
    if self.config.frustum_margin > 0.0 {
      frustum.expanded(self.config.frustum_margin)
    } else {
      frustum
    }
  }

  /// Run one frame: classify, upload and submit.
  ///
  /// Every (species, level, mesh) is submitted each frame, including levels
  /// with nothing visible, so the host sees a zero count rather than stale
  /// instances.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "lod::render"))]
  pub fn render(&mut self, camera: &CameraView, sink: &mut dyn InstanceSink) -> FrameReport {
    let start = Instant::now();

    let batches = {
      #[cfg(feature = "tracing")]
      let _span = tracing::info_span!("classify").entered();
      self.classify(camera)
    };

    #[cfg(feature = "metrics")]
    self.metrics.begin_frame();

    #[cfg(feature = "tracing")]
    let _upload = tracing::info_span!("upload").entered();

    let mut report = FrameReport::default();
    for (index, (lod, frame)) in self.species.iter_mut().zip(batches).enumerate() {
      let species = SpeciesId(index as u32);
      let visible_per_level = frame.counts();

      for (level, instances) in frame.levels.iter().enumerate() {
        for (slot, &mesh) in lod.levels[level].meshes.iter().enumerate() {
          let buffer = &mut lod.buffers[level][slot];
          match buffer.upload(instances) {
            BufferUpdate::Reallocated => {
              report.reallocations += 1;
              #[cfg(feature = "tracing")]
              tracing::debug!(
                species = %lod.name,
                level,
                mesh = mesh.0,
                capacity = buffer.capacity(),
                "instance buffer reallocated"
              );
            }
            BufferUpdate::Overwritten => report.overwrites += 1,
          }
          sink.submit(species, level, mesh, buffer);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_level(level, instances.len());
      }

      report.visible += frame.total();
      report.species.push(SpeciesFrame {
        species,
        visible_per_level,
      });
    }

    report.elapsed_us = start.elapsed().as_micros() as u64;

    #[cfg(feature = "metrics")]
    {
      for _ in 0..report.reallocations {
        self.metrics.record_buffer_update(BufferUpdate::Reallocated);
      }
      for _ in 0..report.overwrites {
        self.metrics.record_buffer_update(BufferUpdate::Overwritten);
      }
      self.metrics.record_frame_timing(report.elapsed_us);
    }

    report
  }

  /// Meshes of `level`, or empty for unknown ids.
  pub fn level_meshes(&self, species: SpeciesId, level: usize) -> &[MeshHandle] {
    self
      .levels(species)
      .and_then(|levels| levels.get(level))
      .map(|bucket| bucket.meshes.as_slice())
      .unwrap_or(&[])
  }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
