//! Discrete LOD levels and distance classification.
//!
//! Levels are kept sorted by ascending `distance_threshold`. An instance at
//! distance `d` gets the first level with `d <= threshold`; anything past
//! the last threshold falls into the last level.
//!
//! ```text
//!   distance   0 ────── 30 ────── 80 ──────────► ∞
//!   level      │   0    │    1    │      2       │   thresholds [30, 80, 200]
//!                       ▲
//!              d == 30 stays on level 0 (<=)
//! ```

use smallvec::SmallVec;

/// Opaque handle to a mesh asset owned by the host renderer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

/// One LOD level of a species.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelBucket {
  /// Largest camera distance at which this level still applies.
  pub distance_threshold: f32,
  /// Meshes instanced together at this level (e.g. trunk + leaves).
  pub meshes: SmallVec<[MeshHandle; 2]>,
}

impl LevelBucket {
  pub fn new(distance_threshold: f32, meshes: impl IntoIterator<Item = MeshHandle>) -> Self {
    Self {
      distance_threshold,
      meshes: meshes.into_iter().collect(),
    }
  }

  /// Level drawing a single mesh.
  pub fn single(distance_threshold: f32, mesh: MeshHandle) -> Self {
    Self::new(distance_threshold, [mesh])
  }
}

/// Sort levels by ascending threshold (NaN thresholds last).
pub fn sort_levels(levels: &mut [LevelBucket]) {
  levels.sort_by(|a, b| a.distance_threshold.total_cmp(&b.distance_threshold));
}

/// Level index for an instance `distance` away from the camera.
///
/// A distance exactly equal to a threshold stays on that (more detailed)
/// level. A NaN distance lands on the last level. Returns 0 for an empty
/// level list.
#[inline]
pub fn select_level(levels: &[LevelBucket], distance: f32) -> usize {
  levels
    .iter()
    .position(|level| distance <= level.distance_threshold)
    .unwrap_or_else(|| levels.len().saturating_sub(1))
}
