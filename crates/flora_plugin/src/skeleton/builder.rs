//! Skeleton builder - expands a species into a branch tree.
//!
//! # Per-branch Steps
//!
//! 1. **Path synthesis**: `start`, jittered `mid` (level `disturb`), drooped
//!    `end` (level `gravity`)
//! 2. **Terminal check**: stop at `depth == species.depth` or when the level
//!    has no sub-branch rules
//! 3. **Fan-out**: for each rule, `count` children sprout at
//!    `position ± jitter`, tilted `angle ± jitter` off the local tangent and
//!    spread evenly by `TAU / count` around it
//!
//! Work is driven by an explicit stack instead of recursion.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use smallvec::{smallvec, SmallVec};

use super::{cluster, NodeId, Skeleton};
use crate::constants::{DEFAULT_AXIS, MIN_SEGMENT_LENGTH};
use crate::sampling::{cone_direction, jitter, jitter_fraction, random_perpendicular};
use crate::species::{BranchLevel, BranchStrategy, ConfigError, SpeciesConfig};

/// Generate the branch skeleton for a species.
///
/// Validates the species first; configuration errors are returned before any
/// randomness is consumed.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "skeleton::build", fields(species = %species.name)))]
pub fn build_skeleton(species: &SpeciesConfig, rng: &mut impl Rng) -> Result<Skeleton, ConfigError> {
  species.validate()?;

  let skeleton = match &species.strategy {
    BranchStrategy::FanOut => build_fan_out(species, rng),
    BranchStrategy::Cluster {
      crown_points,
      crown_radius,
      iterations,
    } => cluster::build_clustered(species, *crown_points, *crown_radius, *iterations, rng),
  };

  #[cfg(feature = "tracing")]
  tracing::debug!(
    nodes = skeleton.len(),
    terminals = skeleton.terminal_count(),
    "skeleton built"
  );

  Ok(skeleton)
}

/// Root path: trunk from the origin straight up, shaped by level 0.
pub(crate) fn root_skeleton(species: &SpeciesConfig, rng: &mut impl Rng) -> Skeleton {
  let level = species.level(0).cloned().unwrap_or_default();
  let path = synthesize_path(
    Vec3::ZERO,
    Vec3::Y * species.trunk_length,
    &level,
    rng,
  );
  Skeleton::with_root(species.name.clone(), path)
}

fn build_fan_out(species: &SpeciesConfig, rng: &mut impl Rng) -> Skeleton {
  let mut skeleton = root_skeleton(species, rng);
  let mut stack: Vec<NodeId> = vec![NodeId::ROOT];

  while let Some(id) = stack.pop() {
    let depth = skeleton.node(id).depth;
    if species.is_terminal_depth(depth) {
      continue;
    }
    let (Some(level), Some(child_level)) = (species.level(depth), species.level(depth + 1)) else {
      continue;
    };

    for (origin, end) in fan_out_children(&skeleton, id, level, rng) {
      let path = synthesize_path(origin, end, child_level, rng);
      let child = skeleton.push_child(id, path);
      stack.push(child);
    }
  }

  skeleton
}

/// Start/end points of every child a node spawns under `level`'s rules.
pub(crate) fn fan_out_children(
  skeleton: &Skeleton,
  id: NodeId,
  level: &BranchLevel,
  rng: &mut impl Rng,
) -> Vec<(Vec3, Vec3)> {
  let node = skeleton.node(id);
  let curve = node.curve();
  let parent_length = curve.approx_length().max(MIN_SEGMENT_LENGTH);
  let mut children = Vec::with_capacity(level.child_count() as usize);

  for rule in &level.sub_branches {
    let phase = rng.random::<f32>() * TAU;
    for k in 0..rule.count {
      let u = jitter_fraction(rule.position, rule.position_jitter, rng);
      let origin = curve.point_at(u);
      let tangent = curve.tangent_at(u);
      let angle = jitter(rule.angle, rule.angle_jitter, rng);
      let direction = cone_direction(tangent, angle, phase + TAU * k as f32 / rule.count as f32);
      let length = (jitter(rule.length, rule.length_jitter, rng) * parent_length).max(MIN_SEGMENT_LENGTH);
      children.push((origin, origin + direction * length));
    }
  }

  children
}

/// Three-point branch path: start, disturbed midpoint, drooped end.
pub fn synthesize_path(
  start: Vec3,
  end: Vec3,
  level: &BranchLevel,
  rng: &mut impl Rng,
) -> SmallVec<[Vec3; 3]> {
  let span = end - start;
  let length = span.length().max(MIN_SEGMENT_LENGTH);
  let axis = span.try_normalize().unwrap_or(DEFAULT_AXIS);

  let end = end - Vec3::Y * (level.gravity * length);
  let side = random_perpendicular(axis, rng);
  let mid = start.lerp(end, 0.5) + side * (level.disturb * length * rng.random::<f32>());

  smallvec![start, mid, end]
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
