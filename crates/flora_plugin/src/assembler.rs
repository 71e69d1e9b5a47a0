//! Tree assembler: species -> skeleton -> tubes -> one render group.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Assembly                                                                │
//! │                                                                         │
//! │  SpeciesConfig ──validate──► build_skeleton ──► depth-first node order  │
//! │                                                       │                 │
//! │           one u64 seed per node, drawn from caller rng │                 │
//! │                                                       ▼                 │
//! │  ┌─────────────────────────────────────────────────────────┐            │
//! │  │ par_iter: build_tube(node)  (+ placements if terminal)  │            │
//! │  │ → BranchMesh { mesh, frames, leaves, flowers }          │            │
//! │  └─────────────────────────────────────────────────────────┘            │
//! │                                                       │                 │
//! │                                                       ▼                 │
//! │  merge (indices shifted by running vertex count)                        │
//! │  → RenderGroup { branches, leaves?, flowers? } + placement matrices     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collection preserves node order, so merged output only depends on the
//! caller's generator, never on thread scheduling.

use glam::Mat4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::billboard::{flower_template, leaf_template};
use crate::placement::build_placements;
use crate::skeleton::{build_skeleton, NodeId, Skeleton};
use crate::species::{ConfigError, SpeciesConfig};
use crate::tube::{build_tube, BranchMesh, TubeInput};
use crate::types::MeshData;

/// Meshes produced for one species template.
#[derive(Clone, Debug, Default)]
pub struct RenderGroup {
  /// Trunk and every branch tube, merged.
  pub branches: MeshData,
  /// Leaf template baked at every leaf placement (when merging is enabled).
  pub leaves: Option<MeshData>,
  /// Flower template baked at every flower placement (when merging is
  /// enabled and the species has flowers).
  pub flowers: Option<MeshData>,
}

impl RenderGroup {
  /// Total vertices across all meshes.
  pub fn vertex_count(&self) -> usize {
    self.meshes().map(MeshData::vertex_count).sum()
  }

  /// Total triangles across all meshes.
  pub fn triangle_count(&self) -> usize {
    self.meshes().map(MeshData::triangle_count).sum()
  }

  /// Every mesh present in the group.
  pub fn meshes(&self) -> impl Iterator<Item = &MeshData> {
    std::iter::once(&self.branches)
      .chain(self.leaves.as_ref())
      .chain(self.flowers.as_ref())
  }
}

/// Output of [`assemble`].
#[derive(Clone, Debug, Default)]
pub struct AssembledTree {
  pub group: RenderGroup,
  /// The skeleton the meshes were generated from.
  pub skeleton: Skeleton,
  /// Every leaf placement, in branch order. Returned even when merged.
  pub leaf_matrices: Vec<Mat4>,
  /// Every flower placement, in branch order. Returned even when merged.
  pub flower_matrices: Vec<Mat4>,
}

/// Generate the full template geometry for one species.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "assembler::assemble", fields(species = %species.name)))]
pub fn assemble(species: &SpeciesConfig, rng: &mut impl Rng) -> Result<AssembledTree, ConfigError> {
  let skeleton = build_skeleton(species, rng)?;

  let order = skeleton.depth_first();
  let seeds: Vec<u64> = order.iter().map(|_| rng.random()).collect();

  let branch_meshes: Vec<BranchMesh> = {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("mesh_branches", count = order.len()).entered();

    order
      .par_iter()
      .zip(seeds.par_iter())
      .map(|(&id, &seed)| mesh_branch(species, &skeleton, id, &mut StdRng::seed_from_u64(seed)))
      .collect()
  };

  let branches = MeshData::merge(branch_meshes.iter().map(|b| &b.mesh));
  let leaf_matrices: Vec<Mat4> = branch_meshes.iter().flat_map(|b| b.leaves.iter().copied()).collect();
  let flower_matrices: Vec<Mat4> = branch_meshes.iter().flat_map(|b| b.flowers.iter().copied()).collect();

  let (leaves, flowers) = if species.merge_placements {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("merge_placements").entered();

    let leaves = (!leaf_matrices.is_empty()).then(|| bake_instances(&leaf_template(&species.leaf), &leaf_matrices));
    let flowers = species
      .flower
      .as_ref()
      .filter(|_| !flower_matrices.is_empty())
      .map(|style| bake_instances(&flower_template(style), &flower_matrices));
    (leaves, flowers)
  } else {
    (None, None)
  };

  #[cfg(feature = "tracing")]
  tracing::debug!(
    branches = skeleton.len(),
    vertices = branches.vertex_count(),
    leaves = leaf_matrices.len(),
    flowers = flower_matrices.len(),
    "tree assembled"
  );

  Ok(AssembledTree {
    group: RenderGroup {
      branches,
      leaves,
      flowers,
    },
    skeleton,
    leaf_matrices,
    flower_matrices,
  })
}

/// Tube (and, on terminal branches, placements) for one skeleton node.
fn mesh_branch(species: &SpeciesConfig, skeleton: &Skeleton, id: NodeId, rng: &mut StdRng) -> BranchMesh {
  let node = skeleton.node(id);
  let curve = node.curve();
  let base_radius = species.radius_at_depth(node.depth);
  let length_segments = species.tube.length_segments.max(1);

  let input = TubeInput {
    curve: &curve,
    base_radius,
    length_segments,
    radial_segments: species.tube.radial_segments,
    shrink_per_segment: base_radius * species.taper_at_depth(node.depth) / length_segments as f32,
    sample_jitter: species.tube.sample_offset,
  };
  let mut branch = build_tube(&input, rng);

  if !node.is_terminal() {
    return branch;
  }
  let Some(level) = species.level(node.depth) else {
    return branch;
  };

  for rule in &level.leaves {
    let placements = build_placements(rule, &curve, &branch.frames, species.leaf.scale, rng);
    branch.leaves.extend(placements);
  }
  if let Some(flower) = &species.flower {
    for rule in &level.flowers {
      let placements = build_placements(rule, &curve, &branch.frames, flower.scale, rng);
      branch.flowers.extend(placements);
    }
  }

  branch
}

/// Copy `template` once per matrix into one merged mesh.
pub fn bake_instances(template: &MeshData, matrices: &[Mat4]) -> MeshData {
  let mut merged = MeshData::with_capacity(
    template.vertex_count() * matrices.len(),
    template.indices.len() * matrices.len(),
  );
  for matrix in matrices {
    merged.append(&template.transformed(matrix));
  }
  merged
}

#[cfg(test)]
#[path = "assembler_test.rs"]
mod assembler_test;
