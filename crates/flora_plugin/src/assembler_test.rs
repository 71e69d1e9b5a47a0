use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::species::{BranchLevel, PlacementRule, SubBranchRule};
use crate::tube::tube_vertex_count;

fn rng() -> StdRng {
  StdRng::seed_from_u64(0xA55E)
}

fn single_trunk() -> SpeciesConfig {
  let mut species = SpeciesConfig::shrub();
  species.name = "stick".into();
  species.depth = 0;
  species.levels = vec![BranchLevel::default()];
  species
}

// =========================================================================
// Scenario A
// =========================================================================

#[test]
fn test_single_trunk_vertex_count() {
  let species = single_trunk();
  let tree = assemble(&species, &mut rng()).unwrap();

  assert_eq!(tree.skeleton.len(), 1);
  assert!(tree.skeleton.root().children.is_empty());
  assert_eq!(
    tree.group.branches.vertex_count(),
    tube_vertex_count(species.tube.length_segments, species.tube.radial_segments)
  );
  assert!(tree.leaf_matrices.is_empty());
  assert!(tree.group.leaves.is_none());
  assert!(tree.group.flowers.is_none());
}

// =========================================================================
// Merge integrity
// =========================================================================

#[test]
fn test_merged_indices_in_range_for_presets() {
  for name in SpeciesConfig::PRESET_NAMES {
    let species = SpeciesConfig::preset(name).unwrap();
    let tree = assemble(&species, &mut rng()).unwrap();

    for mesh in tree.group.meshes() {
      assert!(mesh.indices_in_range(), "{name}: index past vertex count");
      assert_eq!(mesh.normals.len(), mesh.positions.len());
      assert_eq!(mesh.uvs.len(), mesh.positions.len());
    }

    let per_tube = tube_vertex_count(species.tube.length_segments, species.tube.radial_segments);
    assert_eq!(tree.group.branches.vertex_count(), per_tube * tree.skeleton.len());
  }
}

/// The second tube's indices start exactly at the first tube's vertex count.
#[test]
fn test_branch_offsets_shift_by_running_count() {
  let mut species = single_trunk();
  species.depth = 1;
  species.levels = vec![
    BranchLevel {
      sub_branches: vec![SubBranchRule {
        position: 0.5,
        position_jitter: 0.0,
        angle: 0.5,
        angle_jitter: 0.0,
        length: 0.5,
        length_jitter: 0.0,
        count: 1,
      }],
      ..Default::default()
    },
    BranchLevel::default(),
  ];
  let tree = assemble(&species, &mut rng()).unwrap();
  let per_tube = tube_vertex_count(species.tube.length_segments, species.tube.radial_segments) as u32;
  let per_tube_indices = (species.tube.length_segments * species.tube.radial_segments * 6) as usize;

  let mesh = &tree.group.branches;
  assert_eq!(mesh.vertex_count() as u32, 2 * per_tube);
  let first = &mesh.indices[..per_tube_indices];
  let second = &mesh.indices[per_tube_indices..];
  assert!(first.iter().all(|&i| i < per_tube));
  assert!(second.iter().all(|&i| i >= per_tube && i < 2 * per_tube));
  assert_eq!(second.iter().min(), Some(&per_tube));
}

// =========================================================================
// Placements
// =========================================================================

#[test]
fn test_leaf_count_matches_terminals() {
  let species = SpeciesConfig::oak();
  let tree = assemble(&species, &mut rng()).unwrap();

  let terminal_leaf_rules: u32 = species.levels[species.depth as usize]
    .leaves
    .iter()
    .map(|r| r.count)
    .sum();
  let terminals_at_depth = tree
    .skeleton
    .iter()
    .filter(|(_, n)| n.is_terminal() && n.depth == species.depth)
    .count();

  assert_eq!(tree.leaf_matrices.len(), terminals_at_depth * terminal_leaf_rules as usize);
  let leaves = tree.group.leaves.as_ref().unwrap();
  let template = leaf_template(&species.leaf);
  assert_eq!(leaves.vertex_count(), template.vertex_count() * tree.leaf_matrices.len());
}

#[test]
fn test_flowers_require_flower_style() {
  let mut species = SpeciesConfig::sakura();
  let tree = assemble(&species, &mut rng()).unwrap();
  assert!(!tree.flower_matrices.is_empty());
  assert!(tree.group.flowers.is_some());

  species.flower = None;
  let tree = assemble(&species, &mut rng()).unwrap();
  assert!(tree.flower_matrices.is_empty());
  assert!(tree.group.flowers.is_none());
}

/// Matrices are returned even when placements are not baked.
#[test]
fn test_unmerged_keeps_matrices() {
  let mut species = SpeciesConfig::shrub();
  species.merge_placements = false;
  let tree = assemble(&species, &mut rng()).unwrap();

  assert!(!tree.leaf_matrices.is_empty());
  assert!(tree.group.leaves.is_none());
}

#[test]
fn test_placements_sit_on_branches() {
  let mut species = single_trunk();
  species.levels[0].leaves = vec![PlacementRule {
    position: 1.0,
    position_jitter: 0.0,
    angle: 0.4,
    angle_jitter: 0.0,
    count: 3,
  }];
  let tree = assemble(&species, &mut rng()).unwrap();
  let tip = tree.skeleton.root().end();

  assert_eq!(tree.leaf_matrices.len(), 3);
  for m in &tree.leaf_matrices {
    assert!((m.w_axis.truncate() - tip).length() < 1e-4);
  }
}

#[test]
fn test_bake_instances() {
  let template = leaf_template(&species_leaf());
  let matrices = [Mat4::IDENTITY, Mat4::from_translation(glam::Vec3::X * 3.0)];
  let baked = bake_instances(&template, &matrices);

  assert_eq!(baked.vertex_count(), template.vertex_count() * 2);
  assert!(baked.indices_in_range());
  assert_eq!(baked.positions[template.vertex_count()][0], template.positions[0][0] + 3.0);
  assert!(bake_instances(&template, &[]).is_empty());
}

fn species_leaf() -> crate::species::LeafStyle {
  SpeciesConfig::oak().leaf
}

// =========================================================================
// Determinism and errors
// =========================================================================

#[test]
fn test_same_seed_same_geometry() {
  let species = SpeciesConfig::sakura();
  let a = assemble(&species, &mut StdRng::seed_from_u64(77)).unwrap();
  let b = assemble(&species, &mut StdRng::seed_from_u64(77)).unwrap();
  assert_eq!(a.group.branches, b.group.branches);
  assert_eq!(a.leaf_matrices, b.leaf_matrices);
  assert_eq!(a.flower_matrices, b.flower_matrices);
}

#[test]
fn test_missing_level_is_config_error() {
  let mut species = SpeciesConfig::oak();
  species.levels.truncate(2);
  let err = assemble(&species, &mut rng()).unwrap_err();
  assert!(matches!(err, ConfigError::MissingLevel { depth: 3, levels: 2, .. }));
}

#[test]
fn test_geometry_is_finite() {
  let tree = assemble(&SpeciesConfig::pine(), &mut rng()).unwrap();
  for mesh in tree.group.meshes() {
    assert!(mesh.positions.iter().flatten().all(|c| c.is_finite()));
    assert!(mesh.normals.iter().flatten().all(|c| c.is_finite()));
  }
  assert!(tree.group.vertex_count() > 0);
  assert!(tree.group.triangle_count() > 0);
}
