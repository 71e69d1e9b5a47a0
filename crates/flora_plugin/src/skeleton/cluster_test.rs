use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::skeleton::build_skeleton;
use crate::species::{BranchStrategy, SpeciesConfig};

fn rng() -> StdRng {
  StdRng::seed_from_u64(42)
}

/// Two tight blobs far apart.
fn two_blobs() -> Vec<Vec3> {
  let mut points = Vec::new();
  for i in 0..10 {
    let offset = Vec3::splat(i as f32 * 0.01);
    points.push(Vec3::new(-10.0, 0.0, 0.0) + offset);
    points.push(Vec3::new(10.0, 0.0, 0.0) + offset);
  }
  points
}

#[test]
fn test_kmeans_separates_blobs() {
  let clusters = kmeans(&two_blobs(), 2, 10, &mut rng());
  assert_eq!(clusters.len(), 2);

  let mut xs: Vec<f32> = clusters.iter().map(|c| c.centroid.x).collect();
  xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
  assert!((xs[0] + 10.0).abs() < 0.1);
  assert!((xs[1] - 10.0).abs() < 0.1);
  for cluster in &clusters {
    assert_eq!(cluster.members.len(), 10);
  }
}

/// Every input point lands in exactly one cluster.
#[test]
fn test_kmeans_partitions_input() {
  let mut rng = rng();
  let points = sample_crown(Vec3::Y * 3.0, 2.0, 200, &mut rng);
  let clusters = kmeans(&points, 7, 8, &mut rng);

  assert_eq!(clusters.len(), 7);
  let total: usize = clusters.iter().map(|c| c.members.len()).sum();
  assert_eq!(total, points.len());
}

#[test]
fn test_kmeans_caps_k_at_point_count() {
  let points = [Vec3::ZERO, Vec3::X, Vec3::Y];
  assert_eq!(kmeans(&points, 10, 4, &mut rng()).len(), 3);
  assert!(kmeans(&[], 3, 4, &mut rng()).is_empty());
  assert!(kmeans(&points, 0, 4, &mut rng()).is_empty());
}

#[test]
fn test_kmeans_coincident_points() {
  let points = vec![Vec3::ONE; 8];
  let clusters = kmeans(&points, 3, 5, &mut rng());
  assert_eq!(clusters.len(), 3);
  for cluster in &clusters {
    assert_eq!(cluster.centroid, Vec3::ONE);
  }
}

#[test]
fn test_crown_sits_above_tip() {
  let tip = Vec3::new(1.0, 4.0, -2.0);
  let points = sample_crown(tip, 1.5, 300, &mut rng());
  assert_eq!(points.len(), 300);
  for p in points {
    let local = p - tip;
    assert!(local.y >= -1.5 * CROWN_FLATTEN * 0.5 - 1e-4);
    assert!(Vec3::new(local.x, 0.0, local.z).length() <= 1.5 + 1e-4);
  }
}

#[test]
fn test_clustered_species_builds() {
  let species = SpeciesConfig::sakura();
  assert!(matches!(species.strategy, BranchStrategy::Cluster { .. }));

  let skeleton = build_skeleton(&species, &mut rng()).unwrap();
  assert_eq!(skeleton.max_depth(), species.depth);
  assert_eq!(skeleton.children(NodeId::ROOT).len(), 4);
  for (_, node) in skeleton.iter() {
    assert!(node.positions.iter().all(|p| p.is_finite()));
    if node.depth < species.depth {
      assert!(!node.is_terminal());
    }
  }
}

/// A crown too sparse for the requested children still yields a full tree.
#[test]
fn test_sparse_crown_falls_back_to_fan_out() {
  let mut species = SpeciesConfig::sakura();
  species.strategy = BranchStrategy::Cluster {
    crown_points: 2,
    crown_radius: 0.5,
    iterations: 4,
  };
  let skeleton = build_skeleton(&species, &mut rng()).unwrap();
  assert_eq!(skeleton.children(NodeId::ROOT).len(), 4);
  // 1 + 4 + 4*3 + 4*3*2
  assert_eq!(skeleton.len(), 1 + 4 + 12 + 24);
}
