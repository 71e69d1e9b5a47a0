//! Crown clustering - alternate branch distribution strategy.
//!
//! Instead of fixed cone angles, the species samples a point cloud filling
//! its crown. Each branch owns a subset of that cloud; its children aim at
//! the k-means centroids of the subset (k = the level's total sub-branch
//! count) and inherit the cluster members as their own cloud.
//!
//! ```text
//!        · ·  ·  ·      crown cloud
//!      ·  ●₁ ·  ●₂ ·    ● centroids -> child end points
//!        · · │ ·│·
//!            └─┬┘
//!              │ trunk
//! ```
//!
//! A branch whose cloud has fewer points than it needs children falls back
//! to fan-out for that branch.

use glam::Vec3;
use rand::Rng;

use super::builder::{fan_out_children, root_skeleton, synthesize_path};
use super::{NodeId, Skeleton};
use crate::sampling::{jitter_fraction, unit_ball};
use crate::species::SpeciesConfig;

/// Vertical squash of the crown ellipsoid.
const CROWN_FLATTEN: f32 = 0.7;

/// One k-means cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
  pub centroid: Vec3,
  pub members: Vec<Vec3>,
}

/// Partition `points` into `k` clusters with k-means++ seeding and Lloyd
/// iterations.
///
/// Returns exactly `min(k, points.len())` clusters. A cluster that empties
/// during iteration keeps its previous centroid.
pub fn kmeans(points: &[Vec3], k: usize, iterations: u32, rng: &mut impl Rng) -> Vec<Cluster> {
  let k = k.min(points.len());
  if k == 0 {
    return Vec::new();
  }

  let mut centroids = seed_centroids(points, k, rng);
  let mut assignment = vec![0usize; points.len()];

  for _ in 0..iterations.max(1) {
    let mut changed = false;
    for (i, p) in points.iter().enumerate() {
      let nearest = nearest_centroid(&centroids, *p);
      if assignment[i] != nearest {
        assignment[i] = nearest;
        changed = true;
      }
    }

    let mut sums = vec![Vec3::ZERO; k];
    let mut counts = vec![0u32; k];
    for (p, &c) in points.iter().zip(&assignment) {
      sums[c] += *p;
      counts[c] += 1;
    }
    for c in 0..k {
      if counts[c] > 0 {
        centroids[c] = sums[c] / counts[c] as f32;
      }
    }

    if !changed {
      break;
    }
  }

  let mut clusters: Vec<Cluster> = centroids
    .into_iter()
    .map(|centroid| Cluster {
      centroid,
      members: Vec::new(),
    })
    .collect();
  for (p, &c) in points.iter().zip(&assignment) {
    clusters[c].members.push(*p);
  }
  clusters
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest existing one.
fn seed_centroids(points: &[Vec3], k: usize, rng: &mut impl Rng) -> Vec<Vec3> {
  let mut centroids = Vec::with_capacity(k);
  centroids.push(points[rng.random_range(0..points.len())]);

  let mut weights = vec![0.0f32; points.len()];
  while centroids.len() < k {
    let mut total = 0.0;
    for (w, p) in weights.iter_mut().zip(points) {
      *w = centroids
        .iter()
        .map(|c| c.distance_squared(*p))
        .fold(f32::INFINITY, f32::min);
      total += *w;
    }

    if total <= 0.0 {
      // All remaining points coincide with a centroid.
      centroids.push(points[centroids.len() % points.len()]);
      continue;
    }

    let mut target = rng.random::<f32>() * total;
    let mut chosen = points.len() - 1;
    for (i, w) in weights.iter().enumerate() {
      if target < *w {
        chosen = i;
        break;
      }
      target -= *w;
    }
    centroids.push(points[chosen]);
  }

  centroids
}

fn nearest_centroid(centroids: &[Vec3], p: Vec3) -> usize {
  let mut best = 0;
  let mut best_distance = f32::INFINITY;
  for (i, c) in centroids.iter().enumerate() {
    let d = c.distance_squared(p);
    if d < best_distance {
      best_distance = d;
      best = i;
    }
  }
  best
}

/// Sample the crown ellipsoid above the trunk tip.
pub fn sample_crown(trunk_tip: Vec3, radius: f32, count: u32, rng: &mut impl Rng) -> Vec<Vec3> {
  let center = trunk_tip + Vec3::Y * (radius * CROWN_FLATTEN * 0.5);
  (0..count)
    .map(|_| {
      let p = unit_ball(rng);
      center + Vec3::new(p.x, p.y * CROWN_FLATTEN, p.z) * radius
    })
    .collect()
}

pub(crate) fn build_clustered(
  species: &SpeciesConfig,
  crown_points: u32,
  crown_radius: f32,
  iterations: u32,
  rng: &mut impl Rng,
) -> Skeleton {
  let mut skeleton = root_skeleton(species, rng);
  let tip = skeleton.root().end();
  let crown = sample_crown(tip, crown_radius * species.trunk_length, crown_points, rng);

  let mut stack: Vec<(NodeId, Vec<Vec3>)> = vec![(NodeId::ROOT, crown)];

  while let Some((id, cloud)) = stack.pop() {
    let depth = skeleton.node(id).depth;
    if species.is_terminal_depth(depth) {
      continue;
    }
    let (Some(level), Some(child_level)) = (species.level(depth), species.level(depth + 1)) else {
      continue;
    };

    let k = level.child_count() as usize;
    if cloud.len() < k {
      for (origin, end) in fan_out_children(&skeleton, id, level, rng) {
        let path = synthesize_path(origin, end, child_level, rng);
        let child = skeleton.push_child(id, path);
        stack.push((child, Vec::new()));
      }
      continue;
    }

    let curve = skeleton.node(id).curve();
    // Rule owning each child slot, so attachment follows the rule's position.
    let rules = level
      .sub_branches
      .iter()
      .flat_map(|rule| std::iter::repeat(rule).take(rule.count as usize));

    let clusters = kmeans(&cloud, k, iterations, rng);
    for (cluster, rule) in clusters.into_iter().zip(rules) {
      let u = jitter_fraction(rule.position, rule.position_jitter, rng);
      let origin = curve.point_at(u);
      let path = synthesize_path(origin, cluster.centroid, child_level, rng);
      let child = skeleton.push_child(id, path);
      stack.push((child, cluster.members));
    }
  }

  skeleton
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod cluster_test;
