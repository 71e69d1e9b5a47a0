//! SpeciesConfig - declarative description of one plant type.
//!
//! A species is a per-depth array of [`BranchLevel`]s. Level `d` describes
//! the branches living at recursion depth `d`: how much their path wanders
//! (`disturb`), how much it droops (`gravity`), which sub-branches sprout from
//! them ([`SubBranchRule`]) and, on terminal levels, which leaves and flowers
//! they carry ([`PlacementRule`]).
//!
//! ```text
//! depth 0 (trunk) ──┬── depth 1 ──┬── depth 2 (terminal: leaves/flowers)
//!                   │             └── depth 2
//!                   └── depth 1 ──── ...
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error detected when a species is validated or generated.
///
/// These describe broken load-time data, so callers are expected to surface
/// them loudly (fail the bake / abort startup), never to recover.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
  #[error("species `{species}` has depth {depth} but only {levels} branch levels")]
  MissingLevel {
    species: String,
    depth: u32,
    levels: usize,
  },

  #[error("species `{species}`: tube tessellation needs >= 1 length and >= 3 radial segments (got {length}x{radial})")]
  InvalidTessellation {
    species: String,
    length: u32,
    radial: u32,
  },

  #[error("species `{species}`: `{field}` must be > 0 (got {value})")]
  NonPositive {
    species: String,
    field: &'static str,
    value: f32,
  },

  #[error("species `{species}`: `{field}` must lie in [0, 1] (got {value})")]
  FractionOutOfRange {
    species: String,
    field: &'static str,
    value: f32,
  },

  #[error("species `{species}`: rule at depth {depth} has count 0")]
  ZeroCount { species: String, depth: u32 },

  #[error("species `{species}`: cluster strategy needs at least one crown point")]
  EmptyCrown { species: String },
}

/// Where and how child branches sprout from a parent branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubBranchRule {
  /// Fraction along the parent path where children attach.
  pub position: f32,
  /// Random ± offset applied to `position`.
  #[serde(default)]
  pub position_jitter: f32,
  /// Cone angle between parent tangent and child direction (radians).
  pub angle: f32,
  /// Random ± offset applied to `angle`.
  #[serde(default)]
  pub angle_jitter: f32,
  /// Child length as a fraction of the parent segment length.
  pub length: f32,
  /// Random ± offset applied to `length`.
  #[serde(default)]
  pub length_jitter: f32,
  /// Number of siblings fanned evenly around the parent tangent.
  pub count: u32,
}

/// Where and how leaves or flowers are scattered along a terminal branch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
  /// Fraction along the branch path.
  pub position: f32,
  /// Random ± offset applied to `position`.
  #[serde(default)]
  pub position_jitter: f32,
  /// Angle between branch tangent and placement "up" (radians).
  pub angle: f32,
  /// Random ± offset applied to `angle`.
  #[serde(default)]
  pub angle_jitter: f32,
  /// Number of placements fanned around the tangent.
  pub count: u32,
}

/// Leaf scatter rule.
pub type LeafRule = PlacementRule;

/// Flower scatter rule.
pub type FlowerRule = PlacementRule;

/// Rules for the branches at one recursion depth.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchLevel {
  /// Lateral random offset of the path midpoint, as a fraction of length.
  #[serde(default)]
  pub disturb: f32,
  /// Vertical droop of the path end point, as a fraction of length.
  #[serde(default)]
  pub gravity: f32,
  /// Child branch rules. Empty on terminal levels.
  #[serde(default)]
  pub sub_branches: Vec<SubBranchRule>,
  /// Leaf rules, evaluated on terminal branches.
  #[serde(default)]
  pub leaves: Vec<LeafRule>,
  /// Flower rules, evaluated on terminal branches.
  #[serde(default)]
  pub flowers: Vec<FlowerRule>,
}

impl BranchLevel {
  /// Total number of children one branch at this level spawns.
  pub fn child_count(&self) -> u32 {
    self.sub_branches.iter().map(|r| r.count).sum()
  }
}

/// Tube tessellation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TubeParams {
  /// Rings along the path (the tube has `length_segments + 1` rings).
  pub length_segments: u32,
  /// Quads around the circumference (each ring has `radial_segments + 1`
  /// vertices, the seam vertex duplicated for UV continuity).
  pub radial_segments: u32,
  /// Ring jitter along the tangent, as a fraction of path length.
  #[serde(default)]
  pub sample_offset: f32,
}

impl Default for TubeParams {
  fn default() -> Self {
    Self {
      length_segments: 6,
      radial_segments: 8,
      sample_offset: 0.0,
    }
  }
}

/// Leaf billboard template shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafShape {
  /// One upright quad.
  Plane,
  /// Two perpendicular quads.
  #[default]
  Cross,
  /// A rhombus, narrower at both ends.
  Diamond,
}

/// Leaf geometry style.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafStyle {
  #[serde(default)]
  pub shape: LeafShape,
  /// Uniform scale applied to every placement.
  pub scale: f32,
  /// Alpha cutoff consumed by the host material.
  #[serde(default = "default_alpha_test")]
  pub alpha_test: f32,
}

fn default_alpha_test() -> f32 {
  0.5
}

impl Default for LeafStyle {
  fn default() -> Self {
    Self {
      shape: LeafShape::Cross,
      scale: 0.4,
      alpha_test: default_alpha_test(),
    }
  }
}

/// Flower billboard template shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowerShape {
  /// Flat star of petals.
  #[default]
  Star,
  /// Petals tilted upward into a cup.
  Cup,
}

/// Flower geometry style.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowerStyle {
  #[serde(default)]
  pub shape: FlowerShape,
  /// Uniform scale applied to every placement.
  pub scale: f32,
}

/// How child branches are distributed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchStrategy {
  /// Fixed cone angles fanned evenly around the parent tangent.
  #[default]
  FanOut,
  /// Children aim at k-means clusters of a crown point cloud.
  Cluster {
    /// Points sampled in the crown ellipsoid.
    crown_points: u32,
    /// Crown radius as a fraction of trunk length.
    crown_radius: f32,
    /// Lloyd iterations per clustering step.
    #[serde(default = "default_kmeans_iterations")]
    iterations: u32,
  },
}

fn default_kmeans_iterations() -> u32 {
  12
}

/// Static description of one plant species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesConfig {
  /// Display name, used in logs and errors.
  pub name: String,
  /// Maximum recursion depth (trunk is depth 0).
  pub depth: u32,
  /// Trunk length in world units.
  pub trunk_length: f32,
  /// Trunk base radius in world units.
  pub trunk_radius: f32,
  /// Fraction of its base radius the trunk loses from base to tip.
  #[serde(default = "default_taper")]
  pub trunk_taper: f32,
  /// Fraction of its base radius a branch loses from base to tip.
  #[serde(default = "default_taper")]
  pub branch_taper: f32,
  /// Radius multiplier per depth: `radius(d) = trunk_radius * branch_shrink^d`.
  pub branch_shrink: f32,
  #[serde(default)]
  pub tube: TubeParams,
  #[serde(default)]
  pub leaf: LeafStyle,
  #[serde(default)]
  pub flower: Option<FlowerStyle>,
  #[serde(default)]
  pub strategy: BranchStrategy,
  /// Bake leaves/flowers into two merged meshes instead of leaving them as
  /// instance matrices only.
  #[serde(default = "default_merge")]
  pub merge_placements: bool,
  /// One entry per depth `0..=depth`.
  pub levels: Vec<BranchLevel>,
}

fn default_taper() -> f32 {
  0.6
}

fn default_merge() -> bool {
  true
}

impl SpeciesConfig {
  /// Rules for `depth`, if present.
  pub fn level(&self, depth: u32) -> Option<&BranchLevel> {
    self.levels.get(depth as usize)
  }

  /// Base radius of branches at `depth`.
  #[inline]
  pub fn radius_at_depth(&self, depth: u32) -> f32 {
    self.trunk_radius * self.branch_shrink.powi(depth as i32)
  }

  /// Base-to-tip radius loss fraction for branches at `depth`.
  #[inline]
  pub fn taper_at_depth(&self, depth: u32) -> f32 {
    if depth == 0 {
      self.trunk_taper
    } else {
      self.branch_taper
    }
  }

  /// Whether branches at `depth` stop recursing.
  pub fn is_terminal_depth(&self, depth: u32) -> bool {
    depth >= self.depth
      || self
        .level(depth)
        .map_or(true, |level| level.sub_branches.is_empty())
  }

  /// Check the configuration for missing or out-of-range data.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let species = || self.name.clone();

    if self.levels.len() <= self.depth as usize {
      return Err(ConfigError::MissingLevel {
        species: species(),
        depth: self.depth,
        levels: self.levels.len(),
      });
    }

    if self.tube.length_segments < 1 || self.tube.radial_segments < 3 {
      return Err(ConfigError::InvalidTessellation {
        species: species(),
        length: self.tube.length_segments,
        radial: self.tube.radial_segments,
      });
    }

    let positive = [
      ("trunk_length", self.trunk_length),
      ("trunk_radius", self.trunk_radius),
      ("branch_shrink", self.branch_shrink),
      ("leaf.scale", self.leaf.scale),
    ];
    for (field, value) in positive {
      if !(value > 0.0) {
        return Err(ConfigError::NonPositive {
          species: species(),
          field,
          value,
        });
      }
    }
    if let Some(flower) = &self.flower {
      if !(flower.scale > 0.0) {
        return Err(ConfigError::NonPositive {
          species: species(),
          field: "flower.scale",
          value: flower.scale,
        });
      }
    }

    let fractions = [
      ("trunk_taper", self.trunk_taper),
      ("branch_taper", self.branch_taper),
      ("leaf.alpha_test", self.leaf.alpha_test),
    ];
    for (field, value) in fractions {
      check_fraction(&self.name, field, value)?;
    }

    for (depth, level) in self.levels.iter().enumerate() {
      let depth = depth as u32;
      for rule in &level.sub_branches {
        check_fraction(&self.name, "sub_branches.position", rule.position)?;
        if rule.count == 0 {
          return Err(ConfigError::ZeroCount {
            species: species(),
            depth,
          });
        }
        if !(rule.length > 0.0) {
          return Err(ConfigError::NonPositive {
            species: species(),
            field: "sub_branches.length",
            value: rule.length,
          });
        }
      }
      for rule in level.leaves.iter().chain(&level.flowers) {
        check_fraction(&self.name, "placement.position", rule.position)?;
        if rule.count == 0 {
          return Err(ConfigError::ZeroCount {
            species: species(),
            depth,
          });
        }
      }
    }

    if let BranchStrategy::Cluster {
      crown_points,
      crown_radius,
      ..
    } = self.strategy
    {
      if crown_points == 0 {
        return Err(ConfigError::EmptyCrown { species: species() });
      }
      if !(crown_radius > 0.0) {
        return Err(ConfigError::NonPositive {
          species: species(),
          field: "crown_radius",
          value: crown_radius,
        });
      }
    }

    Ok(())
  }
}

fn check_fraction(species: &str, field: &'static str, value: f32) -> Result<(), ConfigError> {
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(ConfigError::FractionOutOfRange {
      species: species.to_string(),
      field,
      value,
    })
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
