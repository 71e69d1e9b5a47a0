//! Built-in species presets.

use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, FRAC_PI_6};

use super::config::*;

fn sub(position: f32, angle: f32, length: f32, count: u32) -> SubBranchRule {
  SubBranchRule {
    position,
    position_jitter: 0.1,
    angle,
    angle_jitter: 0.15,
    length,
    length_jitter: 0.1,
    count,
  }
}

fn scatter(position: f32, angle: f32, count: u32) -> PlacementRule {
  PlacementRule {
    position,
    position_jitter: 0.3,
    angle,
    angle_jitter: 0.3,
    count,
  }
}

impl SpeciesConfig {
  /// Broad deciduous tree, three levels of fan-out.
  pub fn oak() -> Self {
    Self {
      name: "oak".into(),
      depth: 3,
      trunk_length: 6.0,
      trunk_radius: 0.45,
      trunk_taper: 0.5,
      branch_taper: 0.7,
      branch_shrink: 0.55,
      tube: TubeParams {
        length_segments: 6,
        radial_segments: 8,
        sample_offset: 0.01,
      },
      leaf: LeafStyle {
        shape: LeafShape::Cross,
        scale: 0.5,
        alpha_test: 0.5,
      },
      flower: None,
      strategy: BranchStrategy::FanOut,
      merge_placements: true,
      levels: vec![
        BranchLevel {
          disturb: 0.05,
          gravity: 0.0,
          sub_branches: vec![sub(0.65, FRAC_PI_4, 0.6, 4), sub(0.9, FRAC_PI_6, 0.45, 2)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.12,
          gravity: 0.05,
          sub_branches: vec![sub(0.6, FRAC_PI_4, 0.6, 3)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.15,
          gravity: 0.1,
          sub_branches: vec![sub(0.7, FRAC_PI_3, 0.5, 2)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.2,
          gravity: 0.15,
          leaves: vec![scatter(0.6, FRAC_PI_4, 6)],
          ..Default::default()
        },
      ],
    }
  }

  /// Conifer: tall trunk, many short drooping whorls.
  pub fn pine() -> Self {
    Self {
      name: "pine".into(),
      depth: 2,
      trunk_length: 10.0,
      trunk_radius: 0.35,
      trunk_taper: 0.85,
      branch_taper: 0.8,
      branch_shrink: 0.35,
      tube: TubeParams {
        length_segments: 8,
        radial_segments: 6,
        sample_offset: 0.0,
      },
      leaf: LeafStyle {
        shape: LeafShape::Diamond,
        scale: 0.35,
        alpha_test: 0.4,
      },
      flower: None,
      strategy: BranchStrategy::FanOut,
      merge_placements: true,
      levels: vec![
        BranchLevel {
          disturb: 0.02,
          gravity: 0.0,
          sub_branches: vec![
            sub(0.35, 1.3, 0.35, 5),
            sub(0.55, 1.2, 0.28, 5),
            sub(0.75, 1.0, 0.2, 4),
          ],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.05,
          gravity: 0.2,
          sub_branches: vec![sub(0.5, FRAC_PI_4, 0.4, 2)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.05,
          gravity: 0.25,
          leaves: vec![scatter(0.5, FRAC_PI_3, 8)],
          ..Default::default()
        },
      ],
    }
  }

  /// Flowering tree using crown clustering.
  pub fn sakura() -> Self {
    Self {
      name: "sakura".into(),
      depth: 3,
      trunk_length: 4.0,
      trunk_radius: 0.3,
      trunk_taper: 0.5,
      branch_taper: 0.7,
      branch_shrink: 0.6,
      tube: TubeParams {
        length_segments: 5,
        radial_segments: 7,
        sample_offset: 0.02,
      },
      leaf: LeafStyle {
        shape: LeafShape::Plane,
        scale: 0.3,
        alpha_test: 0.5,
      },
      flower: Some(FlowerStyle {
        shape: FlowerShape::Star,
        scale: 0.25,
      }),
      strategy: BranchStrategy::Cluster {
        crown_points: 400,
        crown_radius: 0.8,
        iterations: 12,
      },
      merge_placements: true,
      levels: vec![
        BranchLevel {
          disturb: 0.1,
          gravity: 0.0,
          sub_branches: vec![sub(0.8, FRAC_PI_4, 0.7, 4)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.15,
          gravity: 0.05,
          sub_branches: vec![sub(0.6, FRAC_PI_4, 0.6, 3)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.2,
          gravity: 0.1,
          sub_branches: vec![sub(0.6, FRAC_PI_3, 0.5, 2)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.2,
          gravity: 0.15,
          leaves: vec![scatter(0.5, FRAC_PI_4, 3)],
          flowers: vec![scatter(0.7, FRAC_PI_6, 4)],
          ..Default::default()
        },
      ],
    }
  }

  /// Low ground cover: a single level of stems.
  pub fn shrub() -> Self {
    Self {
      name: "shrub".into(),
      depth: 1,
      trunk_length: 0.6,
      trunk_radius: 0.06,
      trunk_taper: 0.5,
      branch_taper: 0.8,
      branch_shrink: 0.7,
      tube: TubeParams {
        length_segments: 3,
        radial_segments: 5,
        sample_offset: 0.0,
      },
      leaf: LeafStyle {
        shape: LeafShape::Cross,
        scale: 0.25,
        alpha_test: 0.5,
      },
      flower: None,
      strategy: BranchStrategy::FanOut,
      merge_placements: true,
      levels: vec![
        BranchLevel {
          disturb: 0.1,
          gravity: 0.0,
          sub_branches: vec![sub(0.3, FRAC_PI_3, 1.0, 5)],
          ..Default::default()
        },
        BranchLevel {
          disturb: 0.2,
          gravity: 0.2,
          leaves: vec![scatter(0.6, FRAC_PI_4, 5)],
          ..Default::default()
        },
      ],
    }
  }

  /// Look up a preset by name.
  pub fn preset(name: &str) -> Option<Self> {
    match name {
      "oak" => Some(Self::oak()),
      "pine" => Some(Self::pine()),
      "sakura" => Some(Self::sakura()),
      "shrub" => Some(Self::shrub()),
      _ => None,
    }
  }

  /// Names accepted by [`SpeciesConfig::preset`].
  pub const PRESET_NAMES: [&'static str; 4] = ["oak", "pine", "sakura", "shrub"];
}
