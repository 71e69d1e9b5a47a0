//! Terrain-validated instance placement.
//!
//! Produces world transforms for the LOD manager's octrees. Each candidate
//! position asks a [`HeightField`] for the ground height; `None` rejects the
//! candidate (water, cliffs, outside the terrain). Attempts are capped at
//! `count * MAX_ATTEMPT_FACTOR` so a mostly-rejecting terrain yields fewer
//! instances instead of looping.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_ATTEMPT_FACTOR;
use crate::sampling::signed_unit;

/// Ground height lookup.
pub trait HeightField {
  /// Height at `(x, z)`, or `None` when nothing may grow there.
  fn height_at(&self, x: f32, z: f32) -> Option<f32>;
}

/// Infinite plane at a fixed height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatGround {
  pub height: f32,
}

impl HeightField for FlatGround {
  fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
    Some(self.height)
  }
}

impl<F> HeightField for F
where
  F: Fn(f32, f32) -> Option<f32>,
{
  fn height_at(&self, x: f32, z: f32) -> Option<f32> {
    self(x, z)
  }
}

/// Axis-aligned XZ rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundRect {
  pub min: [f32; 2],
  pub max: [f32; 2],
}

impl GroundRect {
  pub fn new(min: [f32; 2], max: [f32; 2]) -> Self {
    Self { min, max }
  }

  /// Square of half-width `half` centered on the origin.
  pub fn centered(half: f32) -> Self {
    Self::new([-half, -half], [half, half])
  }

  pub fn width(&self) -> f32 {
    self.max[0] - self.min[0]
  }

  pub fn depth(&self) -> f32 {
    self.max[1] - self.min[1]
  }

  /// Whether the rectangle encloses no area (or has NaN extents).
  pub fn is_empty(&self) -> bool {
    !(self.width() > 0.0 && self.depth() > 0.0)
  }
}

/// How candidate positions are chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementStrategy {
  /// Uniform random positions over `area`.
  Scatter {
    area: GroundRect,
    scale_min: f32,
    scale_max: f32,
  },
  /// Grid cells of `spacing`, each position offset by up to `jitter`
  /// (fraction of half a cell). Cells are visited row-major when `count`
  /// covers the grid, otherwise in a random order without repeats.
  Grid {
    area: GroundRect,
    spacing: f32,
    jitter: f32,
    scale_min: f32,
    scale_max: f32,
  },
}

impl PlacementStrategy {
  pub fn scatter(area: GroundRect) -> Self {
    Self::Scatter {
      area,
      scale_min: 1.0,
      scale_max: 1.0,
    }
  }

  fn scale_range(&self) -> (f32, f32) {
    match *self {
      Self::Scatter {
        scale_min, scale_max, ..
      }
      | Self::Grid {
        scale_min, scale_max, ..
      } => (scale_min, scale_max),
    }
  }
}

/// Up to `count` Y-rotated, uniformly scaled transforms standing on `ground`.
pub fn generate_transforms(
  strategy: &PlacementStrategy,
  count: usize,
  ground: &dyn HeightField,
  rng: &mut impl Rng,
) -> Vec<Mat4> {
  let max_attempts = count.saturating_mul(MAX_ATTEMPT_FACTOR);
  let mut out = Vec::with_capacity(count);
  if count == 0 {
    return out;
  }

  let (scale_min, scale_max) = strategy.scale_range();
  match *strategy {
    PlacementStrategy::Scatter { area, .. } => {
      if area.is_empty() {
        return out;
      }
      let mut attempts = 0;
      while out.len() < count && attempts < max_attempts {
        attempts += 1;
        let x = area.min[0] + area.width() * rng.random::<f32>();
        let z = area.min[1] + area.depth() * rng.random::<f32>();
        if let Some(y) = ground_height(ground, x, z) {
          out.push(instance_transform(Vec3::new(x, y, z), scale_min, scale_max, rng));
        }
      }
    }
    PlacementStrategy::Grid {
      area, spacing, jitter, ..
    } => {
      if area.is_empty() || !(spacing > 0.0) || !spacing.is_finite() {
        return out;
      }
      let columns = (area.width() / spacing).floor().max(1.0) as usize;
      let rows = (area.depth() / spacing).floor().max(1.0) as usize;
      let offset = jitter.clamp(0.0, 1.0) * spacing * 0.5;

      // Fewer instances than cells: visit a random subset so placements
      // cover the whole area instead of the first rows.
      let total = rows.saturating_mul(columns);
      let budget = max_attempts.min(total);
      let cells: Vec<usize> = if count < total {
        index::sample(rng, total, budget).into_vec()
      } else {
        (0..budget).collect()
      };
      for cell in cells {
        if out.len() >= count {
          break;
        }
        let (row, column) = (cell / columns, cell % columns);
        let x = area.min[0] + (column as f32 + 0.5) * spacing + offset * signed_unit(rng);
        let z = area.min[1] + (row as f32 + 0.5) * spacing + offset * signed_unit(rng);
        if let Some(y) = ground_height(ground, x, z) {
          out.push(instance_transform(Vec3::new(x, y, z), scale_min, scale_max, rng));
        }
      }
    }
  }

  #[cfg(feature = "tracing")]
  {
    if out.len() < count {
      tracing::debug!(requested = count, placed = out.len(), "population fell short");
    }
  }
  out
}

#[inline]
fn ground_height(ground: &dyn HeightField, x: f32, z: f32) -> Option<f32> {
  ground.height_at(x, z).filter(|y| y.is_finite())
}

fn instance_transform(position: Vec3, scale_min: f32, scale_max: f32, rng: &mut impl Rng) -> Mat4 {
  let scale = if scale_max > scale_min {
    scale_min + (scale_max - scale_min) * rng.random::<f32>()
  } else {
    scale_min
  };
  let yaw = rng.random::<f32>() * TAU;
  Mat4::from_scale_rotation_translation(Vec3::splat(scale), Quat::from_rotation_y(yaw), position)
}

#[cfg(test)]
#[path = "population_test.rs"]
mod population_test;
