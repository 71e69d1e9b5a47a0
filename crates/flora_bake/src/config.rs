//! Configuration parsing for the flora baker.

use anyhow::{Context, Result};
use flora_plugin::octree::Aabb3;
use flora_plugin::{GroundRect, LodConfig, PlacementStrategy, SpeciesConfig};
use glam::Vec3;
use serde::Deserialize;
use std::path::Path;

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct FloraConfig {
	pub world: WorldSection,
	pub camera: CameraSection,
	/// LOD manager tuning (defaults when omitted).
	#[serde(default)]
	pub lod: LodConfig,
	pub species: Vec<SpeciesEntry>,
}

/// Terrain extent and height range.
#[derive(Debug, Deserialize)]
pub struct WorldSection {
	/// Half-width of the square terrain, centered on the origin.
	pub half_extent: f32,
	pub min_height: f32,
	pub max_height: f32,
	/// Generation seed (`--seed` overrides it).
	pub seed: Option<u64>,
	#[serde(default)]
	pub terrain: TerrainSection,
}

/// Perlin fBm height field parameters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TerrainSection {
	pub frequency: f64,
	pub octaves: u8,
	pub lacunarity: f64,
	pub gain: f32,
	pub amplitude: f32,
	/// Candidates below this height are rejected.
	pub water_level: f32,
	/// Candidates whose ground normal has a smaller Y are rejected.
	pub min_normal_y: f32,
}

impl Default for TerrainSection {
	fn default() -> Self {
		Self {
			frequency: 0.005,
			octaves: 4,
			lacunarity: 2.0,
			gain: 0.5,
			amplitude: 10.0,
			water_level: f32::NEG_INFINITY,
			min_normal_y: 0.7,
		}
	}
}

/// Orbiting camera used for the frame simulation.
#[derive(Debug, Deserialize)]
pub struct CameraSection {
	pub height: f32,
	pub orbit_radius: f32,
	#[serde(default = "default_fov")]
	pub fov_degrees: f32,
	#[serde(default = "default_aspect")]
	pub aspect: f32,
	#[serde(default = "default_near")]
	pub near: f32,
	pub far: f32,
	/// Radians per frame.
	#[serde(default = "default_orbit_speed")]
	pub orbit_speed: f32,
}

fn default_fov() -> f32 {
	60.0
}

fn default_aspect() -> f32 {
	16.0 / 9.0
}

fn default_near() -> f32 {
	0.1
}

fn default_orbit_speed() -> f32 {
	0.01
}

/// One species to bake and populate.
///
/// Exactly one of `preset` or `config` must be given.
#[derive(Debug, Deserialize)]
pub struct SpeciesEntry {
	/// Built-in preset name (`oak`, `pine`, `sakura`, `shrub`).
	pub preset: Option<String>,
	/// Inline species definition.
	pub config: Option<SpeciesConfig>,
	/// Instances to scatter.
	pub count: usize,
	/// Ascending LOD distance thresholds.
	pub thresholds: Vec<f32>,
	/// Place on a jittered grid of this spacing instead of scattering.
	pub grid_spacing: Option<f32>,
	#[serde(default)]
	pub grid_jitter: f32,
	/// Uniform scale range `[min, max]`.
	#[serde(default = "default_scale")]
	pub scale: [f32; 2],
}

fn default_scale() -> [f32; 2] {
	[1.0, 1.0]
}

impl FloraConfig {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate a TOML document.
	pub fn parse(content: &str) -> Result<Self> {
		let config: FloraConfig =
			toml::from_str(content).with_context(|| "Failed to parse config TOML")?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		if self.species.is_empty() {
			anyhow::bail!("Config must have at least one species");
		}
		if !(self.world.half_extent > 0.0) {
			anyhow::bail!("world.half_extent must be > 0, got {}", self.world.half_extent);
		}
		if !(self.world.max_height > self.world.min_height) {
			anyhow::bail!(
				"world.max_height ({}) must exceed world.min_height ({})",
				self.world.max_height,
				self.world.min_height
			);
		}
		if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
			anyhow::bail!(
				"camera needs 0 < near < far, got near={} far={}",
				self.camera.near,
				self.camera.far
			);
		}
		for (i, entry) in self.species.iter().enumerate() {
			entry
				.validate()
				.with_context(|| format!("species entry #{}", i + 1))?;
		}
		Ok(())
	}
}

impl WorldSection {
	/// Octree bounds covering the whole terrain.
	pub fn bounds(&self) -> Aabb3 {
		Aabb3::new(
			Vec3::new(-self.half_extent, self.min_height, -self.half_extent),
			Vec3::new(self.half_extent, self.max_height, self.half_extent),
		)
	}

	pub fn area(&self) -> GroundRect {
		GroundRect::centered(self.half_extent)
	}
}

impl SpeciesEntry {
	/// The species this entry describes.
	pub fn resolve(&self) -> Result<SpeciesConfig> {
		match (&self.preset, &self.config) {
			(Some(name), None) => SpeciesConfig::preset(name).with_context(|| {
				format!(
					"Unknown preset `{name}` (expected one of {:?})",
					SpeciesConfig::PRESET_NAMES
				)
			}),
			(None, Some(config)) => Ok(config.clone()),
			(Some(_), Some(_)) => anyhow::bail!("give either `preset` or `config`, not both"),
			(None, None) => anyhow::bail!("species needs a `preset` or an inline `config`"),
		}
	}

	/// Placement strategy over `area`.
	pub fn strategy(&self, area: GroundRect) -> PlacementStrategy {
		let [scale_min, scale_max] = self.scale;
		match self.grid_spacing {
			Some(spacing) => PlacementStrategy::Grid {
				area,
				spacing,
				jitter: self.grid_jitter,
				scale_min,
				scale_max,
			},
			None => PlacementStrategy::Scatter {
				area,
				scale_min,
				scale_max,
			},
		}
	}

	fn validate(&self) -> Result<()> {
		let species = self.resolve()?;
		species.validate()?;
		if self.count == 0 {
			anyhow::bail!("`{}`: count must be > 0", species.name);
		}
		if self.thresholds.is_empty() {
			anyhow::bail!("`{}`: at least one LOD threshold is required", species.name);
		}
		if !self.thresholds.iter().all(|t| *t > 0.0) {
			anyhow::bail!("`{}`: thresholds must be > 0, got {:?}", species.name, self.thresholds);
		}
		if !self.thresholds.windows(2).all(|w| w[0] < w[1]) {
			anyhow::bail!(
				"`{}`: thresholds must be strictly ascending, got {:?}",
				species.name,
				self.thresholds
			);
		}
		if let Some(spacing) = self.grid_spacing {
			if !(spacing > 0.0) {
				anyhow::bail!("`{}`: grid_spacing must be > 0, got {spacing}", species.name);
			}
		}
		let [min, max] = self.scale;
		if !(min > 0.0 && max >= min) {
			anyhow::bail!("`{}`: scale must satisfy 0 < min <= max, got {:?}", species.name, self.scale);
		}
		Ok(())
	}
}
