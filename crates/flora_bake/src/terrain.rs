//! Perlin fBm terrain used to validate instance placement.

use flora_plugin::HeightField;
use glam::Vec3;
use noise::{NoiseFn, Perlin};

use crate::config::TerrainSection;

/// Finite-difference step for the slope test.
const SLOPE_STEP: f32 = 0.5;

pub struct PerlinTerrain {
	perlin: Perlin,
	frequency: f64,
	octaves: u8,
	lacunarity: f64,
	gain: f32,
	amplitude: f32,
	water_level: f32,
	min_normal_y: f32,
}

impl PerlinTerrain {
	pub fn new(section: &TerrainSection, seed: u32) -> Self {
		Self {
			perlin: Perlin::new(seed),
			frequency: section.frequency,
			octaves: section.octaves.max(1),
			lacunarity: section.lacunarity,
			gain: section.gain,
			amplitude: section.amplitude,
			water_level: section.water_level,
			min_normal_y: section.min_normal_y,
		}
	}

	/// Raw fBm height, ignoring water and slope.
	pub fn sample(&self, x: f32, z: f32) -> f32 {
		let mut freq = self.frequency;
		let mut amp = 1.0_f32;
		let mut sum = 0.0_f32;
		for _ in 0..self.octaves {
			let n = self.perlin.get([x as f64 * freq, z as f64 * freq]) as f32;
			sum += n * amp;
			freq *= self.lacunarity;
			amp *= self.gain;
		}
		sum * self.amplitude
	}

	/// Ground normal from central differences.
	pub fn normal(&self, x: f32, z: f32) -> Vec3 {
		let dx = self.sample(x + SLOPE_STEP, z) - self.sample(x - SLOPE_STEP, z);
		let dz = self.sample(x, z + SLOPE_STEP) - self.sample(x, z - SLOPE_STEP);
		Vec3::new(-dx, 2.0 * SLOPE_STEP, -dz).normalize_or(Vec3::Y)
	}
}

impl HeightField for PerlinTerrain {
	fn height_at(&self, x: f32, z: f32) -> Option<f32> {
		let height = self.sample(x, z);
		if height < self.water_level || self.normal(x, z).y < self.min_normal_y {
			return None;
		}
		Some(height)
	}
}
