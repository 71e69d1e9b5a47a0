//! Headless flora baker.
//!
//! Generates every configured species template, populates a Perlin terrain
//! with instances, then orbits a camera around the origin for a number of
//! frames, driving the LOD manager exactly as an engine would.
//!
//! Output: per-species template statistics, per-level visible counts
//! averaged over the run, frame timings and (optionally) one OBJ file per
//! template.

mod config;
mod obj;
mod terrain;

use anyhow::{Context, Result};
use clap::Parser;
use flora_plugin::{CameraView, FloraWorld, NullSink, SpeciesId, TemplateId};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{CameraSection, FloraConfig};
use terrain::PerlinTerrain;

/// Procedural vegetation baker and LOD simulation driver.
#[derive(Parser, Debug)]
#[command(name = "flora_bake")]
#[command(about = "Bakes species templates and simulates LOD instancing over a terrain")]
struct Args {
	/// Path to configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Frames to simulate.
	#[arg(short, long, default_value_t = 120)]
	frames: u32,

	/// Generation seed (overrides `world.seed`).
	#[arg(short, long)]
	seed: Option<u64>,

	/// Write each species template as OBJ into this directory.
	#[arg(long)]
	obj_dir: Option<PathBuf>,
}

/// One baked and populated species.
struct Baked {
	name: String,
	template: TemplateId,
	species: SpeciesId,
}

fn main() -> Result<()> {
	init_tracing();
	let args = Args::parse();

	info!("Loading config from: {}", args.config.display());
	let config = FloraConfig::load(&args.config)?;

	let seed = args.seed.or(config.world.seed).unwrap_or_else(rand::random);
	info!(seed, species = config.species.len(), "baking");
	let mut rng = StdRng::seed_from_u64(seed);
	let terrain = PerlinTerrain::new(&config.world.terrain, seed as u32);

	if let Some(dir) = &args.obj_dir {
		std::fs::create_dir_all(dir)
			.with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
	}

	let mut world = FloraWorld::new(config.lod.clone());
	let mut baked = Vec::new();
	for entry in &config.species {
		let species = entry.resolve()?;
		let template = world
			.generate_species_mesh(&species, &mut rng)
			.with_context(|| format!("Generating species `{}`", species.name))?;
		let levels = world
			.template_levels(template, &entry.thresholds)
			.context("Template missing right after generation")?;
		let id = world
			.register_lod(template, config.world.bounds(), levels)
			.context("Template missing right after generation")?;
		let placed = world.populate_octree(
			id,
			entry.count,
			&entry.strategy(config.world.area()),
			&terrain,
			&mut rng,
		);
		info!(
			species = %species.name,
			requested = entry.count,
			placed,
			"populated"
		);

		if let Some(dir) = &args.obj_dir {
			export_template(&world, template, &species.name, dir)?;
		}
		baked.push(Baked {
			name: species.name,
			template,
			species: id,
		});
	}

	simulate(&mut world, &baked, &config.camera, args.frames);
	Ok(())
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Camera orbiting the origin at `frame`.
fn orbit_camera(camera: &CameraSection, frame: u32) -> CameraView {
	let angle = frame as f32 * camera.orbit_speed;
	let eye = Vec3::new(
		angle.cos() * camera.orbit_radius,
		camera.height,
		angle.sin() * camera.orbit_radius,
	);
	CameraView::look_at(
		eye,
		Vec3::ZERO,
		camera.fov_degrees.to_radians(),
		camera.aspect,
		camera.near,
		camera.far,
	)
}

fn simulate(world: &mut FloraWorld, baked: &[Baked], camera: &CameraSection, frames: u32) {
	if frames == 0 {
		return;
	}
	// totals[species][level]
	let mut totals: Vec<Vec<u64>> = baked
		.iter()
		.map(|b| vec![0; world.manager().levels(b.species).map_or(0, |l| l.len())])
		.collect();
	let mut reallocations = 0usize;

	for frame in 0..frames {
		let report = world.render(&orbit_camera(camera, frame), &mut NullSink);
		for (species_totals, species_frame) in totals.iter_mut().zip(&report.species) {
			for (total, &visible) in species_totals.iter_mut().zip(&species_frame.visible_per_level) {
				*total += visible as u64;
			}
		}
		reallocations += report.reallocations;
		debug!(
			frame,
			visible = report.visible,
			reallocations = report.reallocations,
			elapsed_us = report.elapsed_us,
			"frame"
		);
	}

	for (b, species_totals) in baked.iter().zip(&totals) {
		let averages: Vec<String> = species_totals
			.iter()
			.map(|t| format!("{:.1}", *t as f64 / frames as f64))
			.collect();
		let template = world.template(b.template);
		info!(
			species = %b.name,
			instances = world.manager().instance_count(b.species),
			vertices = template.map_or(0, |t| t.tree.group.vertex_count()),
			"avg visible per level: [{}]",
			averages.join(", ")
		);
	}

	let metrics = world.manager().metrics();
	info!(
		frames,
		reallocations,
		avg_frame_us = metrics.avg_frame_timing_us(),
		avg_generation_us = metrics.avg_generation_timing_us(),
		"simulation finished"
	);
}

fn export_template(world: &FloraWorld, template: TemplateId, name: &str, dir: &Path) -> Result<()> {
	let template = world
		.template(template)
		.context("Template missing right after generation")?;
	let group = &template.tree.group;
	let mut objects = vec![("branches", &group.branches)];
	if let Some(leaves) = &group.leaves {
		objects.push(("leaves", leaves));
	}
	if let Some(flowers) = &group.flowers {
		objects.push(("flowers", flowers));
	}

	let path = dir.join(format!("{name}.obj"));
	obj::write_obj_file(&path, &objects)?;
	info!(
		species = name,
		vertices = group.vertex_count(),
		triangles = group.triangle_count(),
		"wrote {}",
		path.display()
	);
	Ok(())
}
