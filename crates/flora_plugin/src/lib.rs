//! flora_plugin - Framework/engine independent procedural vegetation
//!
//! This crate generates tree and plant template meshes from declarative
//! species descriptions, and draws many instances of them through a
//! frustum-culled, distance-bucketed instancing manager.
//!
//! # Features
//!
//! - **Skeletons**: recursive branch skeletons with per-depth rules, or
//!   k-means crown clustering for flowering species
//! - **Tube Meshing**: tapered rings along Catmull-Rom paths with
//!   rotation-minimizing frames
//! - **Placements**: leaf and flower transforms aligned to branch frames,
//!   optionally baked into merged meshes
//! - **Octree**: capacity-bounded point octree with box, sphere and frustum
//!   queries
//! - **LOD Instancing**: per-species distance buckets feeding grow-only
//!   instance buffers through an engine-provided sink
//!
//! # Example
//!
//! ```ignore
//! use flora_plugin::{FloraWorld, SpeciesConfig, CameraView, NullSink};
//!
//! let mut world = FloraWorld::default();
//! let mut rng = rand::rng();
//! let oak = world.generate_species_mesh(&SpeciesConfig::oak(), &mut rng)?;
//! let levels = world.template_levels(oak, &[30.0, 90.0, 250.0]).unwrap();
//! let species = world.register_lod(oak, bounds, levels).unwrap();
//! world.populate_octree(species, 5_000, &strategy, &terrain, &mut rng);
//!
//! let report = world.render(&camera, &mut NullSink);
//! println!("{} visible", report.visible);
//! ```

pub mod constants;
pub mod types;

// Re-export commonly used items
pub use types::{InstanceId, MeshData, MinMaxAABB, PlacementTransform};

// Curves, frames and random sampling helpers
pub mod curve;
pub mod sampling;
pub use curve::{CatmullRomCurve, Frame};

// Species descriptions
pub mod species;
pub use species::{ConfigError, SpeciesConfig};

// Template generation
pub mod assembler;
pub mod billboard;
pub mod placement;
pub mod skeleton;
pub mod tube;
pub use assembler::{assemble, AssembledTree, RenderGroup};
pub use skeleton::{build_skeleton, Skeleton};

// Spatial index
pub mod octree;
pub use octree::{Aabb3, Frustum, Octree, Sphere};

// Level of detail and the engine boundary
pub mod lod;
pub mod presentation;
pub use lod::{CameraView, FrameReport, LevelBucket, LodConfig, LodInstanceManager, MeshHandle, SpeciesId};
pub use presentation::{InstanceSink, NullSink, RecordingSink};

// Terrain population
pub mod population;
pub use population::{FlatGround, GroundRect, HeightField, PlacementStrategy};

// World facade
pub mod world;
pub use world::{FloraWorld, SpeciesTemplate, TemplateId};

// Engine-agnostic statistics
pub mod metrics;
