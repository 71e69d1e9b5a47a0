//! Species module: declarative plant descriptions and built-in presets.
//!
//! # Module Structure
//!
//! - [`config`]: `SpeciesConfig`, per-depth `BranchLevel`s and their rules,
//!   plus load-time validation (`ConfigError`)
//! - [`presets`]: ready-made species (`oak`, `pine`, `sakura`, `shrub`)

pub mod config;
pub mod presets;

// Re-exports
pub use config::{
  BranchLevel, BranchStrategy, ConfigError, FlowerRule, FlowerShape, FlowerStyle, LeafRule,
  LeafShape, LeafStyle, PlacementRule, SpeciesConfig, SubBranchRule, TubeParams,
};
