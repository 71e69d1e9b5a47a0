//! Distance-based LOD for instanced vegetation.
//!
//! # Module Structure
//!
//! - [`level`]: `LevelBucket` thresholds and `select_level`
//! - [`buffer`]: grow-only `InstancedDrawBuffer`
//! - [`camera`]: `CameraView` frame snapshot
//! - [`manager`]: `LodInstanceManager` frame loop

pub mod buffer;
pub mod camera;
pub mod level;
pub mod manager;

pub use buffer::{BufferUpdate, InstancedDrawBuffer};
pub use camera::CameraView;
pub use level::{select_level, sort_levels, LevelBucket, MeshHandle};
pub use manager::{FrameBatches, FrameReport, LodConfig, LodInstanceManager, SpeciesFrame, SpeciesId};
