//! Numeric constants shared by the generator, octree and LOD manager.
//!
//! # Degeneracy Clamps
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Input degeneracy              │ Clamp                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ coincident control points     │ tangent = DEFAULT_AXIS (+Y)      │
//! │ tube radius shrinks below 0   │ radius = MIN_RADIUS              │
//! │ zero-length branch            │ length = MIN_SEGMENT_LENGTH      │
//! │ zero-volume query box/sphere  │ empty result                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here ever produces NaN/Inf: a visible artifact is preferable to a
//! corrupted draw call.

use glam::Vec3;

/// Fallback direction when a tangent cannot be derived.
pub const DEFAULT_AXIS: Vec3 = Vec3::Y;

/// Reference "up" axis of leaf/flower template geometry.
pub const PLACEMENT_UP: Vec3 = Vec3::Y;

/// Smallest tube radius emitted by the mesher.
pub const MIN_RADIUS: f32 = 1e-4;

/// Smallest branch length used for child placement math.
pub const MIN_SEGMENT_LENGTH: f32 = 1e-3;

/// Parameter step used for symmetric finite-difference tangents.
pub const TANGENT_DELTA: f32 = 1e-4;

/// Squared-length threshold below which a vector counts as degenerate.
pub const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

/// Divisions used when estimating a curve's arc length.
pub const ARC_LENGTH_DIVISIONS: usize = 32;

/// Default number of elements a leaf octree node holds before subdividing.
pub const DEFAULT_OCTREE_CAPACITY: usize = 8;

/// Default subdivision depth limit.
///
/// Nodes at this depth never subdivide and accept overflow, which bounds the
/// tree when many instances share one position.
pub const DEFAULT_OCTREE_MAX_DEPTH: u32 = 16;

/// Default outward push applied to every frustum plane, in world units.
pub const DEFAULT_FRUSTUM_MARGIN: f32 = 4.0;

/// Placement attempts per requested instance before population gives up.
pub const MAX_ATTEMPT_FACTOR: usize = 8;
