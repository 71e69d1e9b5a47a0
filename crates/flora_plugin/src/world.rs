//! FloraWorld - species templates plus the LOD instance manager.
//!
//! The facade a host engine drives:
//!
//! ```text
//! generate_species_mesh(species)   once per species  -> TemplateId
//! register_lod(template, bounds)   once per species  -> SpeciesId
//! populate_octree(species, ...)    world load
//! render(camera, sink)             every frame
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use web_time::Instant;

use crate::assembler::{assemble, AssembledTree};
use crate::billboard::impostor_template;
use crate::lod::{CameraView, FrameReport, LevelBucket, LodConfig, LodInstanceManager, MeshHandle, SpeciesId};
use crate::octree::Aabb3;
use crate::population::{HeightField, PlacementStrategy};
use crate::presentation::InstanceSink;
use crate::species::{ConfigError, SpeciesConfig};
use crate::types::{MeshData, MinMaxAABB};

// =============================================================================
// TemplateId - unique identifier
// =============================================================================

/// Atomic counter for generating unique TemplateIds.
static TEMPLATE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque species template identifier.
///
/// Generated atomically - guaranteed unique within process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TemplateId(u64);

impl TemplateId {
    /// Generate a new unique TemplateId.
    pub fn new() -> Self {
        Self(TEMPLATE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SpeciesTemplate - generated geometry of one species
// =============================================================================

/// Mesh handles registered for one template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateMeshes {
    pub branches: MeshHandle,
    pub leaves: Option<MeshHandle>,
    pub flowers: Option<MeshHandle>,
    /// Crossed-quad stand-in sized to the template bounds.
    pub impostor: MeshHandle,
}

impl TemplateMeshes {
    /// Every full-detail mesh (branches, then leaves and flowers if baked).
    pub fn full_detail(&self) -> impl Iterator<Item = MeshHandle> {
        std::iter::once(self.branches)
            .chain(self.leaves)
            .chain(self.flowers)
    }
}

/// One generated species.
#[derive(Clone, Debug)]
pub struct SpeciesTemplate {
    pub id: TemplateId,
    pub name: String,
    pub tree: AssembledTree,
    pub meshes: TemplateMeshes,
    /// Object-space bounds of every mesh and placement.
    pub bounds: MinMaxAABB,
}

/// Object-space bounds of a tree, including unbaked placements.
fn tree_bounds(tree: &AssembledTree) -> MinMaxAABB {
    let mut bounds = MinMaxAABB::empty();
    for mesh in tree.group.meshes() {
        bounds.union(&mesh.bounds);
    }
    for matrix in tree.leaf_matrices.iter().chain(&tree.flower_matrices) {
        bounds.encapsulate(matrix.w_axis.truncate().to_array());
    }
    bounds
}

// =============================================================================
// FloraWorld - templates, mesh table and LOD manager
// =============================================================================

/// Owns the generated templates, the mesh table their handles index and the
/// LOD manager.
#[derive(Debug, Default)]
pub struct FloraWorld {
    manager: LodInstanceManager,
    templates: Vec<SpeciesTemplate>,
    meshes: Vec<MeshData>,
}

impl FloraWorld {
    pub fn new(config: LodConfig) -> Self {
        Self {
            manager: LodInstanceManager::new(config),
            templates: Vec::new(),
            meshes: Vec::new(),
        }
    }

    pub fn manager(&self) -> &LodInstanceManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut LodInstanceManager {
        &mut self.manager
    }

    /// Add a mesh to the table.
    pub fn register_mesh(&mut self, mesh: MeshData) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(mesh);
        handle
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(handle.0 as usize)
    }

    pub fn template(&self, id: TemplateId) -> Option<&SpeciesTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn templates(&self) -> &[SpeciesTemplate] {
        &self.templates
    }

    /// Generate and store the template geometry for `species`.
    ///
    /// Fails only on an invalid configuration.
    pub fn generate_species_mesh(
        &mut self,
        species: &SpeciesConfig,
        rng: &mut impl Rng,
    ) -> Result<TemplateId, ConfigError> {
        let start = Instant::now();
        let tree = assemble(species, rng)?;
        let bounds = tree_bounds(&tree);

        let meshes = TemplateMeshes {
            branches: self.register_mesh(tree.group.branches.clone()),
            leaves: tree.group.leaves.clone().map(|m| self.register_mesh(m)),
            flowers: tree.group.flowers.clone().map(|m| self.register_mesh(m)),
            impostor: self.register_mesh(impostor_template(&bounds)),
        };

        let elapsed_us = start.elapsed().as_micros() as u64;
        #[cfg(feature = "metrics")]
        self.manager.metrics_mut().record_generation_timing(elapsed_us);

        #[cfg(feature = "tracing")]
        tracing::info!(
            species = %species.name,
            vertices = tree.group.vertex_count(),
            triangles = tree.group.triangle_count(),
            leaves = tree.leaf_matrices.len(),
            flowers = tree.flower_matrices.len(),
            elapsed_us,
            "species template generated"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = elapsed_us;

        let id = TemplateId::new();
        self.templates.push(SpeciesTemplate {
            id,
            name: species.name.clone(),
            tree,
            meshes,
            bounds,
        });
        Ok(id)
    }

    /// Buckets for `template` at `thresholds`, nearest first.
    ///
    /// The nearest level draws every full-detail mesh, the farthest draws
    /// the impostor and any level in between draws branches only. A single
    /// threshold yields one full-detail level. `None` for unknown templates.
    pub fn template_levels(&self, template: TemplateId, thresholds: &[f32]) -> Option<Vec<LevelBucket>> {
        let meshes = self.template(template)?.meshes;
        let mut thresholds = thresholds.to_vec();
        thresholds.sort_by(f32::total_cmp);
        let last = thresholds.len().saturating_sub(1);
        Some(
            thresholds
                .iter()
                .enumerate()
                .map(|(i, &threshold)| match i {
                    0 => LevelBucket::new(threshold, meshes.full_detail()),
                    i if i == last => LevelBucket::single(threshold, meshes.impostor),
                    _ => LevelBucket::single(threshold, meshes.branches),
                })
                .collect(),
        )
    }

    /// Register a LOD species for `template` indexed over `bounds`.
    pub fn register_lod(
        &mut self,
        template: TemplateId,
        bounds: Aabb3,
        levels: Vec<LevelBucket>,
    ) -> Option<SpeciesId> {
        let name = self.template(template)?.name.clone();
        Some(self.manager.register_species(name, bounds, levels))
    }

    /// Scatter up to `count` instances of `species`. Returns how many were
    /// indexed.
    pub fn populate_octree(
        &mut self,
        species: SpeciesId,
        count: usize,
        strategy: &PlacementStrategy,
        ground: &dyn HeightField,
        rng: &mut impl Rng,
    ) -> usize {
        self.manager.populate(species, count, strategy, ground, rng)
    }

    /// Run one frame.
    pub fn render(&mut self, camera: &CameraView, sink: &mut dyn InstanceSink) -> FrameReport {
        self.manager.render(camera, sink)
    }
}

#[cfg(test)]
#[path = "world_test.rs"]
mod world_test;
