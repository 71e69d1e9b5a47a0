//! Point/capacity octree over placed plant instances.
//!
//! Built once at world-population time, read-only afterwards. Queries prune
//! whole cells with a bounds test before looking at any entry, so cost
//! scales with the visible region rather than the instance count.
//!
//! ```text
//!   query(volume)
//!     stack = [root]
//!     pop node ─► cell misses volume? ─► skip subtree
//!               └► test each entry's translation, push children
//! ```
//!
//! # Module Structure
//!
//! - [`bounds`]: `Aabb3` cells and box queries, `Sphere` queries
//! - [`frustum`]: `Frustum` six-plane camera volume
//! - [`node`]: `OctreeNode` insert and subdivision

pub mod bounds;
pub mod frustum;
pub mod node;

use glam::Mat4;
use smallvec::SmallVec;

pub use bounds::{Aabb3, Sphere};
pub use frustum::{Frustum, Plane};
pub use node::{OctreeEntry, OctreeNode};

use crate::constants::DEFAULT_OCTREE_MAX_DEPTH;
use crate::types::InstanceId;

/// Traversal stack; 8 children per level keeps typical queries inline.
type NodeStack<'a> = SmallVec<[&'a OctreeNode; 64]>;

/// Shape statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
  pub nodes: usize,
  pub leaves: usize,
  pub max_depth: u32,
  pub elements: usize,
}

/// Octree root plus bookkeeping.
#[derive(Clone, Debug)]
pub struct Octree {
  root: OctreeNode,
  len: usize,
}

impl Octree {
  /// Empty tree over `bounds` with the default depth limit.
  pub fn new(bounds: Aabb3, capacity: usize) -> Self {
    Self::with_max_depth(bounds, capacity, DEFAULT_OCTREE_MAX_DEPTH)
  }

  pub fn with_max_depth(bounds: Aabb3, capacity: usize, max_depth: u32) -> Self {
    Self {
      root: OctreeNode::new(bounds, capacity, 0, max_depth),
      len: 0,
    }
  }

  /// Insert an instance. Returns `false` when its translation lies outside
  /// the tree bounds.
  pub fn insert(&mut self, id: InstanceId, transform: Mat4) -> bool {
    let inserted = self.root.insert(id, transform);
    if inserted {
      self.len += 1;
    } else {
      #[cfg(feature = "tracing")]
      tracing::trace!(id = id.raw(), position = ?transform.w_axis.truncate(), "octree insert rejected");
    }
    inserted
  }

  /// Number of stored entries.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Root cell bounds.
  pub fn bounds(&self) -> Aabb3 {
    self.root.bounds
  }

  pub fn root(&self) -> &OctreeNode {
    &self.root
  }

  /// Entries whose translation lies inside `query` (boundary inclusive).
  pub fn query_box(&self, query: &Aabb3) -> Vec<OctreeEntry> {
    let mut out = Vec::new();
    self.query_box_into(query, &mut out);
    out
  }

  /// [`Octree::query_box`], appending to `out`.
  pub fn query_box_into(&self, query: &Aabb3, out: &mut Vec<OctreeEntry>) {
    if query.is_degenerate() {
      return;
    }
    self.collect(out, |cell| cell.overlaps(query), |entry| query.contains_point(entry.position()));
  }

  /// Entries whose translation lies inside `sphere`.
  pub fn query_sphere(&self, sphere: &Sphere) -> Vec<OctreeEntry> {
    let mut out = Vec::new();
    self.query_sphere_into(sphere, &mut out);
    out
  }

  /// [`Octree::query_sphere`], appending to `out`.
  pub fn query_sphere_into(&self, sphere: &Sphere, out: &mut Vec<OctreeEntry>) {
    if sphere.is_degenerate() {
      return;
    }
    self.collect(
      out,
      |cell| cell.intersects_sphere(sphere),
      |entry| sphere.contains_point(entry.position()),
    );
  }

  /// Entries whose translation lies inside `frustum`.
  pub fn query_frustum(&self, frustum: &Frustum) -> Vec<OctreeEntry> {
    let mut out = Vec::new();
    self.query_frustum_into(frustum, &mut out);
    out
  }

  /// [`Octree::query_frustum`], appending to `out`.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::query_frustum"))]
  pub fn query_frustum_into(&self, frustum: &Frustum, out: &mut Vec<OctreeEntry>) {
    if frustum.is_degenerate() {
      return;
    }
    self.collect(
      out,
      |cell| frustum.intersects_aabb(cell),
      |entry| frustum.contains_point(entry.position()),
    );
  }

  fn collect(
    &self,
    out: &mut Vec<OctreeEntry>,
    cell_test: impl Fn(&Aabb3) -> bool,
    entry_test: impl Fn(&OctreeEntry) -> bool,
  ) {
    if self.len == 0 {
      return;
    }
    let mut stack: NodeStack = SmallVec::new();
    stack.push(&self.root);

    while let Some(node) = stack.pop() {
      if !cell_test(&node.bounds) {
        continue;
      }
      out.extend(node.elements.iter().filter(|e| entry_test(e)).copied());
      stack.extend(node.child_nodes().iter());
    }
  }

  /// Leaf cells in depth-first order.
  pub fn leaves(&self) -> Leaves<'_> {
    let mut stack = NodeStack::new();
    stack.push(&self.root);
    Leaves { stack }
  }

  /// Every stored entry, leaf by leaf.
  pub fn entries(&self) -> impl Iterator<Item = &OctreeEntry> {
    self.leaves().flat_map(|leaf| leaf.elements.iter())
  }

  /// Walk the whole tree and count nodes, leaves and entries.
  pub fn stats(&self) -> OctreeStats {
    let mut stats = OctreeStats::default();
    let mut stack: NodeStack = SmallVec::new();
    stack.push(&self.root);

    while let Some(node) = stack.pop() {
      stats.nodes += 1;
      stats.max_depth = stats.max_depth.max(node.depth);
      stats.elements += node.elements.len();
      if node.is_divided() {
        stack.extend(node.child_nodes().iter());
      } else {
        stats.leaves += 1;
      }
    }
    stats
  }
}

/// Iterator over leaf cells.
pub struct Leaves<'a> {
  stack: NodeStack<'a>,
}

impl<'a> Iterator for Leaves<'a> {
  type Item = &'a OctreeNode;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(node) = self.stack.pop() {
      if node.is_divided() {
        self.stack.extend(node.child_nodes().iter().rev());
      } else {
        return Some(node);
      }
    }
    None
  }
}
