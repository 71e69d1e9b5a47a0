//! OctreeNode - one cell of the point/capacity octree.
//!
//! A node is either a **leaf** (no children, holds up to `capacity`
//! entries) or **internal** (8 children, holds nothing directly).
//!
//! ```text
//!   leaf, len < capacity      ──insert──► leaf, len + 1
//!   leaf, len == capacity     ──insert──► internal: entries moved to the
//!                                         8 octants, new entry routed down
//!   leaf at max_depth         ──insert──► leaf, overflow accepted
//!   internal                  ──insert──► child at octant_of(position)
//! ```
//!
//! The transition happens once per node. Every entry therefore lives in
//! exactly one leaf whose bounds contain its translation.

use glam::{Mat4, Vec3};

use super::bounds::Aabb3;
use crate::types::InstanceId;

/// One indexed instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeEntry {
  pub id: InstanceId,
  pub transform: Mat4,
}

impl OctreeEntry {
  /// Translation of the transform.
  #[inline]
  pub fn position(&self) -> Vec3 {
    self.transform.w_axis.truncate()
  }
}

/// One octree cell.
#[derive(Clone, Debug)]
pub struct OctreeNode {
  pub bounds: Aabb3,
  pub capacity: usize,
  pub elements: Vec<OctreeEntry>,
  pub children: Option<Box<[OctreeNode; 8]>>,
  pub depth: u32,
  /// Nodes at this depth never subdivide.
  pub max_depth: u32,
}

impl OctreeNode {
  /// Empty leaf. Capacity is raised to at least 1.
  pub fn new(bounds: Aabb3, capacity: usize, depth: u32, max_depth: u32) -> Self {
    let capacity = capacity.max(1);
    Self {
      bounds,
      capacity,
      elements: Vec::with_capacity(capacity),
      children: None,
      depth,
      max_depth,
    }
  }

  /// Whether this node has subdivided.
  #[inline]
  pub fn is_divided(&self) -> bool {
    self.children.is_some()
  }

  /// Insert an instance.
  ///
  /// Returns `false` (and changes nothing) when the translation is outside
  /// this node's bounds or not finite.
  pub fn insert(&mut self, id: InstanceId, transform: Mat4) -> bool {
    let entry = OctreeEntry { id, transform };
    let position = entry.position();
    if !position.is_finite() || !self.bounds.contains_point(position) {
      return false;
    }
    self.insert_entry(entry, position);
    true
  }

  fn insert_entry(&mut self, entry: OctreeEntry, position: Vec3) {
    if self.children.is_none() {
      if self.elements.len() < self.capacity || self.depth >= self.max_depth {
        self.elements.push(entry);
        return;
      }
      self.subdivide();
    }

    let octant = self.bounds.octant_of(position);
    if let Some(children) = self.children.as_deref_mut() {
      children[octant].insert_entry(entry, position);
    }
  }

  /// Create the 8 children and move this node's entries into them.
  fn subdivide(&mut self) {
    let bounds = self.bounds;
    let (capacity, depth, max_depth) = (self.capacity, self.depth + 1, self.max_depth);
    let mut children: Box<[OctreeNode; 8]> = Box::new(std::array::from_fn(|octant| {
      OctreeNode::new(bounds.octant(octant), capacity, depth, max_depth)
    }));

    for entry in std::mem::take(&mut self.elements) {
      let position = entry.position();
      children[bounds.octant_of(position)].insert_entry(entry, position);
    }
    self.children = Some(children);
  }

  /// Children as a slice (empty for leaves).
  #[inline]
  pub fn child_nodes(&self) -> &[OctreeNode] {
    match &self.children {
      Some(children) => children.as_slice(),
      None => &[],
    }
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
