//! Skeleton module: the branching structure of one generated plant.
//!
//! The skeleton is an arena: a flat `Vec<SkeletonNode>` where each node owns
//! a short control-point path and the indices of its children. The root
//! (trunk) is always node 0. Traversal is iterative, so deep species never
//! recurse on the call stack.
//!
//! # Module Structure
//!
//! - [`builder`]: fan-out generation (fixed cone angles per level)
//! - [`cluster`]: k-means crown clustering (alternate strategy)

pub mod builder;
pub mod cluster;

use glam::Vec3;
use smallvec::SmallVec;

use crate::constants::MIN_SEGMENT_LENGTH;
use crate::curve::CatmullRomCurve;

pub use builder::build_skeleton;
pub use cluster::{kmeans, Cluster};

/// Index of a node inside a [`Skeleton`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
  /// Root (trunk) node.
  pub const ROOT: Self = Self(0);

  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// One branch segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletonNode {
  /// Sampled control-point path (start, jittered mid, end).
  pub positions: SmallVec<[Vec3; 3]>,
  /// Child branches, owned by this node.
  pub children: SmallVec<[NodeId; 4]>,
  /// Parent branch, `None` for the root.
  pub parent: Option<NodeId>,
  /// Recursion depth (root = 0).
  pub depth: u32,
}

impl SkeletonNode {
  /// First control point.
  pub fn start(&self) -> Vec3 {
    self.positions[0]
  }

  /// Last control point.
  pub fn end(&self) -> Vec3 {
    self.positions[self.positions.len() - 1]
  }

  /// Straight-line length from start to end, never below
  /// [`MIN_SEGMENT_LENGTH`].
  pub fn chord_length(&self) -> f32 {
    self.start().distance(self.end()).max(MIN_SEGMENT_LENGTH)
  }

  /// Smooth curve through the control points.
  pub fn curve(&self) -> CatmullRomCurve {
    CatmullRomCurve::from_path(&self.positions)
  }

  /// Whether this branch spawned no children.
  pub fn is_terminal(&self) -> bool {
    self.children.is_empty()
  }
}

/// Arena-backed branch tree for one species template.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
  /// Name of the species this skeleton was generated from.
  pub species: String,
  nodes: Vec<SkeletonNode>,
}

impl Skeleton {
  /// Create a skeleton holding only the root path.
  pub fn with_root(species: impl Into<String>, positions: SmallVec<[Vec3; 3]>) -> Self {
    Self {
      species: species.into(),
      nodes: vec![SkeletonNode {
        positions,
        children: SmallVec::new(),
        parent: None,
        depth: 0,
      }],
    }
  }

  /// Add a child under `parent` and return its id.
  pub fn push_child(&mut self, parent: NodeId, positions: SmallVec<[Vec3; 3]>) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    let depth = self.nodes[parent.index()].depth + 1;
    self.nodes.push(SkeletonNode {
      positions,
      children: SmallVec::new(),
      parent: Some(parent),
      depth,
    });
    self.nodes[parent.index()].children.push(id);
    id
  }

  /// Number of nodes.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Check if empty (only for `Default`-constructed skeletons).
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Root node.
  pub fn root(&self) -> &SkeletonNode {
    &self.nodes[0]
  }

  /// Node by id.
  pub fn node(&self, id: NodeId) -> &SkeletonNode {
    &self.nodes[id.index()]
  }

  /// Children of a node.
  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.nodes[id.index()].children
  }

  /// Iterate over all nodes in arena order (parents before children).
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SkeletonNode)> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(i, node)| (NodeId(i as u32), node))
  }

  /// Node ids in depth-first pre-order (children in insertion order).
  pub fn depth_first(&self) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(self.nodes.len());
    if self.nodes.is_empty() {
      return order;
    }
    let mut stack: Vec<NodeId> = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
      order.push(id);
      stack.extend(self.children(id).iter().rev().copied());
    }
    order
  }

  /// Deepest node depth.
  pub fn max_depth(&self) -> u32 {
    self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
  }

  /// Number of edges on the path from the root to `id`.
  pub fn path_length(&self, id: NodeId) -> u32 {
    let mut edges = 0;
    let mut current = self.node(id).parent;
    while let Some(parent) = current {
      edges += 1;
      current = self.node(parent).parent;
    }
    edges
  }

  /// Number of terminal (leaf-bearing) branches.
  pub fn terminal_count(&self) -> usize {
    self.nodes.iter().filter(|n| n.is_terminal()).count()
  }
}
