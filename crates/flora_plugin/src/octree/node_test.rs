use glam::{Mat4, Vec3};

use super::*;

fn at(x: f32, y: f32, z: f32) -> Mat4 {
  Mat4::from_translation(Vec3::new(x, y, z))
}

fn unit_node(capacity: usize) -> OctreeNode {
  OctreeNode::new(Aabb3::new(Vec3::ZERO, Vec3::splat(8.0)), capacity, 0, 16)
}

#[test]
fn test_insert_under_capacity_stays_leaf() {
  let mut node = unit_node(3);
  assert!(node.insert(InstanceId(0), at(1.0, 1.0, 1.0)));
  assert!(node.insert(InstanceId(1), at(7.0, 7.0, 7.0)));
  assert!(node.insert(InstanceId(2), at(4.0, 4.0, 4.0)));

  assert!(!node.is_divided());
  assert_eq!(node.elements.len(), 3);
  assert!(node.child_nodes().is_empty());
}

/// The insert that exceeds capacity subdivides and empties the node.
#[test]
fn test_overflow_subdivides_once() {
  let mut node = unit_node(2);
  node.insert(InstanceId(0), at(1.0, 1.0, 1.0));
  node.insert(InstanceId(1), at(7.0, 1.0, 1.0));
  assert!(!node.is_divided());

  node.insert(InstanceId(2), at(1.0, 7.0, 1.0));
  assert!(node.is_divided());
  assert!(node.elements.is_empty());

  let children = node.child_nodes();
  assert_eq!(children.len(), 8);
  assert_eq!(children[0].elements[0].id, InstanceId(0));
  assert_eq!(children[1].elements[0].id, InstanceId(1));
  assert_eq!(children[2].elements[0].id, InstanceId(2));
  for child in children {
    assert_eq!(child.depth, 1);
    assert!(!child.is_divided());
  }
}

#[test]
fn test_out_of_bounds_rejected_without_mutation() {
  let mut node = unit_node(1);
  assert!(!node.insert(InstanceId(0), at(9.0, 1.0, 1.0)));
  assert!(!node.insert(InstanceId(1), at(-0.1, 1.0, 1.0)));
  assert!(!node.insert(InstanceId(2), at(f32::NAN, 1.0, 1.0)));
  assert!(node.elements.is_empty());
  assert!(!node.is_divided());
}

#[test]
fn test_boundary_points_accepted() {
  let mut node = unit_node(1);
  assert!(node.insert(InstanceId(0), at(0.0, 0.0, 0.0)));
  assert!(node.insert(InstanceId(1), at(8.0, 8.0, 8.0)));
  assert!(node.insert(InstanceId(2), at(4.0, 4.0, 4.0)));
  assert!(node.is_divided());
}

/// Coincident points stop subdividing at max depth instead of recursing
/// forever.
#[test]
fn test_coincident_points_stop_at_max_depth() {
  let mut node = OctreeNode::new(Aabb3::new(Vec3::ZERO, Vec3::splat(8.0)), 1, 0, 3);
  for i in 0..10 {
    assert!(node.insert(InstanceId(i), at(1.0, 1.0, 1.0)));
  }

  let p = Vec3::ONE;
  let mut current = &node;
  while let Some(children) = &current.children {
    assert!(current.elements.is_empty());
    current = &children[current.bounds.octant_of(p)];
  }
  assert_eq!(current.depth, 3);
  assert_eq!(current.elements.len(), 10);
}

#[test]
fn test_zero_capacity_raised_to_one() {
  let node = unit_node(0);
  assert_eq!(node.capacity, 1);
}

#[test]
fn test_entry_position() {
  let entry = OctreeEntry {
    id: InstanceId(4),
    transform: Mat4::from_scale_rotation_translation(
      Vec3::splat(2.0),
      glam::Quat::from_rotation_y(1.0),
      Vec3::new(1.0, 2.0, 3.0),
    ),
  };
  assert_eq!(entry.position(), Vec3::new(1.0, 2.0, 3.0));
}
