//! Axis-aligned boxes and spheres used for octree cells and queries.

use glam::Vec3;

/// Axis-aligned bounding box.
///
/// Used both as the extent of an octree node and as a query volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb3 {
	/// Minimum corner (inclusive).
	pub min: Vec3,
	/// Maximum corner (inclusive).
	pub max: Vec3,
}

impl Aabb3 {
	/// Create a new AABB from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: Vec3, max: Vec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Create a new AABB from center and half-extents.
	pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
		Self {
			min: center - half_extents,
			max: center + half_extents,
		}
	}

	/// Check if this AABB overlaps with another.
	///
	/// Two AABBs overlap if they share any interior or boundary points.
	#[inline]
	pub fn overlaps(&self, other: &Aabb3) -> bool {
		self.min.x <= other.max.x
			&& self.max.x >= other.min.x
			&& self.min.y <= other.max.y
			&& self.max.y >= other.min.y
			&& self.min.z <= other.max.z
			&& self.max.z >= other.min.z
	}

	/// Check if this AABB contains a point (boundary inclusive).
	#[inline]
	pub fn contains_point(&self, point: Vec3) -> bool {
		point.x >= self.min.x
			&& point.x <= self.max.x
			&& point.y >= self.min.y
			&& point.y <= self.max.y
			&& point.z >= self.min.z
			&& point.z <= self.max.z
	}

	/// Get the size of the AABB (max - min).
	#[inline]
	pub fn size(&self) -> Vec3 {
		self.max - self.min
	}

	/// Get the center of the AABB.
	#[inline]
	pub fn center(&self) -> Vec3 {
		(self.min + self.max) * 0.5
	}

	/// Zero or negative volume, or non-finite corners.
	#[inline]
	pub fn is_degenerate(&self) -> bool {
		let size = self.size();
		!(self.min.is_finite() && self.max.is_finite()) || size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0
	}

	/// Closest point inside the box to `point`.
	#[inline]
	pub fn closest_point(&self, point: Vec3) -> Vec3 {
		point.clamp(self.min, self.max)
	}

	/// Check if this AABB touches a sphere.
	#[inline]
	pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
		self.closest_point(sphere.center).distance_squared(sphere.center) <= sphere.radius * sphere.radius
	}

	/// Octant (0-7) holding `point`.
	///
	/// Bits represent +X, +Y, +Z halves. A coordinate equal to the center
	/// goes to the upper half.
	#[inline]
	pub fn octant_of(&self, point: Vec3) -> usize {
		let c = self.center();
		(point.x >= c.x) as usize | ((point.y >= c.y) as usize) << 1 | ((point.z >= c.z) as usize) << 2
	}

	/// Bounds of octant `octant` (same bit layout as [`Aabb3::octant_of`]).
	pub fn octant(&self, octant: usize) -> Aabb3 {
		let c = self.center();
		let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
			if octant & bit != 0 {
				(mid, hi)
			} else {
				(lo, mid)
			}
		};
		let (x0, x1) = pick(1, self.min.x, c.x, self.max.x);
		let (y0, y1) = pick(2, self.min.y, c.y, self.max.y);
		let (z0, z1) = pick(4, self.min.z, c.z, self.max.z);
		Aabb3 {
			min: Vec3::new(x0, y0, z0),
			max: Vec3::new(x1, y1, z1),
		}
	}
}

/// Sphere query volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
	pub center: Vec3,
	pub radius: f32,
}

impl Sphere {
	pub fn new(center: Vec3, radius: f32) -> Self {
		Self { center, radius }
	}

	/// Check if the sphere contains a point (boundary inclusive).
	#[inline]
	pub fn contains_point(&self, point: Vec3) -> bool {
		self.center.distance_squared(point) <= self.radius * self.radius
	}

	/// Zero or negative radius, or non-finite values.
	#[inline]
	pub fn is_degenerate(&self) -> bool {
		!(self.center.is_finite() && self.radius.is_finite()) || self.radius <= 0.0
	}
}
