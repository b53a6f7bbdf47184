/// Axis-aligned bounding box in scene space.
///
/// The octree uses exact box-in-box tests (closed comparisons, so touching
/// faces count as contained) for member placement, and min/max unions when
/// recomputing root bounds during a grow.

use glam::Vec3;

/// Axis-Aligned Bounding Box described by its two extreme corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its two extreme corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Degenerate box enclosing a single point.
    ///
    /// Point-like scene objects (no bounding volume) resolve to this for
    /// containment and union purposes.
    pub fn point(position: Vec3) -> Self {
        Self { min: position, max: position }
    }

    /// Box centered on `center` extending `half_extents` on each axis.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Compute the center point of this box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Side length on each axis (max - min).
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Test if this box fully contains another box.
    ///
    /// Returns `true` if `other` is entirely within `self`, touching
    /// faces included.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
        && self.min.y <= other.min.y && self.max.y >= other.max.y
        && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Test if this box is fully contained by another box.
    pub fn is_contained_by(&self, other: &Aabb) -> bool {
        other.contains(self)
    }

    /// Test if this box intersects (overlaps) another box.
    ///
    /// Returns `true` if the two boxes overlap or touch.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
        && self.min.y <= other.max.y && self.max.y >= other.min.y
        && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// This box shifted by `delta`.
    pub fn translated(&self, delta: Vec3) -> Aabb {
        Aabb {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}
