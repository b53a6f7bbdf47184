/// Bounding sphere in scene space.

use glam::Vec3;
use super::aabb::Aabb;

/// Sphere described by a center and a radius.
///
/// The octree never tests spheres directly; it works on the sphere's
/// enclosing box via [`BoundingSphere::aabb`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center point in scene space
    pub center: Vec3,
    /// Radius (already scaled into scene space)
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a sphere from its center and radius.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Smallest axis-aligned box enclosing this sphere (center ± radius).
    pub fn aabb(&self) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }

    /// This sphere shifted by `delta`.
    pub fn translated(&self, delta: Vec3) -> BoundingSphere {
        BoundingSphere {
            center: self.center + delta,
            radius: self.radius,
        }
    }
}
