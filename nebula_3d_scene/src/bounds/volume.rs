/// Bounding volume variants understood by the spatial graph.

use glam::Vec3;
use super::aabb::Aabb;
use super::sphere::BoundingSphere;

/// A bounding volume attached to a scene object.
///
/// The enum is closed on purpose: every variant resolves to an enclosing
/// [`Aabb`], so containment tests and union bounds are total and a node can
/// never meet a volume it does not know how to measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingVolume {
    /// Axis-aligned box, already in scene space
    Box(Aabb),
    /// Sphere with scene-space center and scaled radius
    Sphere(BoundingSphere),
}

impl BoundingVolume {
    /// The enclosing axis-aligned box of this volume.
    ///
    /// Boxes return themselves; spheres return center ± radius.
    pub fn aabb(&self) -> Aabb {
        match self {
            BoundingVolume::Box(aabb) => *aabb,
            BoundingVolume::Sphere(sphere) => sphere.aabb(),
        }
    }

    /// This volume shifted by `delta`.
    pub fn translated(&self, delta: Vec3) -> BoundingVolume {
        match self {
            BoundingVolume::Box(aabb) => BoundingVolume::Box(aabb.translated(delta)),
            BoundingVolume::Sphere(sphere) => BoundingVolume::Sphere(sphere.translated(delta)),
        }
    }
}
