//! Bounding volumes consumed by the spatial graph.
//!
//! Provides the axis-aligned box and sphere volume types and the
//! containment/union operations the octree relies on. All volumes are
//! expressed directly in scene space and are translated along with the
//! object that owns them.

mod aabb;
mod sphere;
mod volume;

pub use aabb::Aabb;
pub use sphere::BoundingSphere;
pub use volume::BoundingVolume;
