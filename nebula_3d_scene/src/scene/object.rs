/// Spatial scene objects — the members the octree sorts.

use bitflags::bitflags;
use glam::Vec3;

use crate::bounds::{Aabb, BoundingSphere, BoundingVolume};
use crate::graph::{IndexableMember, MemberStore, NodeKey};

/// Backing storage for a scene's spatial objects.
pub type ObjectStore = MemberStore<SceneObject>;

bitflags! {
    /// Per-object state flags consumed by renderers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObjectFlags: u32 {
        /// Object participates in rendering
        const VISIBLE = 1 << 0;
        /// Object casts shadows
        const CAST_SHADOWS = 1 << 1;
        /// Object receives shadows
        const RECEIVE_SHADOWS = 1 << 2;
    }
}

/// A boundable, moveable object placed in the spatial graph.
///
/// The bounding volume is kept in scene space and travels with the object:
/// `set_position` translates it. After moving an object, the owner must
/// call `Scene::notify_moved` so the index can re-examine its placement.
#[derive(Debug, Clone)]
pub struct SceneObject {
    position: Vec3,
    bounding: Option<BoundingVolume>,
    flags: ObjectFlags,
    /// Containing-node slot, written exclusively by the octree
    node: Option<NodeKey>,
}

impl SceneObject {
    /// A point-like object with no bounding volume.
    pub fn point(position: Vec3) -> Self {
        Self {
            position,
            bounding: None,
            flags: ObjectFlags::VISIBLE,
            node: None,
        }
    }

    /// An object bounded by an axis-aligned box centered on `position`.
    pub fn with_box(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            bounding: Some(BoundingVolume::Box(Aabb::from_center_half_extents(
                position,
                half_extents,
            ))),
            flags: ObjectFlags::VISIBLE,
            node: None,
        }
    }

    /// An object bounded by a sphere centered on `position`.
    pub fn with_sphere(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            bounding: Some(BoundingVolume::Sphere(BoundingSphere::new(position, radius))),
            flags: ObjectFlags::VISIBLE,
            node: None,
        }
    }

    /// Current position in scene space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the object, translating its bounding volume along.
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        if let Some(volume) = self.bounding.take() {
            self.bounding = Some(volume.translated(delta));
        }
    }

    /// State flags.
    pub fn flags(&self) -> ObjectFlags {
        self.flags
    }

    /// Replace the state flags.
    pub fn set_flags(&mut self, flags: ObjectFlags) {
        self.flags = flags;
    }

    /// Whether the VISIBLE flag is set.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(ObjectFlags::VISIBLE)
    }
}

impl IndexableMember for SceneObject {
    fn bounding_volume(&self) -> Option<&BoundingVolume> {
        self.bounding.as_ref()
    }

    fn scene_position(&self) -> Vec3 {
        self.position
    }

    fn containing_node(&self) -> Option<NodeKey> {
        self.node
    }

    fn set_containing_node(&mut self, node: Option<NodeKey>) {
        self.node = node;
    }
}
