/// Graph membership: identifiers and the capability trait.
///
/// The octree never owns member data. Members live in a [`MemberStore`]
/// owned by the scene; the tree holds only [`ObjectId`]s and writes each
/// member's containing-node back-reference through [`IndexableMember`].

use glam::Vec3;
use rustc_hash::FxHashMap;
use slotmap::new_key_type;
use crate::bounds::BoundingVolume;

new_key_type! {
    /// Stable key for a node in the octree arena.
    ///
    /// Node keys survive unrelated split/merge churn; a key dies only when
    /// its own node is destroyed by a merge, grow, shrink or clear.
    pub struct NodeKey;
}

/// Identifier of a graph member, unique within one scene.
///
/// Ids are minted by the scene queue (or the scene's direct insert path)
/// and never reused, so producer threads can hold on to them and name the
/// same member in later tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wrap a raw id value.
    ///
    /// Intended for tests and tooling; scenes mint their own ids.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Backing storage for graph members, keyed by [`ObjectId`].
pub type MemberStore<M> = FxHashMap<ObjectId, M>;

/// Capability required of anything placed in the spatial graph.
///
/// The containing-node slot is written exclusively by the octree: set on
/// insertion, overwritten on relocation, cleared to `None` on removal.
/// Everything else only reads it.
pub trait IndexableMember {
    /// The member's bounding volume, or `None` for point-like members.
    fn bounding_volume(&self) -> Option<&BoundingVolume>;

    /// The member's position in scene space.
    fn scene_position(&self) -> Vec3;

    /// The node currently holding this member, if any.
    fn containing_node(&self) -> Option<NodeKey>;

    /// Set or clear the containing-node back-reference.
    fn set_containing_node(&mut self, node: Option<NodeKey>);
}
