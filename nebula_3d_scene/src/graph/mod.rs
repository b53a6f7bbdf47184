//! Dynamic spatial graph module
//!
//! Provides the dynamic bounding-box octree that sorts scene objects for
//! containment/visibility queries, and the membership capability anything
//! must expose to be placed in it.

mod member;
mod octree;

pub use member::{IndexableMember, MemberStore, NodeKey, ObjectId};
pub use octree::{Octree, OctreeConfig};
