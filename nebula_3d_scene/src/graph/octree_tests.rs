//! Unit tests for the dynamic octree.
//!
//! Built around a small fixture owning a tree plus its member store, with
//! deterministic member layouts chosen so splits land members in known
//! octants.

use glam::Vec3;

use super::{member_bounds, Octree, OctreeConfig};
use crate::bounds::Aabb;
use crate::graph::{IndexableMember, MemberStore, ObjectId};
use crate::scene::SceneObject;

struct Fixture {
    tree: Octree,
    store: MemberStore<SceneObject>,
    next: u64,
}

impl Fixture {
    fn new(config: OctreeConfig) -> Self {
        Self {
            tree: Octree::new(config),
            store: MemberStore::default(),
            next: 1,
        }
    }

    fn with_defaults() -> Self {
        Self::new(OctreeConfig::default())
    }

    fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId::from_raw(self.next);
        self.next += 1;
        self.store.insert(id, object);
        self.tree.insert(&mut self.store, id);
        id
    }

    fn insert_box(&mut self, position: Vec3, half: f32) -> ObjectId {
        self.insert(SceneObject::with_box(position, Vec3::splat(half)))
    }

    fn remove(&mut self, id: ObjectId) {
        self.tree.remove(&mut self.store, id);
    }

    fn containing_node(&self, id: ObjectId) -> Option<crate::graph::NodeKey> {
        self.store[&id].containing_node()
    }

    /// Every indexed member must be contained by the node holding it.
    fn assert_containment_invariant(&self) {
        for (id, object) in &self.store {
            if let Some(node) = object.containing_node() {
                let node_bounds = self
                    .tree
                    .node_bounds(node)
                    .unwrap_or_else(|| panic!("member {:?} references a dead node", id));
                assert!(
                    node_bounds.contains(&member_bounds(object)),
                    "member {:?} is not contained by its node",
                    id
                );
            }
        }
    }
}

// ============================================================================
// SEEDING
// ============================================================================

#[test]
fn test_first_insert_seeds_bounds_around_box_member() {
    let mut f = Fixture::with_defaults();
    let id = f.insert_box(Vec3::ZERO, 10.0);

    // Span per axis equals the member's full extent (20), giving a region
    // eight times the member's volume.
    assert_eq!(f.tree.root_bounds().min, Vec3::splat(-20.0));
    assert_eq!(f.tree.root_bounds().max, Vec3::splat(20.0));
    assert_eq!(f.tree.object_count(), 1);
    assert_eq!(f.tree.node_count(), 1);
    assert!(f.containing_node(id).is_some());
}

#[test]
fn test_first_insert_seeds_fixed_span_for_point_member() {
    let mut f = Fixture::with_defaults();
    let position = Vec3::new(1.0, 2.0, 3.0);
    f.insert(SceneObject::point(position));

    assert_eq!(f.tree.root_bounds().min, position - Vec3::splat(5.0));
    assert_eq!(f.tree.root_bounds().max, position + Vec3::splat(5.0));
}

#[test]
fn test_first_insert_seeds_bounds_around_sphere_member() {
    let mut f = Fixture::with_defaults();
    f.insert(SceneObject::with_sphere(Vec3::ZERO, 3.0));

    // Sphere diameter is 6, so the seeded region spans position ± 6.
    assert_eq!(f.tree.root_bounds().min, Vec3::splat(-6.0));
    assert_eq!(f.tree.root_bounds().max, Vec3::splat(6.0));
}

#[test]
fn test_reseed_after_tree_becomes_empty() {
    let mut f = Fixture::with_defaults();
    let id = f.insert_box(Vec3::ZERO, 10.0);
    f.remove(id);
    assert!(f.tree.is_empty());

    f.insert_box(Vec3::splat(100.0), 2.0);
    assert_eq!(f.tree.root_bounds().min, Vec3::splat(96.0));
    assert_eq!(f.tree.root_bounds().max, Vec3::splat(104.0));
    assert_eq!(f.tree.outside_count(), 0);
}

// ============================================================================
// INSERTION AND THE OUTSIDE LIST
// ============================================================================

#[test]
fn test_contained_member_is_indexed() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let id = f.insert_box(Vec3::new(5.0, 5.0, 5.0), 1.0);

    assert_eq!(f.tree.object_count(), 2);
    assert_eq!(f.tree.outside_count(), 0);
    assert!(f.containing_node(id).is_some());
    f.assert_containment_invariant();
}

#[test]
fn test_uncontained_member_goes_outside() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let id = f.insert_box(Vec3::splat(500.0), 1.0);

    assert_eq!(f.tree.object_count(), 2);
    assert_eq!(f.tree.outside_count(), 1);
    assert!(f.containing_node(id).is_none());
}

#[test]
fn test_point_member_is_indexed_by_position() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let inside = f.insert(SceneObject::point(Vec3::new(3.0, -3.0, 3.0)));
    let outside = f.insert(SceneObject::point(Vec3::splat(1000.0)));

    assert!(f.containing_node(inside).is_some());
    assert!(f.containing_node(outside).is_none());
    assert_eq!(f.tree.outside_count(), 1);
}

// ============================================================================
// SPLIT
// ============================================================================

/// Root seeded to ±20 around a straddling member, then four small members
/// placed at distinct octant centers.
fn split_fixture() -> (Fixture, ObjectId, Vec<ObjectId>) {
    let mut f = Fixture::with_defaults();
    let straddler = f.insert_box(Vec3::ZERO, 10.0);
    let positions = [
        Vec3::new(10.0, 10.0, 10.0),
        Vec3::new(-10.0, -10.0, -10.0),
        Vec3::new(10.0, -10.0, 10.0),
        Vec3::new(-10.0, 10.0, -10.0),
    ];
    let ids = positions.iter().map(|p| f.insert_box(*p, 1.0)).collect();
    (f, straddler, ids)
}

#[test]
fn test_split_fires_exactly_once_at_threshold() {
    let (f, _, _) = split_fixture();

    // Fifth member reached the default split threshold.
    assert!(f.tree.is_split());
    assert_eq!(f.tree.node_count(), 9);
    assert_eq!(f.tree.object_count(), 5);
    f.assert_containment_invariant();
}

#[test]
fn test_split_keeps_straddler_at_parent() {
    let (f, straddler, children) = split_fixture();

    // The center-straddling member stays at the root; the octant members
    // descend into children.
    assert_eq!(f.tree.root_member_count(), 1);
    assert_eq!(
        f.tree.node_bounds(f.containing_node(straddler).unwrap()),
        Some(f.tree.root_bounds())
    );
    for id in children {
        let node = f.containing_node(id).unwrap();
        assert_ne!(f.tree.node_bounds(node), Some(f.tree.root_bounds()));
    }
}

#[test]
fn test_split_children_tile_parent_region() {
    let (f, _, _) = split_fixture();

    let root = f.tree.root_bounds();
    let mut child_regions = Vec::new();
    f.tree.visit_regions(|bounds, depth| {
        if depth == 1 {
            child_regions.push(*bounds);
        }
    });
    assert_eq!(child_regions.len(), 8);

    let mut union = child_regions[0];
    for region in &child_regions {
        union = union.union(region);
        // Zero overlap: each child is exactly half the parent per axis.
        assert_eq!(region.extents(), root.extents() * 0.5);
    }
    assert_eq!(union.min, root.min);
    assert_eq!(union.max, root.max);
}

#[test]
fn test_overlap_inflates_child_regions() {
    let config = OctreeConfig {
        overlap_percent: 10,
        ..OctreeConfig::default()
    };
    let mut f = Fixture::new(config);
    let straddler = f.insert_box(Vec3::ZERO, 10.0);
    for p in [
        Vec3::new(12.0, 12.0, 12.0),
        Vec3::new(-12.0, -12.0, -12.0),
        Vec3::new(12.0, -12.0, 12.0),
        Vec3::new(-12.0, 12.0, -12.0),
    ] {
        f.insert_box(p, 1.0);
    }
    assert!(f.tree.is_split());

    let root = f.tree.root_bounds();
    f.tree.visit_regions(|bounds, depth| {
        if depth == 1 {
            assert_eq!(bounds.extents(), root.extents() * 0.5 * 1.1);
        }
    });
    let _ = straddler;
}

#[test]
fn test_member_fitting_multiple_children_stays_at_parent() {
    // 50% overlap makes the eight children all cover the region around
    // the parent's center.
    let config = OctreeConfig {
        split_threshold: 2,
        overlap_percent: 50,
        ..OctreeConfig::default()
    };
    let mut f = Fixture::new(config);
    f.insert_box(Vec3::ZERO, 10.0);
    let center = f.insert_box(Vec3::ZERO, 1.0);

    assert!(f.tree.is_split());
    // Both the seeding member and the center member fit several children,
    // so both stay at the root.
    assert_eq!(f.tree.root_member_count(), 2);
    assert_eq!(
        f.tree.node_bounds(f.containing_node(center).unwrap()),
        Some(f.tree.root_bounds())
    );
    f.assert_containment_invariant();
}

// ============================================================================
// REMOVE / MERGE
// ============================================================================

#[test]
fn test_remove_is_idempotent() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let id = f.insert_box(Vec3::new(5.0, 5.0, 5.0), 1.0);

    f.remove(id);
    assert_eq!(f.tree.object_count(), 1);
    assert!(f.containing_node(id).is_none());

    f.remove(id);
    assert_eq!(f.tree.object_count(), 1);
}

#[test]
fn test_insert_then_remove_restores_count_and_back_reference() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let before = f.tree.object_count();

    let id = f.insert_box(Vec3::new(-5.0, 5.0, -5.0), 1.0);
    assert_eq!(f.tree.object_count(), before + 1);

    f.remove(id);
    assert_eq!(f.tree.object_count(), before);
    assert!(f.containing_node(id).is_none());
}

#[test]
fn test_remove_unknown_member_is_noop() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);

    f.tree
        .remove(&mut f.store, ObjectId::from_raw(9999));
    assert_eq!(f.tree.object_count(), 1);
}

#[test]
fn test_remove_from_outside_list() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let far = f.insert_box(Vec3::splat(500.0), 1.0);
    assert_eq!(f.tree.outside_count(), 1);

    f.remove(far);
    assert_eq!(f.tree.outside_count(), 0);
    assert_eq!(f.tree.object_count(), 1);
}

#[test]
fn test_merge_collapses_thinned_tree_to_direct_members() {
    let (mut f, straddler, children) = split_fixture();
    assert!(f.tree.is_split());

    // Dropping to the merge threshold (2) collapses the tree.
    f.remove(straddler);
    f.remove(children[0]);
    f.remove(children[1]);

    assert!(!f.tree.is_split());
    assert_eq!(f.tree.node_count(), 1);
    assert_eq!(f.tree.object_count(), 2);
    // Survivors are direct members of the root again.
    assert_eq!(f.tree.root_member_count(), 2);
    for id in &children[2..] {
        assert_eq!(
            f.tree.node_bounds(f.containing_node(*id).unwrap()),
            Some(f.tree.root_bounds())
        );
    }
}

// ============================================================================
// SHRINK
// ============================================================================

#[test]
fn test_shrink_adopts_dominant_child_region() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0); // straddler, stays at root
    let a = f.insert_box(Vec3::new(10.0, 10.0, 10.0), 1.0);
    let b = f.insert_box(Vec3::new(14.0, 14.0, 14.0), 1.0);
    f.insert_box(Vec3::new(-10.0, -10.0, -10.0), 1.0);
    let doomed = f.insert_box(Vec3::new(10.0, -10.0, 10.0), 1.0);
    assert!(f.tree.is_split());

    let dominant_bounds = f
        .tree
        .node_bounds(f.containing_node(a).unwrap())
        .unwrap();

    // Removing the +X-Y+Z member leaves the +X+Y+Z child holding two
    // members, strictly more than any sibling and within the shrink
    // threshold.
    f.remove(doomed);

    assert!(!f.tree.is_split());
    assert_eq!(f.tree.root_bounds(), dominant_bounds);
    assert_eq!(f.tree.object_count(), 4);
    // The straddler and the -X-Y-Z member no longer fit the shrunken
    // region and wait outside.
    assert_eq!(f.tree.outside_count(), 2);
    assert!(f.containing_node(a).is_some());
    assert!(f.containing_node(b).is_some());
    f.assert_containment_invariant();
}

#[test]
fn test_shrink_requires_strict_dominance() {
    let (mut f, straddler, children) = split_fixture();
    assert!(f.tree.is_split());

    // Children hold one member each: removing the straddler leaves a
    // four-way tie, so the tree must not shrink.
    f.remove(straddler);
    assert!(f.tree.is_split());
    assert_eq!(f.tree.object_count(), 4);
    let _ = children;
}

// ============================================================================
// GROW
// ============================================================================

#[test]
fn test_grow_fires_at_threshold_and_absorbs_outside() {
    let mut f = Fixture::with_defaults();
    let anchor = f.insert_box(Vec3::ZERO, 5.0); // root seeded to ±10

    let mut outliers = Vec::new();
    for i in 0..4 {
        outliers.push(f.insert_box(Vec3::new(100.0 + i as f32, 0.0, 0.0), 1.0));
        assert_eq!(f.tree.outside_count(), i + 1);
    }

    // Fifth outlier reaches the grow threshold.
    outliers.push(f.insert_box(Vec3::new(104.0, 0.0, 0.0), 1.0));

    assert_eq!(f.tree.outside_count(), 0);
    assert_eq!(f.tree.object_count(), 6);

    let root = f.tree.root_bounds();
    // Union of the anchor (±5) and the outliers (x up to 105, y/z ±1).
    assert_eq!(root.min, Vec3::new(-5.0, -5.0, -5.0));
    assert_eq!(root.max, Vec3::new(105.0, 5.0, 5.0));

    for id in outliers.iter().chain(std::iter::once(&anchor)) {
        assert!(f.containing_node(*id).is_some(), "member left outside after grow");
    }
    f.assert_containment_invariant();
}

#[test]
fn test_grow_rebuilds_split_tree() {
    let (mut f, _, _) = split_fixture();
    assert!(f.tree.is_split());

    // Flood the outside list until the split tree grows.
    for i in 0..5 {
        f.insert_box(Vec3::new(200.0 + 10.0 * i as f32, 0.0, 0.0), 1.0);
    }

    assert_eq!(f.tree.outside_count(), 0);
    assert_eq!(f.tree.object_count(), 10);
    f.assert_containment_invariant();
}

// ============================================================================
// UPDATE (NOTIFY-MOVED)
// ============================================================================

#[test]
fn test_update_is_noop_while_still_contained() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let id = f.insert_box(Vec3::new(5.0, 5.0, 5.0), 1.0);
    let node_before = f.containing_node(id).unwrap();

    f.store.get_mut(&id).unwrap().set_position(Vec3::new(6.0, 5.0, 5.0));
    f.tree.update_object(&mut f.store, id);

    assert_eq!(f.containing_node(id), Some(node_before));
    assert_eq!(f.tree.object_count(), 2);
}

#[test]
fn test_update_relocates_member_leaving_root_region() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let id = f.insert_box(Vec3::new(5.0, 5.0, 5.0), 1.0);

    f.store.get_mut(&id).unwrap().set_position(Vec3::splat(500.0));
    f.tree.update_object(&mut f.store, id);

    assert!(f.containing_node(id).is_none());
    assert_eq!(f.tree.outside_count(), 1);
    assert_eq!(f.tree.object_count(), 2);
    f.assert_containment_invariant();
}

#[test]
fn test_update_follows_a_sole_member() {
    let mut f = Fixture::with_defaults();
    let id = f.insert_box(Vec3::ZERO, 2.0);

    f.store.get_mut(&id).unwrap().set_position(Vec3::splat(300.0));
    f.tree.update_object(&mut f.store, id);

    // Relocation empties the tree, so the insert re-seeds the root
    // around the member's new position.
    assert_eq!(f.tree.root_bounds().center(), Vec3::splat(300.0));
    assert_eq!(f.tree.object_count(), 1);
    assert_eq!(f.tree.outside_count(), 0);
}

#[test]
fn test_update_pulls_outside_member_back_inside() {
    let mut f = Fixture::with_defaults();
    f.insert_box(Vec3::ZERO, 10.0);
    let id = f.insert_box(Vec3::splat(500.0), 1.0);
    assert_eq!(f.tree.outside_count(), 1);

    f.store.get_mut(&id).unwrap().set_position(Vec3::new(5.0, 0.0, 0.0));
    f.tree.update_object(&mut f.store, id);

    assert_eq!(f.tree.outside_count(), 0);
    assert!(f.containing_node(id).is_some());
    f.assert_containment_invariant();
}

// ============================================================================
// COUNT CONSERVATION AND CLEAR
// ============================================================================

#[test]
fn test_object_count_is_conserved_under_churn() {
    let mut f = Fixture::with_defaults();
    let mut ids = Vec::new();
    for i in 0..24u32 {
        // Deterministic scatter, some members landing outside the
        // current root region to exercise grow along the way.
        let x = ((i * 7) % 13) as f32 * 9.0 - 50.0;
        let y = ((i * 5) % 11) as f32 * 7.0 - 35.0;
        let z = ((i * 3) % 7) as f32 * 11.0 - 30.0;
        let object = match i % 3 {
            0 => SceneObject::with_box(Vec3::new(x, y, z), Vec3::splat(1.5)),
            1 => SceneObject::with_sphere(Vec3::new(x, y, z), 2.0),
            _ => SceneObject::point(Vec3::new(x, y, z)),
        };
        ids.push(f.insert(object));
    }
    assert_eq!(f.tree.object_count(), 24);
    f.assert_containment_invariant();

    for id in ids.drain(..9) {
        f.remove(id);
    }
    assert_eq!(f.tree.object_count(), 15);
    f.assert_containment_invariant();
}

#[test]
fn test_clear_resets_tree_and_back_references() {
    let (mut f, straddler, children) = split_fixture();

    f.tree.clear(&mut f.store);

    assert!(f.tree.is_empty());
    assert_eq!(f.tree.object_count(), 0);
    assert_eq!(f.tree.node_count(), 1);
    assert!(f.containing_node(straddler).is_none());
    for id in children {
        assert!(f.containing_node(id).is_none());
    }

    // The tree seeds again on the next insert.
    f.insert_box(Vec3::splat(50.0), 1.0);
    assert_eq!(f.tree.object_count(), 1);
    assert_eq!(f.tree.root_bounds().center(), Vec3::splat(50.0));
}

// ============================================================================
// DEBUG TRAVERSAL
// ============================================================================

#[test]
fn test_visit_regions_walks_every_live_node() {
    let (f, _, _) = split_fixture();

    let mut depths = Vec::new();
    f.tree.visit_regions(|_, depth| depths.push(depth));

    assert_eq!(depths.len(), 9);
    assert_eq!(depths.iter().filter(|d| **d == 0).count(), 1);
    assert_eq!(depths.iter().filter(|d| **d == 1).count(), 8);
}
