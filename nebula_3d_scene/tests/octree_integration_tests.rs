//! Integration tests for the dynamic octree through the public API.
//!
//! Drives whole grow/shrink/split/merge cycles the way an owning scene
//! would, checking the structural invariants after every phase.

use glam::Vec3;

use nebula_3d_scene::nebula3d::bounds::Aabb;
use nebula_3d_scene::nebula3d::graph::{
    IndexableMember, MemberStore, ObjectId, Octree, OctreeConfig,
};
use nebula_3d_scene::nebula3d::scene::SceneObject;

struct World {
    tree: Octree,
    store: MemberStore<SceneObject>,
    next: u64,
}

impl World {
    fn new(config: OctreeConfig) -> Self {
        Self {
            tree: Octree::new(config),
            store: MemberStore::default(),
            next: 1,
        }
    }

    fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId::from_raw(self.next);
        self.next += 1;
        self.store.insert(id, object);
        self.tree.insert(&mut self.store, id);
        id
    }

    fn remove(&mut self, id: ObjectId) {
        self.tree.remove(&mut self.store, id);
        self.store.remove(&id);
    }

    fn member_aabb(object: &SceneObject) -> Aabb {
        match object.bounding_volume() {
            Some(volume) => volume.aabb(),
            None => Aabb::point(object.scene_position()),
        }
    }

    /// Every member with a containing node must be contained by that
    /// node's region; members without one must be outside the root.
    fn check_invariants(&self) {
        let mut outside_seen = 0;
        for (id, object) in &self.store {
            match object.containing_node() {
                Some(node) => {
                    let bounds = self
                        .tree
                        .node_bounds(node)
                        .unwrap_or_else(|| panic!("{:?} references a dead node", id));
                    assert!(
                        bounds.contains(&Self::member_aabb(object)),
                        "{:?} escaped its node",
                        id
                    );
                }
                None => outside_seen += 1,
            }
        }
        assert_eq!(outside_seen, self.tree.outside_count());
        assert_eq!(self.store.len(), self.tree.object_count());
    }
}

// ============================================================================
// GROW SCENARIO
// ============================================================================

#[test]
fn test_integration_outside_members_trigger_grow() {
    let mut world = World::new(OctreeConfig::default());

    // Root region seeded around the anchor.
    let anchor = world.insert(SceneObject::with_box(Vec3::ZERO, Vec3::splat(5.0)));
    let anchor_aabb = World::member_aabb(&world.store[&anchor]);
    assert!(world.tree.root_bounds().contains(&anchor_aabb));

    // Accumulate members far outside the region until one short of the
    // grow threshold.
    let mut outliers = Vec::new();
    for i in 0..4 {
        outliers.push(world.insert(SceneObject::with_sphere(
            Vec3::new(60.0 + 10.0 * i as f32, 20.0, -30.0),
            2.0,
        )));
    }
    assert_eq!(world.tree.outside_count(), 4);

    // The next outlier fires the grow.
    outliers.push(world.insert(SceneObject::with_sphere(
        Vec3::new(100.0, 20.0, -30.0),
        2.0,
    )));
    assert_eq!(world.tree.outside_count(), 0);

    // New bounds contain the anchor and every outlier.
    let root = world.tree.root_bounds();
    assert!(root.contains(&anchor_aabb));
    for id in &outliers {
        assert!(root.contains(&World::member_aabb(&world.store[id])));
    }
    world.check_invariants();
}

// ============================================================================
// FULL LIFECYCLE CHURN
// ============================================================================

#[test]
fn test_integration_count_conserved_through_split_merge_grow_shrink() {
    let mut world = World::new(OctreeConfig::default());

    // Deterministic scatter wide enough to force several grows and
    // splits on the way in.
    let mut ids = Vec::new();
    for i in 0..60u32 {
        let x = ((i * 17) % 29) as f32 * 6.0 - 80.0;
        let y = ((i * 11) % 23) as f32 * 5.0 - 55.0;
        let z = ((i * 7) % 19) as f32 * 8.0 - 70.0;
        let object = match i % 3 {
            0 => SceneObject::with_box(Vec3::new(x, y, z), Vec3::splat(2.0)),
            1 => SceneObject::with_sphere(Vec3::new(x, y, z), 1.5),
            _ => SceneObject::point(Vec3::new(x, y, z)),
        };
        ids.push(world.insert(object));
        assert_eq!(world.tree.object_count(), ids.len());
    }
    world.check_invariants();

    // Remove every other member, exercising merge and shrink on the way
    // out.
    let mut expected = ids.len();
    for id in ids.iter().step_by(2) {
        world.remove(*id);
        expected -= 1;
        assert_eq!(world.tree.object_count(), expected);
    }
    world.check_invariants();

    // Remove the rest; the tree must come back to truly empty.
    for id in ids.iter().skip(1).step_by(2) {
        world.remove(*id);
    }
    assert_eq!(world.tree.object_count(), 0);
    assert!(world.tree.is_empty());
    assert_eq!(world.tree.node_count(), 1);
}

#[test]
fn test_integration_moving_members_keep_index_consistent() {
    let mut world = World::new(OctreeConfig::default());
    world.insert(SceneObject::with_box(Vec3::ZERO, Vec3::splat(40.0)));
    let mut movers = Vec::new();
    for i in 0..8 {
        let angle = i as f32 * std::f32::consts::FRAC_PI_4;
        movers.push(world.insert(SceneObject::with_box(
            Vec3::new(angle.cos() * 30.0, 0.0, angle.sin() * 30.0),
            Vec3::splat(1.0),
        )));
    }
    world.check_invariants();

    // March everyone outward past the root region, one step at a time.
    for step in 1..=6 {
        for (i, id) in movers.iter().enumerate() {
            let angle = i as f32 * std::f32::consts::FRAC_PI_4;
            let distance = 30.0 + step as f32 * 25.0;
            let position = Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);
            world
                .store
                .get_mut(id)
                .unwrap()
                .set_position(position);
            world.tree.update_object(&mut world.store, *id);
            world.check_invariants();
        }
    }
    assert_eq!(world.tree.object_count(), 9);
}

// ============================================================================
// DEBUG TRAVERSAL
// ============================================================================

#[test]
fn test_integration_region_visitor_matches_node_count() {
    let mut world = World::new(OctreeConfig::default());
    for i in 0..30u32 {
        let x = ((i * 13) % 17) as f32 * 4.0 - 32.0;
        let z = ((i * 5) % 11) as f32 * 6.0 - 30.0;
        world.insert(SceneObject::with_box(Vec3::new(x, 0.0, z), Vec3::splat(1.0)));
    }

    let mut visited = 0;
    world.tree.visit_regions(|_, _| visited += 1);
    assert_eq!(visited, world.tree.node_count());
}
