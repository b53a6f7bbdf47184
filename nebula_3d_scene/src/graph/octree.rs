/// Dynamic bounding-box octree.
///
/// Members are stored in exactly one place: the deepest node whose region
/// fully contains their volume, or the root-only `outside` list when the
/// root region does not contain them yet. A member that fits zero or
/// several children of a split node stays at that node — ambiguity always
/// resolves in favor of the parent, never an arbitrary sibling.
///
/// The tree reshapes itself around the member set:
/// - a node with `split_threshold` direct members subdivides,
/// - a subtree thinned below `merge_threshold` collapses into its root,
/// - `grow_threshold` members outside the root trigger a rebuild over the
///   union bound of everything alive,
/// - after removals the root adopts its dominant child's region when that
///   child holds at most `shrink_threshold` members and strictly more than
///   every sibling.

use glam::Vec3;
use slotmap::SlotMap;

use crate::bounds::Aabb;
use crate::scene_debug;
use super::member::{IndexableMember, MemberStore, NodeKey, ObjectId};

const SOURCE: &str = "nebula3d::Octree";

/// Octant corner anchors, index order matching algebraic octant numbering:
///
/// ```text
/// 0 +X+Y+Z   1 -X+Y+Z   2 -X-Y+Z   3 +X-Y+Z
/// 4 +X+Y-Z   5 -X+Y-Z   6 -X-Y-Z   7 +X-Y-Z
/// ```
///
/// `true` anchors the child at the parent's max corner on that axis,
/// `false` at the min corner. Child regions are derived from this table
/// alone; the branching factor is its length.
const OCTANTS: [[bool; 3]; 8] = [
    [true, true, true],
    [false, true, true],
    [false, false, true],
    [true, false, true],
    [true, true, false],
    [false, true, false],
    [false, false, false],
    [true, false, false],
];

/// Number of children per node, derived from the octant table.
const CHILD_COUNT: usize = OCTANTS.len();

/// Per-axis span used to seed root bounds around a point-like member.
const POINT_MEMBER_SPAN: f32 = 5.0;

/// Tuning thresholds for the dynamic octree.
///
/// Passed explicitly into the owning scene; there is no global tuning
/// state.
#[derive(Debug, Clone, Copy)]
pub struct OctreeConfig {
    /// Direct member count at which a node subdivides
    pub split_threshold: usize,
    /// Recursive member count at or below which a subtree collapses
    pub merge_threshold: usize,
    /// Outside-list size at which the root rebuilds over the union bound
    pub grow_threshold: usize,
    /// Dominant-child member count at or below which the root shrinks
    pub shrink_threshold: usize,
    /// Percentage by which adjacent child regions overlap near the center
    pub overlap_percent: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            split_threshold: 5,
            merge_threshold: 2,
            grow_threshold: 5,
            shrink_threshold: 2,
            overlap_percent: 0,
        }
    }
}

/// A single node in the octree arena.
struct OctreeNode {
    /// Parent node, `None` for the root
    parent: Option<NodeKey>,
    /// Child slots; all `Some` iff `split` is set
    children: [Option<NodeKey>; CHILD_COUNT],
    /// Whether this node has subdivided
    split: bool,
    /// Region this node covers in scene space
    bounds: Aabb,
    /// Side lengths children of this node get (half extent, inflated by overlap)
    child_lengths: Vec3,
    /// Members held directly at this node
    members: Vec<ObjectId>,
}

impl OctreeNode {
    fn new(parent: Option<NodeKey>) -> Self {
        Self {
            parent,
            children: [None; CHILD_COUNT],
            split: false,
            bounds: Aabb::new(Vec3::ZERO, Vec3::ZERO),
            child_lengths: Vec3::ZERO,
            members: Vec::new(),
        }
    }
}

/// Dynamic octree over members living in a caller-owned [`MemberStore`].
///
/// All mutation and traversal belongs to the single owning thread; the
/// only cross-thread path into the tree is the scene's task queue.
pub struct Octree {
    nodes: SlotMap<NodeKey, OctreeNode>,
    root: NodeKey,
    /// Members not contained by the current root region, pending a grow
    outside: Vec<ObjectId>,
    config: OctreeConfig,
}

impl Octree {
    /// Create an empty tree with the given thresholds.
    ///
    /// The root region is seeded from the first inserted member.
    pub fn new(config: OctreeConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OctreeNode::new(None));
        Self {
            nodes,
            root,
            outside: Vec::new(),
            config,
        }
    }

    /// The tree's tuning thresholds.
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// True when no member is held anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        let root = &self.nodes[self.root];
        !root.split && root.members.is_empty() && self.outside.is_empty()
    }

    /// Region currently covered by the root.
    pub fn root_bounds(&self) -> Aabb {
        self.nodes[self.root].bounds
    }

    /// Whether the root has subdivided.
    pub fn is_split(&self) -> bool {
        self.nodes[self.root].split
    }

    /// Number of members waiting outside the root region.
    pub fn outside_count(&self) -> usize {
        self.outside.len()
    }

    /// Number of members held directly at the root.
    pub fn root_member_count(&self) -> usize {
        self.nodes[self.root].members.len()
    }

    /// Number of live nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Region of a node named by a member's back-reference, if the node
    /// is still alive.
    pub fn node_bounds(&self, node: NodeKey) -> Option<Aabb> {
        self.nodes.get(node).map(|n| n.bounds)
    }

    /// Total member count: direct members, children, and the outside list.
    pub fn object_count(&self) -> usize {
        self.subtree_member_count(self.root) + self.outside.len()
    }

    // ===== INSERTION =====

    /// Insert a member into the tree.
    ///
    /// An empty tree seeds its root region around the member first
    /// (position ± the member's own per-axis span, so roughly eight times
    /// its volume; a fixed span for point-like members). A member the root
    /// region does not contain goes to the outside list, growing the tree
    /// once `grow_threshold` members have accumulated there.
    pub fn insert<M: IndexableMember>(&mut self, store: &mut MemberStore<M>, id: ObjectId) {
        if self.is_empty() {
            if self.seed_bounds(store, id) {
                self.add_to_members(store, self.root, id);
            }
            return;
        }

        let Some(bounds) = Self::stored_member_bounds(store, id) else {
            return;
        };
        if self.nodes[self.root].bounds.contains(&bounds) {
            self.internal_insert(self.root, store, id);
        } else {
            self.add_to_outside(store, id);
            if self.outside.len() >= self.config.grow_threshold {
                self.grow(store);
            }
        }
    }

    /// Insert below the root-bounds check.
    ///
    /// At a split node the member descends into the unique child that
    /// fully contains it; zero or multiple candidates leave it here. At a
    /// leaf it is appended, subdividing the node at `split_threshold`.
    fn internal_insert<M: IndexableMember>(
        &mut self,
        node: NodeKey,
        store: &mut MemberStore<M>,
        id: ObjectId,
    ) {
        if self.nodes[node].split {
            let Some(bounds) = Self::stored_member_bounds(store, id) else {
                return;
            };
            match self.sole_containing_child(node, &bounds) {
                Some(child) => self.internal_insert(child, store, id),
                None => self.add_to_members(store, node, id),
            }
        } else {
            self.add_to_members(store, node, id);
            if self.nodes[node].members.len() >= self.config.split_threshold {
                self.split(node, store);
            }
        }
    }

    /// The single child of `node` whose region fully contains `bounds`,
    /// or `None` when no child or more than one child qualifies.
    fn sole_containing_child(&self, node: NodeKey, bounds: &Aabb) -> Option<NodeKey> {
        let mut found = None;
        for child in self.nodes[node].children.iter().flatten() {
            if self.nodes[*child].bounds.contains(bounds) {
                if found.is_some() {
                    // Fits several children: stays at the parent.
                    return None;
                }
                found = Some(*child);
            }
        }
        found
    }

    /// Seed root bounds around the first member of an empty tree.
    ///
    /// Returns false if the member is missing from the store.
    fn seed_bounds<M: IndexableMember>(&mut self, store: &MemberStore<M>, id: ObjectId) -> bool {
        let Some(member) = store.get(&id) else {
            crate::scene_error!(SOURCE, "Cannot seed bounds: member {:?} is not in the store", id);
            return false;
        };
        let span = match member.bounding_volume() {
            Some(volume) => volume.aabb().extents().abs(),
            None => Vec3::splat(POINT_MEMBER_SPAN),
        };
        let position = member.scene_position();
        let bounds = Aabb::new(position - span, position + span);
        let overlap = self.config.overlap_percent;
        let root = &mut self.nodes[self.root];
        root.bounds = bounds;
        root.child_lengths = child_side_lengths(&bounds, overlap);
        scene_debug!(
            SOURCE,
            "Seeded root bounds {:?}..{:?} around member {:?}",
            bounds.min, bounds.max, id
        );
        true
    }

    /// Append a member to a node's direct list and point its
    /// back-reference here.
    fn add_to_members<M: IndexableMember>(
        &mut self,
        store: &mut MemberStore<M>,
        node: NodeKey,
        id: ObjectId,
    ) {
        if let Some(member) = store.get_mut(&id) {
            member.set_containing_node(Some(node));
        }
        self.nodes[node].members.push(id);
    }

    /// Park a member on the outside list with no containing node.
    fn add_to_outside<M: IndexableMember>(&mut self, store: &mut MemberStore<M>, id: ObjectId) {
        if let Some(member) = store.get_mut(&id) {
            member.set_containing_node(None);
        }
        self.outside.push(id);
    }

    // ===== SPLIT / MERGE =====

    /// Subdivide a node into eight children and redistribute its direct
    /// members. A member fitting exactly one child moves there; the rest
    /// stay put.
    fn split<M: IndexableMember>(&mut self, node: NodeKey, store: &mut MemberStore<M>) {
        scene_debug!(
            SOURCE,
            "Splitting node with {} members",
            self.nodes[node].members.len()
        );
        for slot in 0..CHILD_COUNT {
            if self.nodes[node].children[slot].is_none() {
                let child = self.nodes.insert(OctreeNode::new(Some(node)));
                self.nodes[node].children[slot] = Some(child);
            }
        }
        self.assign_child_regions(node);

        let members = std::mem::take(&mut self.nodes[node].members);
        let mut kept = Vec::new();
        for id in members {
            let Some(bounds) = Self::stored_member_bounds(store, id) else {
                continue;
            };
            match self.sole_containing_child(node, &bounds) {
                Some(child) => self.internal_insert(child, store, id),
                // Back-reference already points at this node.
                None => kept.push(id),
            }
        }
        self.nodes[node].members = kept;
        self.nodes[node].split = true;
    }

    /// Recursive member count of a node and all its descendants.
    fn subtree_member_count(&self, node: NodeKey) -> usize {
        let n = &self.nodes[node];
        let mut count = n.members.len();
        if n.split {
            for child in n.children.iter().flatten() {
                count += self.subtree_member_count(*child);
            }
        }
        count
    }

    /// Whether this subtree has thinned enough to collapse.
    fn can_merge(&self, node: NodeKey) -> bool {
        self.subtree_member_count(node) <= self.config.merge_threshold
    }

    /// Collapse a subtree: every descendant's members become direct
    /// members of `node` and the children are destroyed.
    ///
    /// Delegates upward first while the parent can also merge, so a
    /// removal never leaves a collapsed node dangling beneath an ancestor
    /// that should have collapsed instead.
    fn merge<M: IndexableMember>(&mut self, node: NodeKey, store: &mut MemberStore<M>) {
        if let Some(parent) = self.nodes[node].parent {
            if self.can_merge(parent) {
                self.merge(parent, store);
                return;
            }
        }
        if !self.nodes[node].split {
            return;
        }
        scene_debug!(
            SOURCE,
            "Merging subtree with {} members",
            self.subtree_member_count(node)
        );
        let mut collected = Vec::new();
        for slot in 0..CHILD_COUNT {
            if let Some(child) = self.nodes[node].children[slot].take() {
                self.collect_subtree_members(child, &mut collected);
                self.destroy_subtree(child);
            }
        }
        self.nodes[node].split = false;
        for id in collected {
            self.add_to_members(store, node, id);
        }
    }

    /// Gather the members of a node and all its descendants.
    fn collect_subtree_members(&self, node: NodeKey, out: &mut Vec<ObjectId>) {
        let n = &self.nodes[node];
        out.extend_from_slice(&n.members);
        if n.split {
            for child in n.children.iter().flatten() {
                self.collect_subtree_members(*child, out);
            }
        }
    }

    /// Remove a node and all its descendants from the arena.
    fn destroy_subtree(&mut self, node: NodeKey) {
        let children = self.nodes[node].children;
        for child in children.iter().flatten() {
            self.destroy_subtree(*child);
        }
        self.nodes.remove(node);
    }

    // ===== GROW / SHRINK =====

    /// Rebuild the tree over the union bound of every live member.
    ///
    /// Root bounds become the min/max union over all members (inside and
    /// outside), child regions are recomputed, and every member is
    /// re-inserted from scratch: the octant boundaries moved, so old
    /// placements are no longer valid.
    fn grow<M: IndexableMember>(&mut self, store: &mut MemberStore<M>) {
        let members = self.take_all_members(store);
        scene_debug!(SOURCE, "Growing tree over {} members", members.len());

        let mut union: Option<Aabb> = None;
        for id in &members {
            let Some(bounds) = Self::stored_member_bounds(store, *id) else {
                continue;
            };
            union = Some(match union {
                Some(current) => current.union(&bounds),
                None => bounds,
            });
        }
        let Some(bounds) = union else {
            return;
        };

        let overlap = self.config.overlap_percent;
        {
            let root = &mut self.nodes[self.root];
            root.bounds = bounds;
            root.child_lengths = child_side_lengths(&bounds, overlap);
        }
        if self.nodes[self.root].split {
            self.assign_child_regions(self.root);
        }
        for id in members {
            self.internal_insert(self.root, store, id);
        }
    }

    /// Collapse the root onto its dominant child after removals.
    ///
    /// Requires that child to hold strictly more members than every
    /// sibling and at most `shrink_threshold` of them. The root takes the
    /// child's region, the children are destroyed, and every member is
    /// re-tested: contained members re-enter through `internal_insert`,
    /// the rest go outside.
    fn shrink<M: IndexableMember>(&mut self, store: &mut MemberStore<M>) {
        let root = self.root;
        if !self.nodes[root].split {
            return;
        }

        let children = self.nodes[root].children;
        let mut max_count = 0;
        let mut dominant = None;
        for child in children.iter().flatten() {
            let count = self.subtree_member_count(*child);
            if count > max_count {
                max_count = count;
                dominant = Some(*child);
            }
        }
        let Some(dominant) = dominant else {
            return;
        };
        for child in children.iter().flatten() {
            if *child != dominant && self.subtree_member_count(*child) == max_count {
                // Tied siblings: no dominant child, keep the tree as is.
                return;
            }
        }
        if max_count > self.config.shrink_threshold {
            return;
        }

        scene_debug!(SOURCE, "Shrinking root onto child holding {} members", max_count);
        let new_bounds = self.nodes[dominant].bounds;
        let members = self.take_all_members(store);
        let overlap = self.config.overlap_percent;
        {
            let node = &mut self.nodes[root];
            node.bounds = new_bounds;
            node.child_lengths = child_side_lengths(&new_bounds, overlap);
        }
        for slot in 0..CHILD_COUNT {
            if let Some(child) = self.nodes[root].children[slot].take() {
                self.destroy_subtree(child);
            }
        }
        self.nodes[root].split = false;

        for id in members {
            let Some(bounds) = Self::stored_member_bounds(store, id) else {
                continue;
            };
            if self.nodes[root].bounds.contains(&bounds) {
                self.internal_insert(root, store, id);
            } else {
                self.add_to_outside(store, id);
            }
        }
    }

    /// Drain every member from the tree (lists and outside), clearing
    /// their back-references. Node structure is left in place.
    fn take_all_members<M: IndexableMember>(&mut self, store: &mut MemberStore<M>) -> Vec<ObjectId> {
        let mut out = Vec::new();
        out.append(&mut self.outside);
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            let node = &mut self.nodes[key];
            out.append(&mut node.members);
            if node.split {
                let children = node.children;
                stack.extend(children.iter().flatten());
            }
        }
        for id in &out {
            if let Some(member) = store.get_mut(id) {
                member.set_containing_node(None);
            }
        }
        out
    }

    // ===== REMOVAL / RELOCATION =====

    /// Remove a member from the tree.
    ///
    /// Idempotent: removing a member that is not indexed (no containing
    /// node, not outside) is a no-op. A successful removal clears the
    /// back-reference, lets the holding subtree merge, and gives the root
    /// a chance to shrink.
    pub fn remove<M: IndexableMember>(&mut self, store: &mut MemberStore<M>, id: ObjectId) {
        let container = store.get(&id).and_then(|m| m.containing_node());
        match container {
            None => {
                if let Some(pos) = self.outside.iter().position(|other| *other == id) {
                    self.outside.swap_remove(pos);
                }
            }
            Some(node) => {
                if let Some(n) = self.nodes.get_mut(node) {
                    if let Some(pos) = n.members.iter().position(|other| *other == id) {
                        n.members.swap_remove(pos);
                    }
                }
                if let Some(member) = store.get_mut(&id) {
                    member.set_containing_node(None);
                }
                if self.nodes.contains_key(node) && self.can_merge(node) {
                    self.merge(node, store);
                }
            }
        }
        if self.nodes[self.root].split {
            self.shrink(store);
        }
    }

    /// Re-examine a member after it moved.
    ///
    /// A member still contained where it lives stays put. Otherwise it is
    /// relocated through a full remove + insert (which also re-seeds the
    /// root when the member was the tree's only occupant). A member
    /// waiting outside that now fits the root region is pulled inside.
    pub fn update_object<M: IndexableMember>(&mut self, store: &mut MemberStore<M>, id: ObjectId) {
        let Some(member) = store.get(&id) else {
            return;
        };
        let bounds = member_bounds(member);
        match member.containing_node() {
            Some(node) => {
                let still_contained = self
                    .nodes
                    .get(node)
                    .is_some_and(|n| n.bounds.contains(&bounds));
                if !still_contained {
                    self.remove(store, id);
                    self.insert(store, id);
                }
            }
            None => {
                if let Some(pos) = self.outside.iter().position(|other| *other == id) {
                    if self.nodes[self.root].bounds.contains(&bounds) {
                        self.outside.swap_remove(pos);
                        self.internal_insert(self.root, store, id);
                    }
                }
            }
        }
    }

    /// Remove every member and reset to a single unseeded root.
    pub fn clear<M: IndexableMember>(&mut self, store: &mut MemberStore<M>) {
        let _ = self.take_all_members(store);
        let root = self.root;
        for slot in 0..CHILD_COUNT {
            if let Some(child) = self.nodes[root].children[slot].take() {
                self.destroy_subtree(child);
            }
        }
        let node = &mut self.nodes[root];
        node.split = false;
        node.bounds = Aabb::new(Vec3::ZERO, Vec3::ZERO);
        node.child_lengths = Vec3::ZERO;
        scene_debug!(SOURCE, "Cleared tree");
    }

    // ===== REGIONS =====

    /// Recompute the regions of a node's children from its current bounds
    /// and child side lengths, cascading into split children.
    fn assign_child_regions(&mut self, node: NodeKey) {
        let parent_bounds = self.nodes[node].bounds;
        let lengths = self.nodes[node].child_lengths;
        let children = self.nodes[node].children;
        let overlap = self.config.overlap_percent;
        for (octant, child) in children.iter().enumerate() {
            let Some(child) = *child else {
                continue;
            };
            let bounds = octant_region(&parent_bounds, lengths, OCTANTS[octant]);
            {
                let n = &mut self.nodes[child];
                n.bounds = bounds;
                n.child_lengths = child_side_lengths(&bounds, overlap);
            }
            if self.nodes[child].split {
                self.assign_child_regions(child);
            }
        }
    }

    /// Visit every live node's region with its depth (root = 0).
    ///
    /// Development aid for drawing the partitioning; call it on the owning
    /// thread after a drain, never concurrently with one.
    pub fn visit_regions(&self, mut visitor: impl FnMut(&Aabb, usize)) {
        self.visit_node(self.root, 0, &mut visitor);
    }

    fn visit_node(&self, node: NodeKey, depth: usize, visitor: &mut impl FnMut(&Aabb, usize)) {
        let n = &self.nodes[node];
        visitor(&n.bounds, depth);
        if n.split {
            for child in n.children.iter().flatten() {
                self.visit_node(*child, depth + 1, visitor);
            }
        }
    }

    /// Resolved bounds of a member in the store, or `None` if it is
    /// missing (a scene-level bookkeeping defect, reported loudly).
    fn stored_member_bounds<M: IndexableMember>(
        store: &MemberStore<M>,
        id: ObjectId,
    ) -> Option<Aabb> {
        match store.get(&id) {
            Some(member) => Some(member_bounds(member)),
            None => {
                crate::scene_error!(SOURCE, "Member {:?} is not in the store", id);
                None
            }
        }
    }
}

/// Resolved AABB of a member: its volume's enclosing box, or a degenerate
/// box at its position for point-like members.
fn member_bounds<M: IndexableMember>(member: &M) -> Aabb {
    match member.bounding_volume() {
        Some(volume) => volume.aabb(),
        None => Aabb::point(member.scene_position()),
    }
}

/// Side lengths for children of a region: half the extent on each axis,
/// inflated by the configured overlap percentage.
fn child_side_lengths(bounds: &Aabb, overlap_percent: u32) -> Vec3 {
    (bounds.extents() * 0.5 * (1.0 + overlap_percent as f32 / 100.0)).abs()
}

/// Region of one octant: corner-anchored at the like-signed parent corner
/// with the given side lengths.
fn octant_region(parent: &Aabb, side_lengths: Vec3, anchors: [bool; 3]) -> Aabb {
    let mut min = Vec3::ZERO;
    let mut max = Vec3::ZERO;
    for axis in 0..3 {
        if anchors[axis] {
            max[axis] = parent.max[axis];
            min[axis] = parent.max[axis] - side_lengths[axis];
        } else {
            min[axis] = parent.min[axis];
            max[axis] = parent.min[axis] + side_lengths[axis];
        }
    }
    Aabb::new(min, max)
}

#[cfg(test)]
#[path = "octree_tests.rs"]
mod tests;
