/// Scene — the owning container for everything the renderer draws.
///
/// One thread owns the scene: it drains the task queue, mutates the
/// spatial graph and the sibling collections, and runs all queries and
/// traversals. Producer threads interact only through `SceneQueue` clones.
/// `drain()` must run before any index query in the same tick.

use crate::error::{Error, Result};
use crate::graph::{ObjectId, Octree, OctreeConfig};
use crate::{scene_debug, scene_warn};

use super::animation::Animation;
use super::camera::Camera;
use super::light::Light;
use super::object::{ObjectStore, SceneObject};
use super::plugin::ScenePlugin;
use super::task::{AnimationId, CameraId, LightId, PluginId, SceneQueue, SceneTask, TaskKind};

const SOURCE: &str = "nebula3d::Scene";

/// Configuration handed to a new scene.
///
/// Explicit per-scene state; there is no global tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneConfig {
    /// Thresholds for the spatial graph
    pub octree: OctreeConfig,
}

/// The owning scene: spatial objects plus ordered sibling collections.
pub struct Scene {
    objects: ObjectStore,
    graph: Octree,
    cameras: Vec<(CameraId, Camera)>,
    lights: Vec<(LightId, Light)>,
    plugins: Vec<(PluginId, Box<dyn ScenePlugin>)>,
    animations: Vec<(AnimationId, Box<dyn Animation>)>,
    active_camera: Option<CameraId>,
    queue: SceneQueue,
}

impl Scene {
    /// Create an empty scene with the given configuration.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            objects: ObjectStore::default(),
            graph: Octree::new(config.octree),
            cameras: Vec::new(),
            lights: Vec::new(),
            plugins: Vec::new(),
            animations: Vec::new(),
            active_camera: None,
            queue: SceneQueue::new(),
        }
    }

    /// A producer handle to this scene's task queue. Clone freely and
    /// hand to any thread.
    pub fn queue(&self) -> SceneQueue {
        self.queue.clone()
    }

    // ===== DRAIN =====

    /// Apply every pending task, then the pending camera swap.
    ///
    /// Owning thread only, once per tick, before any index query. The
    /// queue lock is held for the entire drain: a producer sees its tasks
    /// either not yet applied or fully applied. Draining an empty queue
    /// is a no-op. Tasks are applied strictly in FIFO order with no
    /// coalescing; the first failing task aborts the drain (it is
    /// consumed, later tasks stay queued for the next tick).
    pub fn drain(&mut self) -> Result<()> {
        let queue = self.queue.clone();
        let mut tasks = queue.lock_tasks();
        while let Some(task) = tasks.pop_front() {
            self.apply_task(task)?;
        }
        drop(tasks);

        self.apply_pending_camera();
        Ok(())
    }

    fn apply_task(&mut self, task: SceneTask) -> Result<()> {
        match task {
            SceneTask::Object(kind) => self.apply_object_task(kind),
            SceneTask::Camera(kind) => self.apply_camera_task(kind),
            SceneTask::Light(kind) => apply_list_task(&mut self.lights, kind, "light"),
            SceneTask::Plugin(kind) => apply_list_task(&mut self.plugins, kind, "plugin"),
            SceneTask::Animation(kind) => apply_list_task(&mut self.animations, kind, "animation"),
        }
    }

    /// Spatial-object tasks also maintain the octree.
    fn apply_object_task(&mut self, kind: TaskKind<ObjectId, SceneObject>) -> Result<()> {
        match kind {
            TaskKind::Add { id, item, index: _ } => {
                // The object store is unordered; an explicit index carries
                // no meaning here.
                self.objects.insert(id, item);
                self.graph.insert(&mut self.objects, id);
                Ok(())
            }
            TaskKind::AddAll(items) => {
                for (id, item) in items {
                    self.objects.insert(id, item);
                    self.graph.insert(&mut self.objects, id);
                }
                Ok(())
            }
            TaskKind::Remove { id: Some(id), .. } => {
                self.graph.remove(&mut self.objects, id);
                self.objects.remove(&id);
                Ok(())
            }
            TaskKind::Remove { id: None, .. } => Err(Error::InvalidIndex(
                "spatial objects are not index-addressable".to_string(),
            )),
            TaskKind::RemoveAll(Some(ids)) => {
                for id in ids {
                    self.graph.remove(&mut self.objects, id);
                    self.objects.remove(&id);
                }
                Ok(())
            }
            TaskKind::RemoveAll(None) => {
                self.graph.clear(&mut self.objects);
                self.objects.clear();
                Ok(())
            }
            TaskKind::Replace {
                id: Some(id),
                replacement,
                ..
            } => {
                if !self.objects.contains_key(&id) {
                    return Err(Error::TargetNotFound(format!(
                        "scene object {:?} not present for replace",
                        id
                    )));
                }
                self.graph.remove(&mut self.objects, id);
                self.objects.insert(id, replacement);
                self.graph.insert(&mut self.objects, id);
                Ok(())
            }
            TaskKind::Replace { id: None, .. } => Err(Error::InvalidIndex(
                "spatial objects are not index-addressable".to_string(),
            )),
        }
    }

    /// Camera tasks keep the active-camera id consistent with the list.
    fn apply_camera_task(&mut self, kind: TaskKind<CameraId, Camera>) -> Result<()> {
        if let TaskKind::RemoveAll(None) = kind {
            // Clearing cameras keeps the active one registered.
            let active = self.active_camera;
            self.cameras.retain(|(id, _)| Some(*id) == active);
            return Ok(());
        }

        apply_list_task(&mut self.cameras, kind, "camera")?;

        match self.active_camera {
            Some(active) if !self.cameras.iter().any(|(id, _)| *id == active) => {
                // The active camera was removed: fall back to the first.
                self.active_camera = self.cameras.first().map(|(id, _)| *id);
                scene_debug!(
                    SOURCE,
                    "Active camera removed, falling back to {:?}",
                    self.active_camera
                );
            }
            None => {
                self.active_camera = self.cameras.first().map(|(id, _)| *id);
            }
            _ => {}
        }
        Ok(())
    }

    /// Consume the pending camera swap exactly once per drain.
    fn apply_pending_camera(&mut self) {
        if let Some(id) = self.queue.take_next_camera() {
            if self.cameras.iter().any(|(cid, _)| *cid == id) {
                self.active_camera = Some(id);
            } else {
                scene_warn!(
                    SOURCE,
                    "Pending camera {:?} is not in the scene, keeping {:?}",
                    id,
                    self.active_camera
                );
            }
        }
    }

    // ===== DIRECT OWNING-THREAD API =====

    /// Insert a spatial object immediately (owning thread only), bypassing
    /// the queue. Returns the new object's id.
    pub fn insert_object(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId::from_raw(self.queue.mint());
        self.objects.insert(id, object);
        self.graph.insert(&mut self.objects, id);
        id
    }

    /// Remove a spatial object immediately (owning thread only).
    /// Removing an absent object is a no-op.
    pub fn remove_object(&mut self, id: ObjectId) {
        self.graph.remove(&mut self.objects, id);
        self.objects.remove(&id);
    }

    /// Re-examine an object's index placement after it moved.
    pub fn notify_moved(&mut self, id: ObjectId) {
        self.graph.update_object(&mut self.objects, id);
    }

    /// Move an object and re-examine its placement in one step.
    pub fn move_object(&mut self, id: ObjectId, position: glam::Vec3) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.set_position(position);
            self.graph.update_object(&mut self.objects, id);
        }
    }

    /// Remove every spatial object and reset the index.
    pub fn clear_spatial(&mut self) {
        self.graph.clear(&mut self.objects);
        self.objects.clear();
    }

    // ===== TICK DRIVERS =====

    /// Advance every animation and re-index the objects they moved.
    pub fn advance_animations(&mut self, delta_seconds: f32) {
        let mut animations = std::mem::take(&mut self.animations);
        for (_, animation) in animations.iter_mut() {
            animation.update(&mut self.objects, delta_seconds);
            if let Some(target) = animation.target() {
                self.graph.update_object(&mut self.objects, target);
            }
        }
        self.animations = animations;
    }

    /// Tick every registered plugin.
    pub fn tick_plugins(&mut self, delta_seconds: f32) {
        for (_, plugin) in self.plugins.iter_mut() {
            plugin.tick(delta_seconds);
        }
    }

    // ===== ACCESSORS =====

    /// Total number of indexed spatial objects.
    pub fn object_count(&self) -> usize {
        self.graph.object_count()
    }

    /// Look up a spatial object.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Iterate spatial objects with the VISIBLE flag set.
    pub fn visible_objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .filter(|(_, object)| object.is_visible())
            .map(|(id, object)| (*id, object))
    }

    /// The spatial graph, for owning-thread queries and traversal.
    pub fn graph(&self) -> &Octree {
        &self.graph
    }

    /// Visit every live index node's region (debug visualization;
    /// owning thread, after a drain).
    pub fn visit_index_regions(&self, visitor: impl FnMut(&crate::bounds::Aabb, usize)) {
        self.graph.visit_regions(visitor);
    }

    /// Number of cameras.
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Look up a camera by id.
    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, camera)| camera)
    }

    /// Cameras in list order.
    pub fn cameras(&self) -> impl Iterator<Item = (CameraId, &Camera)> {
        self.cameras.iter().map(|(id, camera)| (*id, camera))
    }

    /// Id of the active camera, if any.
    pub fn active_camera_id(&self) -> Option<CameraId> {
        self.active_camera
    }

    /// The active camera, if any.
    pub fn active_camera(&self) -> Option<&Camera> {
        self.active_camera.and_then(|id| self.camera(id))
    }

    /// Number of lights.
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Lights in list order.
    pub fn lights(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.lights.iter().map(|(id, light)| (*id, light))
    }

    /// Number of registered plugins.
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Number of registered animations.
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }
}

/// Apply a task to an ordered `(id, element)` list.
///
/// Identity-removal of an absent element is a no-op; identity-replacement
/// of an absent element fails loudly. Explicit indexes outside the list
/// fail loudly. Replacement keeps the replaced element's id.
fn apply_list_task<I, T>(list: &mut Vec<(I, T)>, kind: TaskKind<I, T>, what: &str) -> Result<()>
where
    I: Copy + PartialEq + std::fmt::Debug,
{
    match kind {
        TaskKind::Add { id, item, index } => match index {
            None => {
                list.push((id, item));
                Ok(())
            }
            Some(index) if index <= list.len() => {
                list.insert(index, (id, item));
                Ok(())
            }
            Some(index) => Err(Error::InvalidIndex(format!(
                "{} index {} out of bounds (len {})",
                what,
                index,
                list.len()
            ))),
        },
        TaskKind::AddAll(items) => {
            list.extend(items);
            Ok(())
        }
        TaskKind::Remove {
            id: Some(id),
            index: _,
        } => {
            if let Some(pos) = list.iter().position(|(other, _)| *other == id) {
                list.remove(pos);
            }
            Ok(())
        }
        TaskKind::Remove {
            id: None,
            index: Some(index),
        } => {
            if index < list.len() {
                list.remove(index);
                Ok(())
            } else {
                Err(Error::InvalidIndex(format!(
                    "{} index {} out of bounds (len {})",
                    what,
                    index,
                    list.len()
                )))
            }
        }
        TaskKind::Remove {
            id: None,
            index: None,
        } => Ok(()),
        TaskKind::RemoveAll(Some(ids)) => {
            list.retain(|(id, _)| !ids.contains(id));
            Ok(())
        }
        TaskKind::RemoveAll(None) => {
            list.clear();
            Ok(())
        }
        TaskKind::Replace {
            id: Some(id),
            replacement,
            ..
        } => match list.iter_mut().find(|(other, _)| *other == id) {
            Some(entry) => {
                entry.1 = replacement;
                Ok(())
            }
            None => Err(Error::TargetNotFound(format!(
                "{} {:?} not present for replace",
                what, id
            ))),
        },
        TaskKind::Replace {
            id: None,
            index: Some(index),
            replacement,
        } => {
            if index < list.len() {
                list[index].1 = replacement;
                Ok(())
            } else {
                Err(Error::InvalidIndex(format!(
                    "{} index {} out of bounds (len {})",
                    what,
                    index,
                    list.len()
                )))
            }
        }
        TaskKind::Replace {
            id: None,
            index: None,
            ..
        } => Err(Error::TargetNotFound(format!(
            "{} replace named no target",
            what
        ))),
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
