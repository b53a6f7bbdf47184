/// Scene task queue.
///
/// Every structural change to the scene — spatial objects, cameras,
/// lights, plugins, animations — is expressed as a task, appended to one
/// FIFO, and applied by the owning thread's drain. One mutex guards both
/// the enqueue and the whole drain, so producers observe the queue as
/// either not-yet-applied or fully applied, never in between.
///
/// Element identity is an id minted at enqueue time: every add returns the
/// new element's id immediately, so a producer can name the element in
/// later remove/replace tasks without waiting for a drain. Enqueued tasks
/// cannot be withdrawn.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::graph::ObjectId;
use super::animation::Animation;
use super::camera::Camera;
use super::light::Light;
use super::object::SceneObject;
use super::plugin::ScenePlugin;

/// Identifier of a camera in the scene's camera list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CameraId(pub(crate) u64);

/// Identifier of a light in the scene's light list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(pub(crate) u64);

/// Identifier of a registered scene plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(pub(crate) u64);

/// Identifier of a registered animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub(crate) u64);

/// One structural operation against a single category's collection.
pub(crate) enum TaskKind<I, T> {
    /// Append, or insert at an explicit index where the collection is ordered
    Add {
        id: I,
        item: T,
        index: Option<usize>,
    },
    /// Bulk append
    AddAll(Vec<(I, T)>),
    /// Remove by identity or by explicit index
    Remove {
        id: Option<I>,
        index: Option<usize>,
    },
    /// Remove an explicit set, or clear the whole category when `None`
    RemoveAll(Option<Vec<I>>),
    /// Swap the element named by identity or index for `replacement`
    Replace {
        id: Option<I>,
        index: Option<usize>,
        replacement: T,
    },
}

/// A pending structural change, tagged by target category.
pub(crate) enum SceneTask {
    Object(TaskKind<ObjectId, SceneObject>),
    Camera(TaskKind<CameraId, Camera>),
    Light(TaskKind<LightId, Light>),
    Plugin(TaskKind<PluginId, Box<dyn ScenePlugin>>),
    Animation(TaskKind<AnimationId, Box<dyn Animation>>),
}

/// Cloneable producer handle to a scene's task queue.
///
/// Any thread may enqueue at any time, including while the owning thread
/// drains. The pending-camera slot lives behind its own lock, independent
/// of the queue lock, so setting it never contends with a drain.
#[derive(Clone)]
pub struct SceneQueue {
    tasks: Arc<Mutex<VecDeque<SceneTask>>>,
    next_id: Arc<AtomicU64>,
    next_camera: Arc<Mutex<Option<CameraId>>>,
}

impl SceneQueue {
    pub(crate) fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(VecDeque::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            next_camera: Arc::new(Mutex::new(None)),
        }
    }

    /// Mint a fresh id value, unique for the lifetime of this queue.
    pub(crate) fn mint(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Lock the task FIFO for a whole drain.
    pub(crate) fn lock_tasks(&self) -> MutexGuard<'_, VecDeque<SceneTask>> {
        // A poisoned lock only means some producer panicked mid-enqueue;
        // the deque itself is still coherent.
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Consume the pending camera swap, if one was requested.
    pub(crate) fn take_next_camera(&self) -> Option<CameraId> {
        self.next_camera
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn push(&self, task: SceneTask) {
        self.lock_tasks().push_back(task);
    }

    // ===== SPATIAL OBJECTS =====

    /// Queue a spatial object for addition; returns its id immediately.
    pub fn add_object(&self, object: SceneObject) -> ObjectId {
        let id = ObjectId::from_raw(self.mint());
        self.push(SceneTask::Object(TaskKind::Add {
            id,
            item: object,
            index: None,
        }));
        id
    }

    /// Queue a batch of spatial objects; returns their ids in order.
    pub fn add_objects(&self, objects: Vec<SceneObject>) -> Vec<ObjectId> {
        let items: Vec<(ObjectId, SceneObject)> = objects
            .into_iter()
            .map(|object| (ObjectId::from_raw(self.mint()), object))
            .collect();
        let ids = items.iter().map(|(id, _)| *id).collect();
        self.push(SceneTask::Object(TaskKind::AddAll(items)));
        ids
    }

    /// Queue a spatial object for removal. Removing an object that is
    /// absent by drain time is a no-op.
    pub fn remove_object(&self, id: ObjectId) {
        self.push(SceneTask::Object(TaskKind::Remove {
            id: Some(id),
            index: None,
        }));
    }

    /// Queue a batch of spatial objects for removal.
    pub fn remove_objects(&self, ids: Vec<ObjectId>) {
        self.push(SceneTask::Object(TaskKind::RemoveAll(Some(ids))));
    }

    /// Queue removal of every spatial object.
    pub fn clear_objects(&self) {
        self.push(SceneTask::Object(TaskKind::RemoveAll(None)));
    }

    /// Queue a swap of the object named by `id` for `replacement`.
    ///
    /// The replacement keeps the id. Draining fails loudly if the id is
    /// not present.
    pub fn replace_object(&self, id: ObjectId, replacement: SceneObject) {
        self.push(SceneTask::Object(TaskKind::Replace {
            id: Some(id),
            index: None,
            replacement,
        }));
    }

    // ===== CAMERAS =====

    /// Queue a camera for addition; returns its id immediately.
    pub fn add_camera(&self, camera: Camera) -> CameraId {
        let id = CameraId(self.mint());
        self.push(SceneTask::Camera(TaskKind::Add {
            id,
            item: camera,
            index: None,
        }));
        id
    }

    /// Queue a camera for insertion at an explicit list index.
    pub fn add_camera_at(&self, camera: Camera, index: usize) -> CameraId {
        let id = CameraId(self.mint());
        self.push(SceneTask::Camera(TaskKind::Add {
            id,
            item: camera,
            index: Some(index),
        }));
        id
    }

    /// Queue a batch of cameras; returns their ids in order.
    pub fn add_cameras(&self, cameras: Vec<Camera>) -> Vec<CameraId> {
        let items: Vec<(CameraId, Camera)> = cameras
            .into_iter()
            .map(|camera| (CameraId(self.mint()), camera))
            .collect();
        let ids = items.iter().map(|(id, _)| *id).collect();
        self.push(SceneTask::Camera(TaskKind::AddAll(items)));
        ids
    }

    /// Queue a camera for removal by id.
    pub fn remove_camera(&self, id: CameraId) {
        self.push(SceneTask::Camera(TaskKind::Remove {
            id: Some(id),
            index: None,
        }));
    }

    /// Queue a camera for removal by list index.
    pub fn remove_camera_at(&self, index: usize) {
        self.push(SceneTask::Camera(TaskKind::Remove {
            id: None,
            index: Some(index),
        }));
    }

    /// Queue a batch of cameras for removal.
    pub fn remove_cameras(&self, ids: Vec<CameraId>) {
        self.push(SceneTask::Camera(TaskKind::RemoveAll(Some(ids))));
    }

    /// Queue removal of every camera except the active one.
    pub fn clear_cameras(&self) {
        self.push(SceneTask::Camera(TaskKind::RemoveAll(None)));
    }

    /// Queue a swap of the camera named by `id` for `replacement`.
    pub fn replace_camera(&self, id: CameraId, replacement: Camera) {
        self.push(SceneTask::Camera(TaskKind::Replace {
            id: Some(id),
            index: None,
            replacement,
        }));
    }

    /// Queue a swap of the camera at `index` for `replacement`.
    pub fn replace_camera_at(&self, index: usize, replacement: Camera) {
        self.push(SceneTask::Camera(TaskKind::Replace {
            id: None,
            index: Some(index),
            replacement,
        }));
    }

    /// Request an active-camera swap, applied once at the end of the next
    /// drain. Guarded by its own lock, separate from the queue lock.
    pub fn switch_camera(&self, id: CameraId) {
        *self
            .next_camera
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id);
    }

    // ===== LIGHTS =====

    /// Queue a light for addition; returns its id immediately.
    pub fn add_light(&self, light: Light) -> LightId {
        let id = LightId(self.mint());
        self.push(SceneTask::Light(TaskKind::Add {
            id,
            item: light,
            index: None,
        }));
        id
    }

    /// Queue a light for insertion at an explicit list index.
    pub fn add_light_at(&self, light: Light, index: usize) -> LightId {
        let id = LightId(self.mint());
        self.push(SceneTask::Light(TaskKind::Add {
            id,
            item: light,
            index: Some(index),
        }));
        id
    }

    /// Queue a batch of lights; returns their ids in order.
    pub fn add_lights(&self, lights: Vec<Light>) -> Vec<LightId> {
        let items: Vec<(LightId, Light)> = lights
            .into_iter()
            .map(|light| (LightId(self.mint()), light))
            .collect();
        let ids = items.iter().map(|(id, _)| *id).collect();
        self.push(SceneTask::Light(TaskKind::AddAll(items)));
        ids
    }

    /// Queue a light for removal by id.
    pub fn remove_light(&self, id: LightId) {
        self.push(SceneTask::Light(TaskKind::Remove {
            id: Some(id),
            index: None,
        }));
    }

    /// Queue a light for removal by list index.
    pub fn remove_light_at(&self, index: usize) {
        self.push(SceneTask::Light(TaskKind::Remove {
            id: None,
            index: Some(index),
        }));
    }

    /// Queue removal of every light.
    pub fn clear_lights(&self) {
        self.push(SceneTask::Light(TaskKind::RemoveAll(None)));
    }

    /// Queue a swap of the light named by `id` for `replacement`.
    pub fn replace_light(&self, id: LightId, replacement: Light) {
        self.push(SceneTask::Light(TaskKind::Replace {
            id: Some(id),
            index: None,
            replacement,
        }));
    }

    // ===== PLUGINS =====

    /// Queue a plugin for registration; returns its id immediately.
    pub fn add_plugin(&self, plugin: Box<dyn ScenePlugin>) -> PluginId {
        let id = PluginId(self.mint());
        self.push(SceneTask::Plugin(TaskKind::Add {
            id,
            item: plugin,
            index: None,
        }));
        id
    }

    /// Queue a plugin for removal by id.
    pub fn remove_plugin(&self, id: PluginId) {
        self.push(SceneTask::Plugin(TaskKind::Remove {
            id: Some(id),
            index: None,
        }));
    }

    /// Queue removal of every plugin.
    pub fn clear_plugins(&self) {
        self.push(SceneTask::Plugin(TaskKind::RemoveAll(None)));
    }

    /// Queue a swap of the plugin named by `id` for `replacement`.
    pub fn replace_plugin(&self, id: PluginId, replacement: Box<dyn ScenePlugin>) {
        self.push(SceneTask::Plugin(TaskKind::Replace {
            id: Some(id),
            index: None,
            replacement,
        }));
    }

    // ===== ANIMATIONS =====

    /// Queue an animation for registration; returns its id immediately.
    pub fn add_animation(&self, animation: Box<dyn Animation>) -> AnimationId {
        let id = AnimationId(self.mint());
        self.push(SceneTask::Animation(TaskKind::Add {
            id,
            item: animation,
            index: None,
        }));
        id
    }

    /// Queue an animation for removal by id.
    pub fn remove_animation(&self, id: AnimationId) {
        self.push(SceneTask::Animation(TaskKind::Remove {
            id: Some(id),
            index: None,
        }));
    }

    /// Queue removal of every animation.
    pub fn clear_animations(&self) {
        self.push(SceneTask::Animation(TaskKind::RemoveAll(None)));
    }

    /// Queue a swap of the animation named by `id` for `replacement`.
    pub fn replace_animation(&self, id: AnimationId, replacement: Box<dyn Animation>) {
        self.push(SceneTask::Animation(TaskKind::Replace {
            id: Some(id),
            index: None,
            replacement,
        }));
    }

    /// Number of tasks currently waiting. Advisory only: another producer
    /// may enqueue immediately after this returns.
    pub fn pending_len(&self) -> usize {
        self.lock_tasks().len()
    }
}
