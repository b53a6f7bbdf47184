//! Scene management module
//!
//! Provides the owning `Scene` (spatial objects, cameras, lights, plugins,
//! animations), the thread-safe `SceneQueue` through which producers submit
//! structural changes, and the per-tick drain that applies them.

mod object;
mod camera;
mod light;
mod plugin;
mod animation;
mod task;
mod scene;

pub use object::{ObjectFlags, ObjectStore, SceneObject};
pub use camera::Camera;
pub use light::{Light, LightKind};
pub use plugin::ScenePlugin;
pub use animation::{Animation, OrbitAnimation};
pub use task::{AnimationId, CameraId, LightId, PluginId, SceneQueue};
pub use scene::{Scene, SceneConfig};
