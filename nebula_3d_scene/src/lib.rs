/*!
# Nebula3D Scene Core

Scene-side core for the Nebula3D engine: a dynamic bounding-box octree for
spatial sorting of scene objects, and the thread-safe task queue through
which all structural scene changes are funneled.

## Architecture

- **bounds**: AABB / sphere bounding volumes consumed by the spatial graph
- **graph**: the dynamic octree (split/merge/grow/shrink) and the
  `IndexableMember` capability required of anything it sorts
- **scene**: the owning `Scene` (objects, cameras, lights, plugins,
  animations), the `SceneQueue` producer handle, and per-tick draining

Renderers are external: they receive the scene's collections and the index
traversal hooks, and are expected to run on the same thread that drains the
queue. Producer threads only ever touch a `SceneQueue` clone.
*/

// Internal modules
mod error;
pub mod log;
pub mod bounds;
pub mod graph;
pub mod scene;

// Main nebula3d namespace module
pub mod nebula3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger,
        };
        // Note: scene_* macros are NOT re-exported here - they are internal only
    }

    // Bounding volume sub-module
    pub mod bounds {
        pub use crate::bounds::*;
    }

    // Spatial graph sub-module
    pub mod graph {
        pub use crate::graph::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
