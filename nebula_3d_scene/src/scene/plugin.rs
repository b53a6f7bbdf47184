/// Scene plugin seam.

/// A named extension hooked into the scene's tick.
///
/// Plugins are registered and removed exclusively through the task queue
/// and are ticked by the owning thread after each drain. Renderer-side
/// effects (particle systems, skyboxes, debug overlays) live behind this
/// trait, outside the scene core.
pub trait ScenePlugin: Send {
    /// Stable name used for logs and diagnostics.
    fn name(&self) -> &str;

    /// Advance the plugin by `delta_seconds`.
    fn tick(&mut self, delta_seconds: f32);
}
