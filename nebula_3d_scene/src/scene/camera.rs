/// Perspective camera.
///
/// A plain data container: the scene stores cameras and tracks which one
/// is active, renderers read the derived matrices. Swapping the active
/// camera goes through the scene's pending-camera slot so dependent state
/// (e.g. a projection matrix) is never read mid-swap.

use glam::{Mat4, Vec3};

/// Perspective camera described by a look-at pose and projection parameters.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    fov_y_radians: f32,
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
}

impl Camera {
    /// Create a camera at `position` looking at `target`.
    ///
    /// Defaults: Y-up, 60° vertical FOV, 16:9 aspect, near 0.1, far 1000.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y_radians: 60.0_f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    /// Camera position in scene space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Point the camera looks at.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Move the camera.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Aim the camera.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Set the projection parameters.
    pub fn set_projection(&mut self, fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) {
        self.fov_y_radians = fov_y_radians;
        self.aspect_ratio = aspect_ratio;
        self.z_near = z_near;
        self.z_far = z_far;
    }

    /// View matrix (right-handed look-at).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection matrix (right-handed perspective).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, self.aspect_ratio, self.z_near, self.z_far)
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
