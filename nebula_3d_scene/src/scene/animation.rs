/// Animation seam and the stock orbit animation.
///
/// Animations mutate spatial objects on the owning thread; the scene
/// re-indexes each animation's target after every advance, so a driven
/// object can cross node boundaries (or leave the root region) freely.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::graph::ObjectId;
use super::object::ObjectStore;

/// A per-tick driver for one scene object.
pub trait Animation: Send {
    /// The object this animation moves, if any.
    ///
    /// The scene re-examines the target's index placement after each
    /// `update`.
    fn target(&self) -> Option<ObjectId>;

    /// Advance by `delta_seconds`, mutating the target in the store.
    fn update(&mut self, objects: &mut ObjectStore, delta_seconds: f32);
}

/// Rotates its target around a fixed center point in the XZ plane.
pub struct OrbitAnimation {
    target: ObjectId,
    center: Vec3,
    radius: f32,
    /// Radians per second
    angular_rate: f32,
    angle: f32,
}

impl OrbitAnimation {
    /// Orbit `target` around `center` at `radius`, advancing
    /// `angular_rate` radians per second.
    pub fn new(target: ObjectId, center: Vec3, radius: f32, angular_rate: f32) -> Self {
        Self {
            target,
            center,
            radius,
            angular_rate,
            angle: 0.0,
        }
    }

    /// Current orbit angle in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

impl Animation for OrbitAnimation {
    fn target(&self) -> Option<ObjectId> {
        Some(self.target)
    }

    fn update(&mut self, objects: &mut ObjectStore, delta_seconds: f32) {
        self.angle = (self.angle + self.angular_rate * delta_seconds) % TAU;
        if let Some(object) = objects.get_mut(&self.target) {
            let offset = Vec3::new(self.angle.cos(), 0.0, self.angle.sin()) * self.radius;
            object.set_position(self.center + offset);
        }
    }
}
