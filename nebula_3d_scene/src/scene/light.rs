/// Light value types.
///
/// The scene only stores and hands these to renderers; no shading math
/// lives here.

use glam::Vec3;

/// Kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Infinitely-distant light with a direction only
    Directional,
    /// Omnidirectional light with a position and falloff power
    Point,
}

/// A light in the scene.
#[derive(Debug, Clone)]
pub struct Light {
    pub kind: LightKind,
    /// Linear RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub power: f32,
    /// Position (point lights)
    pub position: Vec3,
    /// Direction (directional lights), not required to be normalized
    pub direction: Vec3,
}

impl Light {
    /// A directional light with unit power.
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            power: 1.0,
            position: Vec3::ZERO,
            direction,
        }
    }

    /// A point light.
    pub fn point(position: Vec3, color: Vec3, power: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            power,
            position,
            direction: Vec3::ZERO,
        }
    }
}
