//! Scene lights: one ambient term, a few directional lights, and point lights
//! riding each star. Point lights are rebuilt every frame from the attached
//! solar systems; ambient and directional lights live for the whole mount.

use glam::Vec3;
use crate::api::types::Color;

/// A point light with finite falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Distance at which the contribution reaches zero.
    pub range: f32,
}

impl PointLight {
    pub fn new(color: Color, intensity: f32, range: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            color,
            intensity,
            range,
        }
    }

    /// Set the position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }
}

/// Light arriving from infinitely far away, shining from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(position: Vec3, color: Color, intensity: f32) -> Self {
        Self { position, color, intensity }
    }

    /// Unit vector the light travels along.
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize_or_zero()
    }
}

/// Manages active lights and ambient color for the scene.
pub struct LightState {
    points: Vec<PointLight>,
    directionals: Vec<DirectionalLight>,
    ambient: Color,
    ambient_intensity: f32,
}

impl LightState {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            directionals: Vec::new(),
            ambient: Color::BLACK,
            ambient_intensity: 0.0,
        }
    }

    /// The fixed rig of the galaxy scene: a soft ambient term, a primary key
    /// light and a dimmer fill from the opposite octant.
    pub fn galaxy_rig() -> Self {
        let mut state = Self::new();
        state.set_ambient(Color::from_hex(0x404040), 0.4);
        state.add_directional(DirectionalLight::new(Vec3::new(5.0, 3.0, 5.0), Color::WHITE, 1.0));
        state.add_directional(DirectionalLight::new(Vec3::new(-5.0, -3.0, -5.0), Color::WHITE, 0.5));
        state
    }

    pub fn add_point(&mut self, light: PointLight) {
        self.points.push(light);
    }

    pub fn add_directional(&mut self, light: DirectionalLight) {
        self.directionals.push(light);
    }

    /// Drop all point lights, keeping ambient and directional lights.
    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[PointLight] {
        &self.points
    }

    pub fn directionals(&self) -> &[DirectionalLight] {
        &self.directionals
    }

    pub fn set_ambient(&mut self, color: Color, intensity: f32) {
        self.ambient = color;
        self.ambient_intensity = intensity;
    }

    /// Ambient color and intensity.
    pub fn ambient(&self) -> (Color, f32) {
        (self.ambient, self.ambient_intensity)
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn galaxy_rig_has_key_and_fill() {
        let state = LightState::galaxy_rig();
        let dirs = state.directionals();
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0].intensity, 1.0);
        assert_eq!(dirs[1].intensity, 0.5);
        // Fill shines from the opposite side.
        assert!(dirs[0].direction().dot(dirs[1].direction()) < -0.99);
        assert_eq!(state.ambient(), (Color::from_hex(0x404040), 0.4));
    }

    #[test]
    fn clear_points_keeps_rig() {
        let mut state = LightState::galaxy_rig();
        state.add_point(PointLight::new(Color::WHITE, 0.5, 100.0));
        state.clear_points();
        assert!(state.points().is_empty());
        assert_eq!(state.directionals().len(), 2);
    }

    #[test]
    fn with_position_moves_light() {
        let light = PointLight::new(Color::WHITE, 0.5, 100.0).with_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(light.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(light.range, 100.0);
    }
}
