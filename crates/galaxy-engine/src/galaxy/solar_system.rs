//! One star with its planets, anchored by a group transform.
//!
//! Planet positions are derived from the orbital phase every update, never
//! accumulated, so they cannot drift off their circles.

use std::f32::consts::TAU;
use glam::Vec3;
use crate::api::types::{Color, GeometryHandle, MaterialHandle, NodeId, Resource, TextureHandle};
use crate::assets::palette::PlanetCategory;
use crate::core::scene::SceneRoot;
use crate::core::transform::Transform;
use crate::renderer::instance::{MeshInstance, RenderBuffer};
use crate::renderer::traits::Renderer;
use crate::systems::lighting::{LightState, PointLight};

/// Step the per-frame increments are expressed in.
pub const REFERENCE_FRAME_DT: f32 = 1.0 / 60.0;
/// Sun self-rotation per reference frame (radians).
pub const SUN_SPIN_PER_FRAME: f32 = 0.01;

/// A renderable body: transform plus the GPU resources drawing it.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub transform: Transform,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub texture: Option<TextureHandle>,
}

impl Mesh {
    pub fn new(geometry: GeometryHandle, material: MaterialHandle, texture: Option<TextureHandle>) -> Self {
        Self {
            transform: Transform::new(),
            geometry,
            material,
            texture,
        }
    }

    /// Resources owned by this mesh, textures last.
    pub fn resources(&self) -> impl Iterator<Item = Resource> {
        [
            Some(Resource::Geometry(self.geometry)),
            Some(Resource::Material(self.material)),
            self.texture.map(Resource::Texture),
        ]
        .into_iter()
        .flatten()
    }
}

/// The star at the center of a system.
#[derive(Debug, Clone)]
pub struct Sun {
    pub radius: f32,
    pub color: Color,
    pub mesh: Mesh,
}

/// Orbital parameters of a planet, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    /// Radians per reference frame; sign gives direction.
    pub speed: f32,
    /// Initial phase in [0, 2π).
    pub phase: f32,
    /// Constant vertical offset (slight inclination).
    pub height: f32,
}

/// A planet on a circular orbit around its system's star.
#[derive(Debug, Clone)]
pub struct Planet {
    radius: f32,
    orbit_radius: f32,
    orbit_speed: f32,
    rotation_speed: f32,
    angle: f32,
    category: PlanetCategory,
    mesh: Mesh,
}

impl Planet {
    pub fn new(radius: f32, orbit: Orbit, rotation_speed: f32, category: PlanetCategory, mesh: Mesh) -> Self {
        let mut planet = Self {
            radius,
            orbit_radius: orbit.radius,
            orbit_speed: orbit.speed,
            rotation_speed,
            angle: orbit.phase.rem_euclid(TAU),
            category,
            mesh,
        };
        planet.mesh.transform.position.y = orbit.height;
        planet.place();
        planet
    }

    fn place(&mut self) {
        let position = &mut self.mesh.transform.position;
        position.x = self.angle.cos() * self.orbit_radius;
        position.z = self.angle.sin() * self.orbit_radius;
    }

    fn advance(&mut self, frames: f32) {
        self.angle = (self.angle + self.orbit_speed * frames).rem_euclid(TAU);
        self.place();
        self.mesh.transform.rotation.y += self.rotation_speed * frames;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn orbit_radius(&self) -> f32 {
        self.orbit_radius
    }

    pub fn orbit_speed(&self) -> f32 {
        self.orbit_speed
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    /// Current orbital phase in [0, 2π).
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn category(&self) -> PlanetCategory {
        self.category
    }

    /// Position relative to the system anchor.
    pub fn position(&self) -> Vec3 {
        self.mesh.transform.position
    }

    /// Self-rotation about the local Y axis.
    pub fn spin(&self) -> f32 {
        self.mesh.transform.rotation.y
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// A star, its planets and the light it casts, positioned as one group.
pub struct SolarSystem {
    id: NodeId,
    group: Transform,
    sun: Sun,
    planets: Vec<Planet>,
    light: PointLight,
    attached: bool,
    disposed: bool,
}

impl SolarSystem {
    /// Assemble a system around `sun` at `position`. The light sits at the star's origin.
    pub fn new(id: NodeId, position: Vec3, sun: Sun, light_intensity: f32, light_range: f32) -> Self {
        let light = PointLight::new(sun.color, light_intensity, light_range);
        Self {
            id,
            group: Transform::from_position(position),
            sun,
            planets: Vec::new(),
            light,
            attached: false,
            disposed: false,
        }
    }

    pub fn push_planet(&mut self, planet: Planet) {
        self.planets.push(planet);
    }

    /// Advance one step. Increments are per reference frame, scaled by
    /// `delta_time / REFERENCE_FRAME_DT`; negative or non-finite deltas do nothing.
    pub fn update(&mut self, delta_time: f32) {
        if self.disposed {
            log::warn!("solar system {:?}: update after dispose ignored", self.id);
            return;
        }
        let frames = delta_time / REFERENCE_FRAME_DT;
        if !frames.is_finite() || frames <= 0.0 {
            return;
        }

        self.sun.mesh.transform.rotation.y += SUN_SPIN_PER_FRAME * frames;
        for planet in &mut self.planets {
            planet.advance(frames);
        }
    }

    /// Attach the group to the scene root. Returns false if already attached.
    pub fn add_to_scene(&mut self, scene: &mut SceneRoot) -> bool {
        self.attached = true;
        scene.attach(self.id)
    }

    /// Detach the group from the scene root. Returns false if it was not attached.
    pub fn remove_from_scene(&mut self, scene: &mut SceneRoot) -> bool {
        self.attached = false;
        scene.detach(self.id)
    }

    /// Release the star's and every planet's GPU resources. Later calls are no-ops.
    /// Refused while the group is still attached to a scene.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) {
        if self.disposed {
            log::debug!("solar system {:?}: already disposed", self.id);
            return;
        }
        if self.attached {
            log::warn!("solar system {:?}: dispose while attached ignored", self.id);
            return;
        }
        for resource in self.resources() {
            renderer.release(resource);
        }
        self.disposed = true;
    }

    fn resources(&self) -> Vec<Resource> {
        self.sun
            .mesh
            .resources()
            .chain(self.planets.iter().flat_map(|p| p.mesh.resources()))
            .collect()
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Fixed anchor of the group in world space.
    pub fn position(&self) -> Vec3 {
        self.group.position
    }

    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    pub fn light(&self) -> &PointLight {
        &self.light
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Push the sun and planets as world-space instances, and the star's light.
    pub fn write_frame(&self, buffer: &mut RenderBuffer, lights: &mut LightState) {
        let mut push = |mesh: &Mesh| {
            buffer.push(MeshInstance::new(
                mesh.transform.world_matrix(&self.group),
                mesh.geometry,
                mesh.material,
                mesh.texture,
            ));
        };
        push(&self.sun.mesh);
        for planet in &self.planets {
            push(&planet.mesh);
        }
        let world = self.group.matrix().transform_point3(self.light.position);
        lights.add_point(self.light.with_position(world));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessRenderer;
    use crate::renderer::traits::{Geometry, Material};

    fn mesh(renderer: &mut HeadlessRenderer, textured: bool) -> Mesh {
        let geometry = renderer.create_geometry(Geometry::Sphere { radius: 1.0, width_segments: 8, height_segments: 8 });
        let texture = if textured { Some(renderer.load_texture("/t.jpg").unwrap()) } else { None };
        let material = renderer.create_material(Material::Basic { color: Color::WHITE, opacity: 1.0 });
        Mesh::new(geometry, material, texture)
    }

    fn system(renderer: &mut HeadlessRenderer) -> SolarSystem {
        let sun = Sun { radius: 3.0, color: Color::WHITE, mesh: mesh(renderer, false) };
        let mut system = SolarSystem::new(NodeId(7), Vec3::new(10.0, 0.0, 0.0), sun, 0.5, 100.0);
        for i in 0..3 {
            let orbit = Orbit { radius: 6.0 * (i + 1) as f32, speed: 0.02 / (i + 1) as f32, phase: 0.3 * i as f32, height: 0.25 };
            system.push_planet(Planet::new(0.5, orbit, 0.05, PlanetCategory::Rocky, mesh(renderer, true)));
        }
        system
    }

    #[test]
    fn orbit_formula_holds_after_updates() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        let initial: Vec<f32> = system.planets().iter().map(|p| p.angle()).collect();

        let k = 250;
        for _ in 0..k {
            system.update(REFERENCE_FRAME_DT);
        }

        for (planet, start) in system.planets().iter().zip(initial) {
            let expected = (start + k as f32 * planet.orbit_speed()).rem_euclid(TAU);
            let diff = (planet.angle() - expected).abs();
            assert!(diff < 1e-3 || (TAU - diff) < 1e-3, "angle {} vs {}", planet.angle(), expected);

            let p = planet.position();
            assert_eq!(p.x, planet.angle().cos() * planet.orbit_radius());
            assert_eq!(p.z, planet.angle().sin() * planet.orbit_radius());
            assert_eq!(p.y, 0.25);
        }
    }

    #[test]
    fn update_spins_sun_and_planets() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        system.update(REFERENCE_FRAME_DT);
        assert!((system.sun().mesh.transform.rotation.y - SUN_SPIN_PER_FRAME).abs() < 1e-6);
        assert!((system.planets()[0].spin() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_or_negative_delta_does_not_move() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        let before = system.planets()[1].angle();
        system.update(0.0);
        system.update(-1.0);
        system.update(f32::NAN);
        assert_eq!(system.planets()[1].angle(), before);
    }

    #[test]
    fn orbit_radius_is_fixed() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        for _ in 0..100 {
            system.update(REFERENCE_FRAME_DT);
        }
        for planet in system.planets() {
            let p = planet.position();
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - planet.orbit_radius()).abs() < 1e-4);
        }
    }

    #[test]
    fn dispose_twice_releases_once() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        // sun: geometry + material; planets: geometry + material + texture each
        assert_eq!(renderer.live_resources(), 2 + 3 * 3);

        system.dispose(&mut renderer);
        system.dispose(&mut renderer);
        assert_eq!(renderer.live_resources(), 0);
        assert_eq!(renderer.double_releases(), 0);
        assert!(system.is_disposed());
    }

    #[test]
    fn dispose_while_attached_is_refused() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        let mut scene = SceneRoot::new();
        system.add_to_scene(&mut scene);

        system.dispose(&mut renderer);
        assert!(!system.is_disposed());
        assert_eq!(renderer.live_resources(), 2 + 3 * 3);

        system.remove_from_scene(&mut scene);
        system.dispose(&mut renderer);
        assert!(system.is_disposed());
        assert_eq!(renderer.live_resources(), 0);
    }

    #[test]
    fn update_after_dispose_is_ignored() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        system.dispose(&mut renderer);
        let before = system.planets()[0].angle();
        system.update(REFERENCE_FRAME_DT);
        assert_eq!(system.planets()[0].angle(), before);
    }

    #[test]
    fn remove_from_scene_twice_is_safe() {
        let mut renderer = HeadlessRenderer::new();
        let mut system = system(&mut renderer);
        let mut scene = SceneRoot::new();
        assert!(system.add_to_scene(&mut scene));
        assert!(system.remove_from_scene(&mut scene));
        assert!(!system.remove_from_scene(&mut scene));
        assert!(scene.is_empty());
    }

    #[test]
    fn write_frame_places_bodies_under_group() {
        let mut renderer = HeadlessRenderer::new();
        let system = system(&mut renderer);
        let mut buffer = RenderBuffer::new();
        let mut lights = LightState::new();
        system.write_frame(&mut buffer, &mut lights);

        assert_eq!(buffer.instance_count(), 4);
        let sun_pos = buffer.instances[0].model_matrix().transform_point3(Vec3::ZERO);
        assert!((sun_pos - system.position()).length() < 1e-5);
        assert_eq!(lights.points().len(), 1);
        assert_eq!(lights.points()[0].position, system.position());
    }
}
