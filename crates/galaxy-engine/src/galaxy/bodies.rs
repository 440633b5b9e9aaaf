//! Celestial body factory: randomized solar systems.
//!
//! All sampling goes through a `RandomSource` parameter, so a seeded or
//! scripted source reproduces a system exactly.

use std::f32::consts::TAU;
use glam::Vec3;
use crate::api::types::NodeId;
use crate::assets::palette::Palette;
use crate::core::scene::SceneRoot;
use crate::error::GalaxyError;
use crate::galaxy::solar_system::{Mesh, Orbit, Planet, SolarSystem, Sun};
use crate::renderer::traits::{Geometry, Material, Renderer};
use crate::systems::rng::RandomSource;

// ── Star ─────────────────────────────────────────────────────────────

pub const SUN_RADIUS_MIN: f32 = 2.0;
pub const SUN_RADIUS_MAX: f32 = 5.0;
pub const SUN_OPACITY: f32 = 0.9;

// ── Planets ──────────────────────────────────────────────────────────

pub const PLANET_COUNT_MIN: usize = 2;
pub const PLANET_COUNT_MAX: usize = 7;
pub const PLANET_RADIUS_MIN: f32 = 0.3;
pub const PLANET_RADIUS_MAX: f32 = 1.8;
/// Orbit radius of planet `i` is `(i + 1) * uniform(ORBIT_STEP_MIN, ORBIT_STEP_MAX)`.
pub const ORBIT_STEP_MIN: f32 = 5.0;
pub const ORBIT_STEP_MAX: f32 = 8.0;
/// Orbit speed of planet `i` is `uniform(ORBIT_SPEED_MIN, ORBIT_SPEED_MAX) / (i + 1)`.
pub const ORBIT_SPEED_MIN: f32 = 0.005;
pub const ORBIT_SPEED_MAX: f32 = 0.025;
pub const ROTATION_SPEED_MIN: f32 = 0.005;
pub const ROTATION_SPEED_MAX: f32 = 0.105;
/// Vertical offset is uniform in [-ORBIT_HEIGHT, ORBIT_HEIGHT).
pub const ORBIT_HEIGHT: f32 = 1.0;
pub const PLANET_ROUGHNESS: f32 = 0.8;
pub const PLANET_METALNESS: f32 = 0.1;

pub const SPHERE_SEGMENTS: u32 = 32;
/// Y extent of the placement box relative to its X/Z width.
pub const DISK_FLATTENING: f32 = 0.2;

/// Light attached to every star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunLight {
    pub intensity: f32,
    pub range: f32,
}

impl Default for SunLight {
    fn default() -> Self {
        Self { intensity: 0.5, range: 100.0 }
    }
}

/// Shared inputs of every construction call.
pub struct Blueprint<'a> {
    pub palette: &'a Palette,
    pub sun_light: SunLight,
}

fn sphere(radius: f32) -> Geometry {
    Geometry::Sphere {
        radius,
        width_segments: SPHERE_SEGMENTS,
        height_segments: SPHERE_SEGMENTS,
    }
}

/// Build one system at `position`.
///
/// On failure (e.g. a planet texture does not resolve) every resource created
/// so far is released before the error is returned.
pub fn create_solar_system(
    id: NodeId,
    position: Vec3,
    blueprint: &Blueprint,
    rng: &mut impl RandomSource,
    renderer: &mut dyn Renderer,
) -> Result<SolarSystem, GalaxyError> {
    let palette = blueprint.palette;
    if !palette.is_usable() {
        return Err(GalaxyError::MissingTexture("empty palette".to_owned()));
    }

    let radius = rng.range(SUN_RADIUS_MIN, SUN_RADIUS_MAX);
    let color = palette.star_colors[rng.index(palette.star_colors.len())];
    let geometry = renderer.create_geometry(sphere(radius));
    let material = renderer.create_material(Material::Basic { color, opacity: SUN_OPACITY });
    let sun = Sun { radius, color, mesh: Mesh::new(geometry, material, None) };

    let mut system = SolarSystem::new(id, position, sun, blueprint.sun_light.intensity, blueprint.sun_light.range);

    let count = PLANET_COUNT_MIN + rng.index(PLANET_COUNT_MAX - PLANET_COUNT_MIN + 1);
    for i in 0..count {
        match create_planet(i, palette, rng, renderer) {
            Ok(planet) => system.push_planet(planet),
            Err(err) => {
                system.dispose(renderer);
                return Err(err);
            }
        }
    }
    Ok(system)
}

fn create_planet(
    index: usize,
    palette: &Palette,
    rng: &mut impl RandomSource,
    renderer: &mut dyn Renderer,
) -> Result<Planet, GalaxyError> {
    let shell = (index + 1) as f32;
    let radius = rng.range(PLANET_RADIUS_MIN, PLANET_RADIUS_MAX);
    let orbit_radius = shell * rng.range(ORBIT_STEP_MIN, ORBIT_STEP_MAX);
    let orbit_speed = rng.range(ORBIT_SPEED_MIN, ORBIT_SPEED_MAX) / shell;
    let rotation_speed = rng.range(ROTATION_SPEED_MIN, ROTATION_SPEED_MAX);
    let appearance = &palette.planets[rng.index(palette.planets.len())];

    let texture = renderer.load_texture(&appearance.texture)?;
    let geometry = renderer.create_geometry(sphere(radius));
    let material = renderer.create_material(Material::Standard {
        color: appearance.tint,
        texture: Some(texture),
        roughness: PLANET_ROUGHNESS,
        metalness: PLANET_METALNESS,
    });

    let orbit = Orbit {
        radius: orbit_radius,
        speed: orbit_speed,
        phase: rng.range(0.0, TAU),
        height: rng.spread(2.0 * ORBIT_HEIGHT),
    };
    let mesh = Mesh::new(geometry, material, Some(texture));
    Ok(Planet::new(radius, orbit, rotation_speed, appearance.category, mesh))
}

/// Random anchor inside the flattened disk box of width `spread`.
pub fn random_position(spread: f32, rng: &mut impl RandomSource) -> Vec3 {
    Vec3::new(
        rng.spread(spread),
        rng.spread(spread * DISK_FLATTENING),
        rng.spread(spread),
    )
}

/// Build `count` systems at independent random positions.
///
/// A system that fails to build is logged and skipped; the result holds
/// however many succeeded, possibly none.
pub fn create_random_solar_systems(
    count: usize,
    spread: f32,
    blueprint: &Blueprint,
    scene: &mut SceneRoot,
    rng: &mut impl RandomSource,
    renderer: &mut dyn Renderer,
) -> Vec<SolarSystem> {
    let mut systems = Vec::with_capacity(count);
    for i in 0..count {
        let position = random_position(spread, rng);
        let id = scene.next_id();
        match create_solar_system(id, position, blueprint, rng, renderer) {
            Ok(system) => systems.push(system),
            Err(err) => log::error!("solar system {}/{} skipped: {}", i + 1, count, err),
        }
    }
    log::info!("created {} of {} solar systems", systems.len(), count);
    systems
}
