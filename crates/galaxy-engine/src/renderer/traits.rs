//! Renderer seam.
//!
//! The engine never talks to a graphics API directly. It asks a `Renderer`
//! for resource handles, hands it one `FrameData` per frame, and releases
//! every handle explicitly on teardown; nothing is reclaimed implicitly.
//!
//! The browser implementation lives in `galaxy-web` (canvas surface + flat
//! buffers read by the TypeScript draw pass); `HeadlessRenderer` backs tests.

use glam::Vec3;
use serde::Serialize;
use super::camera::CameraUniform;
use super::instance::MeshInstance;
use crate::api::types::{Color, GeometryHandle, MaterialHandle, Resource, TextureHandle};
use crate::error::GalaxyError;
use crate::host::Viewport;
use crate::systems::lighting::LightState;

/// Geometry descriptions the engine requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// UV sphere.
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Dynamic point cloud; positions are streamed every frame through `FrameData::stars`.
    Points { count: usize },
}

/// How overlapping fragments combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard alpha blending.
    Alpha,
    /// Colors sum, so overlaps brighten.
    Additive,
}

/// Circular soft-edged sprite material for the star field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarPointsMaterial {
    /// Sprite size at the attenuation distance.
    pub base_size: f32,
    /// Depth at which a sprite renders at `base_size` pixels.
    pub attenuation: f32,
    pub blend: BlendMode,
    pub depth_test: bool,
}

impl Default for StarPointsMaterial {
    fn default() -> Self {
        Self {
            base_size: 3.0,
            attenuation: 300.0,
            blend: BlendMode::Additive,
            depth_test: false,
        }
    }
}

impl StarPointsMaterial {
    /// Sprite size in pixels for a point at view-space `depth` (positive, in front of the camera).
    pub fn point_size(&self, depth: f32) -> f32 {
        self.base_size * (self.attenuation / depth.max(f32::EPSILON))
    }

    /// Fragment alpha at `distance` from the sprite center (0.5 = sprite edge).
    /// Matches the fragment shader: `(1 - smoothstep(0, 0.5, d))²`.
    pub fn falloff(distance: f32) -> f32 {
        let t = (distance / 0.5).clamp(0.0, 1.0);
        let smooth = t * t * (3.0 - 2.0 * t);
        let alpha = 1.0 - smooth;
        alpha * alpha
    }
}

/// Material descriptions the engine requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    /// Unlit, emissive-looking surface (stars read as light sources).
    Basic { color: Color, opacity: f32 },
    /// Lit PBR surface with an optional texture tinted by `color`.
    Standard {
        color: Color,
        texture: Option<TextureHandle>,
        roughness: f32,
        metalness: f32,
    },
    /// Star-field sprites.
    StarPoints(StarPointsMaterial),
}

/// Complete frame data for rendering.
pub struct FrameData<'a> {
    pub camera: CameraUniform,
    /// Clear color.
    pub background: Color,
    /// Live star positions (world space).
    pub stars: &'a [Vec3],
    /// Whether star positions changed since the previous frame.
    pub stars_dirty: bool,
    /// Geometry/material pair the star positions are drawn with.
    pub star_resources: Option<(GeometryHandle, MaterialHandle)>,
    /// Sun and planet instances, world matrices already composed.
    pub meshes: &'a [MeshInstance],
    pub lights: &'a LightState,
}

/// Renderer trait for graphics backends.
pub trait Renderer {
    /// Backend identifier (e.g. "webgl", "headless").
    fn backend(&self) -> &'static str;

    /// Create the render surface sized to `viewport` and attach it to its container.
    fn mount(&mut self, viewport: Viewport) -> Result<(), GalaxyError>;

    /// Detach the render surface. Must be a no-op when nothing is attached.
    fn unmount(&mut self);

    /// Resize the render surface.
    fn resize(&mut self, viewport: Viewport);

    /// Load a texture by asset path. Fails for paths the backend cannot resolve.
    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, GalaxyError>;

    fn create_geometry(&mut self, geometry: Geometry) -> GeometryHandle;

    fn create_material(&mut self, material: Material) -> MaterialHandle;

    /// Release a GPU resource.
    fn release(&mut self, resource: Resource);

    /// Draw a complete frame.
    fn draw(&mut self, frame: &FrameData);

    /// Release surface-level state (context, swap chain). Called last on teardown.
    fn dispose(&mut self);
}
