use std::collections::HashSet;
use super::traits::{FrameData, Geometry, Material, Renderer};
use crate::api::types::{GeometryHandle, MaterialHandle, Resource, TextureHandle};
use crate::assets::registry::TextureRegistry;
use crate::error::GalaxyError;
use crate::host::Viewport;

/// Summary of the most recent `draw` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSummary {
    pub star_count: usize,
    pub stars_dirty: bool,
    pub mesh_count: usize,
    pub point_lights: usize,
}

/// Renderer that draws nothing and records everything.
pub struct HeadlessRenderer {
    textures: Option<TextureRegistry>,
    surface: Option<Viewport>,
    live: HashSet<Resource>,
    next_handle: u32,
    double_releases: u32,
    draws: u64,
    disposals: u32,
    last_frame: FrameSummary,
}

impl HeadlessRenderer {
    /// Renderer that resolves every texture path.
    pub fn new() -> Self {
        Self {
            textures: None,
            surface: None,
            live: HashSet::new(),
            next_handle: 1,
            double_releases: 0,
            draws: 0,
            disposals: 0,
            last_frame: FrameSummary::default(),
        }
    }

    /// Renderer that resolves only textures known to `registry`.
    pub fn with_textures(registry: TextureRegistry) -> Self {
        Self {
            textures: Some(registry),
            ..Self::new()
        }
    }

    fn next(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    /// Whether a surface is attached to the container.
    pub fn surface_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface_size(&self) -> Option<Viewport> {
        self.surface
    }

    /// Resources created and not yet released.
    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    /// Releases of resources that were not live.
    pub fn double_releases(&self) -> u32 {
        self.double_releases
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn disposals(&self) -> u32 {
        self.disposals
    }

    pub fn last_frame(&self) -> FrameSummary {
        self.last_frame
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn backend(&self) -> &'static str {
        "headless"
    }

    fn mount(&mut self, viewport: Viewport) -> Result<(), GalaxyError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(GalaxyError::Surface(format!(
                "degenerate viewport {}x{}",
                viewport.width, viewport.height
            )));
        }
        self.surface = Some(viewport);
        Ok(())
    }

    fn unmount(&mut self) {
        self.surface = None;
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.surface.is_some() {
            self.surface = Some(viewport);
        }
    }

    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, GalaxyError> {
        if let Some(registry) = &self.textures {
            if registry.slot(path).is_none() {
                return Err(GalaxyError::MissingTexture(path.to_owned()));
            }
        }
        let handle = TextureHandle(self.next());
        self.live.insert(Resource::Texture(handle));
        Ok(handle)
    }

    fn create_geometry(&mut self, _geometry: Geometry) -> GeometryHandle {
        let handle = GeometryHandle(self.next());
        self.live.insert(Resource::Geometry(handle));
        handle
    }

    fn create_material(&mut self, _material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next());
        self.live.insert(Resource::Material(handle));
        handle
    }

    fn release(&mut self, resource: Resource) {
        if !self.live.remove(&resource) {
            self.double_releases += 1;
        }
    }

    fn draw(&mut self, frame: &FrameData) {
        self.draws += 1;
        self.last_frame = FrameSummary {
            star_count: frame.stars.len(),
            stars_dirty: frame.stars_dirty,
            mesh_count: frame.meshes.len(),
            point_lights: frame.lights.points().len(),
        };
    }

    fn dispose(&mut self) {
        self.surface = None;
        self.disposals += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::manifest::AssetManifest;

    #[test]
    fn release_tracks_double_free() {
        let mut r = HeadlessRenderer::new();
        let g = r.create_geometry(Geometry::Points { count: 4 });
        assert_eq!(r.live_resources(), 1);
        r.release(Resource::Geometry(g));
        r.release(Resource::Geometry(g));
        assert_eq!(r.live_resources(), 0);
        assert_eq!(r.double_releases(), 1);
    }

    #[test]
    fn registry_rejects_unknown_texture() {
        let manifest = AssetManifest::from_json(r#"{ "textures": ["/ok.jpg"] }"#).unwrap();
        let mut r = HeadlessRenderer::with_textures(TextureRegistry::from_manifest(&manifest));
        assert!(r.load_texture("/ok.jpg").is_ok());
        assert!(matches!(r.load_texture("/missing.jpg"), Err(GalaxyError::MissingTexture(_))));
    }

    #[test]
    fn mount_and_unmount_surface() {
        let mut r = HeadlessRenderer::new();
        r.mount(Viewport::new(800, 600)).unwrap();
        assert!(r.surface_attached());
        r.resize(Viewport::new(1024, 768));
        assert_eq!(r.surface_size(), Some(Viewport::new(1024, 768)));
        r.unmount();
        r.unmount();
        assert!(!r.surface_attached());
        assert!(r.mount(Viewport::new(0, 600)).is_err());
    }
}
