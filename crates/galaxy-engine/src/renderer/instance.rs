use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use crate::api::types::{GeometryHandle, MaterialHandle, TextureHandle};

/// Sentinel written in `texture` when a mesh is untextured.
pub const NO_TEXTURE: u32 = u32::MAX;

/// Per-mesh render data handed to the draw pass.
/// 20 words = 80 bytes stride: column-major world matrix, then resource ids.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshInstance {
    /// World matrix, column-major.
    pub model: [[f32; 4]; 4],
    pub geometry: u32,
    pub material: u32,
    /// Texture id, or `NO_TEXTURE`.
    pub texture: u32,
    pub _pad: u32,
}

impl MeshInstance {
    pub const WORDS: usize = 20;
    pub const STRIDE_BYTES: usize = Self::WORDS * 4;

    pub fn new(
        model: Mat4,
        geometry: GeometryHandle,
        material: MaterialHandle,
        texture: Option<TextureHandle>,
    ) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            geometry: geometry.0,
            material: material.0,
            texture: texture.map_or(NO_TEXTURE, |t| t.0),
            _pad: 0,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

/// Mesh instances for one frame.
pub struct RenderBuffer {
    pub instances: Vec<MeshInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(128),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: MeshInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn as_slice(&self) -> &[MeshInstance] {
        &self.instances
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
