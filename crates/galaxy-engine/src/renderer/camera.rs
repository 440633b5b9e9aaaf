use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use crate::api::config::CameraConfig;

/// Free-fly perspective camera.
/// Translation is always along the camera's own axes, so movement follows
/// the current facing direction (-Z is forward).
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Position in world space.
    pub position: Vec3,
    /// Orientation in world space.
    pub orientation: Quat,
    projection: Mat4,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub const FLOATS: usize = 36;
}

fn usable_aspect(aspect: f32) -> bool {
    aspect.is_finite() && aspect > 0.0
}

impl PerspectiveCamera {
    /// A non-finite or non-positive `aspect` falls back to 1.0.
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_y_degrees,
            aspect: if usable_aspect(aspect) { aspect } else { 1.0 },
            near,
            far,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self::new(config.fov_y_degrees, aspect, config.near, config.far)
            .with_position(Vec3::from_array(config.start))
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Move by `offset` expressed in camera-local axes.
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.orientation * offset;
    }

    pub fn translate_z(&mut self, distance: f32) {
        self.translate_local(Vec3::Z * distance);
    }

    /// Change the aspect ratio (e.g. on viewport resize) and rebuild the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        if usable_aspect(aspect) {
            self.aspect = aspect;
            self.update_projection();
        }
    }

    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view: self.view_matrix().to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}
