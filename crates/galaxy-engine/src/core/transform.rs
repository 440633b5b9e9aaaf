// core/transform.rs
//
// Local transforms for scene nodes. A group's transform positions all its
// children as one rigid unit: world = group.matrix() * child.matrix().

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, Euler rotation (XYZ, radians) and scale relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    /// Matrix of this transform placed under `parent`.
    pub fn world_matrix(&self, parent: &Transform) -> Mat4 {
        parent.matrix() * self.matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_is_offset_by_group() {
        let group = Transform::from_position(Vec3::new(100.0, 10.0, -50.0));
        let child = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));
        let world = child.world_matrix(&group);
        let p = world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(105.0, 10.0, -50.0)).length() < 1e-4);
    }

    #[test]
    fn spin_does_not_move_origin() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_rotation(Vec3::new(0.0, 1.3, 0.0));
        let p = t.matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }
}
