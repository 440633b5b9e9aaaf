use glam::Vec3;
use crate::api::types::{GeometryHandle, MaterialHandle, NodeId, Resource};
use crate::core::scene::SceneRoot;
use crate::renderer::traits::{Geometry, Material, Renderer, StarPointsMaterial};
use crate::systems::rng::RandomSource;

/// Drifting background stars rendered as one additive point cloud.
///
/// Every star wanders with its own constant velocity and snaps back to where
/// it started once it strays past `drift_limit`, so the field stays bounded.
pub struct StarField {
    id: NodeId,
    positions: Vec<Vec3>,
    original: Vec<Vec3>,
    velocities: Vec<Vec3>,
    max_speed: f32,
    drift_limit: f32,
    needs_update: bool,
    geometry: GeometryHandle,
    material: MaterialHandle,
    attached: bool,
    disposed: bool,
}

/// Construction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarFieldParams {
    pub count: usize,
    /// Side of the cube the stars start in, centered at the origin.
    pub extent: f32,
    /// Velocity components are uniform in [-max_speed, max_speed).
    pub max_speed: f32,
    pub drift_limit: f32,
}

impl Default for StarFieldParams {
    fn default() -> Self {
        Self {
            count: 5000,
            extent: 10000.0,
            max_speed: 0.1,
            drift_limit: 500.0,
        }
    }
}

fn random_velocity(max_speed: f32, rng: &mut impl RandomSource) -> Vec3 {
    let width = 2.0 * max_speed;
    Vec3::new(rng.spread(width), rng.spread(width), rng.spread(width))
}

impl StarField {
    pub fn new(
        id: NodeId,
        params: StarFieldParams,
        rng: &mut impl RandomSource,
        renderer: &mut dyn Renderer,
    ) -> Self {
        let mut positions = Vec::with_capacity(params.count);
        let mut velocities = Vec::with_capacity(params.count);
        for _ in 0..params.count {
            positions.push(Vec3::new(
                rng.spread(params.extent),
                rng.spread(params.extent),
                rng.spread(params.extent),
            ));
            velocities.push(random_velocity(params.max_speed, rng));
        }

        let geometry = renderer.create_geometry(Geometry::Points { count: params.count });
        let material = renderer.create_material(Material::StarPoints(StarPointsMaterial::default()));

        Self {
            id,
            original: positions.clone(),
            positions,
            velocities,
            max_speed: params.max_speed,
            drift_limit: params.drift_limit,
            needs_update: true,
            geometry,
            material,
            attached: false,
            disposed: false,
        }
    }

    /// Integrate one frame. Stars that would leave the drift sphere are put
    /// back on their origin with a fresh velocity.
    pub fn update(&mut self, rng: &mut impl RandomSource) {
        if self.disposed {
            return;
        }
        let limit_sq = self.drift_limit * self.drift_limit;
        for ((position, origin), velocity) in self
            .positions
            .iter_mut()
            .zip(&self.original)
            .zip(&mut self.velocities)
        {
            let next = *position + *velocity;
            if next.distance_squared(*origin) > limit_sq {
                *position = *origin;
                *velocity = random_velocity(self.max_speed, rng);
            } else {
                *position = next;
            }
        }
        self.needs_update = true;
    }

    /// Take the "positions changed" flag for the renderer.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn add_to_scene(&mut self, scene: &mut SceneRoot) -> bool {
        self.attached = true;
        scene.attach(self.id)
    }

    pub fn remove_from_scene(&mut self, scene: &mut SceneRoot) -> bool {
        self.attached = false;
        scene.detach(self.id)
    }

    /// Release the point cloud. Later calls are no-ops; refused while attached.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) {
        if self.disposed {
            log::debug!("star field already disposed");
            return;
        }
        if self.attached {
            log::warn!("star field: dispose while attached ignored");
            return;
        }
        renderer.release(Resource::Geometry(self.geometry));
        renderer.release(Resource::Material(self.material));
        self.disposed = true;
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn original_positions(&self) -> &[Vec3] {
        &self.original
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn resources(&self) -> (GeometryHandle, MaterialHandle) {
        (self.geometry, self.material)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[cfg(test)]
    fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        self.velocities[index] = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessRenderer;
    use crate::systems::rng::Rng;

    fn field(count: usize, renderer: &mut HeadlessRenderer) -> StarField {
        let params = StarFieldParams { count, ..StarFieldParams::default() };
        StarField::new(NodeId(1), params, &mut Rng::new(11), renderer)
    }

    #[test]
    fn construction_bounds() {
        let mut renderer = HeadlessRenderer::new();
        let stars = field(2000, &mut renderer);
        assert_eq!(stars.len(), 2000);
        for (p, v) in stars.positions().iter().zip(stars.velocities()) {
            assert!(p.abs().max_element() <= 5000.0);
            assert!(v.abs().max_element() <= 0.1);
        }
        assert_eq!(stars.positions(), stars.original_positions());
        assert_eq!(renderer.live_resources(), 2);
    }

    #[test]
    fn drift_stays_within_limit() {
        let mut renderer = HeadlessRenderer::new();
        let mut stars = field(200, &mut renderer);
        // Fast enough to hit the limit many times.
        for i in 0..stars.len() {
            stars.set_velocity(i, Vec3::new(37.0, -11.0, 5.0));
        }
        let mut rng = Rng::new(3);
        for _ in 0..400 {
            stars.update(&mut rng);
            for (p, o) in stars.positions().iter().zip(stars.original_positions()) {
                assert!(p.distance(*o) <= 500.0 + 1e-3);
            }
        }
    }

    #[test]
    fn overshoot_resets_to_origin_with_new_velocity() {
        let mut renderer = HeadlessRenderer::new();
        let mut stars = field(1, &mut renderer);
        let fast = Vec3::new(600.0, 0.0, 0.0);
        stars.set_velocity(0, fast);

        stars.update(&mut Rng::new(8));
        assert_eq!(stars.positions()[0], stars.original_positions()[0]);
        assert_ne!(stars.velocities()[0], fast);
        assert!(stars.velocities()[0].abs().max_element() <= 0.1);
    }

    #[test]
    fn update_integrates_and_marks_dirty() {
        let mut renderer = HeadlessRenderer::new();
        let mut stars = field(1, &mut renderer);
        assert!(stars.take_dirty());
        assert!(!stars.needs_update());

        let v = Vec3::new(0.05, -0.02, 0.01);
        stars.set_velocity(0, v);
        let before = stars.positions()[0];
        stars.update(&mut Rng::new(1));
        assert!((stars.positions()[0] - (before + v)).length() < 1e-3);
        assert!(stars.needs_update());
    }

    #[test]
    fn dispose_twice_releases_once() {
        let mut renderer = HeadlessRenderer::new();
        let mut stars = field(10, &mut renderer);
        stars.dispose(&mut renderer);
        stars.dispose(&mut renderer);
        assert_eq!(renderer.live_resources(), 0);
        assert_eq!(renderer.double_releases(), 0);
    }

    #[test]
    fn dispose_waits_for_detach() {
        let mut renderer = HeadlessRenderer::new();
        let mut stars = field(10, &mut renderer);
        let mut scene = SceneRoot::new();
        stars.add_to_scene(&mut scene);
        stars.dispose(&mut renderer);
        assert!(!stars.is_disposed());
        assert_eq!(renderer.live_resources(), 2);

        stars.remove_from_scene(&mut scene);
        stars.dispose(&mut renderer);
        assert!(stars.is_disposed());
        assert_eq!(renderer.live_resources(), 0);
    }
}
