//! Scene lifecycle controller.
//!
//! `GalaxyView` owns the renderer and host for its whole life and a
//! `SceneSession` for the span of one mount. Everything the session holds is
//! created on mount and released, in a fixed order, on unmount.

use crate::api::config::GalaxyConfig;
use crate::api::types::Color;
use crate::assets::palette::Palette;
use crate::core::scene::SceneRoot;
use crate::error::GalaxyError;
use crate::galaxy::bodies::{create_random_solar_systems, Blueprint, SunLight};
use crate::galaxy::solar_system::SolarSystem;
use crate::galaxy::star_field::{StarField, StarFieldParams};
use crate::host::{FrameRequest, Host, HostEvent, ListenerId, ListenerKind};
use crate::input::keys::InputState;
use crate::renderer::camera::PerspectiveCamera;
use crate::renderer::instance::RenderBuffer;
use crate::renderer::traits::{FrameData, Renderer};
use crate::systems::lighting::LightState;
use crate::systems::render::build_render_buffer;
use crate::systems::rng::Rng;

/// Seed used when the config does not pin one.
pub const DEFAULT_SEED: u64 = 0x5eed_9a1a_c7e5;

const LISTENERS: [ListenerKind; 3] = [ListenerKind::KeyDown, ListenerKind::KeyUp, ListenerKind::Resize];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Initializing,
    Running,
    TearingDown,
}

/// Everything created by one mount.
struct SceneSession {
    scene: SceneRoot,
    camera: PerspectiveCamera,
    star_field: Option<StarField>,
    systems: Vec<SolarSystem>,
    lights: LightState,
    input: InputState,
    listeners: Vec<ListenerId>,
    frame: Option<FrameRequest>,
    render_buffer: RenderBuffer,
    rng: Rng,
    surface_mounted: bool,
}

impl SceneSession {
    fn new(config: &GalaxyConfig, aspect: f32) -> Self {
        Self {
            scene: SceneRoot::new(),
            camera: PerspectiveCamera::from_config(&config.camera, aspect),
            star_field: None,
            systems: Vec::new(),
            lights: LightState::galaxy_rig(),
            input: InputState::new(),
            listeners: Vec::with_capacity(LISTENERS.len()),
            frame: None,
            render_buffer: RenderBuffer::with_capacity(config.system_count * 8),
            rng: Rng::new(config.seed.unwrap_or(DEFAULT_SEED)),
            surface_mounted: false,
        }
    }

    /// Build the scene step by step. Whatever was created before a failure
    /// stays recorded on the session so teardown can release it.
    fn build(
        &mut self,
        config: &GalaxyConfig,
        palette: &Palette,
        renderer: &mut dyn Renderer,
        host: &mut dyn Host,
    ) -> Result<(), GalaxyError> {
        renderer.mount(host.viewport())?;
        self.surface_mounted = true;

        let params = StarFieldParams {
            count: config.star_count,
            extent: config.star_field_extent,
            max_speed: config.star_max_speed,
            drift_limit: config.star_drift_limit,
        };
        let id = self.scene.next_id();
        let mut star_field = StarField::new(id, params, &mut self.rng, renderer);
        star_field.add_to_scene(&mut self.scene);
        self.star_field = Some(star_field);

        let blueprint = Blueprint {
            palette,
            sun_light: SunLight {
                intensity: config.sun_light_intensity,
                range: config.sun_light_range,
            },
        };
        self.systems = create_random_solar_systems(
            config.system_count,
            config.system_spread,
            &blueprint,
            &mut self.scene,
            &mut self.rng,
            renderer,
        );
        for system in &mut self.systems {
            system.add_to_scene(&mut self.scene);
        }

        for kind in LISTENERS {
            let id = host.listen(kind)?;
            self.listeners.push(id);
        }

        self.frame = Some(host.request_frame()?);
        Ok(())
    }

    /// Release everything in teardown order: frame callback, scene contents,
    /// surface, listeners.
    fn teardown(mut self, renderer: &mut dyn Renderer, host: &mut dyn Host) {
        if let Some(request) = self.frame.take() {
            host.cancel_frame(request);
        }

        for system in &mut self.systems {
            system.remove_from_scene(&mut self.scene);
            system.dispose(renderer);
        }
        if let Some(star_field) = &mut self.star_field {
            star_field.remove_from_scene(&mut self.scene);
            star_field.dispose(renderer);
        }

        if self.surface_mounted {
            renderer.unmount();
        }

        for id in self.listeners.drain(..) {
            host.unlisten(id);
        }
    }
}

/// The galaxy scene: a mountable surface driven by host frames and events.
pub struct GalaxyView<R: Renderer, H: Host> {
    renderer: R,
    host: H,
    config: GalaxyConfig,
    palette: Palette,
    state: LifecycleState,
    initialized: bool,
    session: Option<SceneSession>,
    frames_drawn: u64,
}

impl<R: Renderer, H: Host> GalaxyView<R, H> {
    pub fn new(renderer: R, host: H, config: GalaxyConfig) -> Self {
        Self {
            renderer,
            host,
            config,
            palette: Palette::default(),
            state: LifecycleState::Unmounted,
            initialized: false,
            session: None,
            frames_drawn: 0,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Build the scene, register listeners and schedule the first frame.
    ///
    /// Calling it again while mounted does nothing. If any step fails, what
    /// was already created is torn down and the error is returned.
    pub fn mount(&mut self) -> Result<(), GalaxyError> {
        if self.initialized {
            log::debug!("galaxy already initialized ({:?}), mount ignored", self.state);
            return Ok(());
        }
        self.initialized = true;
        self.state = LifecycleState::Initializing;

        let aspect = self.host.viewport().aspect();
        let mut session = SceneSession::new(&self.config, aspect);
        let result = session.build(&self.config, &self.palette, &mut self.renderer, &mut self.host);
        self.session = Some(session);

        match result {
            Ok(()) => {
                self.state = LifecycleState::Running;
                log::info!(
                    "galaxy mounted: {} solar systems, {} stars",
                    self.systems().len(),
                    self.star_field().map_or(0, StarField::len)
                );
                Ok(())
            }
            Err(err) => {
                log::error!("galaxy mount failed: {}", err);
                self.teardown();
                Err(err)
            }
        }
    }

    /// Deliver a host event. Events outside a mount are dropped.
    pub fn handle_event(&mut self, event: HostEvent) {
        let session = match (&self.state, self.session.as_mut()) {
            (LifecycleState::Running, Some(session)) => session,
            _ => return,
        };
        match event {
            HostEvent::KeyDown(key) => session.input.press(key),
            HostEvent::KeyUp(key) => session.input.release(key),
            HostEvent::Resize(viewport) => {
                session.camera.set_aspect(viewport.aspect());
                self.renderer.resize(viewport);
            }
        }
    }

    /// Frame callback: move the camera, advance the scene, draw, reschedule.
    /// A callback arriving after teardown is ignored.
    pub fn frame(&mut self) {
        let session = match (&self.state, self.session.as_mut()) {
            (LifecycleState::Running, Some(session)) => session,
            _ => {
                log::debug!("stray frame callback ignored");
                return;
            }
        };
        // The request that got us here has fired.
        session.frame = None;

        let step = session.input.movement() * self.config.move_speed;
        session.camera.translate_local(step);

        if let Some(star_field) = &mut session.star_field {
            star_field.update(&mut session.rng);
        }
        for system in &mut session.systems {
            system.update(self.config.fixed_dt);
        }

        build_render_buffer(
            session.systems.iter(),
            &session.scene,
            &mut session.render_buffer,
            &mut session.lights,
        );

        let (stars, stars_dirty, star_resources) = match &mut session.star_field {
            Some(field) if session.scene.contains(field.id()) => {
                let dirty = field.take_dirty();
                (field.positions(), dirty, Some(field.resources()))
            }
            _ => (&[][..], false, None),
        };

        let frame = FrameData {
            camera: session.camera.uniform(),
            background: Color::BLACK,
            stars,
            stars_dirty,
            star_resources,
            meshes: session.render_buffer.as_slice(),
            lights: &session.lights,
        };
        self.renderer.draw(&frame);
        self.frames_drawn += 1;

        match self.host.request_frame() {
            Ok(request) => session.frame = Some(request),
            Err(err) => log::error!("could not schedule next frame: {}", err),
        }
    }

    /// Tear the scene down. Safe to call at any point, including before mount.
    pub fn unmount(&mut self) {
        if !self.initialized && self.session.is_none() {
            log::debug!("galaxy not mounted, unmount ignored");
            return;
        }
        self.teardown();
        log::info!("galaxy unmounted");
    }

    fn teardown(&mut self) {
        self.state = LifecycleState::TearingDown;
        if let Some(session) = self.session.take() {
            session.teardown(&mut self.renderer, &mut self.host);
            self.renderer.dispose();
        }
        self.initialized = false;
        self.state = LifecycleState::Unmounted;
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn config(&self) -> &GalaxyConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.session.as_ref().map(|s| &s.camera)
    }

    pub fn systems(&self) -> &[SolarSystem] {
        self.session.as_ref().map(|s| s.systems.as_slice()).unwrap_or_default()
    }

    pub fn star_field(&self) -> Option<&StarField> {
        self.session.as_ref().and_then(|s| s.star_field.as_ref())
    }

    pub fn input(&self) -> Option<&InputState> {
        self.session.as_ref().map(|s| &s.input)
    }

    /// Nodes currently attached to the scene root.
    pub fn attached_nodes(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.scene.len())
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::registry::TextureRegistry;
    use crate::host::{HeadlessHost, Viewport};
    use crate::input::keys::KeyCode;
    use crate::renderer::headless::HeadlessRenderer;
    use glam::Vec3;

    fn config() -> GalaxyConfig {
        GalaxyConfig {
            star_count: 200,
            seed: Some(42),
            ..GalaxyConfig::default()
        }
    }

    fn view() -> GalaxyView<HeadlessRenderer, HeadlessHost> {
        GalaxyView::new(HeadlessRenderer::new(), HeadlessHost::default(), config())
    }

    /// Fire the pending frame and run the callback, as the display refresh would.
    fn tick(view: &mut GalaxyView<HeadlessRenderer, HeadlessHost>) {
        assert!(view.host_mut().fire_frame());
        view.frame();
    }

    #[test]
    fn mount_builds_scene() {
        let mut view = view();
        view.mount().unwrap();
        assert!(view.is_running());
        assert_eq!(view.systems().len(), 10);
        assert_eq!(view.star_field().map(StarField::len), Some(200));
        assert_eq!(view.attached_nodes(), 11);
        assert!(view.renderer().surface_attached());
        assert_eq!(view.camera().map(|c| c.position), Some(Vec3::new(0.0, 0.0, 50.0)));
    }

    #[test]
    fn double_mount_registers_once() {
        let mut view = view();
        view.mount().unwrap();
        view.mount().unwrap();
        assert_eq!(view.host().listener_count(), 3);
        assert_eq!(view.host().pending_frames(), 1);
        assert_eq!(view.systems().len(), 10);
    }

    #[test]
    fn held_forward_moves_along_local_z() {
        let mut view = view();
        view.mount().unwrap();
        view.handle_event(HostEvent::KeyDown(KeyCode::KeyW));

        let t = 40;
        for _ in 0..t {
            tick(&mut view);
        }
        let position = view.camera().map(|c| c.position).unwrap();
        assert!((position.z - (50.0 - 0.5 * t as f32)).abs() < 1e-4);
        assert_eq!(position.x, 0.0);
        assert_eq!(position.y, 0.0);
        assert_eq!(view.host().pending_frames(), 1);
        assert_eq!(view.frames_drawn(), t);

        view.handle_event(HostEvent::KeyUp(KeyCode::KeyW));
        tick(&mut view);
        let after = view.camera().map(|c| c.position).unwrap();
        assert_eq!(after, position);
    }

    #[test]
    fn unmount_releases_everything() {
        let mut view = view();
        view.mount().unwrap();
        tick(&mut view);
        view.unmount();

        assert_eq!(view.state(), LifecycleState::Unmounted);
        assert_eq!(view.host().listener_count(), 0);
        assert_eq!(view.host().pending_frames(), 0);
        assert!(!view.renderer().surface_attached());
        assert_eq!(view.renderer().live_resources(), 0);
        assert_eq!(view.renderer().double_releases(), 0);
        assert_eq!(view.renderer().disposals(), 1);
        assert!(view.camera().is_none());
    }

    #[test]
    fn unmount_before_mount_is_safe() {
        let mut view = view();
        view.unmount();
        view.unmount();
        assert_eq!(view.renderer().disposals(), 0);
        assert_eq!(view.state(), LifecycleState::Unmounted);
    }

    #[test]
    fn stray_frame_after_unmount_is_ignored() {
        let mut view = view();
        view.mount().unwrap();
        view.unmount();
        view.frame();
        view.handle_event(HostEvent::KeyDown(KeyCode::KeyW));
        assert_eq!(view.renderer().draw_count(), 0);
        assert_eq!(view.host().pending_frames(), 0);
    }

    #[test]
    fn remount_after_unmount() {
        let mut view = view();
        view.mount().unwrap();
        view.unmount();
        view.mount().unwrap();
        assert!(view.is_running());
        assert_eq!(view.host().listener_count(), 3);
        assert_eq!(view.host().pending_frames(), 1);
    }

    #[test]
    fn resize_updates_camera_and_surface() {
        let mut view = view();
        view.mount().unwrap();
        view.handle_event(HostEvent::Resize(Viewport::new(1000, 500)));
        assert_eq!(view.camera().map(|c| c.aspect), Some(2.0));
        assert_eq!(view.renderer().surface_size(), Some(Viewport::new(1000, 500)));
        tick(&mut view);
        assert!(view.is_running());
    }

    #[test]
    fn frame_draws_stars_and_systems() {
        let mut view = view();
        view.mount().unwrap();
        tick(&mut view);
        let summary = view.renderer().last_frame();
        assert_eq!(summary.star_count, 200);
        assert!(summary.stars_dirty);
        assert_eq!(summary.point_lights, 10);
        let meshes: usize = view.systems().iter().map(|s| 1 + s.planets().len()).sum();
        assert_eq!(summary.mesh_count, meshes);
    }

    #[test]
    fn failed_listen_rolls_back() {
        let mut view = view();
        view.host_mut().fail_next_listen();
        assert!(view.mount().is_err());
        assert_eq!(view.state(), LifecycleState::Unmounted);
        assert_eq!(view.host().listener_count(), 0);
        assert_eq!(view.host().pending_frames(), 0);
        assert!(!view.renderer().surface_attached());
        assert_eq!(view.renderer().live_resources(), 0);

        view.mount().unwrap();
        assert!(view.is_running());
    }

    #[test]
    fn degenerate_viewport_fails_mount() {
        let host = HeadlessHost::new(Viewport::new(0, 0));
        let mut view = GalaxyView::new(HeadlessRenderer::new(), host, config());
        assert!(view.mount().is_err());
        assert_eq!(view.state(), LifecycleState::Unmounted);
        assert_eq!(view.renderer().live_resources(), 0);
        assert_eq!(view.host().listener_count(), 0);
    }

    #[test]
    fn missing_textures_still_run_with_no_systems() {
        let renderer = HeadlessRenderer::with_textures(TextureRegistry::new());
        let mut view = GalaxyView::new(renderer, HeadlessHost::default(), config());
        view.mount().unwrap();
        assert!(view.systems().is_empty());
        tick(&mut view);
        assert_eq!(view.renderer().last_frame().mesh_count, 0);
        assert_eq!(view.renderer().last_frame().star_count, 200);
    }

    mod teardown_order {
        use super::*;
        use crate::api::types::{GeometryHandle, MaterialHandle, Resource, TextureHandle};
        use crate::renderer::traits::{Geometry, Material};
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Call {
            CancelFrame,
            Release,
            SurfaceUnmount,
            Unlisten,
            Dispose,
        }

        type Log = Rc<RefCell<Vec<Call>>>;

        struct RecordingRenderer {
            inner: HeadlessRenderer,
            log: Log,
        }

        impl Renderer for RecordingRenderer {
            fn backend(&self) -> &'static str {
                self.inner.backend()
            }
            fn mount(&mut self, viewport: Viewport) -> Result<(), GalaxyError> {
                self.inner.mount(viewport)
            }
            fn unmount(&mut self) {
                self.log.borrow_mut().push(Call::SurfaceUnmount);
                self.inner.unmount();
            }
            fn resize(&mut self, viewport: Viewport) {
                self.inner.resize(viewport);
            }
            fn load_texture(&mut self, path: &str) -> Result<TextureHandle, GalaxyError> {
                self.inner.load_texture(path)
            }
            fn create_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
                self.inner.create_geometry(geometry)
            }
            fn create_material(&mut self, material: Material) -> MaterialHandle {
                self.inner.create_material(material)
            }
            fn release(&mut self, resource: Resource) {
                self.log.borrow_mut().push(Call::Release);
                self.inner.release(resource);
            }
            fn draw(&mut self, frame: &FrameData) {
                self.inner.draw(frame);
            }
            fn dispose(&mut self) {
                self.log.borrow_mut().push(Call::Dispose);
                self.inner.dispose();
            }
        }

        struct RecordingHost {
            inner: HeadlessHost,
            log: Log,
        }

        impl Host for RecordingHost {
            fn viewport(&self) -> Viewport {
                self.inner.viewport()
            }
            fn listen(&mut self, kind: ListenerKind) -> Result<ListenerId, GalaxyError> {
                self.inner.listen(kind)
            }
            fn unlisten(&mut self, id: ListenerId) {
                self.log.borrow_mut().push(Call::Unlisten);
                self.inner.unlisten(id);
            }
            fn request_frame(&mut self) -> Result<FrameRequest, GalaxyError> {
                self.inner.request_frame()
            }
            fn cancel_frame(&mut self, request: FrameRequest) {
                self.log.borrow_mut().push(Call::CancelFrame);
                self.inner.cancel_frame(request);
            }
        }

        fn position(calls: &[Call], call: Call) -> usize {
            calls.iter().position(|c| *c == call).unwrap()
        }

        #[test]
        fn frame_is_cancelled_first_and_renderer_disposed_last() {
            let log: Log = Rc::default();
            let renderer = RecordingRenderer { inner: HeadlessRenderer::new(), log: Rc::clone(&log) };
            let host = RecordingHost { inner: HeadlessHost::default(), log: Rc::clone(&log) };
            let mut view = GalaxyView::new(renderer, host, config());
            view.mount().unwrap();
            assert!(view.host_mut().inner.fire_frame());
            view.frame();
            let live = view.renderer().inner.live_resources();
            log.borrow_mut().clear();

            view.unmount();
            let calls = log.borrow().clone();

            assert_eq!(calls.first(), Some(&Call::CancelFrame));
            assert_eq!(calls.last(), Some(&Call::Dispose));
            assert_eq!(calls.iter().filter(|c| **c == Call::Release).count(), live);
            assert_eq!(calls.iter().filter(|c| **c == Call::Unlisten).count(), 3);

            let unmount = position(&calls, Call::SurfaceUnmount);
            let last_release = calls.iter().rposition(|c| *c == Call::Release).unwrap();
            assert!(last_release < unmount);
            assert!(unmount < position(&calls, Call::Unlisten));
            assert_eq!(view.renderer().inner.live_resources(), 0);
        }
    }
}
