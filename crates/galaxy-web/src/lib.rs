//! WASM bridge for the galaxy scene.
//!
//! One `GalaxyView` lives in a `thread_local!`, because wasm-bindgen cannot
//! export generic structs directly. The TypeScript draw pass reads the flat
//! frame buffers through the pointer accessors below after each `on_draw`.

pub mod host;
pub mod renderer;
pub mod theme;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;
use galaxy_engine::{AssetManifest, GalaxyConfig, GalaxyView, HostEvent, TextureRegistry};
use wasm_bindgen::prelude::*;

pub use host::WebHost;
pub use renderer::{FrameBuffers, WebRenderer, LIGHT_FLOATS};

type View = GalaxyView<WebRenderer, WebHost>;

thread_local! {
    static VIEW: RefCell<Option<View>> = const { RefCell::new(None) };
    static BUFFERS: Rc<RefCell<FrameBuffers>> = Rc::new(RefCell::new(FrameBuffers::default()));
}

static LOGGING: Once = Once::new();

/// Run `f` on the mounted view. Returns None when nothing is mounted or the
/// view is already borrowed (a callback re-entering the engine).
fn with_view<R>(f: impl FnOnce(&mut View) -> R) -> Option<R> {
    VIEW.with(|cell| {
        let mut borrow = cell.try_borrow_mut().ok()?;
        borrow.as_mut().map(f)
    })
}

/// Run `mount` on the view in `cell`. A view that fails to mount is taken
/// out and dropped, so the next mount starts from fresh arguments.
/// None when the slot is empty or busy.
fn mount_slot<T, E>(cell: &RefCell<Option<T>>, mount: impl FnOnce(&mut T) -> Result<(), E>) -> Option<Result<(), E>> {
    let mut slot = cell.try_borrow_mut().ok()?;
    let result = mount(slot.as_mut()?);
    let failed = if result.is_err() { slot.take() } else { None };
    drop(slot);
    drop(failed);
    Some(result)
}

/// Run `unmount` on the view in `cell` and drop it. Returns false when the
/// view is busy, e.g. when called from inside the draw callback.
fn unmount_slot<T>(cell: &RefCell<Option<T>>, unmount: impl FnOnce(&mut T)) -> bool {
    let taken = match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(view) = slot.as_mut() {
                unmount(view);
            }
            slot.take()
        }
        Err(_) => {
            log::warn!("unmount requested while the galaxy view is busy; ignored");
            return false;
        }
    };
    drop(taken);
    true
}

fn with_buffers<R>(f: impl FnOnce(&FrameBuffers) -> R) -> R {
    BUFFERS.with(|buffers| f(&buffers.borrow()))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn create_view(container_id: &str, config_json: Option<String>, manifest_json: Option<String>) -> Result<View, JsValue> {
    let window = web_sys::window().ok_or_else(|| to_js("no window"))?;
    let document = window.document().ok_or_else(|| to_js("no document"))?;

    let mut config = match config_json {
        Some(json) => GalaxyConfig::from_json(&json).map_err(to_js)?,
        None => GalaxyConfig::default(),
    };
    if config.seed.is_none() {
        config.seed = Some(js_sys::Date::now() as u64);
    }
    let manifest = match manifest_json {
        Some(json) => AssetManifest::from_json(&json).map_err(to_js)?,
        None => AssetManifest::builtin(),
    };

    let buffers = BUFFERS.with(Rc::clone);
    let renderer = WebRenderer::new(document, container_id, TextureRegistry::from_manifest(&manifest), buffers);
    let host = WebHost::new(
        window,
        Rc::new(|event: HostEvent| {
            with_view(|view| view.handle_event(event));
        }),
        Rc::new(|| {
            with_view(|view| view.frame());
        }),
    );
    Ok(GalaxyView::new(renderer, host, config).with_palette(manifest.palette()))
}

/// Mount the galaxy into the element with id `container_id`.
/// Mounting again while mounted does nothing.
#[wasm_bindgen]
pub fn galaxy_mount(container_id: &str, config_json: Option<String>, manifest_json: Option<String>) -> Result<(), JsValue> {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    });

    let mounted = VIEW.with(|cell| cell.borrow().is_some());
    if !mounted {
        let view = create_view(container_id, config_json, manifest_json)?;
        VIEW.with(|cell| *cell.borrow_mut() = Some(view));
    }
    VIEW.with(|cell| mount_slot(cell, |view| view.mount()))
        .ok_or_else(|| to_js("galaxy view busy"))?
        .map_err(to_js)
}

/// Tear the galaxy down and drop the view with its DOM closures.
/// Ignored, with a warning, when called from inside the draw callback.
#[wasm_bindgen]
pub fn galaxy_unmount() {
    VIEW.with(|cell| unmount_slot(cell, |view| view.unmount()));
}

/// Register the function the TypeScript pass draws from after every frame.
#[wasm_bindgen]
pub fn galaxy_set_on_draw(callback: Option<js_sys::Function>) {
    with_view(|view| view.renderer_mut().set_on_draw(callback));
}

#[wasm_bindgen]
pub fn galaxy_is_running() -> bool {
    with_view(|view| view.is_running()).unwrap_or(false)
}

// ---- Frame buffer accessors ----

#[wasm_bindgen]
pub fn galaxy_camera_ptr() -> *const f32 {
    with_buffers(|b| b.camera.as_ptr())
}

#[wasm_bindgen]
pub fn galaxy_mesh_ptr() -> *const f32 {
    with_buffers(|b| b.meshes.as_ptr())
}

#[wasm_bindgen]
pub fn galaxy_mesh_count() -> u32 {
    with_buffers(|b| b.mesh_count)
}

#[wasm_bindgen]
pub fn galaxy_star_ptr() -> *const f32 {
    with_buffers(|b| b.stars.as_ptr())
}

#[wasm_bindgen]
pub fn galaxy_star_count() -> u32 {
    with_buffers(|b| (b.stars.len() / 3) as u32)
}

#[wasm_bindgen]
pub fn galaxy_stars_dirty() -> bool {
    with_buffers(|b| b.stars_dirty)
}

#[wasm_bindgen]
pub fn galaxy_star_geometry() -> u32 {
    with_buffers(|b| b.star_geometry)
}

#[wasm_bindgen]
pub fn galaxy_star_material() -> u32 {
    with_buffers(|b| b.star_material)
}

#[wasm_bindgen]
pub fn galaxy_lights_ptr() -> *const f32 {
    with_buffers(|b| b.lights.as_ptr())
}

#[wasm_bindgen]
pub fn galaxy_point_light_count() -> u32 {
    with_buffers(|b| b.point_lights)
}

#[wasm_bindgen]
pub fn galaxy_directional_light_count() -> u32 {
    with_buffers(|b| b.directional_lights)
}

#[wasm_bindgen]
pub fn galaxy_ambient() -> Vec<f32> {
    with_buffers(|b| b.ambient.to_vec())
}

/// JSON descriptor of a live geometry or material handle.
#[wasm_bindgen]
pub fn galaxy_resource(handle: u32) -> Option<String> {
    with_buffers(|b| b.resources.get(&handle).cloned())
}

/// Asset path of a live texture handle.
#[wasm_bindgen]
pub fn galaxy_texture_path(handle: u32) -> Option<String> {
    with_buffers(|b| b.textures.get(&handle).cloned())
}

// ---- Theme ----

fn with_theme<R>(f: impl FnOnce(&web_sys::Window, &mut galaxy_engine::ThemePreference<theme::LocalStorage>) -> R) -> Option<R> {
    let window = web_sys::window()?;
    let mut preference = theme::load(&window);
    Some(f(&window, &mut preference))
}

/// Stored theme ("dark" or "light"), applied to the document element.
#[wasm_bindgen]
pub fn theme_current() -> String {
    with_theme(|window, preference| {
        let current = preference.current();
        if let Some(document) = window.document() {
            theme::apply(&document, current);
        }
        current.as_str().to_owned()
    })
    .unwrap_or_else(|| galaxy_engine::Theme::default().as_str().to_owned())
}

/// Switch theme, persist it and apply it. Returns the new theme.
#[wasm_bindgen]
pub fn theme_toggle() -> String {
    with_theme(|window, preference| {
        let next = match preference.toggle() {
            Ok(theme) => theme,
            Err(err) => {
                log::warn!("theme not saved: {}", err);
                preference.current()
            }
        };
        if let Some(document) = window.document() {
            theme::apply(&document, next);
        }
        next.as_str().to_owned()
    })
    .unwrap_or_else(|| galaxy_engine::Theme::default().as_str().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeView {
        fail: bool,
        mounts: u32,
        unmounted: Rc<Cell<bool>>,
    }

    fn slot(fail: bool) -> (RefCell<Option<FakeView>>, Rc<Cell<bool>>) {
        let unmounted = Rc::new(Cell::new(false));
        let view = FakeView { fail, mounts: 0, unmounted: Rc::clone(&unmounted) };
        (RefCell::new(Some(view)), unmounted)
    }

    fn mount(view: &mut FakeView) -> Result<(), &'static str> {
        view.mounts += 1;
        if view.fail { Err("no container") } else { Ok(()) }
    }

    #[test]
    fn failed_mount_drops_the_view() {
        let (cell, _) = slot(true);
        assert_eq!(mount_slot(&cell, mount), Some(Err("no container")));
        assert!(cell.borrow().is_none());
    }

    #[test]
    fn successful_mount_keeps_the_view() {
        let (cell, _) = slot(false);
        assert_eq!(mount_slot(&cell, mount), Some(Ok(())));
        assert_eq!(cell.borrow().as_ref().map(|v| v.mounts), Some(1));
    }

    #[test]
    fn mount_on_empty_or_busy_slot_is_none() {
        let empty: RefCell<Option<FakeView>> = RefCell::new(None);
        assert_eq!(mount_slot(&empty, mount), None);

        let (cell, _) = slot(false);
        let _guard = cell.borrow_mut();
        assert_eq!(mount_slot(&cell, mount), None);
    }

    #[test]
    fn unmount_runs_then_drops_the_view() {
        let (cell, unmounted) = slot(false);
        assert!(unmount_slot(&cell, |view| view.unmounted.set(true)));
        assert!(unmounted.get());
        assert!(cell.borrow().is_none());
    }

    #[test]
    fn unmount_while_busy_keeps_the_view() {
        let (cell, unmounted) = slot(false);
        {
            let _guard = cell.borrow_mut();
            assert!(!unmount_slot(&cell, |view| view.unmounted.set(true)));
        }
        assert!(!unmounted.get());
        assert!(cell.borrow().is_some());
    }
}
