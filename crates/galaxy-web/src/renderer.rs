use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use galaxy_engine::{
    CameraUniform, FrameData, GalaxyError, Geometry, GeometryHandle, LightState, Material,
    MaterialHandle, Renderer, Resource, TextureHandle, TextureRegistry, Viewport, CONTROL_HINTS,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

/// Floats per packed light: xyz, intensity, rgb, range (0 for directional).
pub const LIGHT_FLOATS: usize = 8;

pub const CANVAS_CLASS: &str = "galaxy-canvas";
pub const OVERLAY_CLASS: &str = "galaxy-controls";

/// Inline style of the controls overlay, pinned to the container's top-left corner.
pub const OVERLAY_STYLE: [(&str, &str); 10] = [
    ("position", "absolute"),
    ("top", "20px"),
    ("left", "20px"),
    ("color", "white"),
    ("font-family", "monospace"),
    ("font-size", "14px"),
    ("background-color", "rgba(0,0,0,0.7)"),
    ("padding", "10px"),
    ("border-radius", "5px"),
    ("z-index", "1000"),
];

/// Flat per-frame data read by the TypeScript draw pass through pointer accessors.
#[derive(Default)]
pub struct FrameBuffers {
    pub camera: Vec<f32>,
    /// `MeshInstance` words; ids are u32 bit patterns.
    pub meshes: Vec<f32>,
    pub mesh_count: u32,
    /// xyz per star. Only rewritten when positions changed.
    pub stars: Vec<f32>,
    pub stars_dirty: bool,
    pub star_geometry: u32,
    pub star_material: u32,
    /// Point lights first, then directional lights.
    pub lights: Vec<f32>,
    pub point_lights: u32,
    pub directional_lights: u32,
    /// rgb + intensity.
    pub ambient: [f32; 4],
    /// Descriptor JSON per live geometry/material handle.
    pub resources: HashMap<u32, String>,
    /// Asset path per live texture handle.
    pub textures: HashMap<u32, String>,
}

impl FrameBuffers {
    fn pack_lights(&mut self, lights: &LightState) {
        self.lights.clear();
        for light in lights.points() {
            self.lights.extend_from_slice(&light.position.to_array());
            self.lights.push(light.intensity);
            self.lights.extend_from_slice(&light.color.to_array());
            self.lights.push(light.range);
        }
        for light in lights.directionals() {
            self.lights.extend_from_slice(&light.direction().to_array());
            self.lights.push(light.intensity);
            self.lights.extend_from_slice(&light.color.to_array());
            self.lights.push(0.0);
        }
        self.point_lights = lights.points().len() as u32;
        self.directional_lights = lights.directionals().len() as u32;
        let (color, intensity) = lights.ambient();
        let [r, g, b] = color.to_array();
        self.ambient = [r, g, b, intensity];
    }
}

/// Canvas-backed renderer. Owns the DOM surface and mirrors every frame into
/// `FrameBuffers`; the actual GPU work happens in the TypeScript pass,
/// notified through `on_draw` after each frame.
pub struct WebRenderer {
    document: Document,
    container_id: String,
    canvas: Option<HtmlCanvasElement>,
    overlay: Option<HtmlElement>,
    registry: TextureRegistry,
    buffers: Rc<RefCell<FrameBuffers>>,
    on_draw: Option<js_sys::Function>,
    next_handle: u32,
}

impl WebRenderer {
    pub fn new(document: Document, container_id: &str, registry: TextureRegistry, buffers: Rc<RefCell<FrameBuffers>>) -> Self {
        Self {
            document,
            container_id: container_id.to_owned(),
            canvas: None,
            overlay: None,
            registry,
            buffers,
            on_draw: None,
            next_handle: 1,
        }
    }

    pub fn set_on_draw(&mut self, callback: Option<js_sys::Function>) {
        self.on_draw = callback;
    }

    pub fn canvas(&self) -> Option<&HtmlCanvasElement> {
        self.canvas.as_ref()
    }

    fn next(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    fn surface_error(context: &str, err: JsValue) -> GalaxyError {
        GalaxyError::Surface(format!("{}: {:?}", context, err))
    }

    fn create_overlay(&self) -> Result<HtmlElement, GalaxyError> {
        let overlay: HtmlElement = self
            .document
            .create_element("div")
            .map_err(|e| Self::surface_error("create overlay", e))?
            .dyn_into()
            .map_err(|_| GalaxyError::Surface("overlay element has the wrong type".into()))?;
        overlay.set_class_name(OVERLAY_CLASS);
        let style = overlay.style();
        for (property, value) in OVERLAY_STYLE {
            style
                .set_property(property, value)
                .map_err(|e| Self::surface_error("style overlay", e))?;
        }
        for line in CONTROL_HINTS {
            let row = self
                .document
                .create_element("div")
                .map_err(|e| Self::surface_error("create overlay row", e))?;
            row.set_text_content(Some(line));
            overlay
                .append_child(&row)
                .map_err(|e| Self::surface_error("append overlay row", e))?;
        }
        Ok(overlay)
    }

    fn describe(&mut self, handle: u32, json: Result<String, serde_json::Error>) {
        match json {
            Ok(json) => {
                self.buffers.borrow_mut().resources.insert(handle, json);
            }
            Err(err) => log::error!("resource {} descriptor: {}", handle, err),
        }
    }
}

impl Renderer for WebRenderer {
    fn backend(&self) -> &'static str {
        "webgl"
    }

    fn mount(&mut self, viewport: Viewport) -> Result<(), GalaxyError> {
        let container = self
            .document
            .get_element_by_id(&self.container_id)
            .ok_or_else(|| GalaxyError::Surface(format!("no element #{}", self.container_id)))?;

        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(|e| Self::surface_error("create canvas", e))?
            .dyn_into()
            .map_err(|_| GalaxyError::Surface("canvas element has the wrong type".into()))?;
        canvas.set_class_name(CANVAS_CLASS);
        canvas.set_width(viewport.width);
        canvas.set_height(viewport.height);
        let style = canvas.style();
        let _ = style.set_property("display", "block");
        let _ = style.set_property("width", "100%");
        let _ = style.set_property("height", "100%");

        container
            .append_child(&canvas)
            .map_err(|e| Self::surface_error("attach canvas", e))?;
        self.canvas = Some(canvas);

        // The overlay is absolutely positioned against the container.
        if let Some(container) = container.dyn_ref::<HtmlElement>() {
            let style = container.style();
            if style.get_property_value("position").unwrap_or_default().is_empty() {
                let _ = style.set_property("position", "relative");
            }
        }

        // A missing overlay is cosmetic; the scene still runs.
        match self.create_overlay() {
            Ok(overlay) => match container.append_child(&overlay) {
                Ok(_) => self.overlay = Some(overlay),
                Err(err) => log::warn!("controls overlay not attached: {:?}", err),
            },
            Err(err) => log::warn!("controls overlay not created: {}", err),
        }
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            canvas.remove();
        }
        if let Some(overlay) = self.overlay.take() {
            overlay.remove();
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if let Some(canvas) = &self.canvas {
            canvas.set_width(viewport.width);
            canvas.set_height(viewport.height);
        }
    }

    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, GalaxyError> {
        if self.registry.slot(path).is_none() {
            return Err(GalaxyError::MissingTexture(path.to_owned()));
        }
        let handle = self.next();
        self.buffers.borrow_mut().textures.insert(handle, path.to_owned());
        Ok(TextureHandle(handle))
    }

    fn create_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        let handle = self.next();
        self.describe(handle, serde_json::to_string(&geometry));
        GeometryHandle(handle)
    }

    fn create_material(&mut self, material: Material) -> MaterialHandle {
        let handle = self.next();
        self.describe(handle, serde_json::to_string(&material));
        MaterialHandle(handle)
    }

    fn release(&mut self, resource: Resource) {
        let mut buffers = self.buffers.borrow_mut();
        let released = match resource {
            Resource::Geometry(GeometryHandle(id)) | Resource::Material(MaterialHandle(id)) => {
                buffers.resources.remove(&id).is_some()
            }
            Resource::Texture(TextureHandle(id)) => buffers.textures.remove(&id).is_some(),
        };
        if !released {
            log::warn!("release of unknown resource {:?}", resource);
        }
    }

    fn draw(&mut self, frame: &FrameData) {
        {
            let mut buffers = self.buffers.borrow_mut();
            buffers.camera.clear();
            buffers.camera.extend_from_slice(bytemuck::cast_slice::<CameraUniform, f32>(
                std::slice::from_ref(&frame.camera),
            ));

            buffers.meshes.clear();
            buffers.meshes.extend_from_slice(bytemuck::cast_slice(frame.meshes));
            buffers.mesh_count = frame.meshes.len() as u32;

            buffers.stars_dirty = frame.stars_dirty;
            if frame.stars_dirty {
                buffers.stars.clear();
                buffers.stars.extend_from_slice(bytemuck::cast_slice(frame.stars));
            }
            if let Some((geometry, material)) = frame.star_resources {
                buffers.star_geometry = geometry.0;
                buffers.star_material = material.0;
            }

            buffers.pack_lights(frame.lights);
        }

        if let Some(callback) = &self.on_draw {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                log::error!("draw callback failed: {:?}", err);
            }
        }
    }

    fn dispose(&mut self) {
        self.unmount();
        self.on_draw = None;
        let mut buffers = self.buffers.borrow_mut();
        let live = buffers.resources.len() + buffers.textures.len();
        if live > 0 {
            log::warn!("renderer disposed with {} resources still live", live);
        }
        buffers.camera.clear();
        buffers.meshes.clear();
        buffers.mesh_count = 0;
        buffers.stars.clear();
        buffers.stars_dirty = false;
        buffers.lights.clear();
        buffers.point_lights = 0;
        buffers.directional_lights = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_of(property: &str) -> Option<&'static str> {
        OVERLAY_STYLE.iter().find(|(p, _)| *p == property).map(|(_, v)| *v)
    }

    #[test]
    fn overlay_is_pinned_above_the_canvas() {
        assert_eq!(style_of("position"), Some("absolute"));
        assert_eq!(style_of("top"), Some("20px"));
        assert_eq!(style_of("left"), Some("20px"));
        assert_eq!(style_of("z-index"), Some("1000"));
    }

    #[test]
    fn overlay_is_readable() {
        assert_eq!(style_of("color"), Some("white"));
        assert_eq!(style_of("background-color"), Some("rgba(0,0,0,0.7)"));
        assert_eq!(style_of("font-family"), Some("monospace"));
    }
}
