pub mod api;
pub mod assets;
pub mod core;
pub mod error;
pub mod galaxy;
pub mod host;
pub mod input;
pub mod renderer;
pub mod systems;
pub mod theme;

// Re-export key types at crate root for convenience
pub use api::config::{CameraConfig, GalaxyConfig};
pub use api::types::{Color, GeometryHandle, MaterialHandle, NodeId, Resource, TextureHandle};
pub use assets::manifest::AssetManifest;
pub use assets::palette::{Palette, PlanetAppearance, PlanetCategory};
pub use assets::registry::TextureRegistry;
pub use crate::core::scene::SceneRoot;
pub use crate::core::transform::Transform;
pub use error::GalaxyError;
pub use galaxy::{
    create_random_solar_systems, create_solar_system, Blueprint, GalaxyView, LifecycleState,
    Planet, SolarSystem, StarField, StarFieldParams, SunLight,
};
pub use host::{FrameRequest, HeadlessHost, Host, HostEvent, ListenerId, ListenerKind, Viewport};
pub use input::keys::{ControlKey, InputState, KeyCode, CONTROL_HINTS};
pub use renderer::{
    CameraUniform, FrameData, Geometry, HeadlessRenderer, Material, MeshInstance, PerspectiveCamera,
    RenderBuffer, Renderer,
};
pub use systems::lighting::{DirectionalLight, LightState, PointLight};
pub use systems::rng::{RandomSource, Rng};
pub use theme::{MemoryStorage, Theme, ThemePreference, ThemeStorage, THEME_STORAGE_KEY};
