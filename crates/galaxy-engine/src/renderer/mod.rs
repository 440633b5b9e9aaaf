pub mod camera;
pub mod headless;
pub mod instance;
pub mod traits;

// Re-export key types for convenient access
pub use camera::{CameraUniform, PerspectiveCamera};
pub use headless::{FrameSummary, HeadlessRenderer};
pub use instance::{MeshInstance, RenderBuffer, NO_TEXTURE};
pub use traits::{BlendMode, FrameData, Geometry, Material, Renderer, StarPointsMaterial};
