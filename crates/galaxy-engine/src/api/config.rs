use serde::{Deserialize, Serialize};

/// Camera setup applied on every mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    /// Far plane; large enough to contain the whole star field.
    pub far: f32,
    /// Starting position in world space.
    pub start: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 10_000.0,
            start: [0.0, 0.0, 50.0],
        }
    }
}

/// Scene configuration. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyConfig {
    /// Step passed to solar-system updates each frame (default: 1/60).
    pub fixed_dt: f32,
    /// Number of background stars (default: 5000).
    pub star_count: usize,
    /// Side of the cube the star field is scattered in (default: 10000).
    pub star_field_extent: f32,
    /// Per-axis velocity bound for drifting stars (default: 0.1).
    pub star_max_speed: f32,
    /// Distance from its origin at which a star snaps back (default: 500).
    pub star_drift_limit: f32,
    /// Number of solar systems requested from the factory (default: 10).
    pub system_count: usize,
    /// Width of the X/Z placement box; Y uses a fifth of it (default: 2000).
    pub system_spread: f32,
    /// Camera translation per frame per held direction (default: 0.5).
    pub move_speed: f32,
    /// Intensity of the light riding each star (default: 0.5).
    pub sun_light_intensity: f32,
    /// Falloff range of the light riding each star (default: 100).
    pub sun_light_range: f32,
    pub camera: CameraConfig,
    /// Fixed RNG seed. `None` lets the host pick one (e.g. wall-clock time).
    pub seed: Option<u64>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            star_count: 5000,
            star_field_extent: 10_000.0,
            star_max_speed: 0.1,
            star_drift_limit: 500.0,
            system_count: 10,
            system_spread: 2000.0,
            move_speed: 0.5,
            sun_light_intensity: 0.5,
            sun_light_range: 100.0,
            camera: CameraConfig::default(),
            seed: None,
        }
    }
}

impl GalaxyConfig {
    /// Parse a config from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
