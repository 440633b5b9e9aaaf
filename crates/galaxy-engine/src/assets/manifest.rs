use serde::{Deserialize, Serialize};
use crate::assets::palette::Palette;

/// Asset manifest describing the textures shipped with the site.
/// Loaded from a JSON file at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Texture paths the host can serve.
    pub textures: Vec<String>,
    /// Optional palette override; the built-in palette otherwise.
    #[serde(default)]
    pub palette: Option<Palette>,
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Manifest listing exactly the textures of the built-in palette.
    pub fn builtin() -> Self {
        let palette = Palette::default();
        Self {
            textures: palette.texture_paths().map(str::to_owned).collect(),
            palette: None,
        }
    }

    /// The palette to generate with.
    pub fn palette(&self) -> Palette {
        self.palette.clone().unwrap_or_default()
    }
}
