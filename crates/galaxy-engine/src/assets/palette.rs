use serde::{Deserialize, Serialize};
use crate::api::types::Color;

/// Descriptive planet family. Recorded on each planet but does not drive
/// size or motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetCategory {
    Rocky,
    Desert,
    Gas,
    Ice,
}

/// One entry of the planet palette: surface texture, tint, family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetAppearance {
    /// Asset path of the surface texture.
    pub texture: String,
    pub tint: Color,
    pub category: PlanetCategory,
}

impl PlanetAppearance {
    pub fn new(texture: impl Into<String>, tint: u32, category: PlanetCategory) -> Self {
        Self {
            texture: texture.into(),
            tint: Color::from_hex(tint),
            category,
        }
    }
}

/// Colors and appearances the celestial factory draws from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub star_colors: Vec<Color>,
    pub planets: Vec<PlanetAppearance>,
}

impl Default for Palette {
    fn default() -> Self {
        use PlanetCategory::*;
        Self {
            star_colors: [
                0xffff00, // yellow
                0xffa500, // orange
                0xff4500, // red-orange
                0xffffff, // white
                0x87ceeb, // light blue
                0xffd700, // gold
            ]
            .into_iter()
            .map(Color::from_hex)
            .collect(),
            planets: vec![
                PlanetAppearance::new("/textures/planet/mercury.jpg", 0x8c7853, Rocky),
                PlanetAppearance::new("/textures/planet/venus_surface.jpg", 0xffc649, Desert),
                PlanetAppearance::new("/textures/planet/earth_daymap.jpg", 0x6b93d6, Rocky),
                PlanetAppearance::new("/textures/planet/mars.jpg", 0xcd5c5c, Desert),
                PlanetAppearance::new("/textures/planet/jupiter.jpg", 0xd2691e, Gas),
                PlanetAppearance::new("/textures/planet/saturn.jpg", 0xffd700, Gas),
                PlanetAppearance::new("/textures/planet/uranus.jpg", 0x4fd0e3, Ice),
                PlanetAppearance::new("/textures/planet/neptune.jpg", 0x4169e1, Ice),
            ],
        }
    }
}

impl Palette {
    /// Texture paths referenced by the planet palette.
    pub fn texture_paths(&self) -> impl Iterator<Item = &str> {
        self.planets.iter().map(|p| p.texture.as_str())
    }

    /// A palette the factory can sample from (both lists non-empty).
    pub fn is_usable(&self) -> bool {
        !self.star_colors.is_empty() && !self.planets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_sizes() {
        let palette = Palette::default();
        assert_eq!(palette.star_colors.len(), 6);
        assert_eq!(palette.planets.len(), 8);
        assert!(palette.is_usable());
    }

    #[test]
    fn every_category_is_represented() {
        let palette = Palette::default();
        for category in [PlanetCategory::Rocky, PlanetCategory::Desert, PlanetCategory::Gas, PlanetCategory::Ice] {
            assert!(palette.planets.iter().any(|p| p.category == category));
        }
    }

    #[test]
    fn appearance_parses_hex_tint() {
        let json = r#"{ "texture": "/t/x.jpg", "tint": 16711680, "category": "gas" }"#;
        let appearance: PlanetAppearance = serde_json::from_str(json).unwrap();
        assert_eq!(appearance.tint, Color::new(1.0, 0.0, 0.0));
        assert_eq!(appearance.category, PlanetCategory::Gas);
    }
}
