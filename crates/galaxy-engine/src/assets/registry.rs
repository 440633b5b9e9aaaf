use std::collections::HashMap;
use crate::assets::manifest::AssetManifest;

/// Registry of loadable textures, built from an AssetManifest.
/// Maps each known path to a stable slot the draw pass indexes its image table with.
pub struct TextureRegistry {
    slots: HashMap<String, u32>,
    paths: Vec<String>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            paths: Vec::new(),
        }
    }

    /// Build a registry from a parsed AssetManifest.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let mut registry = Self::new();
        for path in &manifest.textures {
            registry.insert(path);
        }
        registry
    }

    /// Register a path. Returns its slot (existing slot if already known).
    pub fn insert(&mut self, path: &str) -> u32 {
        if let Some(&slot) = self.slots.get(path) {
            return slot;
        }
        let slot = self.paths.len() as u32;
        self.paths.push(path.to_owned());
        self.slots.insert(path.to_owned(), slot);
        slot
    }

    /// Look up a path. Returns None if unknown.
    pub fn slot(&self, path: &str) -> Option<u32> {
        self.slots.get(path).copied()
    }

    /// Path for a slot.
    pub fn path(&self, slot: u32) -> Option<&str> {
        self.paths.get(slot as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
