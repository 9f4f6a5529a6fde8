//! Named texture lookup
//!
//! Scenes ask for images by name. A name the catalog doesn't know resolves to
//! [`Texture::Placeholder`] so a missing asset never stops a run.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Every image the game's scenes refer to
pub const GAME_IMAGES: &[&str] = &[
    // Gameplay
    "backgroundImage",
    "playerImage",
    "platformImage",
    "widePlatformImage",
    "coinImage",
    "chestImage",
    "rockImage",
    // Start
    "startBackgroundImage",
    "playButtonImage",
    "startButtonImage",
    "settingsButtonImage",
    // Game over
    "overBackgroundImage",
];

/// Handle the host renderer draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Texture {
    Loaded(u32),
    /// Empty visual for an unresolved name
    Placeholder,
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    textures: HashMap<String, u32>,
    /// Names already reported missing
    missing: HashSet<String>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every game image registered
    pub fn with_game_images() -> Self {
        let mut catalog = Self::new();
        for name in GAME_IMAGES {
            catalog.register(name);
        }
        catalog
    }

    /// Register a name, returning its handle (idempotent)
    pub fn register(&mut self, name: &str) -> Texture {
        let next = self.textures.len() as u32;
        let id = *self.textures.entry(name.to_string()).or_insert(next);
        Texture::Loaded(id)
    }

    /// Look up a texture, falling back to the placeholder
    pub fn resolve(&mut self, name: &str) -> Texture {
        if let Some(&id) = self.textures.get(name) {
            return Texture::Loaded(id);
        }
        if self.missing.insert(name.to_string()) {
            log::warn!("Missing image `{name}`, drawing placeholder");
        }
        Texture::Placeholder
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
