use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Texture manifest mapping logical texture names to files.
/// Loaded from a JSON file at runtime. Records may reference either a
/// logical name listed here or a plain path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextureManifest {
    /// Prefix joined to every relative path (e.g., "/assets").
    #[serde(default)]
    pub base_path: String,
    /// Named texture lookup: name → file.
    #[serde(default)]
    pub textures: HashMap<String, TextureDescriptor>,
}

/// Describes a single texture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureDescriptor {
    /// Relative path to the image (e.g., "images/earth_daymap.jpg").
    pub path: String,
}

impl TextureManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Resolve a record's texture reference to a loadable path.
    pub fn resolve(&self, reference: &str) -> String {
        let path = self
            .textures
            .get(reference)
            .map(|d| d.path.as_str())
            .unwrap_or(reference);
        if self.base_path.is_empty() || path.starts_with('/') || path.contains("://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_path.trim_end_matches('/'), path)
    }
}
