use std::collections::HashMap;

use crate::api::types::TextureHandle;

/// Cache of textures already resolved by the loader, keyed by path.
/// Rebuilding a system (e.g. on a scale change) reuses these instead of
/// fetching again. Failed loads are not cached.
pub struct TextureRegistry {
    textures: HashMap<String, TextureHandle>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }

    /// Look up a texture by path. Returns None if it was never loaded.
    pub fn get(&self, path: &str) -> Option<TextureHandle> {
        self.textures.get(path).copied()
    }

    pub fn insert(&mut self, path: impl Into<String>, handle: TextureHandle) {
        self.textures.insert(path.into(), handle);
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_handles() {
        let mut reg = TextureRegistry::new();
        reg.insert("images/earth_daymap.jpg", TextureHandle(4));
        assert_eq!(reg.get("images/earth_daymap.jpg"), Some(TextureHandle(4)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn unknown_returns_none() {
        let reg = TextureRegistry::new();
        assert!(reg.get("nonexistent").is_none());
        assert!(reg.is_empty());
    }
}
