//! Asynchronous texture loading.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::api::types::TextureHandle;

/// Why a texture could not be loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("texture not found: {0}")]
    NotFound(String),

    #[error("texture load timed out: {0}")]
    Timeout(String),

    #[error("texture {path} could not be decoded: {reason}")]
    Decode { path: String, reason: String },
}

impl AssetError {
    pub fn path(&self) -> &str {
        match self {
            AssetError::NotFound(path) | AssetError::Timeout(path) => path,
            AssetError::Decode { path, .. } => path,
        }
    }
}

/// Resolves texture paths to renderer texture handles.
///
/// Loads may fail or never finish; the factory treats every failure as
/// "use the fallback color".
#[allow(async_fn_in_trait)]
pub trait TextureLoader {
    async fn load(&self, path: &str) -> Result<TextureHandle, AssetError>;
}

/// Loader backed by an in-memory table. Unknown paths fail with `NotFound`.
#[derive(Debug, Default)]
pub struct MemoryTextureLoader {
    textures: HashMap<String, TextureHandle>,
    failing: HashSet<String>,
    requests: RefCell<Vec<String>>,
}

impl MemoryTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path; it gets the next handle.
    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        let handle = TextureHandle(self.textures.len() as u32 + 1);
        self.textures.insert(path.into(), handle);
        self
    }

    pub fn with_textures<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self = self.with_texture(path);
        }
        self
    }

    /// Make a path fail to decode even if it is registered.
    pub fn with_failure(mut self, path: impl Into<String>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Every path requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl TextureLoader for MemoryTextureLoader {
    async fn load(&self, path: &str) -> Result<TextureHandle, AssetError> {
        self.requests.borrow_mut().push(path.to_string());
        if self.failing.contains(path) {
            return Err(AssetError::Decode {
                path: path.to_string(),
                reason: "corrupt image".into(),
            });
        }
        self.textures
            .get(path)
            .copied()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}
