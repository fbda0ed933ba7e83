//! Error types for the engine surface

use thiserror::Error;

use crate::assets::loader::AssetError;
use crate::components::record::RecordError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by engine operations and emitted as `loading:error` events
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown scale mode: {0}")]
    InvalidScaleMode(String),

    #[error("Invalid record '{name}': {reason}")]
    InvalidRecord {
        name: String,
        #[source]
        reason: RecordError,
    },

    #[error("Duplicate key '{key}' for record '{name}'")]
    DuplicateKey { name: String, key: String },

    #[error("Failed to load {path}: {reason}")]
    ResourceLoadFailure { path: String, reason: String },

    #[error("Speed multiplier must be finite and non-negative, got {0}")]
    InvalidSpeed(f64),

    #[error("No body with key '{0}'")]
    UnknownBody(String),

    #[error("Invalid archetype catalog: {0}")]
    InvalidCatalog(String),

    #[error("Renderer unavailable")]
    RendererUnavailable,

    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Engine disposed")]
    Disposed,

    #[error("Malformed JSON document: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<AssetError> for EngineError {
    fn from(err: AssetError) -> Self {
        EngineError::ResourceLoadFailure {
            path: err.path().to_string(),
            reason: err.to_string(),
        }
    }
}

impl EngineError {
    /// Name of the record an `InvalidRecord` or `DuplicateKey` error refers to.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            EngineError::InvalidRecord { name, .. } | EngineError::DuplicateKey { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_record_message_names_the_record() {
        let err = EngineError::InvalidRecord {
            name: "Vulcan".into(),
            reason: RecordError::MissingField("diameterKm"),
        };
        let message = err.to_string();
        assert!(message.contains("Vulcan"));
        assert!(message.contains("diameterKm"));
        assert_eq!(err.record_name(), Some("Vulcan"));
    }

    #[test]
    fn asset_errors_become_load_failures() {
        let err: EngineError = AssetError::NotFound("images/earth.jpg".into()).into();
        match err {
            EngineError::ResourceLoadFailure { path, .. } => assert_eq!(path, "images/earth.jpg"),
            other => panic!("Expected ResourceLoadFailure, got {other:?}"),
        }
    }
}
