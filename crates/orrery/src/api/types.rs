use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a renderable primitive owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveHandle(pub u32);

/// Opaque handle to a texture resolved by a [`TextureLoader`](crate::assets::loader::TextureLoader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Stable identifier of a body in the active system.
///
/// Top-level bodies use a slug of their display name (`"earth"`), moons are
/// namespaced under their parent (`"earth/moon"`). Keys survive rebuilds, so
/// they are what selection and lookups hold on to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyKey(String);

impl BodyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a key from a display name: lowercase, whitespace and `.` become
    /// `-`, anything else that is not alphanumeric is dropped. May be empty.
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        for ch in name.trim().chars() {
            if ch.is_alphanumeric() {
                slug.extend(ch.to_lowercase());
            } else if (ch.is_whitespace() || matches!(ch, '-' | '_' | '.'))
                && !slug.is_empty()
                && !slug.ends_with('-')
            {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        Self(slug)
    }

    /// Key for a satellite of this body.
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}/{}", self.0, Self::from_name(name).0))
    }

    /// Key of the parent body, if this is a satellite key.
    pub fn parent(&self) -> Option<BodyKey> {
        self.0.rsplit_once('/').map(|(parent, _)| BodyKey(parent.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Which animation channel a speed multiplier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedKind {
    Orbit,
    Rotation,
}

/// Camera framing used when a body is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    /// Highlight only; the camera stays where it is.
    #[default]
    Normal,
    /// Fly to five body radii and track the body.
    Focus,
    /// Fly to two body radii and track the body.
    Detailed,
}

impl FocusMode {
    /// Camera distance expressed in body radii, `None` when the camera does not move.
    pub fn radii(self) -> Option<f64> {
        match self {
            FocusMode::Normal => None,
            FocusMode::Focus => Some(5.0),
            FocusMode::Detailed => Some(2.0),
        }
    }
}
