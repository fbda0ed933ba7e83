//! Optional overlay of labels and orbit markers.
//!
//! The engine tells the layer which bodies exist; drawing them is the layer's business.

use crate::api::types::BodyKey;
use crate::components::material::Rgb;

pub trait MarkerLayer {
    /// A body entered the scene.
    fn attach(&mut self, key: &BodyKey, label: &str, orbit_radius: f64, color: Rgb);

    /// A body left the scene.
    fn detach(&mut self, key: &BodyKey);

    fn set_labels_visible(&mut self, _visible: bool) {}
}

/// Marker layer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMarkers;

impl MarkerLayer for NoMarkers {
    fn attach(&mut self, _key: &BodyKey, _label: &str, _orbit_radius: f64, _color: Rgb) {}

    fn detach(&mut self, _key: &BodyKey) {}
}
