//! Scale modes and the profiles that map physical units to scene units.
//!
//! Physical distances are in millions of km, diameters in km. A profile turns
//! both into scene units and carries the camera limits that suit it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, EngineResult};

/// Named scale presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    /// True proportions. Planets are specks.
    Realistic,
    /// True distances, sizes inflated 1000x.
    #[serde(alias = "semi-realistic")]
    SemiRealistic,
    /// Distances compressed 10x, sizes inflated 50000x.
    Educational,
    /// Legacy unit-scale preset with true proportions.
    #[serde(alias = "legacy-realistic")]
    RealisticUnit,
    /// Legacy visual preset: distances compressed 10x, sizes inflated 100x.
    #[serde(alias = "visual")]
    VisualUnit,
}

impl ScaleMode {
    pub const ALL: [ScaleMode; 5] = [
        ScaleMode::Realistic,
        ScaleMode::SemiRealistic,
        ScaleMode::Educational,
        ScaleMode::RealisticUnit,
        ScaleMode::VisualUnit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScaleMode::Realistic => "realistic",
            ScaleMode::SemiRealistic => "semiRealistic",
            ScaleMode::Educational => "educational",
            ScaleMode::RealisticUnit => "realisticUnit",
            ScaleMode::VisualUnit => "visualUnit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScaleMode::Realistic => "True sizes and distances",
            ScaleMode::SemiRealistic => "True distances, enlarged bodies",
            ScaleMode::Educational => "Compressed distances, greatly enlarged bodies",
            ScaleMode::RealisticUnit => "Legacy true-proportion view",
            ScaleMode::VisualUnit => "Legacy compressed view",
        }
    }

    /// Modes whose scene spans true distances use the wide camera range.
    pub fn is_realistic(self) -> bool {
        matches!(self, ScaleMode::Realistic | ScaleMode::RealisticUnit)
    }

    /// Distance of the overview camera used by `reset_view`.
    pub fn overview_distance(self) -> f64 {
        if self.is_realistic() {
            1000.0
        } else {
            500.0
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "realistic" => Ok(ScaleMode::Realistic),
            "semiRealistic" | "semi-realistic" => Ok(ScaleMode::SemiRealistic),
            "educational" => Ok(ScaleMode::Educational),
            "realisticUnit" | "legacy-realistic" => Ok(ScaleMode::RealisticUnit),
            "visualUnit" | "visual" => Ok(ScaleMode::VisualUnit),
            other => Err(EngineError::InvalidScaleMode(other.to_string())),
        }
    }
}

/// Numeric factors for one scale mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleProfile {
    pub mode: ScaleMode,
    /// Scene units per million km of orbital distance.
    pub distance_factor: f64,
    /// Multiplier applied to radii after converting km to thousands of km.
    pub size_factor: f64,
    pub camera_near: f64,
    pub camera_far: f64,
    /// Closest the orbit camera may get to its target.
    pub min_zoom: f64,
    /// Farthest the orbit camera may get from its target.
    pub max_zoom: f64,
}

impl ScaleProfile {
    /// Scene radius of a body with the given diameter in km.
    pub fn scaled_radius(&self, diameter_km: f64) -> f64 {
        self.scaled_size_km(diameter_km / 2.0)
    }

    /// Scene length of a body-scale measurement in km (radii, ring edges).
    pub fn scaled_size_km(&self, km: f64) -> f64 {
        km * self.size_factor / 1000.0
    }

    /// Scene length of an orbital distance in millions of km.
    pub fn scaled_distance(&self, million_km: f64) -> f64 {
        million_km * self.distance_factor
    }

    /// Both factors positive, `near < far` and `min_zoom <= max_zoom`.
    pub fn is_consistent(&self) -> bool {
        self.distance_factor > 0.0
            && self.size_factor > 0.0
            && self.camera_near > 0.0
            && self.camera_near < self.camera_far
            && self.min_zoom <= self.max_zoom
    }
}

/// Resolve a mode to its profile. Pure; the same mode always yields the same profile.
pub fn resolve_scale(mode: ScaleMode) -> ScaleProfile {
    let (distance_factor, size_factor) = match mode {
        ScaleMode::Realistic | ScaleMode::RealisticUnit => (1.0, 1.0),
        ScaleMode::SemiRealistic => (1.0, 1000.0),
        ScaleMode::Educational => (0.1, 50_000.0),
        ScaleMode::VisualUnit => (0.1, 100.0),
    };
    let (camera_far, min_zoom, max_zoom) = if mode.is_realistic() {
        (10_000.0, 1.0, 8000.0)
    } else {
        (5000.0, 10.0, 2000.0)
    };
    ScaleProfile {
        mode,
        distance_factor,
        size_factor,
        camera_near: 0.1,
        camera_far,
        min_zoom,
        max_zoom,
    }
}

/// Resolve a mode by name.
pub fn resolve_scale_named(name: &str) -> EngineResult<ScaleProfile> {
    name.parse().map(resolve_scale)
}
