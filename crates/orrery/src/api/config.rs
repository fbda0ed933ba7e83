use serde::Deserialize;

use crate::api::error::EngineResult;
use crate::systems::motion::MotionTuning;
use crate::systems::scale::ScaleMode;

/// Configuration for the engine, provided by the host.
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Scale mode the first build uses (default: educational).
    pub initial_scale: ScaleMode,
    /// Angular speed constants for orbits and spins.
    pub motion: MotionTuning,
    /// Divisor applied to moon distances in km before the distance factor (default: 10000).
    pub moon_distance_divisor: f64,
    /// Camera follow smoothing (0.0 = snap, 0.99 = very slow).
    pub camera_smoothing: f32,
    /// Duration of focus flights in seconds (default: 1.2).
    pub focus_flight_seconds: f64,
    /// Maximum number of undrained events kept (default: 256).
    pub max_events: usize,
    /// Whether orbit paths start visible.
    pub show_orbits: bool,
    /// Seed for initial angles of bodies built outside a whole-system pass.
    pub seed: u64,
    /// Viewport aspect ratio the camera starts with.
    pub aspect_ratio: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_scale: ScaleMode::Educational,
            motion: MotionTuning::default(),
            moon_distance_divisor: 10_000.0,
            camera_smoothing: 0.0,
            focus_flight_seconds: 1.2,
            max_events: 256,
            show_orbits: true,
            seed: 42,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        log::info!(
            "Config loaded: scale={}, orbit speed={}",
            config.initial_scale.name(),
            config.motion.orbit_speed
        );
        Ok(config)
    }
}
