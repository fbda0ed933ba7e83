//! Angular motion: speed constants, wrapping, and circular orbit placement.
//! Pure math, no dependencies on bodies or the renderer.

use std::f64::consts::TAU;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, EngineResult};
use crate::api::types::SpeedKind;

/// Length of Earth's sidereal day in days. Rotation speeds are relative to it.
pub const SIDEREAL_DAY: f64 = 0.997_269_68;

/// Angular speed constants in radians per second of simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionTuning {
    /// Orbit speed of a body at 1 AU.
    pub orbit_speed: f64,
    /// Orbit speed falls off as `distance_au ^ exponent`.
    pub orbit_speed_exponent: f64,
    /// Spin speed of a body with a one sidereal day rotation period.
    pub rotation_speed: f64,
    /// Orbit speed of a moon with a one day orbital period.
    pub moon_orbit_speed: f64,
    /// Rotation of an asteroid belt as a whole.
    pub belt_speed: f64,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            orbit_speed: 0.06,
            orbit_speed_exponent: 0.5,
            rotation_speed: 0.6,
            moon_orbit_speed: 0.6,
            belt_speed: 0.006,
        }
    }
}

impl MotionTuning {
    /// Orbit speed around the primary for a body `distance_au` out.
    pub fn orbit_angular_speed(&self, distance_au: f64) -> f64 {
        if !distance_au.is_finite() || distance_au <= 0.0 {
            return 0.0;
        }
        self.orbit_speed / distance_au.powf(self.orbit_speed_exponent)
    }

    /// Orbit speed of a moon. A negative period orbits retrograde; a missing
    /// or zero period counts as one day.
    pub fn moon_angular_speed(&self, orbital_period_days: Option<f64>) -> f64 {
        let period = orbital_period_days
            .filter(|p| p.is_finite() && *p != 0.0)
            .unwrap_or(1.0);
        self.moon_orbit_speed / period
    }

    /// Spin speed from a rotation period in days. Negative periods spin retrograde.
    pub fn rotation_angular_speed(&self, rotation_period_days: Option<f64>) -> f64 {
        match rotation_period_days {
            Some(p) if p.is_finite() && p != 0.0 => {
                self.rotation_speed * SIDEREAL_DAY / p.abs() * p.signum()
            }
            _ => 0.0,
        }
    }
}

/// Runtime speed multipliers set through the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedMultipliers {
    pub orbit: f64,
    pub rotation: f64,
}

impl Default for SpeedMultipliers {
    fn default() -> Self {
        Self { orbit: 1.0, rotation: 1.0 }
    }
}

impl SpeedMultipliers {
    /// Set one channel. Rejects negative or non-finite values and leaves state untouched.
    pub fn set(&mut self, kind: SpeedKind, multiplier: f64) -> EngineResult<()> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(EngineError::InvalidSpeed(multiplier));
        }
        match kind {
            SpeedKind::Orbit => self.orbit = multiplier,
            SpeedKind::Rotation => self.rotation = multiplier,
        }
        Ok(())
    }

    pub fn get(&self, kind: SpeedKind) -> f64 {
        match kind {
            SpeedKind::Orbit => self.orbit,
            SpeedKind::Rotation => self.rotation,
        }
    }
}

/// Wrap an angle into `[0, TAU)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

/// Point on a circular orbit in the XZ plane.
pub fn orbit_position(center: DVec3, radius: f64, angle: f64) -> DVec3 {
    center + DVec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

/// Initial angle for the `index`th of `count` siblings, evenly spread.
pub fn sibling_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    wrap_angle(index as f64 / count as f64 * TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_speed_falls_with_distance() {
        let tuning = MotionTuning::default();
        let earth = tuning.orbit_angular_speed(1.0);
        let neptune = tuning.orbit_angular_speed(30.07);
        assert!((earth - 0.06).abs() < 1e-12);
        assert!(neptune < earth);
        assert!((neptune - 0.06 / 30.07_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_distance_does_not_orbit() {
        let tuning = MotionTuning::default();
        assert_eq!(tuning.orbit_angular_speed(0.0), 0.0);
        assert_eq!(tuning.orbit_angular_speed(f64::NAN), 0.0);
    }

    #[test]
    fn retrograde_rotation_is_negative() {
        let tuning = MotionTuning::default();
        let venus = tuning.rotation_angular_speed(Some(-243.02));
        let earth = tuning.rotation_angular_speed(Some(SIDEREAL_DAY));
        assert!(venus < 0.0);
        assert!((earth - 0.6).abs() < 1e-12);
        assert_eq!(tuning.rotation_angular_speed(None), 0.0);
    }

    #[test]
    fn moon_without_period_uses_one_day() {
        let tuning = MotionTuning::default();
        assert_eq!(tuning.moon_angular_speed(None), 0.6);
        assert_eq!(tuning.moon_angular_speed(Some(0.0)), 0.6);
        assert!((tuning.moon_angular_speed(Some(27.32)) - 0.6 / 27.32).abs() < 1e-12);
    }

    #[test]
    fn wrap_stays_in_range() {
        for angle in [-1e-18, -TAU, TAU, 3.0 * TAU + 0.5, -0.25, 1e9, 0.0] {
            let wrapped = wrap_angle(angle);
            assert!((0.0..TAU).contains(&wrapped), "{angle} wrapped to {wrapped}");
        }
        assert!((wrap_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn speed_multipliers_reject_bad_values() {
        let mut speeds = SpeedMultipliers::default();
        assert!(speeds.set(SpeedKind::Orbit, -1.0).is_err());
        assert!(speeds.set(SpeedKind::Rotation, f64::INFINITY).is_err());
        assert_eq!(speeds, SpeedMultipliers::default());
        speeds.set(SpeedKind::Orbit, 0.0).unwrap();
        assert_eq!(speeds.get(SpeedKind::Orbit), 0.0);
    }

    #[test]
    fn siblings_spread_evenly() {
        assert_eq!(sibling_angle(0, 4), 0.0);
        assert!((sibling_angle(1, 4) - TAU / 4.0).abs() < 1e-12);
        assert_eq!(sibling_angle(3, 0), 0.0);
    }

    #[test]
    fn orbit_position_lies_on_circle() {
        let p = orbit_position(DVec3::new(1.0, 2.0, 3.0), 10.0, 0.7);
        let offset = p - DVec3::new(1.0, 2.0, 3.0);
        assert!((offset.length() - 10.0).abs() < 1e-9);
        assert_eq!(offset.y, 0.0);
    }
}
