// extensions/easing.rs
//
// Easing curves for camera flights.
// Pure math, no dependencies on bodies or the renderer.

use glam::DVec3;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity (no easing).
    Linear,
    /// Fast start, slow arrival. Used by focus flights.
    #[default]
    CubicOut,
    /// Slow start and end.
    CubicInOut,
}

impl Easing {
    /// Apply the easing function to a normalized time value `t` in [0, 1].
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Eased interpolation between two points.
#[inline]
pub fn ease_dvec3(easing: Easing, a: DVec3, b: DVec3, t: f64) -> DVec3 {
    a.lerp(b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 3] = [Easing::Linear, Easing::CubicOut, Easing::CubicInOut];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::CubicOut.apply(2.0), 1.0);
    }

    #[test]
    fn cubic_out_front_loads_motion() {
        assert!(Easing::CubicOut.apply(0.5) > 0.5);
        assert!((Easing::CubicOut.apply(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn cubic_in_out_is_symmetric() {
        let a = Easing::CubicInOut.apply(0.25);
        let b = Easing::CubicInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 1e-12);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ease_dvec3_midpoint() {
        let p = ease_dvec3(Easing::Linear, DVec3::ZERO, DVec3::new(10.0, 20.0, 30.0), 0.5);
        assert_eq!(p, DVec3::new(5.0, 10.0, 15.0));
    }
}
