use bytemuck::{Pod, Zeroable};
use glam::{DMat4, DVec3};

use crate::extensions::easing::{ease_dvec3, Easing};
use crate::systems::scale::ScaleProfile;

/// Perspective camera orbiting a target point.
/// Distance to the target is kept inside the active scale profile's zoom limits.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Eye position in scene units.
    pub position: DVec3,
    /// Point the camera looks at.
    pub target: DVec3,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Smoothing factor for follow (0.0 = instant, 0.99 = very slow).
    pub smoothing: f32,
    flight: Option<CameraFlight>,
}

/// An eased move of both eye and target.
#[derive(Debug, Clone, Copy)]
struct CameraFlight {
    from_position: DVec3,
    from_target: DVec3,
    to_position: DVec3,
    to_target: DVec3,
    duration: f64,
    elapsed: f64,
    easing: Easing,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position, w = 1.
    pub eye: [f32; 4],
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: DVec3::new(0.0, 100.0, 200.0),
            target: DVec3::ZERO,
            fov_y: 45f64.to_radians(),
            aspect: aspect as f64,
            near: 0.1,
            far: 5000.0,
            min_distance: 10.0,
            max_distance: 2000.0,
            smoothing: 0.0,
            flight: None,
        }
    }

    /// Adopt a scale profile's clip planes and zoom limits.
    pub fn apply_profile(&mut self, profile: &ScaleProfile) {
        self.near = profile.camera_near;
        self.far = profile.camera_far;
        self.min_distance = profile.min_zoom;
        self.max_distance = profile.max_zoom;
        self.clamp_distance();
    }

    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }

    /// Pull the eye along its view direction until the distance is within limits.
    pub fn clamp_distance(&mut self) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f64::EPSILON {
            self.position = self.target + DVec3::Z * self.min_distance;
            return;
        }
        let clamped = distance.clamp(self.min_distance, self.max_distance);
        if clamped != distance {
            self.position = self.target + offset * (clamped / distance);
        }
    }

    /// Set smoothing factor for camera follow.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 0.99);
    }

    /// Move the eye to `distance` on the standard overview diagonal, looking at the origin.
    pub fn reset(&mut self, distance: f64) {
        self.flight = None;
        self.target = DVec3::ZERO;
        self.position = DVec3::new(-distance, distance * 0.5, distance * 0.8);
        self.clamp_distance();
    }

    /// Retarget without moving the eye.
    pub fn look_at(&mut self, target: DVec3) {
        self.target = target;
        self.clamp_distance();
    }

    /// Track a moving target, carrying the eye along so the view offset is kept.
    /// Call this each frame with the target's position.
    pub fn follow(&mut self, target: DVec3, dt: f64) {
        let delta = if self.smoothing <= 0.0 {
            target - self.target
        } else {
            let lerp_factor = 1.0 - (self.smoothing as f64).powf(dt * 60.0);
            (target - self.target) * lerp_factor
        };
        self.target += delta;
        self.position += delta;
    }

    /// Start an eased flight to a new eye and target.
    pub fn fly_to(&mut self, position: DVec3, target: DVec3, duration: f64, easing: Easing) {
        if duration <= 0.0 {
            self.position = position;
            self.target = target;
            self.flight = None;
            return;
        }
        self.flight = Some(CameraFlight {
            from_position: self.position,
            from_target: self.target,
            to_position: position,
            to_target: target,
            duration,
            elapsed: 0.0,
            easing,
        });
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn cancel_flight(&mut self) {
        self.flight = None;
    }

    /// Step the current flight. Returns true while a flight is in progress.
    pub fn advance_flight(&mut self, dt: f64) -> bool {
        let Some(flight) = self.flight.as_mut() else {
            return false;
        };
        flight.elapsed += dt;
        let t = (flight.elapsed / flight.duration).min(1.0);
        self.position = ease_dvec3(flight.easing, flight.from_position, flight.to_position, t);
        self.target = ease_dvec3(flight.easing, flight.from_target, flight.to_target, t);
        if t >= 1.0 {
            self.flight = None;
        }
        self.flight.is_some()
    }

    /// Resize the viewport.
    pub fn resize(&mut self, viewport_width: f32, viewport_height: f32) {
        if viewport_height > 0.0 {
            self.aspect = (viewport_width / viewport_height) as f64;
        }
    }

    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.target, DVec3::Y)
    }

    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn uniform(&self) -> CameraUniform {
        let view_proj = (self.projection_matrix() * self.view_matrix()).as_mat4();
        let eye = self.position.as_vec3();
        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}
