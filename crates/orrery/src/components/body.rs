use glam::{DQuat, DVec3};

use crate::api::types::{BodyKey, PrimitiveHandle};
use crate::components::record::{BodyCategory, BodyRecord};
use crate::renderer::traits::{SceneRenderer, Transform};
use crate::systems::classification::Archetype;
use crate::systems::motion::{orbit_position, wrap_angle, SpeedMultipliers};

/// Scene primitives owned by one body. Satellites own their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPrimitives {
    /// Sphere for bodies, ring for asteroid belts.
    pub surface: PrimitiveHandle,
    pub orbit_path: Option<PrimitiveHandle>,
    pub atmosphere: Option<PrimitiveHandle>,
    pub ring: Option<PrimitiveHandle>,
}

impl BodyPrimitives {
    pub fn new(surface: PrimitiveHandle) -> Self {
        Self {
            surface,
            orbit_path: None,
            atmosphere: None,
            ring: None,
        }
    }

    /// Handles in creation order.
    pub fn handles(&self) -> impl Iterator<Item = PrimitiveHandle> {
        [Some(self.surface), self.orbit_path, self.atmosphere, self.ring]
            .into_iter()
            .flatten()
    }

    /// Handles that render as part of the body itself (not its orbit path).
    pub fn body_handles(&self) -> impl Iterator<Item = PrimitiveHandle> {
        [Some(self.surface), self.atmosphere, self.ring].into_iter().flatten()
    }
}

/// Scaled geometry and angular speeds, resolved once by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub scaled_radius: f64,
    /// Radius of the circular orbit around the primary (or the parent for moons).
    pub scaled_orbit_radius: f64,
    /// Radians per second. Zero for bodies that do not orbit.
    pub orbit_angular_speed: f64,
    /// Radians per second. Negative spins retrograde.
    pub rotation_angular_speed: f64,
    pub initial_orbit_angle: f64,
    pub axial_tilt_rad: f64,
}

/// Live simulated body.
///
/// Owns its primitives and its satellites. `dispose` consumes the body, so a
/// body cannot be released twice.
#[derive(Debug)]
pub struct OrbitingBody {
    key: BodyKey,
    record: BodyRecord,
    archetype: Option<Archetype>,
    kinematics: Kinematics,
    orbit_angle: f64,
    rotation_angle: f64,
    center: DVec3,
    position: DVec3,
    primitives: BodyPrimitives,
    atmosphere_scale: f64,
    moons: Vec<OrbitingBody>,
}

impl OrbitingBody {
    pub fn new(key: BodyKey, record: BodyRecord, kinematics: Kinematics, primitives: BodyPrimitives) -> Self {
        let orbit_angle = wrap_angle(kinematics.initial_orbit_angle);
        let mut body = Self {
            key,
            record,
            archetype: None,
            kinematics,
            orbit_angle,
            rotation_angle: 0.0,
            center: DVec3::ZERO,
            position: DVec3::ZERO,
            primitives,
            atmosphere_scale: 1.0,
            moons: Vec::new(),
        };
        body.place(DVec3::ZERO);
        body
    }

    // -- Builder pattern --

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = Some(archetype);
        self
    }

    pub fn with_atmosphere_scale(mut self, scale: f64) -> Self {
        self.atmosphere_scale = scale;
        self
    }

    pub fn with_moons(mut self, moons: Vec<OrbitingBody>) -> Self {
        self.moons = moons;
        let position = self.position;
        for moon in &mut self.moons {
            moon.place(position);
        }
        self
    }

    // -- Accessors --

    pub fn key(&self) -> &BodyKey {
        &self.key
    }

    pub fn display_name(&self) -> &str {
        &self.record.name
    }

    pub fn category(&self) -> BodyCategory {
        self.record.category
    }

    pub fn record(&self) -> &BodyRecord {
        &self.record
    }

    pub fn archetype(&self) -> Option<&Archetype> {
        self.archetype.as_ref()
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn scaled_radius(&self) -> f64 {
        self.kinematics.scaled_radius
    }

    pub fn scaled_orbit_radius(&self) -> f64 {
        self.kinematics.scaled_orbit_radius
    }

    pub fn orbit_angle(&self) -> f64 {
        self.orbit_angle
    }

    pub fn rotation_angle(&self) -> f64 {
        self.rotation_angle
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn primitives(&self) -> &BodyPrimitives {
        &self.primitives
    }

    pub fn moons(&self) -> &[OrbitingBody] {
        &self.moons
    }

    /// Belts spin as a whole around the primary instead of orbiting it.
    pub fn is_belt(&self) -> bool {
        self.record.category == BodyCategory::AsteroidBelt
    }

    /// This body or one of its satellites.
    pub fn find(&self, key: &str) -> Option<&OrbitingBody> {
        if self.key.as_str() == key {
            return Some(self);
        }
        self.moons.iter().find_map(|m| m.find(key))
    }

    /// Key of the body (or satellite) owning `handle`.
    pub fn owner_of(&self, handle: PrimitiveHandle) -> Option<&BodyKey> {
        if self.primitives.handles().any(|h| h == handle) {
            return Some(&self.key);
        }
        self.moons.iter().find_map(|m| m.owner_of(handle))
    }

    /// Every handle owned by this body and its satellites.
    pub fn all_handles(&self) -> Vec<PrimitiveHandle> {
        let mut handles: Vec<_> = self.primitives.handles().collect();
        for moon in &self.moons {
            handles.extend(moon.all_handles());
        }
        handles
    }

    // -- Motion --

    /// Advance this body's own angles by `dt` seconds. Does not move satellites.
    pub fn advance(&mut self, dt: f64, speeds: SpeedMultipliers) {
        self.orbit_angle =
            wrap_angle(self.orbit_angle + self.kinematics.orbit_angular_speed * speeds.orbit * dt);
        self.rotation_angle =
            wrap_angle(self.rotation_angle + self.kinematics.rotation_angular_speed * speeds.rotation * dt);
    }

    /// Recompute the position around `center` from the current orbit angle.
    pub fn place(&mut self, center: DVec3) {
        self.center = center;
        self.position = if self.is_belt() {
            center
        } else {
            orbit_position(center, self.kinematics.scaled_orbit_radius, self.orbit_angle)
        };
    }

    /// Advance this body, place it around `center`, then advance its
    /// satellites around its new position.
    pub fn advance_tree(&mut self, dt: f64, speeds: SpeedMultipliers, center: DVec3) {
        self.advance(dt, speeds);
        self.place(center);
        let position = self.position;
        for moon in &mut self.moons {
            moon.advance_tree(dt, speeds, position);
        }
    }

    // -- Renderer sync --

    /// Push current transforms for this body and its satellites.
    pub fn sync<R: SceneRenderer>(&self, renderer: &mut R) {
        let tilt = DQuat::from_rotation_z(self.kinematics.axial_tilt_rad);
        let surface_rotation = if self.is_belt() {
            DQuat::from_rotation_y(self.orbit_angle)
        } else {
            tilt * DQuat::from_rotation_y(self.rotation_angle)
        };
        renderer.set_transform(
            self.primitives.surface,
            &Transform::at(self.position).with_rotation(surface_rotation),
        );
        if let Some(atmosphere) = self.primitives.atmosphere {
            let t = Transform {
                translation: self.position,
                rotation: tilt * DQuat::from_rotation_y(self.rotation_angle * 0.95),
                scale: self.atmosphere_scale,
            };
            renderer.set_transform(atmosphere, &t);
        }
        if let Some(ring) = self.primitives.ring {
            renderer.set_transform(ring, &Transform::at(self.position).with_rotation(tilt));
        }
        if let Some(path) = self.primitives.orbit_path {
            renderer.set_transform(path, &Transform::at(self.center));
        }
        for moon in &self.moons {
            moon.sync(renderer);
        }
    }

    /// Show or hide orbit paths for this body and its satellites.
    pub fn set_orbit_visible<R: SceneRenderer>(&self, renderer: &mut R, visible: bool) {
        if let Some(path) = self.primitives.orbit_path {
            renderer.set_visible(path, visible);
        }
        for moon in &self.moons {
            moon.set_orbit_visible(renderer, visible);
        }
    }

    /// Detach and release every primitive, satellites first.
    pub fn dispose<R: SceneRenderer>(self, renderer: &mut R) {
        for moon in self.moons {
            moon.dispose(renderer);
        }
        for handle in self.primitives.handles() {
            renderer.remove_from_scene(handle);
            renderer.dispose_primitive(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::material::Material;
    use crate::components::record::Distance;
    use crate::renderer::headless::HeadlessRenderer;
    use std::f64::consts::TAU;

    fn body(renderer: &mut HeadlessRenderer, key: &str, kinematics: Kinematics) -> OrbitingBody {
        let surface = renderer.create_sphere(kinematics.scaled_radius, &Material::default());
        renderer.add_to_scene(surface);
        let record = BodyRecord::new(key, BodyCategory::Terrestrial)
            .with_diameter(1000.0)
            .with_distance(Distance::Mkm(1.0));
        OrbitingBody::new(BodyKey::new(key), record, kinematics, BodyPrimitives::new(surface))
    }

    fn planet_kinematics() -> Kinematics {
        Kinematics {
            scaled_radius: 1.0,
            scaled_orbit_radius: 100.0,
            orbit_angular_speed: 0.5,
            rotation_angular_speed: -2.0,
            ..Default::default()
        }
    }

    #[test]
    fn angles_stay_wrapped_over_long_runs() {
        let mut r = HeadlessRenderer::new();
        let mut b = body(&mut r, "planet", planet_kinematics());
        for _ in 0..10_000 {
            b.advance(0.37, SpeedMultipliers::default());
            assert!((0.0..TAU).contains(&b.orbit_angle()));
            assert!((0.0..TAU).contains(&b.rotation_angle()));
        }
    }

    #[test]
    fn zero_speed_freezes_motion() {
        let mut r = HeadlessRenderer::new();
        let mut b = body(&mut r, "planet", planet_kinematics());
        let before = (b.orbit_angle(), b.rotation_angle());
        b.advance(5.0, SpeedMultipliers { orbit: 0.0, rotation: 0.0 });
        assert_eq!(before, (b.orbit_angle(), b.rotation_angle()));
    }

    #[test]
    fn position_stays_on_orbit() {
        let mut r = HeadlessRenderer::new();
        let mut b = body(&mut r, "planet", planet_kinematics());
        for _ in 0..100 {
            b.advance_tree(0.1, SpeedMultipliers::default(), DVec3::ZERO);
            assert!((b.position().length() - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn moon_follows_parent_post_tick_position() {
        let mut r = HeadlessRenderer::new();
        let moon = body(
            &mut r,
            "planet/moon",
            Kinematics {
                scaled_radius: 0.2,
                scaled_orbit_radius: 5.0,
                orbit_angular_speed: 3.0,
                ..Default::default()
            },
        );
        let mut planet = body(&mut r, "planet", planet_kinematics()).with_moons(vec![moon]);
        for _ in 0..50 {
            planet.advance_tree(0.05, SpeedMultipliers::default(), DVec3::ZERO);
            let moon = &planet.moons()[0];
            let separation = moon.position().distance(planet.position());
            assert!((separation - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn find_and_owner_descend_into_moons() {
        let mut r = HeadlessRenderer::new();
        let moon = body(&mut r, "earth/moon", planet_kinematics());
        let moon_surface = moon.primitives().surface;
        let earth = body(&mut r, "earth", planet_kinematics()).with_moons(vec![moon]);
        assert_eq!(earth.find("earth/moon").map(|m| m.key().as_str()), Some("earth/moon"));
        assert_eq!(earth.owner_of(moon_surface).map(BodyKey::as_str), Some("earth/moon"));
        assert_eq!(earth.all_handles().len(), 2);
    }

    #[test]
    fn sync_pushes_positions() {
        let mut r = HeadlessRenderer::new();
        let mut b = body(&mut r, "planet", planet_kinematics());
        b.advance_tree(1.0, SpeedMultipliers::default(), DVec3::ZERO);
        b.sync(&mut r);
        let p = r.primitive(b.primitives().surface).unwrap();
        assert_eq!(p.transform.translation, b.position());
    }

    #[test]
    fn dispose_releases_every_handle_once() {
        let mut r = HeadlessRenderer::new();
        let moon = body(&mut r, "planet/moon", planet_kinematics());
        let planet = body(&mut r, "planet", planet_kinematics()).with_moons(vec![moon]);
        planet.dispose(&mut r);
        assert_eq!(r.live_count(), 0);
        assert_eq!(r.disposed().len(), 2);
        assert!(r.invalid_disposals().is_empty());
    }
}
