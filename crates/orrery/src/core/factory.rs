//! Turns records into live bodies under a scale profile.

use std::cell::RefCell;

use crate::api::error::{EngineError, EngineResult};
use crate::api::types::{BodyKey, PrimitiveHandle};
use crate::assets::loader::TextureLoader;
use crate::assets::manifest::TextureManifest;
use crate::assets::registry::TextureRegistry;
use crate::components::body::{BodyPrimitives, Kinematics, OrbitingBody};
use crate::components::material::{Material, Rgb};
use crate::components::record::{BodyCategory, BodyRecord};
use crate::renderer::traits::SceneRenderer;
use crate::systems::classification::{Archetype, ClassificationEngine};
use crate::systems::motion::{sibling_angle, MotionTuning};
use crate::systems::rng::Rng;
use crate::systems::scale::ScaleProfile;

const ORBIT_PATH_COLOR: u32 = 0x444444;
const MOON_ORBIT_PATH_COLOR: u32 = 0x666666;
const ATMOSPHERE_COLOR: u32 = 0x87CEEB;
const ATMOSPHERE_SHELL_MIN: f64 = 1.0;
const ATMOSPHERE_SHELL_MAX: f64 = 1.2;

/// Where a new body sits among its siblings and what it orbits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitPlacement {
    /// `(index, count)` among siblings built in the same pass. `None` picks a random angle.
    pub slot: Option<(usize, usize)>,
    /// Scene radius of the host star. Exoplanet orbits start at its surface.
    pub host_radius: f64,
}

impl OrbitPlacement {
    pub fn sibling(index: usize, count: usize) -> Self {
        Self {
            slot: Some((index, count)),
            host_radius: 0.0,
        }
    }

    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn around_host(mut self, host_radius: f64) -> Self {
        self.host_radius = host_radius;
        self
    }
}

/// A built body plus the satellites that were rejected while building it.
#[derive(Debug)]
pub struct BuiltBody {
    pub body: OrbitingBody,
    pub rejected: Vec<EngineError>,
}

pub struct BodyFactory<L: TextureLoader> {
    loader: L,
    manifest: TextureManifest,
    classifier: ClassificationEngine,
    motion: MotionTuning,
    moon_distance_divisor: f64,
    textures: RefCell<TextureRegistry>,
    rng: RefCell<Rng>,
}

impl<L: TextureLoader> BodyFactory<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            manifest: TextureManifest::default(),
            classifier: ClassificationEngine::builtin(),
            motion: MotionTuning::default(),
            moon_distance_divisor: 10_000.0,
            textures: RefCell::new(TextureRegistry::new()),
            rng: RefCell::new(Rng::new(42)),
        }
    }

    pub fn with_manifest(mut self, manifest: TextureManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassificationEngine) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_motion(mut self, motion: MotionTuning) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_moon_distance_divisor(mut self, divisor: f64) -> Self {
        if divisor.is_finite() && divisor > 0.0 {
            self.moon_distance_divisor = divisor;
        }
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.rng.replace(Rng::new(seed));
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn classifier(&self) -> &ClassificationEngine {
        &self.classifier
    }

    pub fn motion(&self) -> &MotionTuning {
        &self.motion
    }

    /// Number of distinct textures loaded so far.
    pub fn cached_textures(&self) -> usize {
        self.textures.borrow().len()
    }

    /// Build one body and its satellites. Fails only if the record itself is
    /// invalid; texture failures fall back to flat colors and invalid
    /// satellites are skipped and reported in [`BuiltBody::rejected`].
    pub async fn build_body<R: SceneRenderer>(
        &self,
        record: &BodyRecord,
        profile: &ScaleProfile,
        placement: OrbitPlacement,
        renderer: &mut R,
    ) -> EngineResult<BuiltBody> {
        record.validate().map_err(|reason| EngineError::InvalidRecord {
            name: record.name.clone(),
            reason,
        })?;
        let key = BodyKey::from_name(&record.name);

        if record.category == BodyCategory::AsteroidBelt {
            let body = self.build_belt(key, record, profile, renderer).await;
            return Ok(BuiltBody { body, rejected: Vec::new() });
        }

        let archetype = (record.category == BodyCategory::Exoplanet).then(|| self.classifier.classify(record));
        let kinematics = self.primary_kinematics(record, profile, placement, archetype.as_ref());

        let (texture, fallback) = match &archetype {
            Some(a) => {
                let frame = placement.slot.map_or(0, |(index, _)| index);
                (a.textures.frame(frame).map(str::to_string), Rgb::from_hex(a.color))
            }
            None => (record.texture.clone(), record.category.fallback_color()),
        };
        let mut material = self.material_for(texture.as_deref(), fallback).await;
        if record.category == BodyCategory::Star {
            material = material.with_emissive(1.0);
        }

        let surface = attach(renderer, |r| r.create_sphere(kinematics.scaled_radius, &material));
        let mut primitives = BodyPrimitives::new(surface);

        if kinematics.scaled_orbit_radius > 0.0 {
            let color = match &archetype {
                Some(a) => Rgb::from_hex(a.color),
                None => Rgb::from_hex(record.orbit_color.unwrap_or(ORBIT_PATH_COLOR)),
            };
            primitives.orbit_path =
                Some(attach(renderer, |r| r.create_orbit_path(kinematics.scaled_orbit_radius, color)));
        }

        let mut atmosphere_scale = 1.0;
        if let Some(atmosphere) = &record.atmosphere {
            atmosphere_scale = atmosphere.shell_scale.clamp(ATMOSPHERE_SHELL_MIN, ATMOSPHERE_SHELL_MAX);
            let fallback = if record.category == BodyCategory::Star {
                record.category.fallback_color()
            } else {
                Rgb::from_hex(ATMOSPHERE_COLOR)
            };
            let material = self
                .material_for(atmosphere.texture.as_deref(), fallback)
                .await
                .with_opacity(atmosphere.opacity)
                .double_sided();
            primitives.atmosphere =
                Some(attach(renderer, |r| r.create_sphere(kinematics.scaled_radius, &material)));
        }

        if let Some(rings) = &record.rings {
            let material = self
                .material_for(rings.texture.as_deref(), record.category.fallback_color())
                .await
                .with_opacity(0.8)
                .double_sided();
            let (inner, outer) = (
                profile.scaled_size_km(rings.inner_radius_km),
                profile.scaled_size_km(rings.outer_radius_km),
            );
            primitives.ring = Some(attach(renderer, |r| r.create_ring(inner, outer, &material)));
        }

        let mut rejected = Vec::new();
        let moon_records = record.moons.records();
        let mut moons: Vec<OrbitingBody> = Vec::with_capacity(moon_records.len());
        for (index, moon) in moon_records.iter().enumerate() {
            let moon_key = key.child(&moon.name);
            if moons.iter().any(|m| *m.key() == moon_key) {
                log::warn!("Skipping moon of {}: key {} already used", record.name, moon_key);
                rejected.push(EngineError::DuplicateKey {
                    name: moon.name.clone(),
                    key: moon_key.as_str().to_string(),
                });
                continue;
            }
            match self
                .build_moon(&key, kinematics.scaled_radius, moon, (index, moon_records.len()), profile, renderer)
                .await
            {
                Ok(body) => moons.push(body),
                Err(err) => {
                    log::warn!("Skipping moon of {}: {}", record.name, err);
                    rejected.push(err);
                }
            }
        }

        let mut body = OrbitingBody::new(key, record.clone(), kinematics, primitives)
            .with_atmosphere_scale(atmosphere_scale)
            .with_moons(moons);
        if let Some(archetype) = archetype {
            log::debug!(
                "{} classified as {} ({:.2})",
                record.name,
                archetype.key,
                archetype.match_confidence
            );
            body = body.with_archetype(archetype);
        }
        body.sync(renderer);
        Ok(BuiltBody { body, rejected })
    }

    fn primary_kinematics(
        &self,
        record: &BodyRecord,
        profile: &ScaleProfile,
        placement: OrbitPlacement,
        archetype: Option<&Archetype>,
    ) -> Kinematics {
        let scaled_radius = profile.scaled_radius(record.diameter_km.unwrap_or(0.0));
        let rotation_angular_speed = self.motion.rotation_angular_speed(record.rotation_period_days);
        let axial_tilt_rad = record.axial_tilt_deg.to_radians();
        if record.category == BodyCategory::Star {
            return Kinematics {
                scaled_radius,
                rotation_angular_speed,
                axial_tilt_rad,
                ..Default::default()
            };
        }

        let distance = record.distance.map_or(0.0, |d| d.to_million_km());
        let mut scaled_orbit_radius = profile.scaled_distance(distance);
        if archetype.is_some() {
            scaled_orbit_radius += placement.host_radius;
        }
        let distance_au = record.distance.map_or(0.0, |d| d.to_au());
        Kinematics {
            scaled_radius,
            scaled_orbit_radius,
            orbit_angular_speed: self.motion.orbit_angular_speed(distance_au),
            rotation_angular_speed,
            initial_orbit_angle: self.initial_angle(placement.slot),
            axial_tilt_rad,
        }
    }

    async fn build_belt<R: SceneRenderer>(
        &self,
        key: BodyKey,
        record: &BodyRecord,
        profile: &ScaleProfile,
        renderer: &mut R,
    ) -> OrbitingBody {
        let (inner, outer) = match &record.belt {
            Some(belt) => (
                profile.scaled_distance(belt.inner.to_million_km()),
                profile.scaled_distance(belt.outer.to_million_km()),
            ),
            None => (0.0, 0.0),
        };
        let material = self
            .material_for(record.texture.as_deref(), record.category.fallback_color())
            .await
            .with_opacity(0.6)
            .double_sided();
        let surface = attach(renderer, |r| r.create_ring(inner, outer, &material));
        let kinematics = Kinematics {
            scaled_radius: (outer - inner) / 2.0,
            scaled_orbit_radius: (inner + outer) / 2.0,
            orbit_angular_speed: self.motion.belt_speed,
            ..Default::default()
        };
        let body = OrbitingBody::new(key, record.clone(), kinematics, BodyPrimitives::new(surface));
        body.sync(renderer);
        body
    }

    async fn build_moon<R: SceneRenderer>(
        &self,
        parent: &BodyKey,
        parent_radius: f64,
        record: &BodyRecord,
        slot: (usize, usize),
        profile: &ScaleProfile,
        renderer: &mut R,
    ) -> EngineResult<OrbitingBody> {
        record.validate().map_err(|reason| EngineError::InvalidRecord {
            name: record.name.clone(),
            reason,
        })?;
        if !record.moons.records().is_empty() {
            log::debug!("Ignoring satellites of moon {}", record.name);
        }

        let scaled_radius = profile.scaled_radius(record.diameter_km.unwrap_or(0.0));
        let distance_km = record.distance.map_or(0.0, |d| d.to_km());
        let scaled_orbit_radius =
            parent_radius + distance_km * profile.distance_factor / self.moon_distance_divisor;
        let orbit_angular_speed = self.motion.moon_angular_speed(record.orbital_period_days);
        // Without a rotation period a moon is tidally locked.
        let rotation_angular_speed = match record.rotation_period_days {
            Some(_) => self.motion.rotation_angular_speed(record.rotation_period_days),
            None => orbit_angular_speed,
        };
        let kinematics = Kinematics {
            scaled_radius,
            scaled_orbit_radius,
            orbit_angular_speed,
            rotation_angular_speed,
            initial_orbit_angle: self.initial_angle(Some(slot)),
            axial_tilt_rad: record.axial_tilt_deg.to_radians(),
        };

        let material = self
            .material_for(record.texture.as_deref(), BodyCategory::Moon.fallback_color())
            .await;
        let surface = attach(renderer, |r| r.create_sphere(scaled_radius, &material));
        let mut primitives = BodyPrimitives::new(surface);
        primitives.orbit_path = Some(attach(renderer, |r| {
            r.create_orbit_path(scaled_orbit_radius, Rgb::from_hex(MOON_ORBIT_PATH_COLOR))
        }));

        Ok(OrbitingBody::new(parent.child(&record.name), record.clone(), kinematics, primitives))
    }

    fn initial_angle(&self, slot: Option<(usize, usize)>) -> f64 {
        match slot {
            Some((index, count)) => sibling_angle(index, count),
            None => self.rng.borrow_mut().next_angle(),
        }
    }

    /// Textured material if the reference loads, flat `fallback` otherwise.
    async fn material_for(&self, texture: Option<&str>, fallback: Rgb) -> Material {
        let Some(reference) = texture else {
            return Material::flat(fallback);
        };
        let path = self.manifest.resolve(reference);
        let cached = self.textures.borrow().get(&path);
        if let Some(handle) = cached {
            return Material::textured(handle);
        }
        match self.loader.load(&path).await {
            Ok(handle) => {
                self.textures.borrow_mut().insert(path, handle);
                Material::textured(handle)
            }
            Err(err) => {
                log::warn!("Texture unavailable, using fallback color: {}", err);
                Material::flat(fallback)
            }
        }
    }
}

/// Create a primitive and add it to the scene.
fn attach<R: SceneRenderer>(renderer: &mut R, create: impl FnOnce(&mut R) -> PrimitiveHandle) -> PrimitiveHandle {
    let handle = create(renderer);
    renderer.add_to_scene(handle);
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::loader::MemoryTextureLoader;
    use crate::components::material::Surface;
    use crate::components::record::{AtmosphereSpec, BeltSpec, Distance, ExoplanetTraits, RingSpec};
    use crate::renderer::headless::{HeadlessRenderer, PrimitiveShape};
    use crate::systems::scale::{resolve_scale, ScaleMode};
    use futures::executor::block_on;

    fn earth() -> BodyRecord {
        BodyRecord::new("Earth", BodyCategory::Terrestrial)
            .with_diameter(12_756.0)
            .with_distance(Distance::Mkm(149.598))
            .with_rotation_period(0.997_269_68)
            .with_axial_tilt(23.44)
            .with_texture("images/earth_daymap.jpg")
            .with_atmosphere(AtmosphereSpec {
                texture: Some("images/earth_atmosphere.jpg".into()),
                shell_scale: 1.5,
                opacity: 0.3,
            })
            .with_moons(vec![BodyRecord::new("Moon", BodyCategory::Moon)
                .with_diameter(3474.0)
                .with_distance(Distance::Km(384_400.0))
                .with_orbital_period(27.32)])
    }

    #[test]
    fn earth_in_visual_mode() {
        let factory = BodyFactory::new(MemoryTextureLoader::new().with_texture("images/earth_daymap.jpg"));
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::VisualUnit);
        let built = block_on(factory.build_body(&earth(), &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();
        let body = built.body;

        assert_eq!(body.key().as_str(), "earth");
        assert!((body.scaled_orbit_radius() - 14.9598).abs() < 1e-9);
        assert!((body.scaled_radius() - 637.8).abs() < 1e-9);
        assert!(body.primitives().orbit_path.is_some());
        assert!(body.primitives().atmosphere.is_some());

        let moon = &body.moons()[0];
        assert_eq!(moon.key().as_str(), "earth/moon");
        let expected = 637.8 + 384_400.0 * 0.1 / 10_000.0;
        assert!((moon.scaled_orbit_radius() - expected).abs() < 1e-9);
        assert!((moon.position().distance(body.position()) - expected).abs() < 1e-9);
    }

    #[test]
    fn missing_texture_falls_back_to_category_color() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Educational);
        let built = block_on(factory.build_body(&earth(), &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();

        let surface = r.primitive(built.body.primitives().surface).unwrap();
        let material = surface.material.unwrap();
        assert_eq!(material.surface, Surface::Color(BodyCategory::Terrestrial.fallback_color()));
        assert_eq!(factory.cached_textures(), 0);
    }

    #[test]
    fn atmosphere_shell_is_clamped() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Educational);
        let built = block_on(factory.build_body(&earth(), &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();
        built.body.sync(&mut r);
        let atmosphere = built.body.primitives().atmosphere.unwrap();
        assert_eq!(r.primitive(atmosphere).unwrap().transform.scale, 1.2);
    }

    #[test]
    fn textures_are_cached_across_builds() {
        let factory = BodyFactory::new(MemoryTextureLoader::new().with_texture("images/earth_daymap.jpg"));
        let mut r = HeadlessRenderer::new();
        for mode in [ScaleMode::Educational, ScaleMode::Realistic] {
            let profile = resolve_scale(mode);
            block_on(factory.build_body(&earth(), &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();
        }
        let earth_loads = factory
            .loader()
            .requests()
            .iter()
            .filter(|p| p.as_str() == "images/earth_daymap.jpg")
            .count();
        assert_eq!(earth_loads, 1);
    }

    #[test]
    fn invalid_record_creates_nothing() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Educational);
        let record = BodyRecord::new("Vulcan", BodyCategory::Terrestrial).with_distance(Distance::Mkm(20.0));
        let err = block_on(factory.build_body(&record, &profile, OrbitPlacement::standalone(), &mut r)).unwrap_err();
        assert_eq!(err.record_name(), Some("Vulcan"));
        assert_eq!(r.created_count(), 0);
    }

    #[test]
    fn bad_moon_is_skipped_not_fatal() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Educational);
        let record = BodyRecord::new("Mars", BodyCategory::Terrestrial)
            .with_diameter(6792.0)
            .with_distance(Distance::Mkm(227.92))
            .with_moons(vec![
                BodyRecord::new("Phobos", BodyCategory::Moon)
                    .with_diameter(22.4)
                    .with_distance(Distance::Km(9376.0)),
                BodyRecord::new("Ghost", BodyCategory::Moon).with_distance(Distance::Km(1.0)),
            ]);
        let built = block_on(factory.build_body(&record, &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();
        assert_eq!(built.body.moons().len(), 1);
        assert_eq!(built.rejected.len(), 1);
        assert_eq!(built.rejected[0].record_name(), Some("Ghost"));
    }

    #[test]
    fn moons_sharing_a_key_keep_the_first() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Educational);
        let record = earth().with_moons(vec![
            BodyRecord::new("Luna", BodyCategory::Moon)
                .with_diameter(3474.0)
                .with_distance(Distance::Km(384_400.0)),
            BodyRecord::new("luna", BodyCategory::Moon)
                .with_diameter(100.0)
                .with_distance(Distance::Km(500_000.0)),
        ]);
        let built = block_on(factory.build_body(&record, &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();

        assert_eq!(built.body.moons().len(), 1);
        assert_eq!(built.body.moons()[0].display_name(), "Luna");
        assert_eq!(built.rejected.len(), 1);
        assert_eq!(built.rejected[0].record_name(), Some("luna"));
        assert!(matches!(&built.rejected[0], EngineError::DuplicateKey { key, .. } if key == "earth/luna"));
        // the rejected moon never reached the renderer
        assert_eq!(r.created_count(), built.body.all_handles().len());
    }

    #[test]
    fn rings_use_size_scale() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::SemiRealistic);
        let saturn = BodyRecord::new("Saturn", BodyCategory::GasGiant)
            .with_diameter(120_536.0)
            .with_distance(Distance::Mkm(1432.04))
            .with_rings(RingSpec {
                inner_radius_km: 7000.0,
                outer_radius_km: 80_000.0,
                texture: None,
            });
        let built = block_on(factory.build_body(&saturn, &profile, OrbitPlacement::sibling(0, 1), &mut r)).unwrap();
        let ring = r.primitive(built.body.primitives().ring.unwrap()).unwrap();
        assert_eq!(
            ring.shape,
            PrimitiveShape::Ring { inner_radius: 7000.0, outer_radius: 80_000.0 }
        );
    }

    #[test]
    fn exoplanet_orbit_starts_at_star_surface() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Educational);
        let record = BodyRecord::new("Kepler-22 b", BodyCategory::Exoplanet)
            .with_diameter(2.0 * 6371.0 * 2.4)
            .with_distance(Distance::Au(0.85))
            .with_exoplanet_traits(ExoplanetTraits {
                radius_earth: Some(2.4),
                equilibrium_temp_k: Some(262.0),
                semi_major_axis_au: Some(0.85),
            });
        let placement = OrbitPlacement::sibling(0, 1).around_host(50.0);
        let built = block_on(factory.build_body(&record, &profile, placement, &mut r)).unwrap();
        let expected = profile.scaled_distance(Distance::Au(0.85).to_million_km()) + 50.0;
        assert!((built.body.scaled_orbit_radius() - expected).abs() < 1e-9);
        assert!(built.body.archetype().is_some());
    }

    #[test]
    fn belt_is_a_ring_around_the_primary() {
        let factory = BodyFactory::new(MemoryTextureLoader::new());
        let mut r = HeadlessRenderer::new();
        let profile = resolve_scale(ScaleMode::Realistic);
        let belt = BodyRecord::new("Main Asteroid Belt", BodyCategory::AsteroidBelt).with_belt(BeltSpec {
            inner: Distance::Au(2.2),
            outer: Distance::Au(3.2),
            particle_count: 1000,
        });
        let built = block_on(factory.build_body(&belt, &profile, OrbitPlacement::standalone(), &mut r)).unwrap();
        assert!(built.body.is_belt());
        assert_eq!(built.body.position(), glam::DVec3::ZERO);
        let ring = r.primitive(built.body.primitives().surface).unwrap();
        assert!(matches!(ring.shape, PrimitiveShape::Ring { .. }));
    }

    #[test]
    fn standalone_angles_follow_seed() {
        let build = |seed| {
            let factory = BodyFactory::new(MemoryTextureLoader::new()).with_seed(seed);
            let mut r = HeadlessRenderer::new();
            let profile = resolve_scale(ScaleMode::Educational);
            let record = BodyRecord::new("Ceres", BodyCategory::Terrestrial)
                .with_diameter(939.0)
                .with_distance(Distance::Au(2.77));
            block_on(factory.build_body(&record, &profile, OrbitPlacement::standalone(), &mut r))
                .unwrap()
                .body
                .orbit_angle()
        };
        assert_eq!(build(7).to_bits(), build(7).to_bits());
    }
}
