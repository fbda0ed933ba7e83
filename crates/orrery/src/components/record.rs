use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::BodyKey;
use crate::components::material::Rgb;

/// Kilometres in one astronomical unit.
pub const KM_PER_AU: f64 = 149_597_870.0;
/// Mean radius of Earth in km, the unit exoplanet radii are given in.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Diameter of the Sun in km, the unit stellar radii are given in.
pub const SUN_DIAMETER_KM: f64 = 1_392_700.0;

/// Broad kind of a body. Drives fallback colors and how the factory builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyCategory {
    Star,
    Terrestrial,
    GasGiant,
    IceGiant,
    Moon,
    AsteroidBelt,
    Exoplanet,
}

impl BodyCategory {
    /// Flat color used when a body's texture is missing or fails to load.
    pub fn fallback_color(self) -> Rgb {
        match self {
            BodyCategory::Star => Rgb::from_hex(0xFDB813),
            BodyCategory::Terrestrial => Rgb::from_hex(0x9C8B7A),
            BodyCategory::GasGiant => Rgb::from_hex(0xD8CA9D),
            BodyCategory::IceGiant => Rgb::from_hex(0x7FC8E0),
            BodyCategory::Moon => Rgb::from_hex(0x888888),
            BodyCategory::AsteroidBelt => Rgb::from_hex(0x8B4513),
            BodyCategory::Exoplanet => Rgb::from_hex(0xB0B0B0),
        }
    }

    /// Whether bodies of this category orbit the primary.
    pub fn orbits_primary(self) -> bool {
        !matches!(self, BodyCategory::Star | BodyCategory::AsteroidBelt)
    }
}

/// A distance with its unit. Serialized as `{"km": 384400}`, `{"mkm": 149.6}` or `{"au": 1.0}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Km(f64),
    /// Millions of km, the working unit for orbital distances.
    Mkm(f64),
    Au(f64),
}

impl Distance {
    pub fn to_km(self) -> f64 {
        match self {
            Distance::Km(km) => km,
            Distance::Mkm(mkm) => mkm * 1.0e6,
            Distance::Au(au) => au * KM_PER_AU,
        }
    }

    pub fn to_million_km(self) -> f64 {
        match self {
            Distance::Km(km) => km / 1.0e6,
            Distance::Mkm(mkm) => mkm,
            Distance::Au(au) => au * KM_PER_AU / 1.0e6,
        }
    }

    pub fn to_au(self) -> f64 {
        match self {
            Distance::Au(au) => au,
            other => other.to_km() / KM_PER_AU,
        }
    }

    fn value(self) -> f64 {
        match self {
            Distance::Km(v) | Distance::Mkm(v) | Distance::Au(v) => v,
        }
    }
}

/// Planetary ring extents, measured in km from the body's center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSpec {
    pub inner_radius_km: f64,
    pub outer_radius_km: f64,
    #[serde(default)]
    pub texture: Option<String>,
}

/// Translucent shell drawn around a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtmosphereSpec {
    pub texture: Option<String>,
    /// Shell radius relative to the body. Clamped to [1.0, 1.2] when built.
    pub shell_scale: f64,
    pub opacity: f32,
}

impl Default for AtmosphereSpec {
    fn default() -> Self {
        Self {
            texture: None,
            shell_scale: 1.02,
            opacity: 0.3,
        }
    }
}

/// Radial extent of an asteroid belt around the primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeltSpec {
    pub inner: Distance,
    pub outer: Distance,
    #[serde(default)]
    pub particle_count: u32,
}

/// Satellites of a body: either just a count, or full records that get built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoonSpec {
    Count(u32),
    Detailed(Vec<BodyRecord>),
}

impl Default for MoonSpec {
    fn default() -> Self {
        MoonSpec::Count(0)
    }
}

impl MoonSpec {
    /// Records to build. A bare count builds nothing.
    pub fn records(&self) -> &[BodyRecord] {
        match self {
            MoonSpec::Count(_) => &[],
            MoonSpec::Detailed(records) => records,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            MoonSpec::Count(n) => *n as usize,
            MoonSpec::Detailed(records) => records.len(),
        }
    }
}

/// Survey measurements used to classify an exoplanet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExoplanetTraits {
    /// Radius in Earth radii.
    pub radius_earth: Option<f64>,
    /// Equilibrium temperature in K.
    pub equilibrium_temp_k: Option<f64>,
    /// Orbital semi-major axis in AU.
    pub semi_major_axis_au: Option<f64>,
}

/// Why a record was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("field `{field}` must be finite and non-zero, got {value}")]
    ZeroOrNonFinite { field: &'static str, value: f64 },

    #[error("ring outer radius {outer} km must exceed inner radius {inner} km")]
    RingRadii { inner: f64, outer: f64 },

    #[error("belt outer edge must lie beyond its inner edge")]
    BeltRadii,

    #[error("name has no characters usable in a key")]
    UnkeyableName,
}

/// Immutable description of a celestial body.
///
/// Numeric fields that a catalog may omit are optional here; `validate`
/// decides which ones a given category needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRecord {
    pub name: String,
    pub category: BodyCategory,
    #[serde(default)]
    pub diameter_km: Option<f64>,
    #[serde(default)]
    pub mass_kg: Option<f64>,
    /// Distance from the primary (planets) or from the parent (moons).
    #[serde(default)]
    pub distance: Option<Distance>,
    #[serde(default)]
    pub orbital_period_days: Option<f64>,
    /// Negative for retrograde spin.
    #[serde(default)]
    pub rotation_period_days: Option<f64>,
    #[serde(default)]
    pub axial_tilt_deg: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub texture: Option<String>,
    /// Orbit path color as 0xRRGGBB.
    #[serde(default)]
    pub orbit_color: Option<u32>,
    #[serde(default)]
    pub rings: Option<RingSpec>,
    #[serde(default)]
    pub atmosphere: Option<AtmosphereSpec>,
    #[serde(default)]
    pub moons: MoonSpec,
    #[serde(default)]
    pub belt: Option<BeltSpec>,
    #[serde(default)]
    pub exoplanet: Option<ExoplanetTraits>,
}

impl BodyRecord {
    pub fn new(name: impl Into<String>, category: BodyCategory) -> Self {
        Self {
            name: name.into(),
            category,
            diameter_km: None,
            mass_kg: None,
            distance: None,
            orbital_period_days: None,
            rotation_period_days: None,
            axial_tilt_deg: 0.0,
            eccentricity: 0.0,
            texture: None,
            orbit_color: None,
            rings: None,
            atmosphere: None,
            moons: MoonSpec::default(),
            belt: None,
            exoplanet: None,
        }
    }

    pub fn with_diameter(mut self, km: f64) -> Self {
        self.diameter_km = Some(km);
        self
    }

    pub fn with_mass(mut self, kg: f64) -> Self {
        self.mass_kg = Some(kg);
        self
    }

    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_orbital_period(mut self, days: f64) -> Self {
        self.orbital_period_days = Some(days);
        self
    }

    pub fn with_rotation_period(mut self, days: f64) -> Self {
        self.rotation_period_days = Some(days);
        self
    }

    pub fn with_axial_tilt(mut self, degrees: f64) -> Self {
        self.axial_tilt_deg = degrees;
        self
    }

    pub fn with_eccentricity(mut self, eccentricity: f64) -> Self {
        self.eccentricity = eccentricity;
        self
    }

    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_orbit_color(mut self, hex: u32) -> Self {
        self.orbit_color = Some(hex);
        self
    }

    pub fn with_rings(mut self, rings: RingSpec) -> Self {
        self.rings = Some(rings);
        self
    }

    pub fn with_atmosphere(mut self, atmosphere: AtmosphereSpec) -> Self {
        self.atmosphere = Some(atmosphere);
        self
    }

    pub fn with_moons(mut self, moons: Vec<BodyRecord>) -> Self {
        self.moons = MoonSpec::Detailed(moons);
        self
    }

    pub fn with_moon_count(mut self, count: u32) -> Self {
        self.moons = MoonSpec::Count(count);
        self
    }

    pub fn with_belt(mut self, belt: BeltSpec) -> Self {
        self.belt = Some(belt);
        self
    }

    pub fn with_exoplanet_traits(mut self, traits: ExoplanetTraits) -> Self {
        self.exoplanet = Some(traits);
        self
    }

    /// Check the fields this record's category needs. Satellites are not
    /// checked here; each is validated when it is built.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::MissingField("name"));
        }
        if BodyKey::from_name(&self.name).as_str().is_empty() {
            return Err(RecordError::UnkeyableName);
        }

        if self.category == BodyCategory::AsteroidBelt {
            let belt = self.belt.as_ref().ok_or(RecordError::MissingField("belt"))?;
            check_distance("belt.inner", Some(belt.inner), true)?;
            check_distance("belt.outer", Some(belt.outer), true)?;
            if belt.outer.to_million_km() <= belt.inner.to_million_km() {
                return Err(RecordError::BeltRadii);
            }
            return Ok(());
        }

        match self.diameter_km {
            None => return Err(RecordError::MissingField("diameterKm")),
            Some(d) if !d.is_finite() || d <= 0.0 => {
                return Err(RecordError::NotPositive { field: "diameterKm", value: d })
            }
            Some(_) => {}
        }

        check_distance("distance", self.distance, self.category != BodyCategory::Star)?;

        if let Some(p) = self.orbital_period_days {
            if !p.is_finite() || p == 0.0 {
                return Err(RecordError::ZeroOrNonFinite { field: "orbitalPeriodDays", value: p });
            }
        }
        if let Some(p) = self.rotation_period_days {
            if !p.is_finite() || p == 0.0 {
                return Err(RecordError::ZeroOrNonFinite { field: "rotationPeriodDays", value: p });
            }
        }
        if !self.axial_tilt_deg.is_finite() {
            return Err(RecordError::ZeroOrNonFinite {
                field: "axialTiltDeg",
                value: self.axial_tilt_deg,
            });
        }

        if let Some(rings) = &self.rings {
            let (inner, outer) = (rings.inner_radius_km, rings.outer_radius_km);
            if !inner.is_finite() || inner <= 0.0 {
                return Err(RecordError::NotPositive { field: "rings.innerRadiusKm", value: inner });
            }
            if !outer.is_finite() || outer <= inner {
                return Err(RecordError::RingRadii { inner, outer });
            }
        }

        if let Some(atmosphere) = &self.atmosphere {
            if !atmosphere.shell_scale.is_finite() {
                return Err(RecordError::ZeroOrNonFinite {
                    field: "atmosphere.shellScale",
                    value: atmosphere.shell_scale,
                });
            }
        }

        Ok(())
    }
}

fn check_distance(
    field: &'static str,
    distance: Option<Distance>,
    required: bool,
) -> Result<(), RecordError> {
    match distance {
        None if required => Err(RecordError::MissingField(field)),
        None => Ok(()),
        Some(d) if !d.value().is_finite() || d.value() < 0.0 => {
            Err(RecordError::NotPositive { field, value: d.value() })
        }
        Some(d) if required && d.value() == 0.0 => {
            Err(RecordError::NotPositive { field, value: 0.0 })
        }
        Some(_) => Ok(()),
    }
}

/// A named set of records that make up one planetary system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub name: String,
    pub records: Vec<BodyRecord>,
}

impl StarSystem {
    pub fn new(name: impl Into<String>, records: Vec<BodyRecord>) -> Self {
        Self { name: name.into(), records }
    }

    /// The first star record, if any. Its scene radius offsets exoplanet orbits.
    pub fn primary(&self) -> Option<&BodyRecord> {
        self.records.iter().find(|r| r.category == BodyCategory::Star)
    }
}
