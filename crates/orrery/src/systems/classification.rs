//! Exoplanet archetype classification.
//!
//! Each archetype declares intervals for radius (Earth radii), equilibrium
//! temperature (K) and orbital distance (AU). A planet qualifies for an
//! archetype only if all three measurements fall inside; qualifying
//! archetypes are scored by closeness to the interval midpoints and the best
//! score wins. Ties keep the earlier catalog entry.

use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, EngineResult};
use crate::components::record::{BodyRecord, EARTH_RADIUS_KM};

/// Confidence reported when any measurement is missing.
pub const MISSING_DATA_CONFIDENCE: f64 = 0.0;
/// Confidence reported when measurements exist but no archetype qualifies.
pub const NO_MATCH_CONFIDENCE: f64 = 0.1;

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// `1 - |x - mid| / width`. 1.0 at the midpoint, 0.5 at either edge.
    pub fn closeness(&self, x: f64) -> f64 {
        let width = self.max - self.min;
        if width <= 0.0 {
            return 1.0;
        }
        1.0 - (x - self.midpoint()).abs() / width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeCriteria {
    pub radius: Interval,
    pub temperature: Interval,
    pub distance: Interval,
}

/// Texture frames available for an archetype, plus an optional atlas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureSet {
    #[serde(default)]
    pub atlas: Option<String>,
    #[serde(default)]
    pub frames: Vec<String>,
}

impl TextureSet {
    /// Frame for the `index`th planet using this archetype, cycling through the set.
    pub fn frame(&self, index: usize) -> Option<&str> {
        if self.frames.is_empty() {
            return None;
        }
        Some(self.frames[index % self.frames.len()].as_str())
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeDef {
    pub key: String,
    pub name: String,
    pub display_category: String,
    /// Orbit color as 0xRRGGBB.
    pub color: u32,
    pub criteria: ArchetypeCriteria,
    #[serde(default)]
    pub textures: TextureSet,
}

/// Result of classifying one planet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    pub key: String,
    pub name: String,
    pub display_category: String,
    pub color: u32,
    pub textures: TextureSet,
    pub match_confidence: f64,
}

impl Archetype {
    fn from_def(def: &ArchetypeDef, match_confidence: f64) -> Self {
        Self {
            key: def.key.clone(),
            name: def.name.clone(),
            display_category: def.display_category.clone(),
            color: def.color,
            textures: def.textures.clone(),
            match_confidence,
        }
    }
}

/// Relative weight of each measurement in the score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub radius: f64,
    pub temperature: f64,
    pub distance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            radius: 0.4,
            temperature: 0.3,
            distance: 0.3,
        }
    }
}

impl ScoreWeights {
    fn sum(&self) -> f64 {
        self.radius + self.temperature + self.distance
    }
}

/// The three measurements classification needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanetTraits {
    pub radius_earth: Option<f64>,
    pub temperature_k: Option<f64>,
    pub distance_au: Option<f64>,
}

impl PlanetTraits {
    /// Gather traits from a record, falling back to its diameter and distance
    /// when the survey fields are absent.
    pub fn from_record(record: &BodyRecord) -> Self {
        let survey = record.exoplanet.clone().unwrap_or_default();
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Self {
            radius_earth: finite(survey.radius_earth)
                .or_else(|| finite(record.diameter_km).map(|d| d / 2.0 / EARTH_RADIUS_KM)),
            temperature_k: finite(survey.equilibrium_temp_k),
            distance_au: finite(survey.semi_major_axis_au)
                .or_else(|| finite(record.distance.map(|d| d.to_au()))),
        }
    }
}

/// Catalog document accepted by [`ClassificationEngine::from_json`].
#[derive(Debug, Deserialize)]
struct CatalogFile {
    fallback: String,
    #[serde(default)]
    weights: Option<ScoreWeights>,
    archetypes: Vec<ArchetypeDef>,
}

pub struct ClassificationEngine {
    catalog: Vec<ArchetypeDef>,
    fallback: usize,
    weights: ScoreWeights,
}

impl ClassificationEngine {
    pub fn new(catalog: Vec<ArchetypeDef>, fallback_key: &str, weights: ScoreWeights) -> EngineResult<Self> {
        if (weights.sum() - 1.0).abs() > 1e-9 {
            return Err(EngineError::InvalidCatalog(format!(
                "weights sum to {}, expected 1",
                weights.sum()
            )));
        }
        if let Some(bad) = catalog.iter().find(|d| !criteria_ordered(&d.criteria)) {
            return Err(EngineError::InvalidCatalog(format!(
                "archetype '{}' has an interval with min > max",
                bad.key
            )));
        }
        let fallback = catalog
            .iter()
            .position(|d| d.key == fallback_key)
            .ok_or_else(|| {
                EngineError::InvalidCatalog(format!("fallback archetype '{fallback_key}' not in catalog"))
            })?;
        Ok(Self { catalog, fallback, weights })
    }

    /// The built-in twelve-archetype catalog with `barren` as fallback.
    pub fn builtin() -> Self {
        Self {
            catalog: builtin_catalog(),
            fallback: BUILTIN_FALLBACK,
            weights: ScoreWeights::default(),
        }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let engine = Self::new(file.archetypes, &file.fallback, file.weights.unwrap_or_default())?;
        log::info!("Archetype catalog loaded: {} entries", engine.catalog.len());
        Ok(engine)
    }

    pub fn catalog(&self) -> &[ArchetypeDef] {
        &self.catalog
    }

    pub fn fallback(&self) -> &ArchetypeDef {
        &self.catalog[self.fallback]
    }

    pub fn get(&self, key: &str) -> Option<&ArchetypeDef> {
        self.catalog.iter().find(|d| d.key == key)
    }

    /// Weighted score of `traits` against one archetype, or 0.0 if any
    /// measurement falls outside its interval.
    pub fn score(&self, def: &ArchetypeDef, radius: f64, temperature: f64, distance: f64) -> f64 {
        let c = &def.criteria;
        if !(c.radius.contains(radius) && c.temperature.contains(temperature) && c.distance.contains(distance)) {
            return 0.0;
        }
        self.weights.radius * c.radius.closeness(radius)
            + self.weights.temperature * c.temperature.closeness(temperature)
            + self.weights.distance * c.distance.closeness(distance)
    }

    pub fn classify(&self, record: &BodyRecord) -> Archetype {
        self.classify_traits(PlanetTraits::from_record(record))
    }

    /// Total: always returns an archetype.
    pub fn classify_traits(&self, traits: PlanetTraits) -> Archetype {
        let (Some(radius), Some(temperature), Some(distance)) =
            (traits.radius_earth, traits.temperature_k, traits.distance_au)
        else {
            return Archetype::from_def(self.fallback(), MISSING_DATA_CONFIDENCE);
        };

        let mut best: Option<(&ArchetypeDef, f64)> = None;
        for def in &self.catalog {
            let score = self.score(def, radius, temperature, distance);
            if score > 0.0 && best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((def, score));
            }
        }

        match best {
            Some((def, score)) => Archetype::from_def(def, score),
            None => Archetype::from_def(self.fallback(), NO_MATCH_CONFIDENCE),
        }
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

fn criteria_ordered(c: &ArchetypeCriteria) -> bool {
    [c.radius, c.temperature, c.distance]
        .iter()
        .all(|i| i.min.is_finite() && i.max.is_finite() && i.min <= i.max)
}

// ── Built-in catalog ──────────────────────────────────────────────

const BUILTIN_FALLBACK: usize = 8;

#[allow(clippy::too_many_arguments)]
fn archetype(
    key: &str,
    name: &str,
    display_category: &str,
    color: u32,
    radius: (f64, f64),
    temperature: (f64, f64),
    distance: (f64, f64),
    frames: usize,
) -> ArchetypeDef {
    let dir = format!("images/textures_exoplanet/{name}");
    ArchetypeDef {
        key: key.to_string(),
        name: name.to_string(),
        display_category: display_category.to_string(),
        color,
        criteria: ArchetypeCriteria {
            radius: Interval::new(radius.0, radius.1),
            temperature: Interval::new(temperature.0, temperature.1),
            distance: Interval::new(distance.0, distance.1),
        },
        textures: TextureSet {
            atlas: Some(format!("{dir}/{name}_atlas.png")),
            frames: (1..=frames).map(|i| format!("{dir}/{name}{i:02}.png")).collect(),
        },
    }
}

/// Catalog order matters: earlier entries win ties.
pub fn builtin_catalog() -> Vec<ArchetypeDef> {
    vec![
        archetype("grassland", "Grassland", "terrestrial", 0x7CFC00, (0.8, 1.5), (250.0, 320.0), (0.8, 1.2), 5),
        archetype("jungle", "Jungle", "terrestrial", 0x228B22, (0.9, 1.8), (280.0, 330.0), (0.7, 1.1), 5),
        archetype("snowy", "Snowy", "terrestrial", 0xE0FFFF, (0.5, 2.0), (150.0, 250.0), (1.5, 5.0), 5),
        archetype("tundra", "Tundra", "terrestrial", 0x87CEEB, (0.7, 1.3), (200.0, 270.0), (1.2, 2.5), 5),
        archetype("arid", "Arid", "arid", 0xD2691E, (0.6, 1.4), (300.0, 400.0), (0.4, 0.8), 5),
        archetype("sandy", "Sandy", "arid", 0xF4A460, (0.8, 1.6), (280.0, 380.0), (0.5, 0.9), 5),
        archetype("dusty", "Dusty", "arid", 0xC0C0C0, (0.7, 1.2), (200.0, 350.0), (0.6, 2.0), 5),
        archetype("martian", "Martian", "extreme", 0xFF4500, (0.4, 0.8), (180.0, 280.0), (1.0, 2.5), 5),
        archetype("barren", "Barren", "extreme", 0x696969, (0.3, 1.0), (100.0, 500.0), (0.1, 10.0), 5),
        archetype("marshy", "Marshy", "terrestrial", 0x556B2F, (1.0, 2.2), (260.0, 310.0), (0.8, 1.3), 5),
        archetype("gaseous", "Gaseous", "gas_giant", 0xFFA500, (3.0, 20.0), (50.0, 2000.0), (0.1, 30.0), 10),
        archetype("methane", "Methane", "gas_giant", 0x4169E1, (2.5, 15.0), (50.0, 150.0), (5.0, 50.0), 5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::record::{BodyCategory, Distance, ExoplanetTraits};

    fn traits(r: f64, t: f64, d: f64) -> PlanetTraits {
        PlanetTraits {
            radius_earth: Some(r),
            temperature_k: Some(t),
            distance_au: Some(d),
        }
    }

    #[test]
    fn builtin_fallback_is_barren() {
        let engine = ClassificationEngine::builtin();
        assert_eq!(engine.fallback().key, "barren");
        assert_eq!(engine.catalog().len(), 12);
    }

    #[test]
    fn earth_like_planet_scores_grassland() {
        let engine = ClassificationEngine::builtin();
        let grassland = engine.get("grassland").unwrap();
        assert!(engine.score(grassland, 1.0, 288.0, 1.0) > 0.0);
        assert_eq!(engine.score(grassland, 1.0, 1000.0, 1.0), 0.0);
    }

    #[test]
    fn score_is_one_at_midpoints() {
        let engine = ClassificationEngine::builtin();
        let grassland = engine.get("grassland").unwrap();
        let score = engine.score(grassland, 1.15, 285.0, 1.0);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn best_score_wins() {
        let engine = ClassificationEngine::builtin();
        let result = engine.classify_traits(traits(1.0, 288.0, 1.0));
        // several archetypes qualify; grassland is closest to its midpoints
        assert_eq!(result.key, "grassland");
        assert!(result.match_confidence > 0.5);
    }

    #[test]
    fn hot_giant_is_gaseous() {
        let engine = ClassificationEngine::builtin();
        let result = engine.classify_traits(traits(11.0, 1400.0, 0.05 + 1.0));
        assert_eq!(result.key, "gaseous");
        assert_eq!(result.textures.frames.len(), 10);
    }

    #[test]
    fn missing_measurement_falls_back_with_zero_confidence() {
        let engine = ClassificationEngine::builtin();
        let result = engine.classify_traits(PlanetTraits {
            radius_earth: Some(1.0),
            temperature_k: None,
            distance_au: Some(1.0),
        });
        assert_eq!(result.key, "barren");
        assert_eq!(result.match_confidence, MISSING_DATA_CONFIDENCE);
    }

    #[test]
    fn nothing_qualifies_falls_back_with_low_confidence() {
        let engine = ClassificationEngine::builtin();
        let result = engine.classify_traits(traits(50.0, 5000.0, 500.0));
        assert_eq!(result.key, "barren");
        assert_eq!(result.match_confidence, NO_MATCH_CONFIDENCE);
    }

    #[test]
    fn ties_keep_first_declared() {
        let def = |key: &str| ArchetypeDef {
            key: key.into(),
            name: key.into(),
            display_category: "test".into(),
            color: 0,
            criteria: ArchetypeCriteria {
                radius: Interval::new(0.0, 2.0),
                temperature: Interval::new(0.0, 2.0),
                distance: Interval::new(0.0, 2.0),
            },
            textures: TextureSet::default(),
        };
        let engine =
            ClassificationEngine::new(vec![def("first"), def("second")], "second", ScoreWeights::default()).unwrap();
        assert_eq!(engine.classify_traits(traits(1.0, 1.0, 1.0)).key, "first");
    }

    #[test]
    fn traits_from_record_fall_back_to_geometry() {
        let record = BodyRecord::new("Kepler-22 b", BodyCategory::Exoplanet)
            .with_diameter(2.0 * EARTH_RADIUS_KM * 2.4)
            .with_distance(Distance::Au(0.85))
            .with_exoplanet_traits(ExoplanetTraits {
                equilibrium_temp_k: Some(262.0),
                ..Default::default()
            });
        let t = PlanetTraits::from_record(&record);
        assert!((t.radius_earth.unwrap() - 2.4).abs() < 1e-9);
        assert!((t.distance_au.unwrap() - 0.85).abs() < 1e-9);
        assert_eq!(t.temperature_k, Some(262.0));
    }

    #[test]
    fn texture_frames_cycle() {
        let engine = ClassificationEngine::builtin();
        let set = &engine.get("jungle").unwrap().textures;
        assert_eq!(set.frame(0), Some("images/textures_exoplanet/Jungle/Jungle01.png"));
        assert_eq!(set.frame(5), set.frame(0));
        assert_eq!(TextureSet::default().frame(3), None);
    }

    #[test]
    fn catalog_from_json_validates() {
        let json = r#"{
            "fallback": "rock",
            "archetypes": [{
                "key": "rock", "name": "Rock", "displayCategory": "extreme", "color": 6908265,
                "criteria": {
                    "radius": {"min": 0.1, "max": 2.0},
                    "temperature": {"min": 0.0, "max": 900.0},
                    "distance": {"min": 0.0, "max": 40.0}
                }
            }]
        }"#;
        let engine = ClassificationEngine::from_json(json).unwrap();
        assert_eq!(engine.classify_traits(traits(1.0, 300.0, 1.0)).key, "rock");

        let missing_fallback = json.replace(r#""fallback": "rock""#, r#""fallback": "ice""#);
        assert!(matches!(
            ClassificationEngine::from_json(&missing_fallback),
            Err(EngineError::InvalidCatalog(_))
        ));

        let bad_weights = json.replace(
            r#""archetypes""#,
            r#""weights": {"radius": 0.5, "temperature": 0.5, "distance": 0.5}, "archetypes""#,
        );
        assert!(ClassificationEngine::from_json(&bad_weights).is_err());
    }
}
