//! Normalization of externally supplied JSON into body records.
//!
//! Two shapes are accepted: plain record documents using the `BodyRecord`
//! field names, and rows from the Kepler objects-of-interest table.

use serde::Deserialize;

use crate::api::error::EngineResult;
use crate::components::record::{
    BodyCategory, BodyRecord, Distance, ExoplanetTraits, StarSystem, EARTH_RADIUS_KM, SUN_DIAMETER_KM,
};

/// Texture given to host stars of ingested systems.
pub const HOST_STAR_TEXTURE: &str = "images/sun.jpg";

/// Parse a JSON array of records. `moons` may be a count or an array of records.
pub fn parse_records(json: &str) -> EngineResult<Vec<BodyRecord>> {
    let records: Vec<BodyRecord> = serde_json::from_str(json)?;
    log::debug!("Parsed {} records", records.len());
    Ok(records)
}

#[derive(Deserialize)]
struct SystemDocument {
    name: String,
    records: Vec<BodyRecord>,
}

/// Parse `{ "name": ..., "records": [...] }` into a system.
pub fn parse_system(json: &str) -> EngineResult<StarSystem> {
    let doc: SystemDocument = serde_json::from_str(json)?;
    log::info!("Parsed system {} ({} records)", doc.name, doc.records.len());
    Ok(StarSystem::new(doc.name, doc.records))
}

/// One row of the Kepler objects-of-interest table. Every column may be null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeplerRow {
    pub kepoi_name: Option<String>,
    pub kepler_name: Option<String>,
    /// Planet radius in Earth radii.
    pub koi_prad: Option<f64>,
    /// Equilibrium temperature in K.
    pub koi_teq: Option<f64>,
    /// Semi-major axis in AU.
    pub koi_sma: Option<f64>,
    /// Orbital period in days.
    pub koi_period: Option<f64>,
    /// Host star radius in solar radii.
    pub koi_srad: Option<f64>,
}

impl KeplerRow {
    /// Confirmed name if there is one, else the KOI designation.
    pub fn name(&self) -> Option<&str> {
        self.kepler_name
            .as_deref()
            .or(self.kepoi_name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    /// Convert to an exoplanet record. Missing columns stay missing; the
    /// build step rejects rows without a radius or semi-major axis.
    pub fn to_record(&self, fallback_name: &str) -> BodyRecord {
        let name = self.name().unwrap_or(fallback_name);
        let mut record = BodyRecord::new(name, BodyCategory::Exoplanet).with_exoplanet_traits(ExoplanetTraits {
            radius_earth: self.koi_prad,
            equilibrium_temp_k: self.koi_teq,
            semi_major_axis_au: self.koi_sma,
        });
        if let Some(radius) = self.koi_prad {
            record = record.with_diameter(radius * EARTH_RADIUS_KM * 2.0);
        }
        if let Some(au) = self.koi_sma {
            record = record.with_distance(Distance::Au(au));
        }
        if let Some(days) = self.koi_period {
            record = record.with_orbital_period(days);
        }
        record
    }
}

pub fn parse_kepler_rows(json: &str) -> EngineResult<Vec<KeplerRow>> {
    let rows: Vec<KeplerRow> = serde_json::from_str(json)?;
    Ok(rows)
}

/// Build a system around `host` from table rows, ordered by semi-major axis.
/// Unnamed rows are called `{host}.01`, `{host}.02`, ...
pub fn exoplanet_system(host: &str, rows: &[KeplerRow]) -> StarSystem {
    let star_diameter = rows
        .iter()
        .find_map(|r| r.koi_srad)
        .filter(|r| r.is_finite() && *r > 0.0)
        .map_or(SUN_DIAMETER_KM, |r| r * SUN_DIAMETER_KM);

    let star = BodyRecord::new(host, BodyCategory::Star)
        .with_diameter(star_diameter)
        .with_texture(HOST_STAR_TEXTURE);

    let mut planets: Vec<BodyRecord> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| row.to_record(&format!("{}.{:02}", host, i + 1)))
        .collect();
    planets.sort_by(|a, b| {
        let au = |r: &BodyRecord| r.distance.map_or(f64::INFINITY, Distance::to_au);
        au(a).total_cmp(&au(b))
    });

    log::info!("Ingested {} with {} planets", host, planets.len());
    let mut records = Vec::with_capacity(planets.len() + 1);
    records.push(star);
    records.extend(planets);
    StarSystem::new(host, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::EngineError;
    use crate::components::record::MoonSpec;

    #[test]
    fn moons_accept_count_or_records() {
        let json = r#"[
            { "name": "Saturn", "category": "gas-giant", "diameterKm": 120536,
              "distance": { "mkm": 1432.04 }, "moons": 146 },
            { "name": "Mars", "category": "terrestrial", "diameterKm": 6792,
              "distance": { "mkm": 227.92 },
              "moons": [ { "name": "Phobos", "category": "moon", "diameterKm": 22.4,
                           "distance": { "km": 9376 } } ] }
        ]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records[0].moons, MoonSpec::Count(146));
        assert_eq!(records[1].moons.records()[0].name, "Phobos");
        assert!(records.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_records("[{"), Err(EngineError::Config(_))));
        assert!(matches!(parse_system(r#"{"records": []}"#), Err(EngineError::Config(_))));
    }

    #[test]
    fn system_document_round_trips_into_star_system() {
        let json = r#"{ "name": "Tiny", "records": [
            { "name": "Star", "category": "star", "diameterKm": 1000000 }
        ] }"#;
        let system = parse_system(json).unwrap();
        assert_eq!(system.name, "Tiny");
        assert_eq!(system.primary().map(|r| r.name.as_str()), Some("Star"));
    }

    #[test]
    fn kepler_rows_become_sorted_exoplanets() {
        let json = r#"[
            { "kepoi_name": "K00701.04", "kepler_name": "Kepler-62 f",
              "koi_prad": 1.41, "koi_teq": 208, "koi_sma": 0.718, "koi_period": 267.29, "koi_srad": 0.64 },
            { "kepoi_name": "K00701.03", "kepler_name": "Kepler-62 e",
              "koi_prad": 1.61, "koi_teq": 270, "koi_sma": 0.427, "koi_period": 122.39 }
        ]"#;
        let rows = parse_kepler_rows(json).unwrap();
        let system = exoplanet_system("Kepler-62", &rows);

        assert_eq!(system.records.len(), 3);
        let star = system.primary().unwrap();
        assert!((star.diameter_km.unwrap() - 0.64 * SUN_DIAMETER_KM).abs() < 1e-6);

        let names: Vec<_> = system.records[1..].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Kepler-62 e", "Kepler-62 f"]);
        let e = &system.records[1];
        assert_eq!(e.category, BodyCategory::Exoplanet);
        assert!((e.diameter_km.unwrap() - 1.61 * EARTH_RADIUS_KM * 2.0).abs() < 1e-6);
        assert_eq!(e.exoplanet.as_ref().and_then(|t| t.equilibrium_temp_k), Some(270.0));
    }

    #[test]
    fn sparse_rows_keep_missing_columns_missing() {
        let rows = vec![
            KeplerRow { koi_teq: Some(500.0), ..KeplerRow::default() },
            KeplerRow {
                kepoi_name: Some("K00001.01".into()),
                koi_prad: Some(12.0),
                koi_sma: Some(0.03),
                ..KeplerRow::default()
            },
        ];
        let system = exoplanet_system("KOI-1", &rows);
        let unnamed = system.records.iter().find(|r| r.name == "KOI-1.01").unwrap();
        assert!(unnamed.validate().is_err());
        assert_eq!(system.records.last().map(|r| r.name.as_str()), Some("KOI-1.01"));
        assert_eq!(system.records[1].name, "K00001.01");
        assert_eq!(system.primary().unwrap().diameter_km, Some(SUN_DIAMETER_KM));
    }
}
