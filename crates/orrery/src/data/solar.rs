//! Built-in catalog of the solar system.
//! Distances in millions of km, diameters in km, periods in days.

use crate::components::record::{
    AtmosphereSpec, BeltSpec, BodyCategory, BodyRecord, Distance, RingSpec, StarSystem,
};

pub const SOLAR_SYSTEM_NAME: &str = "Solar System";

/// Orbit path colors of the eight planets.
pub const ORBIT_COLORS: [(&str, u32); 8] = [
    ("Mercury", 0x8C7853),
    ("Venus", 0xFFC649),
    ("Earth", 0x6B93D6),
    ("Mars", 0xCD5C5C),
    ("Jupiter", 0xD8CA9D),
    ("Saturn", 0xFAD5A5),
    ("Uranus", 0x4FD0E7),
    ("Neptune", 0x4B70DD),
];

fn orbit_color(name: &str) -> u32 {
    ORBIT_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(0xFFFFFF, |(_, c)| *c)
}

#[allow(clippy::too_many_arguments)]
fn planet(
    name: &str,
    category: BodyCategory,
    diameter_km: f64,
    mass_kg: f64,
    distance_mkm: f64,
    orbital_period: f64,
    rotation_period: f64,
    axial_tilt: f64,
    eccentricity: f64,
    texture: &str,
) -> BodyRecord {
    BodyRecord::new(name, category)
        .with_diameter(diameter_km)
        .with_mass(mass_kg)
        .with_distance(Distance::Mkm(distance_mkm))
        .with_orbital_period(orbital_period)
        .with_rotation_period(rotation_period)
        .with_axial_tilt(axial_tilt)
        .with_eccentricity(eccentricity)
        .with_texture(texture)
        .with_orbit_color(orbit_color(name))
}

/// A tidally locked moon: rotation period equals orbital period.
fn moon(name: &str, diameter_km: f64, mass_kg: f64, distance_km: f64, period: f64) -> BodyRecord {
    BodyRecord::new(name, BodyCategory::Moon)
        .with_diameter(diameter_km)
        .with_mass(mass_kg)
        .with_distance(Distance::Km(distance_km))
        .with_orbital_period(period)
        .with_rotation_period(period)
}

fn belt(name: &str, inner_au: f64, outer_au: f64, particle_count: u32) -> BodyRecord {
    BodyRecord::new(name, BodyCategory::AsteroidBelt).with_belt(BeltSpec {
        inner: Distance::Au(inner_au),
        outer: Distance::Au(outer_au),
        particle_count,
    })
}

/// The Sun, eight planets with their major moons, and two belts.
pub fn solar_system() -> StarSystem {
    let sun = BodyRecord::new("Sun", BodyCategory::Star)
        .with_diameter(1_392_700.0)
        .with_mass(1.989e30)
        .with_rotation_period(25.05)
        .with_texture("images/sun.jpg")
        .with_atmosphere(AtmosphereSpec {
            texture: None,
            shell_scale: 1.2,
            opacity: 0.15,
        });

    let mercury = planet(
        "Mercury",
        BodyCategory::Terrestrial,
        4879.0,
        3.3011e23,
        57.91,
        87.97,
        58.65,
        0.034,
        0.2056,
        "images/mercurymap.jpg",
    );

    let venus = planet(
        "Venus",
        BodyCategory::Terrestrial,
        12_104.0,
        4.8675e24,
        108.21,
        224.7,
        -243.02,
        177.36,
        0.0067,
        "images/venusmap.jpg",
    )
    .with_atmosphere(AtmosphereSpec {
        texture: Some("images/venus_atmosphere.jpg".into()),
        ..AtmosphereSpec::default()
    });

    let earth = planet(
        "Earth",
        BodyCategory::Terrestrial,
        12_756.0,
        5.9724e24,
        149.598,
        365.26,
        0.997_269_68,
        23.44,
        0.0167,
        "images/earth_daymap.jpg",
    )
    .with_atmosphere(AtmosphereSpec {
        texture: Some("images/earth_atmosphere.jpg".into()),
        ..AtmosphereSpec::default()
    })
    .with_moons(vec![
        moon("Moon", 3474.0, 7.342e22, 384_400.0, 27.32).with_texture("images/moonmap.jpg")
    ]);

    let mars = planet(
        "Mars",
        BodyCategory::Terrestrial,
        6792.0,
        6.4171e23,
        227.92,
        686.98,
        1.026,
        25.19,
        0.0934,
        "images/marsmap.jpg",
    )
    .with_moons(vec![
        moon("Phobos", 22.4, 1.0659e16, 9376.0, 0.32),
        moon("Deimos", 12.4, 1.4762e15, 23_463.0, 1.26),
    ]);

    let jupiter = planet(
        "Jupiter",
        BodyCategory::GasGiant,
        142_984.0,
        1.8982e27,
        778.57,
        4332.59,
        0.41354,
        3.13,
        0.0489,
        "images/jupiter.jpg",
    )
    .with_moons(vec![
        moon("Io", 3643.0, 8.932e22, 421_700.0, 1.77).with_texture("images/jupiterIo.jpg"),
        moon("Europa", 3122.0, 4.8e22, 671_034.0, 3.55).with_texture("images/jupiterEuropa.jpg"),
        moon("Ganymede", 5268.0, 1.482e23, 1_070_412.0, 7.15)
            .with_texture("images/jupiterGanymede.jpg"),
        moon("Callisto", 4821.0, 1.076e23, 1_882_709.0, 16.69)
            .with_texture("images/jupiterCallisto.jpg"),
    ]);

    let saturn = planet(
        "Saturn",
        BodyCategory::GasGiant,
        120_536.0,
        5.6834e26,
        1432.04,
        10_759.22,
        0.44401,
        26.73,
        0.0565,
        "images/saturnmap.jpg",
    )
    .with_rings(RingSpec {
        inner_radius_km: 7000.0,
        outer_radius_km: 80_000.0,
        texture: Some("images/saturn_ring.png".into()),
    })
    .with_moon_count(146);

    let uranus = planet(
        "Uranus",
        BodyCategory::IceGiant,
        51_118.0,
        8.6810e25,
        2867.04,
        30_688.5,
        -0.71833,
        97.77,
        0.0457,
        "images/uranus.jpg",
    )
    .with_rings(RingSpec {
        inner_radius_km: 38_000.0,
        outer_radius_km: 51_000.0,
        texture: Some("images/uranus_ring.png".into()),
    })
    .with_moon_count(27);

    let neptune = planet(
        "Neptune",
        BodyCategory::IceGiant,
        49_528.0,
        1.02413e26,
        4515.0,
        60_182.0,
        0.6713,
        28.32,
        0.0113,
        "images/neptune.jpg",
    )
    .with_moon_count(16);

    StarSystem::new(
        SOLAR_SYSTEM_NAME,
        vec![
            sun,
            mercury,
            venus,
            earth,
            mars,
            jupiter,
            saturn,
            uranus,
            neptune,
            belt("Main Belt", 2.2, 3.2, 1000),
            belt("Kuiper Belt", 30.0, 50.0, 3000),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_record_validates() {
        let system = solar_system();
        for record in &system.records {
            assert!(record.validate().is_ok(), "{} invalid", record.name);
            for moon in record.moons.records() {
                assert!(moon.validate().is_ok(), "{} invalid", moon.name);
            }
        }
    }

    #[test]
    fn sun_is_primary_and_planets_follow_in_order() {
        let system = solar_system();
        assert_eq!(system.primary().map(|r| r.name.as_str()), Some("Sun"));
        let planets: Vec<_> = system
            .records
            .iter()
            .filter(|r| r.category.orbits_primary())
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(planets.len(), 8);
        assert_eq!(planets[0], "Mercury");
        assert_eq!(planets[7], "Neptune");
    }

    #[test]
    fn retrograde_spinners_have_negative_periods() {
        let system = solar_system();
        let period = |name: &str| {
            system
                .records
                .iter()
                .find(|r| r.name == name)
                .and_then(|r| r.rotation_period_days)
        };
        assert!(period("Venus").unwrap() < 0.0);
        assert!(period("Uranus").unwrap() < 0.0);
        assert!(period("Earth").unwrap() > 0.0);
    }

    #[test]
    fn detailed_moons_and_counts() {
        let system = solar_system();
        let find = |name: &str| system.records.iter().find(|r| r.name == name).unwrap();
        assert_eq!(find("Jupiter").moons.records().len(), 4);
        assert_eq!(find("Saturn").moons.count(), 146);
        assert!(find("Saturn").moons.records().is_empty());
        assert_eq!(find("Earth").orbit_color, Some(0x6B93D6));
    }
}
