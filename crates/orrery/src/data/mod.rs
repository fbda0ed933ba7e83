pub mod ingest;
pub mod solar;

pub use ingest::{exoplanet_system, parse_kepler_rows, parse_records, parse_system, KeplerRow};
pub use solar::solar_system;
