// extensions/mod.rs
//
// Optional helpers decoupled from the body pipeline.

pub mod easing;

pub use easing::{ease_dvec3, Easing};
