pub mod classification;
pub mod motion;
pub mod rng;
pub mod scale;
