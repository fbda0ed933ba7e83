pub mod engine;
pub mod factory;
pub mod registry;
