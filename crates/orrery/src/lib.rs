pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod assets;
pub mod data;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::EngineConfig;
pub use api::error::{EngineError, EngineResult};
pub use api::events::{EngineEvent, EventQueue};
pub use api::types::{BodyKey, FocusMode, PrimitiveHandle, SpeedKind, TextureHandle};
pub use assets::loader::{AssetError, MemoryTextureLoader, TextureLoader};
pub use assets::manifest::TextureManifest;
pub use components::body::OrbitingBody;
pub use components::material::{Material, Rgb};
pub use components::record::{BodyCategory, BodyRecord, Distance, MoonSpec, RecordError, StarSystem};
pub use core::engine::{EngineState, OrbitalEngine, ScaleInfo, Selection};
pub use core::factory::BodyFactory;
pub use core::registry::{BuildReport, SearchHit, SystemRegistry};
pub use renderer::{FrameView, HeadlessRenderer, MarkerLayer, OrbitCamera, SceneRenderer};
pub use systems::classification::{Archetype, ClassificationEngine};
pub use systems::motion::{MotionTuning, SpeedMultipliers};
pub use systems::scale::{resolve_scale, ScaleMode, ScaleProfile};
