pub mod camera;
pub mod headless;
pub mod markers;
pub mod traits;

// Re-export key types for convenient access
pub use camera::{CameraUniform, OrbitCamera};
pub use headless::HeadlessRenderer;
pub use markers::{MarkerLayer, NoMarkers};
pub use traits::{FrameView, SceneRenderer, Transform};
