//! Renderer trait the engine drives.
//!
//! The engine never touches a graphics API. It creates primitives through
//! this trait, pushes transforms every tick, and asks for one render per tick.
//! Backends (WebGL bridge, wgpu, the headless test renderer) implement it.

use glam::{DQuat, DVec3};

use super::camera::OrbitCamera;
use crate::api::types::PrimitiveHandle;
use crate::components::material::{Material, Rgb};

/// Placement of a primitive in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: DVec3,
    pub rotation: DQuat,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn at(translation: DVec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Scene renderer collaborator.
///
/// # Example Implementation
///
/// ```ignore
/// struct WgpuRenderer {
///     meshes: SlotMap<MeshKey, GpuMesh>,
///     // ...
/// }
///
/// impl SceneRenderer for WgpuRenderer {
///     fn backend(&self) -> &'static str { "wgpu" }
///
///     fn create_sphere(&mut self, radius: f64, material: &Material) -> PrimitiveHandle {
///         // Upload a UV sphere...
///     }
///     // ...
/// }
/// ```
pub trait SceneRenderer {
    /// Backend identifier (e.g. "webgl", "wgpu", "headless").
    fn backend(&self) -> &'static str;

    /// Whether the backend has a usable context. Checked once by `init`.
    fn is_available(&self) -> bool {
        true
    }

    fn create_sphere(&mut self, radius: f64, material: &Material) -> PrimitiveHandle;

    /// Flat annulus in the body's equatorial plane.
    fn create_ring(&mut self, inner_radius: f64, outer_radius: f64, material: &Material) -> PrimitiveHandle;

    /// Circular line loop of the given radius, centered on its transform.
    fn create_orbit_path(&mut self, radius: f64, color: Rgb) -> PrimitiveHandle;

    fn add_to_scene(&mut self, handle: PrimitiveHandle);

    fn remove_from_scene(&mut self, handle: PrimitiveHandle);

    /// Release GPU resources. The handle is dead afterwards.
    fn dispose_primitive(&mut self, handle: PrimitiveHandle);

    fn set_transform(&mut self, handle: PrimitiveHandle, transform: &Transform);

    fn set_visible(&mut self, handle: PrimitiveHandle, visible: bool);

    /// Primitive under a screen position, using the camera of the last rendered frame.
    fn pick(&self, screen_x: f32, screen_y: f32) -> Option<PrimitiveHandle>;

    /// Draw one frame.
    fn render(&mut self, frame: &FrameView);
}

/// Per-frame data handed to the renderer.
pub struct FrameView<'a> {
    pub camera: &'a OrbitCamera,
    /// Primitives of the selected body, for highlight rendering.
    pub highlighted: &'a [PrimitiveHandle],
}
