//! In-memory renderer with no GPU.
//!
//! Records every primitive it is asked to create, tracks scene membership and
//! disposal, and answers picks with a top-down ray: screen coordinates are
//! read as scene `(x, z)` and the sphere whose surface is highest along +Y wins.
//! Used by tests and by hosts that simulate without drawing.

use std::collections::BTreeMap;

use super::traits::{FrameView, SceneRenderer, Transform};
use crate::api::types::PrimitiveHandle;
use crate::components::material::{Material, Rgb};

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveShape {
    Sphere { radius: f64 },
    Ring { inner_radius: f64, outer_radius: f64 },
    OrbitPath { radius: f64 },
}

#[derive(Debug, Clone)]
pub struct HeadlessPrimitive {
    pub shape: PrimitiveShape,
    pub material: Option<Material>,
    pub color: Option<Rgb>,
    pub transform: Transform,
    pub in_scene: bool,
    pub visible: bool,
}

pub struct HeadlessRenderer {
    primitives: BTreeMap<PrimitiveHandle, HeadlessPrimitive>,
    next_handle: u32,
    available: bool,
    frames: u64,
    disposed: Vec<PrimitiveHandle>,
    invalid_disposals: Vec<PrimitiveHandle>,
    last_highlight: Vec<PrimitiveHandle>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self {
            primitives: BTreeMap::new(),
            next_handle: 1,
            available: true,
            frames: 0,
            disposed: Vec::new(),
            invalid_disposals: Vec::new(),
            last_highlight: Vec::new(),
        }
    }

    /// A renderer that reports no usable context.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    fn insert(&mut self, shape: PrimitiveShape, material: Option<Material>, color: Option<Rgb>) -> PrimitiveHandle {
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;
        self.primitives.insert(
            handle,
            HeadlessPrimitive {
                shape,
                material,
                color,
                transform: Transform::default(),
                in_scene: false,
                visible: true,
            },
        );
        handle
    }

    pub fn primitive(&self, handle: PrimitiveHandle) -> Option<&HeadlessPrimitive> {
        self.primitives.get(&handle)
    }

    /// Primitives that exist (created and not yet disposed).
    pub fn live_count(&self) -> usize {
        self.primitives.len()
    }

    /// Live primitives that are currently attached to the scene.
    pub fn scene_count(&self) -> usize {
        self.primitives.values().filter(|p| p.in_scene).count()
    }

    /// Total primitives ever created.
    pub fn created_count(&self) -> usize {
        (self.next_handle - 1) as usize
    }

    pub fn disposed(&self) -> &[PrimitiveHandle] {
        &self.disposed
    }

    /// Dispose calls for handles that were already disposed or never existed.
    pub fn invalid_disposals(&self) -> &[PrimitiveHandle] {
        &self.invalid_disposals
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_highlight(&self) -> &[PrimitiveHandle] {
        &self.last_highlight
    }

    /// Screen position a pick needs to hit the given sphere's center.
    pub fn screen_position_of(&self, handle: PrimitiveHandle) -> Option<(f32, f32)> {
        self.primitives
            .get(&handle)
            .map(|p| (p.transform.translation.x as f32, p.transform.translation.z as f32))
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn backend(&self) -> &'static str {
        "headless"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn create_sphere(&mut self, radius: f64, material: &Material) -> PrimitiveHandle {
        self.insert(PrimitiveShape::Sphere { radius }, Some(*material), None)
    }

    fn create_ring(&mut self, inner_radius: f64, outer_radius: f64, material: &Material) -> PrimitiveHandle {
        self.insert(
            PrimitiveShape::Ring { inner_radius, outer_radius },
            Some(*material),
            None,
        )
    }

    fn create_orbit_path(&mut self, radius: f64, color: Rgb) -> PrimitiveHandle {
        self.insert(PrimitiveShape::OrbitPath { radius }, None, Some(color))
    }

    fn add_to_scene(&mut self, handle: PrimitiveHandle) {
        if let Some(p) = self.primitives.get_mut(&handle) {
            p.in_scene = true;
        }
    }

    fn remove_from_scene(&mut self, handle: PrimitiveHandle) {
        if let Some(p) = self.primitives.get_mut(&handle) {
            p.in_scene = false;
        }
    }

    fn dispose_primitive(&mut self, handle: PrimitiveHandle) {
        if self.primitives.remove(&handle).is_some() {
            self.disposed.push(handle);
        } else {
            log::warn!("dispose of dead primitive {:?}", handle);
            self.invalid_disposals.push(handle);
        }
    }

    fn set_transform(&mut self, handle: PrimitiveHandle, transform: &Transform) {
        if let Some(p) = self.primitives.get_mut(&handle) {
            p.transform = *transform;
        }
    }

    fn set_visible(&mut self, handle: PrimitiveHandle, visible: bool) {
        if let Some(p) = self.primitives.get_mut(&handle) {
            p.visible = visible;
        }
    }

    fn pick(&self, screen_x: f32, screen_y: f32) -> Option<PrimitiveHandle> {
        let (x, z) = (screen_x as f64, screen_y as f64);
        let mut best: Option<(PrimitiveHandle, f64)> = None;
        for (handle, p) in &self.primitives {
            let PrimitiveShape::Sphere { radius } = p.shape else {
                continue;
            };
            if !p.in_scene || !p.visible {
                continue;
            }
            let radius = radius * p.transform.scale;
            let center = p.transform.translation;
            let d2 = (x - center.x).powi(2) + (z - center.z).powi(2);
            if d2 > radius * radius {
                continue;
            }
            let top = center.y + (radius * radius - d2).sqrt();
            if best.map_or(true, |(_, best_top)| top > best_top) {
                best = Some((*handle, top));
            }
        }
        best.map(|(handle, _)| handle)
    }

    fn render(&mut self, frame: &FrameView) {
        self.frames += 1;
        self.last_highlight = frame.highlighted.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn dispose_tracks_double_free() {
        let mut r = HeadlessRenderer::new();
        let h = r.create_sphere(1.0, &Material::default());
        r.add_to_scene(h);
        assert_eq!(r.scene_count(), 1);
        r.remove_from_scene(h);
        r.dispose_primitive(h);
        r.dispose_primitive(h);
        assert_eq!(r.live_count(), 0);
        assert_eq!(r.disposed(), &[h]);
        assert_eq!(r.invalid_disposals(), &[h]);
    }

    #[test]
    fn pick_prefers_highest_surface() {
        let mut r = HeadlessRenderer::new();
        let big = r.create_sphere(10.0, &Material::default());
        let small = r.create_sphere(1.0, &Material::default());
        r.add_to_scene(big);
        r.add_to_scene(small);
        r.set_transform(big, &Transform::at(DVec3::ZERO));
        r.set_transform(small, &Transform::at(DVec3::new(0.0, 12.0, 0.0)));

        assert_eq!(r.pick(0.0, 0.0), Some(small));
        assert_eq!(r.pick(5.0, 0.0), Some(big));
        assert_eq!(r.pick(50.0, 50.0), None);
    }

    #[test]
    fn pick_ignores_hidden_and_detached() {
        let mut r = HeadlessRenderer::new();
        let h = r.create_sphere(5.0, &Material::default());
        assert_eq!(r.pick(0.0, 0.0), None);
        r.add_to_scene(h);
        r.set_visible(h, false);
        assert_eq!(r.pick(0.0, 0.0), None);
        r.set_visible(h, true);
        assert_eq!(r.pick(0.0, 0.0), Some(h));
    }

    #[test]
    fn unavailable_renderer_reports_it() {
        assert!(!HeadlessRenderer::unavailable().is_available());
        assert_eq!(HeadlessRenderer::new().backend(), "headless");
    }
}
