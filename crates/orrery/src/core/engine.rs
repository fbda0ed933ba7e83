//! The engine facade: owns the renderer, the registry and the camera, and
//! exposes the operations a host UI drives.

use glam::DVec3;
use serde::Serialize;

use crate::api::config::EngineConfig;
use crate::api::error::{EngineError, EngineResult};
use crate::api::events::{EngineEvent, EventQueue};
use crate::api::types::{BodyKey, FocusMode, PrimitiveHandle, SpeedKind};
use crate::assets::loader::TextureLoader;
use crate::assets::manifest::TextureManifest;
use crate::components::body::OrbitingBody;
use crate::components::material::Rgb;
use crate::components::record::StarSystem;
use crate::core::factory::BodyFactory;
use crate::core::registry::{BuildReport, SearchHit, SystemRegistry};
use crate::data::solar::solar_system;
use crate::extensions::easing::Easing;
use crate::renderer::camera::OrbitCamera;
use crate::renderer::markers::{MarkerLayer, NoMarkers};
use crate::renderer::traits::{FrameView, SceneRenderer};
use crate::systems::classification::ClassificationEngine;
use crate::systems::motion::SpeedMultipliers;
use crate::systems::scale::{resolve_scale, ScaleMode, ScaleProfile};

/// Largest time step a single tick simulates, in seconds.
/// Longer gaps (a backgrounded tab) are truncated rather than replayed.
pub const MAX_FRAME_DT: f64 = 0.1;

/// Direction from a focused body to the eye.
const FOCUS_DIRECTION: DVec3 = DVec3::new(1.0, 0.3, 0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Running,
    Paused,
    /// The renderer had no usable context at `init`.
    Failed,
    Disposed,
}

/// Current selection. Held by key so it survives rebuilds.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: BodyKey,
    pub mode: FocusMode,
}

/// Snapshot returned by [`OrbitalEngine::scale_info`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleInfo {
    pub mode: ScaleMode,
    pub description: &'static str,
    pub profile: ScaleProfile,
    pub available: &'static [ScaleMode],
    pub body_count: usize,
}

pub struct OrbitalEngine<R: SceneRenderer, L: TextureLoader> {
    config: EngineConfig,
    renderer: R,
    factory: BodyFactory<L>,
    markers: Box<dyn MarkerLayer>,
    registry: SystemRegistry,
    camera: OrbitCamera,
    events: EventQueue,
    system: StarSystem,
    profile: ScaleProfile,
    selection: Option<Selection>,
    speeds: SpeedMultipliers,
    show_orbits: bool,
    state: EngineState,
}

impl<R: SceneRenderer, L: TextureLoader> OrbitalEngine<R, L> {
    /// Create an engine showing the built-in solar system. Nothing is built until `init`.
    pub fn new(config: EngineConfig, renderer: R, loader: L) -> Self {
        let profile = resolve_scale(config.initial_scale);
        let mut camera = OrbitCamera::new(config.aspect_ratio);
        camera.set_smoothing(config.camera_smoothing);
        camera.apply_profile(&profile);
        let factory = BodyFactory::new(loader)
            .with_motion(config.motion)
            .with_moon_distance_divisor(config.moon_distance_divisor)
            .with_seed(config.seed);
        Self {
            renderer,
            factory,
            markers: Box::new(NoMarkers),
            registry: SystemRegistry::new(),
            camera,
            events: EventQueue::new(config.max_events),
            system: solar_system(),
            profile,
            selection: None,
            speeds: SpeedMultipliers::default(),
            show_orbits: config.show_orbits,
            state: EngineState::Uninitialized,
            config,
        }
    }

    // -- Builder pattern --

    pub fn with_system(mut self, system: StarSystem) -> Self {
        self.system = system;
        self
    }

    pub fn with_markers(mut self, markers: Box<dyn MarkerLayer>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassificationEngine) -> Self {
        self.factory = self.factory.with_classifier(classifier);
        self
    }

    pub fn with_manifest(mut self, manifest: TextureManifest) -> Self {
        self.factory = self.factory.with_manifest(manifest);
        self
    }

    // -- Lifecycle --

    /// Build the configured system. Calling it again after success is a no-op.
    pub async fn init(&mut self) -> EngineResult<()> {
        match self.state {
            EngineState::Uninitialized => {}
            EngineState::Disposed => return Err(EngineError::Disposed),
            EngineState::Failed => return Err(EngineError::RendererUnavailable),
            EngineState::Running | EngineState::Paused => return Ok(()),
        }
        if !self.renderer.is_available() {
            log::error!("Renderer {} has no usable context", self.renderer.backend());
            self.state = EngineState::Failed;
            self.events.emit(EngineEvent::LoadingError {
                message: EngineError::RendererUnavailable.to_string(),
                record: None,
            });
            return Err(EngineError::RendererUnavailable);
        }

        log::info!(
            "Initializing {} on {} renderer at {} scale",
            self.system.name,
            self.renderer.backend(),
            self.profile.mode
        );
        self.camera.reset(self.profile.mode.overview_distance());
        self.rebuild().await;
        self.state = EngineState::Running;
        self.emit_system_loaded();
        Ok(())
    }

    /// Release every primitive. Idempotent; the engine is unusable afterwards.
    pub fn dispose(&mut self) {
        if self.state == EngineState::Disposed {
            return;
        }
        detach_markers(self.markers.as_mut(), &self.registry);
        self.registry.clear(&mut self.renderer);
        self.selection = None;
        self.camera.cancel_flight();
        self.state = EngineState::Disposed;
        log::info!("Engine disposed");
    }

    // -- Scale --

    /// Switch scale mode, rebuilding every body. No-op if `mode` is already active.
    /// Before `init` only the preference is recorded.
    pub async fn set_scale(&mut self, mode: ScaleMode) -> EngineResult<()> {
        if mode == self.profile.mode {
            return Ok(());
        }
        match self.state {
            EngineState::Disposed => return Err(EngineError::Disposed),
            EngineState::Uninitialized | EngineState::Failed => {
                self.profile = resolve_scale(mode);
                self.camera.apply_profile(&self.profile);
                return Ok(());
            }
            EngineState::Running | EngineState::Paused => {}
        }

        let from = self.profile.mode;
        log::info!("Scale change {} -> {}", from, mode);
        self.events.emit(EngineEvent::ScaleChanging { mode, from });
        self.profile = resolve_scale(mode);
        self.camera.apply_profile(&self.profile);
        self.rebuild().await;
        self.reattach_selection();
        self.events.emit(EngineEvent::ScaleChanged { mode });
        Ok(())
    }

    pub async fn set_scale_named(&mut self, name: &str) -> EngineResult<()> {
        let mode: ScaleMode = name.parse()?;
        self.set_scale(mode).await
    }

    pub fn scale_info(&self) -> ScaleInfo {
        ScaleInfo {
            mode: self.profile.mode,
            description: self.profile.mode.description(),
            profile: self.profile,
            available: &ScaleMode::ALL,
            body_count: self.registry.body_count(),
        }
    }

    // -- Systems --

    /// Replace the active system. Clears the selection; the camera stays put.
    pub async fn load_system(&mut self, system: StarSystem) -> EngineResult<BuildReport> {
        self.ensure_ready()?;
        self.deselect();
        self.system = system;
        let report = self.rebuild().await;
        self.emit_system_loaded();
        Ok(report)
    }

    pub fn system(&self) -> &StarSystem {
        &self.system
    }

    /// Every body and satellite in build order.
    pub fn bodies(&self) -> Vec<SearchHit> {
        self.registry.listing()
    }

    pub fn body(&self, key: &str) -> Option<&OrbitingBody> {
        self.registry.find(key)
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.registry.search(query)
    }

    // -- Selection --

    /// Select whatever is under a screen position, or deselect if nothing is.
    pub fn select_at(&mut self, screen_x: f32, screen_y: f32) -> Option<BodyKey> {
        if !matches!(self.state, EngineState::Running | EngineState::Paused) {
            return None;
        }
        let key = self
            .renderer
            .pick(screen_x, screen_y)
            .and_then(|handle| self.registry.resolve_handle(handle))
            .cloned();
        match key {
            Some(key) => {
                self.apply_selection(key.clone(), FocusMode::Normal);
                Some(key)
            }
            None => {
                self.deselect();
                None
            }
        }
    }

    /// Select a body by key and frame it according to `mode`.
    pub fn select_by_key(&mut self, key: &str, mode: FocusMode) -> EngineResult<()> {
        self.ensure_ready()?;
        if self.registry.find(key).is_none() {
            return Err(EngineError::UnknownBody(key.to_string()));
        }
        self.apply_selection(BodyKey::new(key), mode);
        Ok(())
    }

    pub fn deselect(&mut self) {
        if self.selection.take().is_some() {
            self.camera.cancel_flight();
            self.events.emit(EngineEvent::ObjectDeselected);
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    fn apply_selection(&mut self, key: BodyKey, mode: FocusMode) {
        let Some(body) = self.registry.find(key.as_str()) else {
            return;
        };
        self.events.emit(EngineEvent::ObjectSelected {
            key: key.clone(),
            display_name: body.display_name().to_string(),
            category: body.category(),
            record: Box::new(body.record().clone()),
        });
        self.selection = Some(Selection { key, mode });
        self.focus_camera();
    }

    /// Start a flight toward the selected body if its mode moves the camera.
    fn focus_camera(&mut self) {
        let Some(selection) = &self.selection else {
            return;
        };
        let Some(radii) = selection.mode.radii() else {
            return;
        };
        let Some(body) = self.registry.find(selection.key.as_str()) else {
            return;
        };
        let target = body.position();
        let distance = (body.scaled_radius() * radii).clamp(self.camera.min_distance, self.camera.max_distance);
        let eye = target + FOCUS_DIRECTION.normalize() * distance;
        self.camera
            .fly_to(eye, target, self.config.focus_flight_seconds, Easing::CubicOut);
    }

    /// After a rebuild, keep the selection if its key still exists.
    fn reattach_selection(&mut self) {
        let Some(selection) = &self.selection else {
            return;
        };
        if self.registry.find(selection.key.as_str()).is_some() {
            self.focus_camera();
        } else {
            log::info!("Selected body {} gone after rebuild", selection.key);
            self.deselect();
        }
    }

    // -- Camera --

    /// Return the camera to the overview position and clear the selection.
    pub fn reset_view(&mut self) {
        self.deselect();
        self.camera.reset(self.profile.mode.overview_distance());
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    // -- Animation --

    pub fn set_animation_speed(&mut self, kind: SpeedKind, multiplier: f64) -> EngineResult<()> {
        if self.state == EngineState::Disposed {
            return Err(EngineError::Disposed);
        }
        self.speeds.set(kind, multiplier)?;
        self.events.emit(EngineEvent::SpeedChanged { kind, multiplier });
        Ok(())
    }

    pub fn speeds(&self) -> SpeedMultipliers {
        self.speeds
    }

    pub fn pause(&mut self) {
        if self.state == EngineState::Running {
            self.state = EngineState::Paused;
            self.events.emit(EngineEvent::AnimationToggled { running: false });
        }
    }

    pub fn resume(&mut self) {
        if self.state == EngineState::Paused {
            self.state = EngineState::Running;
            self.events.emit(EngineEvent::AnimationToggled { running: true });
        }
    }

    /// Pause if running, resume if paused. Returns whether the engine is now running.
    pub fn toggle_animation(&mut self) -> bool {
        match self.state {
            EngineState::Running => self.pause(),
            EngineState::Paused => self.resume(),
            _ => {}
        }
        self.state == EngineState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == EngineState::Paused
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    // -- Overlays --

    pub fn set_orbits_visible(&mut self, visible: bool) {
        self.show_orbits = visible;
        self.registry.set_orbits_visible(&mut self.renderer, visible);
        self.events.emit(EngineEvent::OrbitsVisibilityChanged { visible });
    }

    pub fn orbits_visible(&self) -> bool {
        self.show_orbits
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        self.markers.set_labels_visible(visible);
    }

    // -- Frame --

    /// Advance the simulation by `dt` seconds and render one frame.
    /// Does nothing unless the engine is running.
    pub fn tick(&mut self, dt: f64) {
        if self.state != EngineState::Running {
            return;
        }
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.registry.advance_all(dt, self.speeds);

        if !self.camera.advance_flight(dt) {
            if let Some(selection) = &self.selection {
                if selection.mode != FocusMode::Normal {
                    if let Some(body) = self.registry.find(selection.key.as_str()) {
                        self.camera.follow(body.position(), dt);
                    }
                }
            }
        }

        self.registry.sync_all(&mut self.renderer);
        self.draw();
    }

    /// Render without advancing time, e.g. after a camera move while paused.
    pub fn redraw(&mut self) {
        if matches!(self.state, EngineState::Running | EngineState::Paused) {
            self.draw();
        }
    }

    fn draw(&mut self) {
        let highlighted: Vec<PrimitiveHandle> = self
            .selection
            .as_ref()
            .and_then(|s| self.registry.find(s.key.as_str()))
            .map(|b| b.primitives().body_handles().collect())
            .unwrap_or_default();
        let frame = FrameView {
            camera: &self.camera,
            highlighted: &highlighted,
        };
        self.renderer.render(&frame);
    }

    // -- Events --

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    // -- Collaborators --

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn factory(&self) -> &BodyFactory<L> {
        &self.factory
    }

    pub fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- Internals --

    fn ensure_ready(&self) -> EngineResult<()> {
        match self.state {
            EngineState::Running | EngineState::Paused => Ok(()),
            EngineState::Uninitialized => Err(EngineError::NotInitialized),
            EngineState::Failed => Err(EngineError::RendererUnavailable),
            EngineState::Disposed => Err(EngineError::Disposed),
        }
    }

    async fn rebuild(&mut self) -> BuildReport {
        detach_markers(self.markers.as_mut(), &self.registry);
        self.events.emit(EngineEvent::LoadingStart);
        let report = self
            .registry
            .build_system(
                &self.system,
                &self.profile,
                &self.factory,
                &mut self.renderer,
                &mut self.events,
            )
            .await;
        if !self.show_orbits {
            self.registry.set_orbits_visible(&mut self.renderer, false);
        }
        attach_markers(self.markers.as_mut(), &self.registry);
        self.events.emit(EngineEvent::LoadingComplete);
        log::info!(
            "Built {} bodies ({} rejected), generation {}",
            self.registry.body_count(),
            report.rejected.len(),
            report.generation
        );
        report
    }

    fn emit_system_loaded(&mut self) {
        self.events.emit(EngineEvent::SystemLoaded {
            system_name: self.system.name.clone(),
            body_count: self.registry.body_count(),
        });
    }
}

fn attach_markers(markers: &mut dyn MarkerLayer, registry: &SystemRegistry) {
    for body in registry.iter() {
        if body.scaled_orbit_radius() > 0.0 {
            let color = body
                .archetype()
                .map(|a| Rgb::from_hex(a.color))
                .or_else(|| body.record().orbit_color.map(Rgb::from_hex))
                .unwrap_or(Rgb::WHITE);
            markers.attach(body.key(), body.display_name(), body.scaled_orbit_radius(), color);
        }
    }
}

fn detach_markers(markers: &mut dyn MarkerLayer, registry: &SystemRegistry) {
    for body in registry.iter() {
        if body.scaled_orbit_radius() > 0.0 {
            markers.detach(body.key());
        }
    }
}
