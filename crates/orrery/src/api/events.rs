use std::collections::VecDeque;

use serde::Serialize;

use crate::api::types::{BodyKey, SpeedKind};
use crate::components::record::{BodyCategory, BodyRecord};
use crate::systems::scale::ScaleMode;

/// Notifications the engine publishes to its host.
///
/// Serializes as `{"type": "<tag>", "payload": {...}}` using the tags the UI
/// layer listens for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    #[serde(rename = "loading:start")]
    LoadingStart,
    #[serde(rename = "loading:progress")]
    LoadingProgress { percent: f32, label: String },
    #[serde(rename = "loading:complete")]
    LoadingComplete,
    #[serde(rename = "loading:error")]
    LoadingError { message: String, record: Option<String> },
    #[serde(rename = "scale:changing")]
    /// `mode` is the mode being switched to.
    ScaleChanging { mode: ScaleMode, from: ScaleMode },
    #[serde(rename = "scale:changed")]
    ScaleChanged { mode: ScaleMode },
    #[serde(rename = "object:selected")]
    ObjectSelected {
        key: BodyKey,
        display_name: String,
        category: BodyCategory,
        record: Box<BodyRecord>,
    },
    #[serde(rename = "object:deselected")]
    ObjectDeselected,
    #[serde(rename = "system:loaded")]
    SystemLoaded { system_name: String, body_count: usize },
    #[serde(rename = "speed:changed")]
    SpeedChanged { kind: SpeedKind, multiplier: f64 },
    #[serde(rename = "animation:toggled")]
    AnimationToggled { running: bool },
    #[serde(rename = "orbits:visibility-changed")]
    OrbitsVisibilityChanged { visible: bool },
}

impl EngineEvent {
    /// The wire tag of this event.
    pub fn tag(&self) -> &'static str {
        match self {
            EngineEvent::LoadingStart => "loading:start",
            EngineEvent::LoadingProgress { .. } => "loading:progress",
            EngineEvent::LoadingComplete => "loading:complete",
            EngineEvent::LoadingError { .. } => "loading:error",
            EngineEvent::ScaleChanging { .. } => "scale:changing",
            EngineEvent::ScaleChanged { .. } => "scale:changed",
            EngineEvent::ObjectSelected { .. } => "object:selected",
            EngineEvent::ObjectDeselected => "object:deselected",
            EngineEvent::SystemLoaded { .. } => "system:loaded",
            EngineEvent::SpeedChanged { .. } => "speed:changed",
            EngineEvent::AnimationToggled { .. } => "animation:toggled",
            EngineEvent::OrbitsVisibilityChanged { .. } => "orbits:visibility-changed",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Bounded queue of pending events.
/// The engine pushes during operations; the host drains once per frame.
/// When full, the oldest event is dropped.
pub struct EventQueue {
    events: VecDeque<EngineEvent>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn emit(&mut self, event: EngineEvent) {
        if self.events.len() >= self.capacity {
            if let Some(dropped) = self.events.pop_front() {
                log::warn!("Event queue full, dropping {}", dropped.tag());
            }
        }
        log::debug!("event {}", event.tag());
        self.events.push_back(event);
    }

    /// Drain all pending events in emission order.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(256)
    }
}
