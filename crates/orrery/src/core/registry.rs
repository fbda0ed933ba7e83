use glam::DVec3;
use serde::Serialize;

use crate::api::error::EngineError;
use crate::api::events::{EngineEvent, EventQueue};
use crate::api::types::{BodyKey, PrimitiveHandle};
use crate::assets::loader::TextureLoader;
use crate::components::body::OrbitingBody;
use crate::components::record::{BodyCategory, StarSystem};
use crate::core::factory::{BodyFactory, OrbitPlacement};
use crate::renderer::traits::SceneRenderer;
use crate::systems::motion::SpeedMultipliers;
use crate::systems::scale::ScaleProfile;

/// Proof that a build was started at a given generation.
/// Bodies published with a stale ticket are disposed instead of stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTicket {
    generation: u64,
}

impl BuildTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of [`SystemRegistry::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Stored,
    /// The ticket predates the latest build or clear; the body was disposed.
    Stale,
    /// A body with the same key is already registered; the new one was disposed.
    Duplicate,
}

/// One search match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub key: BodyKey,
    pub display_name: String,
    pub category: BodyCategory,
}

/// Summary of a whole-system build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub generation: u64,
    /// Top-level bodies stored.
    pub published: usize,
    /// Records (or satellites) that were rejected.
    pub rejected: Vec<EngineError>,
}

/// Ordered storage of the live bodies of the active system.
/// Flat Vec in build order; satellites live inside their parent.
pub struct SystemRegistry {
    bodies: Vec<OrbitingBody>,
    generation: u64,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self {
            bodies: Vec::with_capacity(16),
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new build: bump the generation so older tickets go stale.
    pub fn begin_build(&mut self) -> BuildTicket {
        self.generation += 1;
        BuildTicket { generation: self.generation }
    }

    pub fn is_current(&self, ticket: &BuildTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Store a body built under `ticket`. Stale or duplicate bodies are
    /// disposed on the spot so their primitives never leak.
    pub fn publish<R: SceneRenderer>(
        &mut self,
        ticket: &BuildTicket,
        body: OrbitingBody,
        renderer: &mut R,
    ) -> Publish {
        if !self.is_current(ticket) {
            log::warn!(
                "Discarding {} from stale build {} (current {})",
                body.key(),
                ticket.generation,
                self.generation
            );
            body.dispose(renderer);
            return Publish::Stale;
        }
        if self.get(body.key().as_str()).is_some() {
            log::debug!("Duplicate body key {}, discarding", body.key());
            body.dispose(renderer);
            return Publish::Duplicate;
        }
        self.bodies.push(body);
        Publish::Stored
    }

    /// Dispose every body and invalidate outstanding tickets.
    /// Calling it on an empty registry changes nothing observable.
    pub fn clear<R: SceneRenderer>(&mut self, renderer: &mut R) {
        if !self.bodies.is_empty() {
            log::info!("Clearing {} bodies", self.bodies.len());
        }
        for body in self.bodies.drain(..) {
            body.dispose(renderer);
        }
        self.generation += 1;
    }

    /// Clear, then build every record of `system` under `profile`.
    ///
    /// Invalid records are skipped and reported through `loading:error`;
    /// the rest of the system still builds.
    pub async fn build_system<R: SceneRenderer, L: TextureLoader>(
        &mut self,
        system: &StarSystem,
        profile: &ScaleProfile,
        factory: &BodyFactory<L>,
        renderer: &mut R,
        events: &mut EventQueue,
    ) -> BuildReport {
        self.clear(renderer);
        let ticket = self.begin_build();
        let mut report = BuildReport {
            generation: ticket.generation,
            ..Default::default()
        };

        let host_radius = system
            .primary()
            .and_then(|star| star.diameter_km)
            .map_or(0.0, |d| profile.scaled_radius(d));
        let orbiting = system
            .records
            .iter()
            .filter(|r| r.category.orbits_primary())
            .count();
        let mut orbit_index = 0;

        log::info!(
            "Building {} ({} records) at {} scale",
            system.name,
            system.records.len(),
            profile.mode
        );

        for record in &system.records {
            let placement = match record.category {
                BodyCategory::Star => {
                    progress(events, 10.0, format!("Creating {}", record.name));
                    OrbitPlacement::standalone()
                }
                BodyCategory::AsteroidBelt => {
                    progress(events, 85.0, format!("Creating {}", record.name));
                    OrbitPlacement::standalone()
                }
                _ => {
                    let percent = 20.0 + orbit_index as f32 / orbiting.max(1) as f32 * 60.0;
                    progress(events, percent, format!("Creating {}", record.name));
                    let placement = OrbitPlacement::sibling(orbit_index, orbiting).around_host(host_radius);
                    orbit_index += 1;
                    placement
                }
            };

            match factory.build_body(record, profile, placement, renderer).await {
                Ok(built) => {
                    for err in built.rejected {
                        reject(events, &mut report, err);
                    }
                    let key = built.body.key().as_str().to_string();
                    match self.publish(&ticket, built.body, renderer) {
                        Publish::Stored => report.published += 1,
                        Publish::Duplicate => reject(
                            events,
                            &mut report,
                            EngineError::DuplicateKey { name: record.name.clone(), key },
                        ),
                        Publish::Stale => {}
                    }
                }
                Err(err) => reject(events, &mut report, err),
            }
        }

        progress(events, 100.0, "Ready".to_string());
        report
    }

    // -- Lookup --

    /// Top-level body by key.
    pub fn get(&self, key: &str) -> Option<&OrbitingBody> {
        self.bodies.iter().find(|b| b.key().as_str() == key)
    }

    /// Body or satellite by key.
    pub fn find(&self, key: &str) -> Option<&OrbitingBody> {
        self.bodies.iter().find_map(|b| b.find(key))
    }

    /// Key of the body owning a primitive.
    pub fn resolve_handle(&self, handle: PrimitiveHandle) -> Option<&BodyKey> {
        self.bodies.iter().find_map(|b| b.owner_of(handle))
    }

    /// Case-insensitive substring match over display names, bodies and
    /// satellites, in registry order.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        let mut hits = Vec::new();
        for body in &self.bodies {
            collect_hits(body, &needle, &mut hits);
        }
        hits
    }

    /// Every body and satellite, in registry order.
    pub fn listing(&self) -> Vec<SearchHit> {
        self.search("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrbitingBody> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies plus all their satellites.
    pub fn body_count(&self) -> usize {
        fn count(body: &OrbitingBody) -> usize {
            1 + body.moons().iter().map(count).sum::<usize>()
        }
        self.bodies.iter().map(count).sum()
    }

    // -- Per-tick --

    /// Advance every body around the primary at the origin.
    pub fn advance_all(&mut self, dt: f64, speeds: SpeedMultipliers) {
        for body in &mut self.bodies {
            body.advance_tree(dt, speeds, DVec3::ZERO);
        }
    }

    pub fn sync_all<R: SceneRenderer>(&self, renderer: &mut R) {
        for body in &self.bodies {
            body.sync(renderer);
        }
    }

    pub fn set_orbits_visible<R: SceneRenderer>(&self, renderer: &mut R, visible: bool) {
        for body in &self.bodies {
            body.set_orbit_visible(renderer, visible);
        }
    }
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_hits(body: &OrbitingBody, needle: &str, hits: &mut Vec<SearchHit>) {
    if body.display_name().to_lowercase().contains(needle) {
        hits.push(SearchHit {
            key: body.key().clone(),
            display_name: body.display_name().to_string(),
            category: body.category(),
        });
    }
    for moon in body.moons() {
        collect_hits(moon, needle, hits);
    }
}

fn progress(events: &mut EventQueue, percent: f32, label: String) {
    events.emit(EngineEvent::LoadingProgress { percent, label });
}

fn reject(events: &mut EventQueue, report: &mut BuildReport, err: EngineError) {
    log::warn!("{}", err);
    events.emit(EngineEvent::LoadingError {
        message: err.to_string(),
        record: err.record_name().map(str::to_string),
    });
    report.rejected.push(err);
}
