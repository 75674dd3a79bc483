//! Team-scoped world memory.
//!
//! Bounded, append-only rings of positions shared by every vehicle on a
//! team: places where damage was taken, places where stuck recovery was
//! triggered, and places where vehicles died. Entries only bias speed
//! and route scoring; they are never hard constraints, so stale reads
//! are acceptable.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use crate::types::Vec3;

/// A remembered location with a radius of influence.
#[derive(Clone, Copy, Debug)]
pub struct Zone {
    pub position: Vec3,
    pub radius: f32,
}

/// Capped ring of zones, oldest-first eviction.
#[derive(Debug)]
struct ZoneRing {
    entries: VecDeque<Zone>,
    capacity: usize,
}

impl ZoneRing {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, zone: Zone) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(zone);
    }

    fn contains(&self, point: Vec3) -> bool {
        self.entries
            .iter()
            .any(|z| z.position.horizontal_distance(&point) <= z.radius)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Configuration for the shared memory rings.
#[derive(Clone, Debug, Deserialize)]
pub struct MemorySettings {
    /// Maximum entries per ring (default: 32)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Influence radius for recorded zones (default: 15.0)
    #[serde(default = "default_zone_radius")]
    pub zone_radius: f32,

    /// Speed multiplier applied inside a danger or death zone
    /// (default: 0.5)
    #[serde(default = "default_danger_penalty")]
    pub danger_penalty: f32,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            zone_radius: default_zone_radius(),
            danger_penalty: default_danger_penalty(),
        }
    }
}

fn default_capacity() -> usize {
    32
}
fn default_zone_radius() -> f32 {
    15.0
}
fn default_danger_penalty() -> f32 {
    0.5
}

/// Shared world memory for one team.
///
/// Cheap to clone; all clones observe the same rings.
#[derive(Clone, Debug)]
pub struct TeamMemory {
    inner: Arc<MemoryInner>,
}

#[derive(Debug)]
struct MemoryInner {
    settings: MemorySettings,
    danger: RwLock<ZoneRing>,
    stuck: RwLock<ZoneRing>,
    deaths: RwLock<ZoneRing>,
}

impl TeamMemory {
    /// Create a new memory service with the given settings.
    pub fn new(settings: MemorySettings) -> Self {
        let cap = settings.capacity;
        Self {
            inner: Arc::new(MemoryInner {
                settings,
                danger: RwLock::new(ZoneRing::new(cap)),
                stuck: RwLock::new(ZoneRing::new(cap)),
                deaths: RwLock::new(ZoneRing::new(cap)),
            }),
        }
    }

    /// Create with default settings.
    pub fn with_defaults() -> Self {
        Self::new(MemorySettings::default())
    }

    /// Record a location where damage was taken.
    pub fn record_danger(&self, position: Vec3) {
        let radius = self.inner.settings.zone_radius;
        self.inner.danger.write().push(Zone { position, radius });
        tracing::debug!("danger zone recorded at ({:.1}, {:.1})", position.x, position.z);
    }

    /// Record a location where stuck recovery escalated.
    pub fn record_stuck(&self, position: Vec3) {
        let radius = self.inner.settings.zone_radius;
        self.inner.stuck.write().push(Zone { position, radius });
        tracing::debug!("stuck spot recorded at ({:.1}, {:.1})", position.x, position.z);
    }

    /// Record a location where a vehicle died.
    pub fn record_death(&self, position: Vec3) {
        let radius = self.inner.settings.zone_radius;
        self.inner.deaths.write().push(Zone { position, radius });
        tracing::debug!("death remembered at ({:.1}, {:.1})", position.x, position.z);
    }

    /// Speed multiplier for a sample point: penalized inside any danger
    /// or death zone, 1.0 otherwise.
    pub fn speed_bias(&self, point: Vec3) -> f32 {
        let hazardous =
            self.inner.danger.read().contains(point) || self.inner.deaths.read().contains(point);
        if hazardous {
            self.inner.settings.danger_penalty
        } else {
            1.0
        }
    }

    /// Whether the point lies in a remembered stuck spot.
    pub fn near_stuck_spot(&self, point: Vec3) -> bool {
        self.inner.stuck.read().contains(point)
    }

    /// Entry counts per ring: (danger, stuck, deaths).
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.inner.danger.read().len(),
            self.inner.stuck.read().len(),
            self.inner.deaths.read().len(),
        )
    }
}
