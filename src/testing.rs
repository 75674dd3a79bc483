//! Deterministic fake world for unit tests.
//!
//! Implements [`WorldPort`] over axis-aligned box obstacles on a flat
//! ground plane. Corner paths are straight lines, surfaces default to
//! `Normal` and can be painted per region. Sweeps march in fixed steps
//! so results are fully deterministic.

use crate::types::{ActorId, Vec3};
use crate::world::{Footprint, ShapeInfo, SurfaceKind, SweepHit, WorldPort};

/// Install a tracing subscriber for test runs. Safe to call from every
/// test; only the first call wins. Filtering follows `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One box obstacle with the metadata the classifier inspects.
#[derive(Clone, Debug)]
pub struct Box3 {
    pub min: Vec3,
    pub max: Vec3,
    pub name: String,
    pub owner: Option<ActorId>,
    pub is_trigger: bool,
    pub has_driver: bool,
}

impl Box3 {
    fn contains_xz(&self, p: Vec3, inflate: f32) -> bool {
        p.x >= self.min.x - inflate
            && p.x <= self.max.x + inflate
            && p.z >= self.min.z - inflate
            && p.z <= self.max.z + inflate
    }

    fn shape_info(&self, id: u64) -> ShapeInfo {
        ShapeInfo {
            id,
            owner: self.owner,
            is_trigger: self.is_trigger,
            half_extents: Vec3::new(
                (self.max.x - self.min.x) * 0.5,
                (self.max.y - self.min.y) * 0.5,
                (self.max.z - self.min.z) * 0.5,
            ),
            name: self.name.clone(),
            has_driver: self.has_driver,
        }
    }
}

/// Deterministic world double.
pub struct FakeWorld {
    boxes: Vec<Box3>,
    surfaces: Vec<(Vec3, Vec3, SurfaceKind)>,
    has_walkable_surface: bool,
    sweep_step: f32,
}

impl FakeWorld {
    /// Flat, empty, fully walkable world.
    pub fn flat() -> Self {
        Self {
            boxes: Vec::new(),
            surfaces: Vec::new(),
            has_walkable_surface: true,
            sweep_step: 0.25,
        }
    }

    /// World where nothing snaps to a walkable surface.
    pub fn void() -> Self {
        let mut world = Self::flat();
        world.has_walkable_surface = false;
        world
    }

    /// Add a static blocking wall.
    pub fn add_wall(&mut self, min: Vec3, max: Vec3) {
        self.boxes.push(Box3 {
            min,
            max,
            name: "wall".to_string(),
            owner: None,
            is_trigger: false,
            has_driver: false,
        });
    }

    /// Add an arbitrary box shape.
    pub fn add_box(&mut self, b: Box3) {
        self.boxes.push(b);
    }

    /// Paint a rectangular surface region (XZ extents of min/max).
    pub fn paint_surface(&mut self, min: Vec3, max: Vec3, kind: SurfaceKind) {
        self.surfaces.push((min, max, kind));
    }
}

impl WorldPort for FakeWorld {
    fn snap_to_surface(&self, point: Vec3, _radius: f32) -> Option<Vec3> {
        if self.has_walkable_surface {
            Some(Vec3::new(point.x, 0.0, point.z))
        } else {
            None
        }
    }

    fn corner_path(&self, origin: Vec3, destination: Vec3) -> Option<Vec<Vec3>> {
        if !self.has_walkable_surface {
            return None;
        }
        Some(vec![
            Vec3::new(origin.x, 0.0, origin.z),
            Vec3::new(destination.x, 0.0, destination.z),
        ])
    }

    fn sweep(
        &self,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
        footprint: &Footprint,
    ) -> Option<SweepHit> {
        let dir = direction.normalize();
        let inflate = footprint.half_width();
        let mut travelled = 0.0;

        while travelled <= distance {
            let p = origin + dir * travelled;
            for (i, b) in self.boxes.iter().enumerate() {
                if b.contains_xz(p, inflate) {
                    return Some(SweepHit {
                        distance: travelled,
                        shape: b.shape_info(i as u64),
                    });
                }
            }
            travelled += self.sweep_step;
        }

        None
    }

    fn overlap(&self, center: Vec3, footprint: &Footprint) -> Vec<ShapeInfo> {
        let inflate = footprint.half_width();
        self.boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.contains_xz(center, inflate))
            .map(|(i, b)| b.shape_info(i as u64))
            .collect()
    }

    fn classify_surface(&self, point: Vec3) -> SurfaceKind {
        for (min, max, kind) in self.surfaces.iter().rev() {
            if point.x >= min.x && point.x <= max.x && point.z >= min.z && point.z <= max.z {
                return *kind;
            }
        }
        SurfaceKind::Normal
    }
}
