//! Query port to the physics/mesh substrate.
//!
//! All collision and route queries the engine issues go through the
//! [`WorldPort`] trait so steering and verification logic can be tested
//! against a deterministic fake world. Every query is synchronous and
//! completes within the tick that issues it.

use crate::types::{ActorId, Vec3};

/// Surface category under a sample point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Paved or otherwise preferred surface.
    Road,
    /// Ordinary traversable ground.
    Normal,
    /// Traversable but slow (mud, rubble, deep sand).
    OffRoad,
    /// Not traversable at speed (water, lava, void).
    Impassable,
}

/// Vehicle physical envelope used in collision queries.
#[derive(Clone, Copy, Debug)]
pub struct Footprint {
    /// Hull width in world units.
    pub width: f32,
    /// Hull height above the ground.
    pub height: f32,
    /// Extra clearance added to the hull width for sweeps and overlaps.
    pub safety_margin: f32,
}

impl Footprint {
    /// Effective half-width including the safety margin.
    #[inline]
    pub fn half_width(&self) -> f32 {
        (self.width + self.safety_margin) * 0.5
    }
}

/// Description of a collision shape returned by overlap and sweep queries.
///
/// Carries exactly what the collision classifier needs: ownership,
/// trigger-ness, rough extents and the naming hint used for terrain
/// detection.
#[derive(Clone, Debug)]
pub struct ShapeInfo {
    /// Stable shape identity.
    pub id: u64,
    /// Owning actor, if the shape belongs to one.
    pub owner: Option<ActorId>,
    /// Trigger volumes never block movement.
    pub is_trigger: bool,
    /// Half-extents of the shape's bounding box.
    pub half_extents: Vec3,
    /// Shape or material name as exported by the level (lowercased).
    pub name: String,
    /// Whether the owning actor has its own autonomous or player driver.
    pub has_driver: bool,
}

/// Result of a swept-footprint query.
#[derive(Clone, Debug)]
pub struct SweepHit {
    /// Distance along the sweep direction to the first contact.
    pub distance: f32,
    /// The shape that was hit.
    pub shape: ShapeInfo,
}

/// Synchronous query interface to the engine's world substrate.
pub trait WorldPort {
    /// Snap a point to the nearest walkable surface within `radius`.
    fn snap_to_surface(&self, point: Vec3, radius: f32) -> Option<Vec3>;

    /// Request a corner-to-corner route on the walkable-surface graph.
    fn corner_path(&self, origin: Vec3, destination: Vec3) -> Option<Vec<Vec3>>;

    /// Sweep the footprint from `origin` along `direction` for `distance`.
    /// Returns the first contact, blocking or not; the caller classifies.
    fn sweep(
        &self,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
        footprint: &Footprint,
    ) -> Option<SweepHit>;

    /// All shapes overlapping the footprint placed at `center`.
    fn overlap(&self, center: Vec3, footprint: &Footprint) -> Vec<ShapeInfo>;

    /// Classify the surface under a sample point.
    fn classify_surface(&self, point: Vec3) -> SurfaceKind;
}
