//! Collision classifier.
//!
//! Decides whether a detected collision shape actually blocks the
//! vehicle. Every physical verification query funnels through here; a
//! wrong answer produces either a phantom wall or a tank driving through
//! real geometry, so the precedence order below is an invariant.

use crate::types::ActorId;
use crate::world::ShapeInfo;

/// Why a shape was judged ignorable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Trigger volumes never block.
    Trigger,
    /// Our own hull or attachments.
    SelfShape,
    /// Very large, nearly flat geometry is ground.
    FlatTerrain,
    /// Named as terrain/ground/floor/road by the level.
    NamedTerrain,
    /// Another driven vehicle or player; it will move out of the way.
    MobileActor,
}

/// Classification of a detected obstruction. Transient, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Obstruction {
    Ignorable(IgnoreReason),
    Blocking,
}

impl Obstruction {
    #[inline]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Obstruction::Blocking)
    }
}

/// Name fragments the level uses for walkable geometry.
const TERRAIN_NAMES: [&str; 4] = ["terrain", "ground", "floor", "road"];

/// Shapes wider than this with a low profile are treated as ground.
const FLAT_MIN_EXTENT: f32 = 40.0;
/// Maximum half-height for the flat-terrain rule.
const FLAT_MAX_HEIGHT: f32 = 1.0;

/// Classify a collision shape against the vehicle identified by `self_id`.
///
/// Precedence (first match wins): trigger, self, large flat geometry,
/// terrain naming, mobile actor, blocking.
pub fn classify(shape: &ShapeInfo, self_id: ActorId) -> Obstruction {
    if shape.is_trigger {
        return Obstruction::Ignorable(IgnoreReason::Trigger);
    }

    if shape.owner == Some(self_id) {
        return Obstruction::Ignorable(IgnoreReason::SelfShape);
    }

    let horizontal = shape.half_extents.x.max(shape.half_extents.z);
    if horizontal >= FLAT_MIN_EXTENT && shape.half_extents.y <= FLAT_MAX_HEIGHT {
        return Obstruction::Ignorable(IgnoreReason::FlatTerrain);
    }

    if TERRAIN_NAMES.iter().any(|n| shape.name.contains(n)) {
        return Obstruction::Ignorable(IgnoreReason::NamedTerrain);
    }

    if shape.has_driver {
        return Obstruction::Ignorable(IgnoreReason::MobileActor);
    }

    Obstruction::Blocking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    fn shape(name: &str) -> ShapeInfo {
        ShapeInfo {
            id: 1,
            owner: None,
            is_trigger: false,
            half_extents: Vec3::new(2.0, 2.0, 2.0),
            name: name.to_string(),
            has_driver: false,
        }
    }

    #[test]
    fn test_plain_shape_blocks() {
        let s = shape("crate_big");
        assert_eq!(classify(&s, ActorId(7)), Obstruction::Blocking);
    }

    #[test]
    fn test_trigger_beats_everything() {
        let mut s = shape("wall");
        s.is_trigger = true;
        s.has_driver = true;
        assert_eq!(
            classify(&s, ActorId(7)),
            Obstruction::Ignorable(IgnoreReason::Trigger)
        );
    }

    #[test]
    fn test_self_shape_ignored() {
        let mut s = shape("hull");
        s.owner = Some(ActorId(7));
        assert_eq!(
            classify(&s, ActorId(7)),
            Obstruction::Ignorable(IgnoreReason::SelfShape)
        );
    }

    #[test]
    fn test_other_owner_not_self() {
        let mut s = shape("hull");
        s.owner = Some(ActorId(8));
        assert_eq!(classify(&s, ActorId(7)), Obstruction::Blocking);
    }

    #[test]
    fn test_large_flat_is_ground() {
        let mut s = shape("unnamed_mesh");
        s.half_extents = Vec3::new(120.0, 0.5, 120.0);
        assert_eq!(
            classify(&s, ActorId(7)),
            Obstruction::Ignorable(IgnoreReason::FlatTerrain)
        );
    }

    #[test]
    fn test_large_but_tall_blocks() {
        let mut s = shape("unnamed_mesh");
        s.half_extents = Vec3::new(120.0, 6.0, 120.0);
        assert_eq!(classify(&s, ActorId(7)), Obstruction::Blocking);
    }

    #[test]
    fn test_terrain_name_ignored() {
        for name in ["terrain_03", "ground_plane", "floor_mesh", "road_main"] {
            assert_eq!(
                classify(&shape(name), ActorId(7)),
                Obstruction::Ignorable(IgnoreReason::NamedTerrain)
            );
        }
    }

    #[test]
    fn test_driven_vehicle_ignored() {
        let mut s = shape("tank_hull");
        s.owner = Some(ActorId(8));
        s.has_driver = true;
        assert_eq!(
            classify(&s, ActorId(7)),
            Obstruction::Ignorable(IgnoreReason::MobileActor)
        );
    }

    #[test]
    fn test_precedence_name_before_driver() {
        // A driven shape named as road still classifies by name first.
        let mut s = shape("road_segment");
        s.has_driver = true;
        assert_eq!(
            classify(&s, ActorId(7)),
            Obstruction::Ignorable(IgnoreReason::NamedTerrain)
        );
    }
}
