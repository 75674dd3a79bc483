//! Terrain preference scorer.
//!
//! Biases speed and route choice toward preferred surfaces. The speed
//! side is a plain multiplier consumed by the governor; the route side
//! scores lateral via-point detours through road-classified midpoints
//! against the direct corner path for long routes.

use serde::Deserialize;

use crate::types::Vec3;
use crate::world::{SurfaceKind, WorldPort};

/// Configuration for terrain scoring.
#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    /// Speed bonus on road surfaces, clamped downstream so the final
    /// command never exceeds 1.0 (default: 1.25)
    #[serde(default = "default_road_multiplier")]
    pub road_multiplier: f32,

    /// Baseline multiplier on normal ground (default: 1.0)
    #[serde(default = "default_normal_multiplier")]
    pub normal_multiplier: f32,

    /// Penalty off preferred surfaces (default: 0.6)
    #[serde(default = "default_offroad_multiplier")]
    pub offroad_multiplier: f32,

    /// Severe penalty on impassable surface types (default: 0.05)
    #[serde(default = "default_impassable_multiplier")]
    pub impassable_multiplier: f32,

    /// Routes shorter than this skip detour scoring entirely
    /// (default: 50.0)
    #[serde(default = "default_detour_min_route_length")]
    pub detour_min_route_length: f32,

    /// Lateral offset of candidate via points from the route midpoint
    /// (default: 25.0)
    #[serde(default = "default_detour_probe_offset")]
    pub detour_probe_offset: f32,

    /// Sample spacing when measuring road fraction along a polyline
    /// (default: 5.0)
    #[serde(default = "default_sample_spacing")]
    pub sample_spacing: f32,

    /// Required road-fraction gain, net of extra distance, before a
    /// detour beats the direct route (default: 0.15)
    #[serde(default = "default_detour_gain_threshold")]
    pub detour_gain_threshold: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            road_multiplier: default_road_multiplier(),
            normal_multiplier: default_normal_multiplier(),
            offroad_multiplier: default_offroad_multiplier(),
            impassable_multiplier: default_impassable_multiplier(),
            detour_min_route_length: default_detour_min_route_length(),
            detour_probe_offset: default_detour_probe_offset(),
            sample_spacing: default_sample_spacing(),
            detour_gain_threshold: default_detour_gain_threshold(),
        }
    }
}

fn default_road_multiplier() -> f32 {
    1.25
}
fn default_normal_multiplier() -> f32 {
    1.0
}
fn default_offroad_multiplier() -> f32 {
    0.6
}
fn default_impassable_multiplier() -> f32 {
    0.05
}
fn default_detour_min_route_length() -> f32 {
    50.0
}
fn default_detour_probe_offset() -> f32 {
    25.0
}
fn default_sample_spacing() -> f32 {
    5.0
}
fn default_detour_gain_threshold() -> f32 {
    0.15
}

/// Terrain preference scorer.
pub struct TerrainScorer {
    config: TerrainConfig,
}

impl TerrainScorer {
    /// Create a new scorer with configuration.
    pub fn new(config: TerrainConfig) -> Self {
        Self { config }
    }

    /// Create a new scorer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TerrainConfig::default())
    }

    /// Speed multiplier for a surface category.
    pub fn speed_multiplier(&self, kind: SurfaceKind) -> f32 {
        match kind {
            SurfaceKind::Road => self.config.road_multiplier,
            SurfaceKind::Normal => self.config.normal_multiplier,
            SurfaceKind::OffRoad => self.config.offroad_multiplier,
            SurfaceKind::Impassable => self.config.impassable_multiplier,
        }
    }

    /// Whether a surface category is the preferred kind.
    pub fn on_preferred_surface(&self, kind: SurfaceKind) -> bool {
        kind == SurfaceKind::Road
    }

    /// Fraction of samples along a polyline that sit on road surface.
    pub fn road_fraction(&self, world: &dyn WorldPort, polyline: &[Vec3]) -> f32 {
        let mut samples = 0usize;
        let mut on_road = 0usize;

        for pair in polyline.windows(2) {
            let length = pair[0].horizontal_distance(&pair[1]);
            let steps = (length / self.config.sample_spacing).ceil().max(1.0) as usize;
            for k in 0..steps {
                let t = k as f32 / steps as f32;
                let sample = pair[0].lerp(&pair[1], t);
                samples += 1;
                if world.classify_surface(sample) == SurfaceKind::Road {
                    on_road += 1;
                }
            }
        }

        if samples == 0 {
            0.0
        } else {
            on_road as f32 / samples as f32
        }
    }

    /// For long routes, pick a road-classified via point worth detouring
    /// through, or `None` when the direct route wins.
    ///
    /// Candidates are lateral offsets from the route midpoint. A detour is
    /// accepted only when its road-fraction score, discounted by the extra
    /// distance it adds, beats the direct route by the configured margin.
    pub fn pick_road_via(
        &self,
        world: &dyn WorldPort,
        origin: Vec3,
        destination: Vec3,
    ) -> Option<Vec3> {
        let direct_length = origin.horizontal_distance(&destination);
        if direct_length < self.config.detour_min_route_length {
            return None;
        }

        let direct_score = self.road_fraction(world, &[origin, destination]);

        let midpoint = origin.lerp(&destination, 0.5);
        let lateral = (destination - origin).normalize().perpendicular();

        let mut best: Option<(Vec3, f32)> = None;
        for side in [1.0f32, -1.0] {
            let via = midpoint + lateral * (side * self.config.detour_probe_offset);
            if world.classify_surface(via) != SurfaceKind::Road {
                continue;
            }

            let detour_length =
                origin.horizontal_distance(&via) + via.horizontal_distance(&destination);
            let distance_penalty = (detour_length - direct_length) / direct_length;
            let score =
                self.road_fraction(world, &[origin, via, destination]) - distance_penalty;

            if best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((via, score));
            }
        }

        match best {
            Some((via, score)) if score > direct_score + self.config.detour_gain_threshold => {
                tracing::debug!(
                    "road detour via ({:.1}, {:.1}): score {:.2} vs direct {:.2}",
                    via.x,
                    via.z,
                    score,
                    direct_score
                );
                Some(via)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWorld;

    #[test]
    fn test_speed_multipliers_ordered() {
        let scorer = TerrainScorer::with_defaults();
        assert!(scorer.speed_multiplier(SurfaceKind::Road) > 1.0);
        assert!((scorer.speed_multiplier(SurfaceKind::Normal) - 1.0).abs() < 1e-6);
        assert!(scorer.speed_multiplier(SurfaceKind::OffRoad) < 1.0);
        assert!(scorer.speed_multiplier(SurfaceKind::Impassable) < 0.1);
    }

    #[test]
    fn test_preferred_surface_is_road_only() {
        let scorer = TerrainScorer::with_defaults();
        assert!(scorer.on_preferred_surface(SurfaceKind::Road));
        assert!(!scorer.on_preferred_surface(SurfaceKind::Normal));
        assert!(!scorer.on_preferred_surface(SurfaceKind::OffRoad));
        assert!(!scorer.on_preferred_surface(SurfaceKind::Impassable));
    }

    #[test]
    fn test_road_fraction_all_road() {
        let mut world = FakeWorld::flat();
        world.paint_surface(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, 120.0),
            SurfaceKind::Road,
        );

        let scorer = TerrainScorer::with_defaults();
        let fraction = scorer.road_fraction(
            &world,
            &[Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0)],
        );
        assert!(fraction > 0.99);
    }

    #[test]
    fn test_short_route_never_detours() {
        let world = FakeWorld::flat();
        let scorer = TerrainScorer::with_defaults();
        let via = scorer.pick_road_via(&world, Vec3::ZERO, Vec3::new(0.0, 0.0, 30.0));
        assert!(via.is_none());
    }

    #[test]
    fn test_detour_through_road_strip() {
        let mut world = FakeWorld::flat();
        // Wide road strip parallel to the direct route, offset to +X.
        world.paint_surface(
            Vec3::new(10.0, 0.0, -20.0),
            Vec3::new(40.0, 0.0, 120.0),
            SurfaceKind::Road,
        );

        let scorer = TerrainScorer::with_defaults();
        let via = scorer.pick_road_via(&world, Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0));
        let via = via.expect("expected road detour");
        assert!(via.x > 0.0);
    }
}
