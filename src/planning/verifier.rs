//! Path verifier.
//!
//! Walks a corner path at fixed spacing and confirms, through swept
//! footprint queries, that the vehicle's hull can actually occupy and
//! traverse each segment. A failed segment triggers a local detour
//! search instead of a full replan; an exhausted search truncates the
//! path to the prefix accepted so far.

use crate::classifier::classify;
use crate::config::{PlanningConfig, VehicleConfig};
use crate::error::{NavError, Result};
use crate::types::{ActorId, Vec3};
use crate::world::{Footprint, WorldPort};

use super::requester::CornerPath;

/// Polyline whose consecutive points are mutually traversable by a
/// straight physical sweep of the vehicle's footprint.
#[derive(Clone, Debug)]
pub struct VerifiedPath {
    pub points: Vec<Vec3>,
    /// False when verification truncated the corner path partway; the
    /// goal is unreachable past this prefix.
    pub reached_end: bool,
}

impl VerifiedPath {
    /// Final point of the verified prefix.
    pub fn end(&self) -> Vec3 {
        *self.points.last().expect("verified path is never empty")
    }
}

/// Outcome of a detour search around one failed candidate.
struct Detour {
    /// One point for a direct bypass, two for a dog-leg.
    points: Vec<Vec3>,
    /// Whether the original candidate is reachable again from the bypass.
    reconnects: bool,
}

/// Physically verifies corner paths for one vehicle.
pub struct PathVerifier {
    planning: PlanningConfig,
    footprint: Footprint,
    low_band: f32,
    high_band: f32,
    self_id: ActorId,
}

impl PathVerifier {
    /// Create a verifier for the vehicle described by `vehicle`.
    pub fn new(planning: PlanningConfig, vehicle: &VehicleConfig, self_id: ActorId) -> Self {
        Self {
            planning,
            footprint: Footprint {
                width: vehicle.hull_width,
                height: vehicle.hull_height,
                safety_margin: vehicle.safety_margin,
            },
            low_band: vehicle.low_band,
            high_band: vehicle.high_band,
            self_id,
        }
    }

    /// Verify a corner path starting from the vehicle's position.
    ///
    /// `rejected` lists failed-segment positions from earlier recoveries;
    /// detour probes near them are skipped. A prefix of fewer than two
    /// points is `PathVerificationFailed`.
    pub fn verify(
        &self,
        world: &dyn WorldPort,
        start: Vec3,
        corner: &CornerPath,
        rejected: &[Vec3],
    ) -> Result<VerifiedPath> {
        let candidates = self.densify(&corner.waypoints);

        let mut points = vec![start];
        let mut reached_end = true;

        for (candidate, tangent) in candidates {
            let last = *points.last().expect("non-empty");
            if candidate.horizontal_distance(&last) < 0.5 {
                continue;
            }

            // The vehicle already occupies the space near itself.
            if candidate.horizontal_distance(&start) <= self.planning.skip_radius {
                points.push(candidate);
                continue;
            }

            if self.occupiable(world, candidate) && self.reachable(world, last, candidate) {
                points.push(candidate);
                continue;
            }

            match self.search_detour(world, last, candidate, tangent, rejected) {
                Some(detour) => {
                    tracing::debug!(
                        "detour at ({:.1}, {:.1}) via {} point(s), reconnects={}",
                        candidate.x,
                        candidate.z,
                        detour.points.len(),
                        detour.reconnects
                    );
                    points.extend(detour.points);
                    if detour.reconnects {
                        points.push(candidate);
                    }
                }
                None => {
                    tracing::warn!(
                        "detour exhausted at ({:.1}, {:.1}), truncating path",
                        candidate.x,
                        candidate.z
                    );
                    reached_end = false;
                    break;
                }
            }
        }

        if points.len() < 2 {
            return Err(NavError::PathVerificationFailed);
        }

        Ok(VerifiedPath { points, reached_end })
    }

    /// Whether the footprint can sit at `point` without intersecting a
    /// blocking shape, on a surface that is at least nominally drivable.
    pub fn occupiable(&self, world: &dyn WorldPort, point: Vec3) -> bool {
        use crate::world::SurfaceKind;

        if world.classify_surface(point) == SurfaceKind::Impassable {
            return false;
        }

        world
            .overlap(point, &self.footprint)
            .iter()
            .all(|shape| !classify(shape, self.self_id).is_blocking())
    }

    /// Whether a straight footprint sweep from `from` to `to` is clear of
    /// blocking shapes at both height bands.
    pub fn reachable(&self, world: &dyn WorldPort, from: Vec3, to: Vec3) -> bool {
        let distance = from.horizontal_distance(&to);
        if distance < 1e-3 {
            return true;
        }
        let direction = (to - from).normalize();

        for band in [self.low_band, self.high_band] {
            let origin = Vec3::new(from.x, from.y + band, from.z);
            if self
                .blocking_hit_distance(world, origin, direction, distance)
                .is_some()
            {
                return false;
            }
        }
        true
    }

    /// First blocking contact along a sweep. A sweep reports only the
    /// nearest shape, so an ignorable hit (trigger, terrain, mobile
    /// actor) shadows everything behind it; from that point on the rest
    /// of the segment is marched with overlap queries instead. The
    /// stride stays under the footprint inflation, so no inflated
    /// blocking region can fall between two samples.
    fn blocking_hit_distance(
        &self,
        world: &dyn WorldPort,
        origin: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> Option<f32> {
        let hit = world.sweep(origin, direction, distance, &self.footprint)?;
        if classify(&hit.shape, self.self_id).is_blocking() {
            return Some(hit.distance);
        }

        let step = self.footprint.half_width();
        let mut travelled = hit.distance;
        loop {
            let point = origin + direction * travelled;
            let blocked = world
                .overlap(point, &self.footprint)
                .iter()
                .any(|shape| classify(shape, self.self_id).is_blocking());
            if blocked {
                return Some(travelled);
            }
            if travelled >= distance {
                return None;
            }
            travelled = (travelled + step).min(distance);
        }
    }

    /// Probe perpendicular offsets (then offset-and-forward combinations)
    /// around a failed candidate. Offsets follow the corner-path tangent
    /// so probes stay square to the route.
    fn search_detour(
        &self,
        world: &dyn WorldPort,
        last: Vec3,
        candidate: Vec3,
        tangent: Vec3,
        rejected: &[Vec3],
    ) -> Option<Detour> {
        let lateral = tangent.perpendicular();

        // Plain perpendicular offsets first.
        for &magnitude in &self.planning.detour_offsets {
            for side in [1.0f32, -1.0] {
                let shift = lateral * (magnitude * side);
                let probe = candidate + shift;
                if let Some(detour) =
                    self.try_probe(world, last, candidate, probe, shift, rejected)
                {
                    return Some(detour);
                }
            }
        }

        // Offset-and-forward combinations.
        for &forward in &self.planning.detour_forward {
            for &magnitude in &self.planning.detour_offsets {
                for side in [1.0f32, -1.0] {
                    let shift = lateral * (magnitude * side);
                    let probe = candidate + shift + tangent * forward;
                    if let Some(mut detour) =
                        self.try_probe(world, last, candidate, probe, shift, rejected)
                    {
                        // Forward probes are already past the candidate.
                        detour.reconnects = false;
                        return Some(detour);
                    }
                }
            }
        }

        None
    }

    /// Accept `probe` if it is occupiable and reachable from the last
    /// accepted point, either directly or through a dog-leg corner at
    /// `last + shift`.
    fn try_probe(
        &self,
        world: &dyn WorldPort,
        last: Vec3,
        candidate: Vec3,
        probe: Vec3,
        shift: Vec3,
        rejected: &[Vec3],
    ) -> Option<Detour> {
        let near_rejected = rejected
            .iter()
            .any(|r| r.horizontal_distance(&probe) <= self.planning.rejection_radius);
        if near_rejected {
            return None;
        }

        if !self.occupiable(world, probe) {
            return None;
        }

        let points = if self.reachable(world, last, probe) {
            vec![probe]
        } else {
            let corner = last + shift;
            if self.occupiable(world, corner)
                && self.reachable(world, last, corner)
                && self.reachable(world, corner, probe)
            {
                vec![corner, probe]
            } else {
                return None;
            }
        };

        let reconnects =
            self.occupiable(world, candidate) && self.reachable(world, probe, candidate);
        Some(Detour { points, reconnects })
    }

    /// Resample the corner polyline at the configured step spacing,
    /// pairing each candidate with its segment tangent.
    fn densify(&self, waypoints: &[Vec3]) -> Vec<(Vec3, Vec3)> {
        let mut out = Vec::new();
        let spacing = self.planning.step_spacing;

        for pair in waypoints.windows(2) {
            let length = pair[0].horizontal_distance(&pair[1]);
            if length < 1e-3 {
                continue;
            }
            let tangent = (pair[1] - pair[0]).normalize();
            let steps = (length / spacing).ceil().max(1.0) as usize;
            for k in 1..=steps {
                let t = k as f32 / steps as f32;
                out.push((pair[0].lerp(&pair[1], t), tangent));
            }
        }

        out
    }
}
