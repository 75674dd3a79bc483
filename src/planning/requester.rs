//! Path requester.
//!
//! Asks the external walkable-surface graph for a corner-to-corner
//! route. Origin, destination and any via points are snapped onto the
//! graph first; a snap or routing failure is reported as
//! `NoWalkableSurface` and never retried here.

use crate::error::{NavError, Result};
use crate::types::Vec3;
use crate::world::WorldPort;

/// One route request. Consumed once, discarded after a verified path is
/// produced or the request fails.
#[derive(Clone, Debug)]
pub struct RouteRequest {
    pub origin: Vec3,
    pub destination: Vec3,
    /// Optional intermediate points the route must pass through.
    pub via: Vec<Vec3>,
}

impl RouteRequest {
    /// Direct request with no via points.
    pub fn direct(origin: Vec3, destination: Vec3) -> Self {
        Self {
            origin,
            destination,
            via: Vec::new(),
        }
    }

    /// Request routed through one intermediate point.
    pub fn through(origin: Vec3, via: Vec3, destination: Vec3) -> Self {
        Self {
            origin,
            destination,
            via: vec![via],
        }
    }
}

/// Raw polyline from the walkable-surface graph, before verification.
#[derive(Clone, Debug)]
pub struct CornerPath {
    pub waypoints: Vec<Vec3>,
}

impl CornerPath {
    /// Total polyline length in the ground plane.
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|w| w[0].horizontal_distance(&w[1]))
            .sum()
    }
}

/// Requests corner paths from the walkable-surface graph.
pub struct PathRequester {
    snap_radius: f32,
}

impl PathRequester {
    /// Create a requester with the given snap search radius.
    pub fn new(snap_radius: f32) -> Self {
        Self { snap_radius }
    }

    /// Resolve a route request into a corner path.
    pub fn request(&self, world: &dyn WorldPort, request: &RouteRequest) -> Result<CornerPath> {
        let mut anchors = Vec::with_capacity(request.via.len() + 2);
        anchors.push(self.snap(world, request.origin)?);
        for &via in &request.via {
            anchors.push(self.snap(world, via)?);
        }
        anchors.push(self.snap(world, request.destination)?);

        let mut waypoints: Vec<Vec3> = Vec::new();
        for leg in anchors.windows(2) {
            let segment = world
                .corner_path(leg[0], leg[1])
                .ok_or(NavError::NoWalkableSurface)?;
            // Drop the duplicated joint between legs.
            let skip = usize::from(!waypoints.is_empty());
            waypoints.extend(segment.into_iter().skip(skip));
        }

        if waypoints.len() < 2 {
            return Err(NavError::NoWalkableSurface);
        }

        tracing::debug!(
            "corner path: {} waypoints, {:.1} units",
            waypoints.len(),
            CornerPath {
                waypoints: waypoints.clone()
            }
            .length()
        );

        Ok(CornerPath { waypoints })
    }

    fn snap(&self, world: &dyn WorldPort, point: Vec3) -> Result<Vec3> {
        world
            .snap_to_surface(point, self.snap_radius)
            .ok_or(NavError::NoWalkableSurface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWorld;

    #[test]
    fn test_direct_request() {
        let world = FakeWorld::flat();
        let requester = PathRequester::new(20.0);

        let path = requester
            .request(
                &world,
                &RouteRequest::direct(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0)),
            )
            .unwrap();

        assert_eq!(path.waypoints.len(), 2);
        assert!((path.length() - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_no_surface_fails() {
        let world = FakeWorld::void();
        let requester = PathRequester::new(20.0);

        let result = requester.request(
            &world,
            &RouteRequest::direct(Vec3::ZERO, Vec3::new(0.0, 0.0, 100.0)),
        );
        assert!(matches!(result, Err(NavError::NoWalkableSurface)));
    }

    #[test]
    fn test_via_point_concatenates_legs() {
        let world = FakeWorld::flat();
        let requester = PathRequester::new(20.0);

        let path = requester
            .request(
                &world,
                &RouteRequest::through(
                    Vec3::ZERO,
                    Vec3::new(30.0, 0.0, 50.0),
                    Vec3::new(0.0, 0.0, 100.0),
                ),
            )
            .unwrap();

        // Two legs of two waypoints each, sharing the via point.
        assert_eq!(path.waypoints.len(), 3);
        assert!((path.waypoints[1].x - 30.0).abs() < 1e-6);
        assert!(path.length() > 100.0);
    }
}
