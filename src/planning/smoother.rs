//! Path smoother.
//!
//! Converts the verified polyline into a dense, drivable spline using a
//! Catmull-Rom 4-point blend per segment, subdivided by arc length so
//! point spacing stays near the configured target regardless of corner
//! spacing. Steering and speed control then operate on smooth curvature
//! instead of waypoint kinks.

use crate::types::Vec3;

use super::verifier::VerifiedPath;

/// Dense point sequence the pursuit controller follows.
#[derive(Clone, Debug)]
pub struct Spline {
    pub points: Vec<Vec3>,
    /// Total arc length in the ground plane.
    pub total_length: f32,
}

impl Spline {
    /// Arc length from the point at `index` to the end of the spline.
    pub fn remaining_from(&self, index: usize) -> f32 {
        if index + 1 >= self.points.len() {
            return 0.0;
        }
        self.points[index..]
            .windows(2)
            .map(|w| w[0].horizontal_distance(&w[1]))
            .sum()
    }

    /// Final point of the spline.
    pub fn end(&self) -> Option<Vec3> {
        self.points.last().copied()
    }
}

/// Catmull-Rom path smoother.
pub struct PathSmoother {
    spacing: f32,
}

impl PathSmoother {
    /// Create a smoother with the given target point spacing.
    pub fn new(spacing: f32) -> Self {
        Self { spacing }
    }

    /// Smooth a verified path into a spline.
    pub fn smooth(&self, path: &VerifiedPath) -> Spline {
        let pts = &path.points;
        if pts.len() < 2 {
            return Spline {
                points: pts.clone(),
                total_length: 0.0,
            };
        }

        let n = pts.len();
        let mut out: Vec<Vec3> = Vec::new();

        for i in 0..n - 1 {
            let p0 = pts[i.saturating_sub(1)];
            let p1 = pts[i];
            let p2 = pts[i + 1];
            let p3 = pts[(i + 2).min(n - 1)];

            let length = p1.horizontal_distance(&p2);
            let steps = (length / self.spacing).round().max(1.0) as usize;

            for k in 0..steps {
                let t = k as f32 / steps as f32;
                out.push(catmull_rom(p0, p1, p2, p3, t));
            }
        }
        out.push(pts[n - 1]);

        let total_length = out
            .windows(2)
            .map(|w| w[0].horizontal_distance(&w[1]))
            .sum();

        tracing::debug!(
            "smoothed {} waypoints into {} spline points, {:.1} units",
            n,
            out.len(),
            total_length
        );

        Spline {
            points: out,
            total_length,
        }
    }
}

/// Standard Catmull-Rom blend of four control points.
#[inline]
fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    (p1 * 2.0
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}
