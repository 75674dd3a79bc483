//! Pursuit steering controller.
//!
//! Each tick the controller advances a monotonic cursor to the closest
//! spline point inside a bounded forward window, walks ahead by a
//! speed-scaled look-ahead distance to place the carrot, and converts
//! the heading error toward the carrot into a bounded turn command.
//! Faster vehicles look farther ahead, which smooths high-speed turns
//! while keeping low-speed maneuvers tight.

use crate::config::SteeringConfig;
use crate::planning::Spline;
use crate::types::{Pose, Vec3};
use crate::utils::normalize_angle;

/// One tick of steering output.
#[derive(Clone, Copy, Debug)]
pub struct SteeringCommand {
    /// Turn command in [-1, 1].
    pub turn: f32,
    /// Signed heading error toward the carrot, radians.
    pub heading_error: f32,
    /// The look-ahead point being pursued.
    pub carrot: Vec3,
    /// True when the heading error demands a pivot instead of an arc.
    pub turn_in_place: bool,
}

/// Pursuit ("carrot") steering controller.
pub struct PursuitController {
    config: SteeringConfig,
    cursor: usize,
}

impl PursuitController {
    /// Create a controller with configuration.
    pub fn new(config: SteeringConfig) -> Self {
        Self { config, cursor: 0 }
    }

    /// Current cursor index into the spline. Monotonically non-decreasing
    /// for a fixed spline.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reset the cursor for a new spline.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Compute the steering command for the current pose.
    ///
    /// `speed` is the current normalized speed in [0, 1] and scales the
    /// look-ahead distance.
    pub fn steer(&mut self, pose: Pose, spline: &Spline, speed: f32) -> SteeringCommand {
        if spline.points.is_empty() {
            return SteeringCommand {
                turn: 0.0,
                heading_error: 0.0,
                carrot: pose.position,
                turn_in_place: false,
            };
        }

        self.advance_cursor(pose.position, spline);
        let carrot = self.find_carrot(spline, speed);

        let target_yaw = pose.position.yaw_to(&carrot);
        let heading_error = normalize_angle(target_yaw - pose.yaw);

        let turn = (heading_error / self.config.full_turn_error).clamp(-1.0, 1.0);
        let turn_in_place = heading_error.abs() > self.config.pivot_threshold;

        if turn_in_place {
            tracing::debug!(
                "pivot: heading error {:.1} deg exceeds threshold",
                heading_error.to_degrees()
            );
        }

        SteeringCommand {
            turn,
            heading_error,
            carrot,
            turn_in_place,
        }
    }

    /// Advance the cursor to the closest spline point within the forward
    /// window. Never regresses.
    fn advance_cursor(&mut self, position: Vec3, spline: &Spline) {
        if spline.points.is_empty() {
            return;
        }
        let start = self.cursor.min(spline.points.len() - 1);
        let end = (start + self.config.cursor_window).min(spline.points.len());

        let mut best = start;
        let mut best_distance = f32::MAX;
        for (i, point) in spline.points[start..end].iter().enumerate() {
            let d = position.horizontal_distance(point);
            if d < best_distance {
                best_distance = d;
                best = start + i;
            }
        }

        self.cursor = best.max(self.cursor);
    }

    /// Walk forward from the cursor accumulating arc length until the
    /// look-ahead distance is reached.
    fn find_carrot(&self, spline: &Spline, speed: f32) -> Vec3 {
        let lookahead = (self.config.min_lookahead + speed * self.config.lookahead_gain)
            .clamp(self.config.min_lookahead, self.config.max_lookahead);

        let mut accumulated = 0.0;
        let mut index = self.cursor.min(spline.points.len() - 1);

        while index + 1 < spline.points.len() && accumulated < lookahead {
            accumulated += spline.points[index].horizontal_distance(&spline.points[index + 1]);
            index += 1;
        }

        spline.points[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_spline(length: f32, spacing: f32) -> Spline {
        let steps = (length / spacing) as usize;
        let points: Vec<Vec3> = (0..=steps)
            .map(|i| Vec3::new(0.0, 0.0, i as f32 * spacing))
            .collect();
        let total_length = length;
        Spline {
            points,
            total_length,
        }
    }

    #[test]
    fn test_straight_line_turn_converges_to_zero() {
        let spline = straight_spline(100.0, 2.0);
        let mut controller = PursuitController::new(SteeringConfig::default());

        let pose = Pose::new(Vec3::ZERO, 0.0);
        let cmd = controller.steer(pose, &spline, 1.0);

        assert!(cmd.turn.abs() < 0.05);
        assert!(!cmd.turn_in_place);
    }

    #[test]
    fn test_cursor_monotonic() {
        let spline = straight_spline(100.0, 2.0);
        let mut controller = PursuitController::new(SteeringConfig::default());

        let mut last_cursor = 0;
        for i in 0..40 {
            // Drive forward, with a deliberate backward jitter halfway.
            let z = if i == 20 { 10.0 } else { i as f32 * 2.0 };
            let pose = Pose::new(Vec3::new(0.0, 0.0, z), 0.0);
            controller.steer(pose, &spline, 0.5);
            assert!(
                controller.cursor() >= last_cursor,
                "cursor regressed at tick {}",
                i
            );
            last_cursor = controller.cursor();
        }
    }

    #[test]
    fn test_lookahead_scales_with_speed() {
        let spline = straight_spline(100.0, 2.0);
        let config = SteeringConfig::default();

        let mut slow = PursuitController::new(config.clone());
        let mut fast = PursuitController::new(config);

        let pose = Pose::new(Vec3::ZERO, 0.0);
        let slow_cmd = slow.steer(pose, &spline, 0.0);
        let fast_cmd = fast.steer(pose, &spline, 1.0);

        assert!(fast_cmd.carrot.z > slow_cmd.carrot.z);
    }

    #[test]
    fn test_large_heading_error_requests_pivot() {
        let spline = straight_spline(100.0, 2.0);
        let mut controller = PursuitController::new(SteeringConfig::default());

        // Facing backward relative to the path.
        let pose = Pose::new(Vec3::ZERO, std::f32::consts::PI);
        let cmd = controller.steer(pose, &spline, 0.2);

        assert!(cmd.turn_in_place);
        assert!((cmd.turn.abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_carrot_clamps_to_spline_end() {
        let spline = straight_spline(8.0, 2.0);
        let mut controller = PursuitController::new(SteeringConfig::default());

        let pose = Pose::new(Vec3::new(0.0, 0.0, 6.0), 0.0);
        let cmd = controller.steer(pose, &spline, 1.0);

        assert_eq!(cmd.carrot, Vec3::new(0.0, 0.0, 8.0));
    }
}
