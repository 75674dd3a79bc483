//! Speed governor.
//!
//! Produces a target speed in [0, 1] as a product of independent
//! penalty factors, so simultaneous hazards compound multiplicatively
//! and the command can never go negative. The commanded speed is
//! low-pass filtered toward the target with separate acceleration and
//! deceleration rates; snapping the throttle would itself look like a
//! stuck vehicle to the recovery machine.

use std::f32::consts::PI;

use crate::config::GovernorConfig;
use crate::planning::Spline;

/// Per-tick inputs sampled by the driver.
#[derive(Clone, Copy, Debug)]
pub struct GovernorInputs {
    /// Signed heading error toward the carrot, radians.
    pub heading_error: f32,
    /// Distance to the nearest blocking obstacle ahead, if any.
    pub obstacle_distance: Option<f32>,
    /// Remaining distance to the final destination.
    pub distance_to_goal: f32,
    /// Speed bias from the shared danger/death memory.
    pub danger_bias: f32,
    /// Speed multiplier for the surface under the vehicle. Values above
    /// 1.0 (road bonus) are allowed; the final product is clamped.
    pub terrain_multiplier: f32,
}

/// Curvature-, obstacle- and terrain-aware speed controller.
pub struct SpeedGovernor {
    config: GovernorConfig,
    current: f32,
}

impl SpeedGovernor {
    /// Create a governor with configuration.
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            config,
            current: 0.0,
        }
    }

    /// Current filtered speed in [0, 1].
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Reset the filtered speed (new goal or recovery exit).
    pub fn reset(&mut self) {
        self.current = 0.0;
    }

    /// Compute the unfiltered target speed for this tick.
    pub fn target_speed(&self, inputs: &GovernorInputs, spline: &Spline, cursor: usize) -> f32 {
        let heading = self.heading_factor(inputs.heading_error);
        let curvature = self.curvature_factor(spline, cursor);
        let obstacle = self.obstacle_factor(inputs.obstacle_distance);
        let arrival = self.arrival_factor(inputs.distance_to_goal);

        let target = heading
            * curvature
            * obstacle
            * arrival
            * inputs.danger_bias
            * inputs.terrain_multiplier;

        tracing::trace!(
            "governor: heading={:.2} curve={:.2} obstacle={:.2} arrival={:.2} danger={:.2} terrain={:.2} -> {:.2}",
            heading,
            curvature,
            obstacle,
            arrival,
            inputs.danger_bias,
            inputs.terrain_multiplier,
            target
        );

        target.clamp(0.0, 1.0)
    }

    /// Filter the commanded speed toward `target`.
    pub fn update(&mut self, target: f32, dt: f32) -> f32 {
        if target > self.current {
            self.current = (self.current + self.config.accel_rate * dt).min(target);
        } else {
            self.current = (self.current - self.config.decel_rate * dt).max(target);
        }
        self.current = self.current.clamp(0.0, 1.0);
        self.current
    }

    /// Immediate heading sharpness: full speed straight ahead, strongly
    /// reduced when pointing away from the carrot.
    fn heading_factor(&self, heading_error: f32) -> f32 {
        1.0 - 0.8 * (heading_error.abs() / PI).clamp(0.0, 1.0)
    }

    /// Upcoming path curvature, sampled over a fixed forward distance
    /// with closer bends weighted more heavily.
    fn curvature_factor(&self, spline: &Spline, cursor: usize) -> f32 {
        if spline.points.len() < 3 || cursor + 2 >= spline.points.len() {
            return 1.0;
        }

        let mut weighted = 0.0;
        let mut travelled = 0.0;
        let mut i = cursor;

        while i + 2 < spline.points.len() && travelled < self.config.curvature_distance {
            let a = spline.points[i];
            let b = spline.points[i + 1];
            let c = spline.points[i + 2];

            let ab = a.yaw_to(&b);
            let bc = b.yaw_to(&c);
            let bend = crate::utils::normalize_angle(bc - ab).abs();

            let weight = 1.0 / (1.0 + travelled);
            weighted += bend * weight;

            travelled += a.horizontal_distance(&b);
            i += 1;
        }

        1.0 / (1.0 + self.config.curvature_weight * weighted)
    }

    /// Proximity to the nearest detected obstacle ahead.
    fn obstacle_factor(&self, obstacle_distance: Option<f32>) -> f32 {
        match obstacle_distance {
            None => 1.0,
            Some(d) if d <= self.config.obstacle_stop_radius => 0.0,
            Some(d) => ((d - self.config.obstacle_stop_radius)
                / (self.config.obstacle_slow_radius - self.config.obstacle_stop_radius))
                .clamp(0.0, 1.0),
        }
    }

    /// Arrival deceleration toward the final destination.
    fn arrival_factor(&self, distance_to_goal: f32) -> f32 {
        if distance_to_goal <= self.config.stop_radius {
            return 0.0;
        }
        ((distance_to_goal - self.config.stop_radius)
            / (self.config.arrival_radius - self.config.stop_radius))
            .clamp(0.0, 1.0)
    }
}
