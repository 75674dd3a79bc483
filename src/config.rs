//! Configuration loading for RathaNav

use crate::error::{NavError, Result};
use crate::memory::MemorySettings;
use crate::terrain::TerrainConfig;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub steering: SteeringConfig,
    #[serde(default)]
    pub governor: GovernorConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub memory: MemorySettings,
}

/// Vehicle physical parameters
#[derive(Clone, Debug, Deserialize)]
pub struct VehicleConfig {
    /// Hull width in world units (default: 3.6)
    #[serde(default = "default_hull_width")]
    pub hull_width: f32,

    /// Hull height above ground (default: 2.4)
    #[serde(default = "default_hull_height")]
    pub hull_height: f32,

    /// Extra clearance added to the hull for collision queries (default: 0.6)
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f32,

    /// Lower sweep height band above ground (default: 0.5)
    #[serde(default = "default_low_band")]
    pub low_band: f32,

    /// Upper sweep height band above ground (default: 1.6)
    #[serde(default = "default_high_band")]
    pub high_band: f32,
}

/// Path request, verification and smoothing parameters
#[derive(Clone, Debug, Deserialize)]
pub struct PlanningConfig {
    /// Snap search radius for walkable-surface queries (default: 20.0)
    #[serde(default = "default_snap_radius")]
    pub snap_radius: f32,

    /// Candidate spacing when walking the corner path (default: 3.0)
    #[serde(default = "default_step_spacing")]
    pub step_spacing: f32,

    /// Radius around the vehicle where candidates skip physical checks
    /// (default: 15.0). Known approximation, not load-bearing.
    #[serde(default = "default_skip_radius")]
    pub skip_radius: f32,

    /// Perpendicular detour probe magnitudes (default: [2.5, 5.0, 7.5, 10.0])
    #[serde(default = "default_detour_offsets")]
    pub detour_offsets: Vec<f32>,

    /// Forward shifts tried with each offset when plain offsets fail
    /// (default: [3.0, 6.0])
    #[serde(default = "default_detour_forward")]
    pub detour_forward: Vec<f32>,

    /// Rejected-segment exclusion radius for detour probes (default: 6.0)
    #[serde(default = "default_rejection_radius")]
    pub rejection_radius: f32,

    /// Maximum remembered failed segments (default: 8)
    #[serde(default = "default_max_failed_segments")]
    pub max_failed_segments: usize,

    /// Target point spacing of the smoothed spline (default: 2.0)
    #[serde(default = "default_spline_spacing")]
    pub spline_spacing: f32,

    /// Minimum interval between full replans in time-units (default: 3.0)
    #[serde(default = "default_replan_interval")]
    pub replan_interval: f32,
}

/// Pursuit steering parameters
#[derive(Clone, Debug, Deserialize)]
pub struct SteeringConfig {
    /// Minimum look-ahead distance (default: 6.0)
    #[serde(default = "default_min_lookahead")]
    pub min_lookahead: f32,

    /// Maximum look-ahead distance (default: 20.0)
    #[serde(default = "default_max_lookahead")]
    pub max_lookahead: f32,

    /// Look-ahead growth per unit of normalized speed (default: 10.0)
    #[serde(default = "default_lookahead_gain")]
    pub lookahead_gain: f32,

    /// Heading error producing a full turn command, radians (default: 0.8)
    #[serde(default = "default_full_turn_error")]
    pub full_turn_error: f32,

    /// Heading error beyond which the vehicle pivots in place, radians
    /// (default: 1.2)
    #[serde(default = "default_pivot_threshold")]
    pub pivot_threshold: f32,

    /// Creep throttle while pivoting (default: 0.08)
    #[serde(default = "default_pivot_creep")]
    pub pivot_creep: f32,

    /// Forward window, in spline points, searched when advancing the
    /// cursor (default: 25)
    #[serde(default = "default_cursor_window")]
    pub cursor_window: usize,
}

/// Speed governor parameters
#[derive(Clone, Debug, Deserialize)]
pub struct GovernorConfig {
    /// Forward distance over which curvature is sampled (default: 15.0)
    #[serde(default = "default_curvature_distance")]
    pub curvature_distance: f32,

    /// Curvature penalty weight (default: 4.0)
    #[serde(default = "default_curvature_weight")]
    pub curvature_weight: f32,

    /// Obstacle distance below which speed starts dropping (default: 12.0)
    #[serde(default = "default_obstacle_slow_radius")]
    pub obstacle_slow_radius: f32,

    /// Obstacle distance at which speed reaches zero (default: 2.0)
    #[serde(default = "default_obstacle_stop_radius")]
    pub obstacle_stop_radius: f32,

    /// Distance to goal where arrival deceleration begins (default: 20.0)
    #[serde(default = "default_arrival_radius")]
    pub arrival_radius: f32,

    /// Distance to goal treated as arrived (default: 2.0)
    #[serde(default = "default_stop_radius")]
    pub stop_radius: f32,

    /// Acceleration rate, normalized speed per time-unit (default: 0.8)
    #[serde(default = "default_accel_rate")]
    pub accel_rate: f32,

    /// Deceleration rate, normalized speed per time-unit (default: 2.0)
    #[serde(default = "default_decel_rate")]
    pub decel_rate: f32,
}

/// Stuck detection and recovery parameters
#[derive(Clone, Debug, Deserialize)]
pub struct RecoveryConfig {
    /// Commanded throttle magnitude that arms stuck detection (default: 0.15)
    #[serde(default = "default_throttle_threshold")]
    pub throttle_threshold: f32,

    /// Measured speed below which the vehicle counts as not moving
    /// (default: 0.2)
    #[serde(default = "default_speed_threshold")]
    pub speed_threshold: f32,

    /// Stuck timer threshold in time-units (default: 1.5)
    #[serde(default = "default_stuck_time")]
    pub stuck_time: f32,

    /// Pivot tier duration (default: 1.0)
    #[serde(default = "default_pivot_duration")]
    pub pivot_duration: f32,

    /// Smart reverse tier duration (default: 1.5)
    #[serde(default = "default_reverse_duration")]
    pub reverse_duration: f32,

    /// Extended reverse tier duration (default: 2.5)
    #[serde(default = "default_extended_reverse_duration")]
    pub extended_reverse_duration: f32,

    /// Reverse throttle used by reverse tiers (default: 0.6)
    #[serde(default = "default_reverse_throttle")]
    pub reverse_throttle: f32,

    /// Probe distance for smart-reverse heading selection (default: 10.0)
    #[serde(default = "default_reverse_probe_distance")]
    pub reverse_probe_distance: f32,

    /// Yaw offsets probed around straight-back, radians
    /// (default: [0.0, 0.4, -0.4, 0.8, -0.8])
    #[serde(default = "default_reverse_probe_offsets")]
    pub reverse_probe_offsets: Vec<f32>,

    /// Measured speed that counts as genuine progress (default: 1.0)
    #[serde(default = "default_progress_speed")]
    pub progress_speed: f32,

    /// Sustained progress needed to reset the attempt counter, in
    /// time-units (default: 5.0)
    #[serde(default = "default_progress_reset_time")]
    pub progress_reset_time: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            hull_width: default_hull_width(),
            hull_height: default_hull_height(),
            safety_margin: default_safety_margin(),
            low_band: default_low_band(),
            high_band: default_high_band(),
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            snap_radius: default_snap_radius(),
            step_spacing: default_step_spacing(),
            skip_radius: default_skip_radius(),
            detour_offsets: default_detour_offsets(),
            detour_forward: default_detour_forward(),
            rejection_radius: default_rejection_radius(),
            max_failed_segments: default_max_failed_segments(),
            spline_spacing: default_spline_spacing(),
            replan_interval: default_replan_interval(),
        }
    }
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            min_lookahead: default_min_lookahead(),
            max_lookahead: default_max_lookahead(),
            lookahead_gain: default_lookahead_gain(),
            full_turn_error: default_full_turn_error(),
            pivot_threshold: default_pivot_threshold(),
            pivot_creep: default_pivot_creep(),
            cursor_window: default_cursor_window(),
        }
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            curvature_distance: default_curvature_distance(),
            curvature_weight: default_curvature_weight(),
            obstacle_slow_radius: default_obstacle_slow_radius(),
            obstacle_stop_radius: default_obstacle_stop_radius(),
            arrival_radius: default_arrival_radius(),
            stop_radius: default_stop_radius(),
            accel_rate: default_accel_rate(),
            decel_rate: default_decel_rate(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            throttle_threshold: default_throttle_threshold(),
            speed_threshold: default_speed_threshold(),
            stuck_time: default_stuck_time(),
            pivot_duration: default_pivot_duration(),
            reverse_duration: default_reverse_duration(),
            extended_reverse_duration: default_extended_reverse_duration(),
            reverse_throttle: default_reverse_throttle(),
            reverse_probe_distance: default_reverse_probe_distance(),
            reverse_probe_offsets: default_reverse_probe_offsets(),
            progress_speed: default_progress_speed(),
            progress_reset_time: default_progress_reset_time(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleConfig::default(),
            planning: PlanningConfig::default(),
            steering: SteeringConfig::default(),
            governor: GovernorConfig::default(),
            recovery: RecoveryConfig::default(),
            terrain: TerrainConfig::default(),
            memory: MemorySettings::default(),
        }
    }
}

// Default value functions
fn default_hull_width() -> f32 {
    3.6
}
fn default_hull_height() -> f32 {
    2.4
}
fn default_safety_margin() -> f32 {
    0.6
}
fn default_low_band() -> f32 {
    0.5
}
fn default_high_band() -> f32 {
    1.6
}

fn default_snap_radius() -> f32 {
    20.0
}
fn default_step_spacing() -> f32 {
    3.0
}
fn default_skip_radius() -> f32 {
    15.0
}
fn default_detour_offsets() -> Vec<f32> {
    vec![2.5, 5.0, 7.5, 10.0]
}
fn default_detour_forward() -> Vec<f32> {
    vec![3.0, 6.0]
}
fn default_rejection_radius() -> f32 {
    6.0
}
fn default_max_failed_segments() -> usize {
    8
}
fn default_spline_spacing() -> f32 {
    2.0
}
fn default_replan_interval() -> f32 {
    3.0
}

fn default_min_lookahead() -> f32 {
    6.0
}
fn default_max_lookahead() -> f32 {
    20.0
}
fn default_lookahead_gain() -> f32 {
    10.0
}
fn default_full_turn_error() -> f32 {
    0.8
}
fn default_pivot_threshold() -> f32 {
    1.2
}
fn default_pivot_creep() -> f32 {
    0.08
}
fn default_cursor_window() -> usize {
    25
}

fn default_curvature_distance() -> f32 {
    15.0
}
fn default_curvature_weight() -> f32 {
    4.0
}
fn default_obstacle_slow_radius() -> f32 {
    12.0
}
fn default_obstacle_stop_radius() -> f32 {
    2.0
}
fn default_arrival_radius() -> f32 {
    20.0
}
fn default_stop_radius() -> f32 {
    2.0
}
fn default_accel_rate() -> f32 {
    0.8
}
fn default_decel_rate() -> f32 {
    2.0
}

fn default_throttle_threshold() -> f32 {
    0.15
}
fn default_speed_threshold() -> f32 {
    0.2
}
fn default_stuck_time() -> f32 {
    1.5
}
fn default_pivot_duration() -> f32 {
    1.0
}
fn default_reverse_duration() -> f32 {
    1.5
}
fn default_extended_reverse_duration() -> f32 {
    2.5
}
fn default_reverse_throttle() -> f32 {
    0.6
}
fn default_reverse_probe_distance() -> f32 {
    10.0
}
fn default_reverse_probe_offsets() -> Vec<f32> {
    vec![0.0, 0.4, -0.4, 0.8, -0.8]
}
fn default_progress_speed() -> f32 {
    1.0
}
fn default_progress_reset_time() -> f32 {
    5.0
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
