//! Per-vehicle navigation driver.
//!
//! Owns the full pipeline for one vehicle: route requesting, physical
//! verification, smoothing, pursuit steering, speed governing and stuck
//! recovery. The tactical layer sets destinations and calls [`TankDriver::tick`]
//! once per frame with the current pose; everything else is internal.
//! All world access goes through the [`WorldPort`] passed into each call,
//! so the driver itself holds no engine handles.

use crate::classifier::classify;
use crate::config::NavConfig;
use crate::memory::TeamMemory;
use crate::planning::{PathRequester, PathSmoother, PathVerifier, RouteRequest, Spline};
use crate::steering::{
    GovernorInputs, PursuitController, RecoveryRequest, SpeedGovernor, StuckRecovery,
};
use crate::terrain::TerrainScorer;
use crate::types::{ActorId, ControlOutput, Pose, Vec3};
use crate::world::{Footprint, SurfaceKind, WorldPort};

/// Navigation driver for a single vehicle.
pub struct TankDriver {
    config: NavConfig,
    self_id: ActorId,
    footprint: Footprint,

    requester: PathRequester,
    verifier: PathVerifier,
    smoother: PathSmoother,
    pursuit: PursuitController,
    governor: SpeedGovernor,
    recovery: StuckRecovery,
    terrain: TerrainScorer,
    memory: TeamMemory,

    destination: Option<Vec3>,
    spline: Option<Spline>,
    /// Whether the current spline reaches the destination or is a
    /// truncated prefix.
    reached_end: bool,
    /// Failed-segment positions fed back into detour searches.
    rejected: Vec<Vec3>,
    replan_timer: f32,
    needs_new_goal: bool,
    last_position: Option<Vec3>,
    on_preferred: bool,
}

impl TankDriver {
    /// Create a driver for the vehicle `self_id`, sharing `memory` with
    /// the rest of its team.
    pub fn new(config: NavConfig, self_id: ActorId, memory: TeamMemory) -> Self {
        let footprint = Footprint {
            width: config.vehicle.hull_width,
            height: config.vehicle.hull_height,
            safety_margin: config.vehicle.safety_margin,
        };
        Self {
            requester: PathRequester::new(config.planning.snap_radius),
            verifier: PathVerifier::new(config.planning.clone(), &config.vehicle, self_id),
            smoother: PathSmoother::new(config.planning.spline_spacing),
            pursuit: PursuitController::new(config.steering.clone()),
            governor: SpeedGovernor::new(config.governor.clone()),
            recovery: StuckRecovery::new(config.recovery.clone()),
            terrain: TerrainScorer::new(config.terrain.clone()),
            memory,
            footprint,
            config,
            self_id,
            destination: None,
            spline: None,
            reached_end: true,
            rejected: Vec::new(),
            replan_timer: 0.0,
            needs_new_goal: false,
            last_position: None,
            on_preferred: false,
        }
    }

    /// Create a driver with default configuration and its own memory.
    pub fn with_defaults(self_id: ActorId) -> Self {
        Self::new(NavConfig::default(), self_id, TeamMemory::with_defaults())
    }

    /// Set a new destination. Returns false, leaving the current goal
    /// untouched, when the point has no walkable surface nearby.
    pub fn set_destination(&mut self, world: &dyn WorldPort, point: Vec3) -> bool {
        if world
            .snap_to_surface(point, self.config.planning.snap_radius)
            .is_none()
        {
            tracing::warn!(
                "destination ({:.1}, {:.1}) has no walkable surface",
                point.x,
                point.z
            );
            return false;
        }

        tracing::info!("new destination ({:.1}, {:.1})", point.x, point.z);
        self.destination = Some(point);
        self.clear_path();
        self.rejected.clear();
        self.needs_new_goal = false;
        self.recovery.on_new_goal();
        true
    }

    /// Drop the current goal and path. The vehicle coasts to a stop.
    pub fn stop(&mut self) {
        self.destination = None;
        self.clear_path();
        self.governor.reset();
    }

    /// Current destination, if any.
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Whether the driver holds a path that reaches its destination.
    pub fn has_path(&self) -> bool {
        self.spline.is_some() && self.reached_end
    }

    /// Arc length left on the current spline.
    pub fn remaining_distance(&self) -> f32 {
        self.spline
            .as_ref()
            .map(|s| s.remaining_from(self.pursuit.cursor()))
            .unwrap_or(0.0)
    }

    /// Whether a recovery maneuver is currently overriding control.
    pub fn is_stuck(&self) -> bool {
        self.recovery.is_recovering()
    }

    /// Raised when the goal was abandoned or proved unreachable; the
    /// tactical layer should pick a new one. Cleared by `set_destination`.
    pub fn needs_new_goal(&self) -> bool {
        self.needs_new_goal
    }

    /// Whether the vehicle sat on a preferred surface at the last tick.
    pub fn on_preferred_surface(&self) -> bool {
        self.on_preferred
    }

    /// Record incoming damage at `position` in the shared team memory.
    pub fn report_damage(&self, position: Vec3) {
        self.memory.record_danger(position);
    }

    /// Record this vehicle's death in the shared team memory.
    pub fn report_death(&self, position: Vec3) {
        self.memory.record_death(position);
    }

    /// Advance the driver one tick and produce control output.
    pub fn tick(&mut self, world: &dyn WorldPort, pose: Pose, dt: f32) -> ControlOutput {
        let measured_speed = match self.last_position {
            Some(prev) if dt > 1e-6 => prev.horizontal_distance(&pose.position) / dt,
            _ => 0.0,
        };
        self.last_position = Some(pose.position);
        self.replan_timer += dt;

        let surface = world.classify_surface(pose.position);
        self.on_preferred = self.terrain.on_preferred_surface(surface);

        let (mut throttle, mut turn, mount_heading_deg) =
            self.drive_command(world, pose, surface, dt);

        // Recovery observes the commanded throttle, not the actuated one,
        // so a vehicle pushing against a wall at full command is detected
        // even while the governor output oscillates.
        let outcome =
            self.recovery
                .tick(world, &self.footprint, pose, throttle, measured_speed, dt);
        if let Some(request) = outcome.request {
            self.handle_recovery_request(request, pose.position);
        }
        if let Some((recovery_throttle, recovery_turn)) = outcome.override_cmd {
            throttle = recovery_throttle;
            turn = recovery_turn;
        }

        ControlOutput {
            throttle,
            turn,
            mount_heading_deg,
        }
    }

    /// Normal (non-recovery) control for this tick.
    fn drive_command(
        &mut self,
        world: &dyn WorldPort,
        pose: Pose,
        surface: SurfaceKind,
        dt: f32,
    ) -> (f32, f32, f32) {
        let idle_mount = pose.yaw.to_degrees();

        let Some(destination) = self.destination else {
            return (0.0, 0.0, idle_mount);
        };

        if pose.position.horizontal_distance(&destination) <= self.config.governor.stop_radius {
            tracing::info!("arrived at ({:.1}, {:.1})", destination.x, destination.z);
            self.destination = None;
            self.clear_path();
            self.governor.reset();
            return (0.0, 0.0, idle_mount);
        }

        if self.spline.is_none() || self.replan_timer >= self.config.planning.replan_interval {
            self.plan(world, pose, destination);
        }
        if self.spline.is_none() {
            return (0.0, 0.0, idle_mount);
        }

        let obstacle_distance = self.obstacle_ahead(world, pose);
        let danger_bias = self.memory.speed_bias(pose.position);

        let spline = self.spline.as_ref().expect("spline present");
        let cmd = self.pursuit.steer(pose, spline, self.governor.current());
        let cursor = self.pursuit.cursor();
        let remaining = spline.remaining_from(cursor);

        let inputs = GovernorInputs {
            heading_error: cmd.heading_error,
            obstacle_distance,
            distance_to_goal: pose.position.horizontal_distance(&destination),
            danger_bias,
            terrain_multiplier: self.terrain.speed_multiplier(surface),
        };
        let target = self.governor.target_speed(&inputs, spline, cursor);

        // A truncated prefix driven to its end, or a truncated prefix with
        // the nose hard against whatever cut it short, means the goal is
        // unreachable from here.
        let prefix_exhausted = remaining <= self.config.governor.stop_radius * 2.0;
        let nose_blocked = obstacle_distance
            .map(|d| d <= self.config.governor.obstacle_stop_radius + 1.0)
            .unwrap_or(false);
        if !self.reached_end && (prefix_exhausted || nose_blocked) {
            tracing::warn!(
                "goal ({:.1}, {:.1}) unreachable, verified prefix exhausted",
                destination.x,
                destination.z
            );
            self.destination = None;
            self.clear_path();
            self.governor.reset();
            self.needs_new_goal = true;
            return (0.0, 0.0, idle_mount);
        }

        let mut throttle = self.governor.update(target, dt);
        if cmd.turn_in_place {
            throttle = self.config.steering.pivot_creep;
        }

        let mount = pose.position.yaw_to(&cmd.carrot).to_degrees();
        (throttle, cmd.turn, mount)
    }

    /// Request, verify and smooth a fresh path toward `destination`.
    fn plan(&mut self, world: &dyn WorldPort, pose: Pose, destination: Vec3) {
        self.replan_timer = 0.0;

        let request = match self.terrain.pick_road_via(world, pose.position, destination) {
            Some(via) => RouteRequest::through(pose.position, via, destination),
            None => RouteRequest::direct(pose.position, destination),
        };

        let planned = self.requester.request(world, &request).and_then(|corner| {
            self.verifier
                .verify(world, pose.position, &corner, &self.rejected)
        });

        match planned {
            Ok(path) => {
                self.reached_end = path.reached_end;
                self.spline = Some(self.smoother.smooth(&path));
                self.pursuit.reset();
            }
            Err(e) => {
                tracing::warn!("planning toward ({:.1}, {:.1}) failed: {}", destination.x, destination.z, e);
                self.destination = None;
                self.clear_path();
                self.needs_new_goal = true;
            }
        }
    }

    /// Blocking obstacle straight ahead, within the governor's slow radius.
    fn obstacle_ahead(&self, world: &dyn WorldPort, pose: Pose) -> Option<f32> {
        let origin = Vec3::new(
            pose.position.x,
            pose.position.y + self.config.vehicle.low_band,
            pose.position.z,
        );
        let hit = world.sweep(
            origin,
            pose.forward(),
            self.config.governor.obstacle_slow_radius,
            &self.footprint,
        )?;
        if classify(&hit.shape, self.self_id).is_blocking() {
            Some(hit.distance)
        } else {
            None
        }
    }

    fn handle_recovery_request(&mut self, request: RecoveryRequest, position: Vec3) {
        match request {
            RecoveryRequest::ClearPath => {
                self.clear_path();
            }
            RecoveryRequest::RejectSegment(segment) => {
                self.memory.record_stuck(segment);
                if self.rejected.len() == self.config.planning.max_failed_segments {
                    self.rejected.remove(0);
                }
                self.rejected.push(segment);
                self.clear_path();
            }
            RecoveryRequest::AbandonGoal => {
                tracing::warn!(
                    "abandoning goal after repeated recoveries at ({:.1}, {:.1})",
                    position.x,
                    position.z
                );
                self.memory.record_stuck(position);
                self.destination = None;
                self.clear_path();
                self.rejected.clear();
                self.needs_new_goal = true;
            }
        }
    }

    fn clear_path(&mut self) {
        self.spline = None;
        self.reached_end = true;
        self.pursuit.reset();
    }
}
