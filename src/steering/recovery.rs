//! Stuck detection and escalating recovery.
//!
//! `Driving -> (stuck timer) -> Recovering(tier) -> Driving`. The timer
//! accumulates while the vehicle is commanding throttle but not moving;
//! crossing the threshold bumps an attempt counter and dispatches an
//! escalating maneuver. While a tier runs, its override replaces both
//! steering and governor output unconditionally. Sustained genuine
//! progress resets the counter so a recovered vehicle is not permanently
//! penalized.

use crate::config::RecoveryConfig;
use crate::types::{Pose, Vec3};
use crate::world::{Footprint, WorldPort};

/// Escalation tiers, strictly ordered by attempt count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryTier {
    /// Attempt 1: pivot turn in place.
    Pivot,
    /// Attempt 2: reverse along the clearest probed heading.
    SmartReverse,
    /// Attempt 3: longer reverse, current position marked as failed.
    ExtendedReverse,
    /// Attempt 4+: abandon the goal entirely, then reverse to open space.
    Abandon,
}

/// Side effects a finished or starting tier asks the driver to perform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecoveryRequest {
    /// Drop the current spline and force a replan.
    ClearPath,
    /// Record a failed segment to bias future detours away from it.
    RejectSegment(Vec3),
    /// Clear everything and demand a fresh goal from the tactical layer.
    AbandonGoal,
}

/// One tick of recovery output.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecoveryOutcome {
    /// Control override while a tier is running: (throttle, turn).
    pub override_cmd: Option<(f32, f32)>,
    /// Request for the driver, emitted at tier boundaries.
    pub request: Option<RecoveryRequest>,
}

struct ActiveRecovery {
    tier: RecoveryTier,
    remaining: f32,
    turn: f32,
}

/// Stuck detection and recovery state machine for one vehicle.
pub struct StuckRecovery {
    config: RecoveryConfig,
    stuck_timer: f32,
    progress_timer: f32,
    attempts: u32,
    active: Option<ActiveRecovery>,
}

impl StuckRecovery {
    /// Create a recovery machine with configuration.
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            stuck_timer: 0.0,
            progress_timer: 0.0,
            attempts: 0,
            active: None,
        }
    }

    /// Whether a recovery tier is currently overriding control.
    pub fn is_recovering(&self) -> bool {
        self.active.is_some()
    }

    /// The tier currently running, if any.
    pub fn active_tier(&self) -> Option<RecoveryTier> {
        self.active.as_ref().map(|a| a.tier)
    }

    /// Current attempt counter.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// A new destination was issued. Timers restart, but an in-flight
    /// tier keeps running to completion so control does not oscillate.
    pub fn on_new_goal(&mut self) {
        self.stuck_timer = 0.0;
        self.progress_timer = 0.0;
    }

    /// Advance the machine one tick.
    ///
    /// `commanded_throttle` is what the driver asked for this tick before
    /// any override; `measured_speed` is displacement over `dt`.
    pub fn tick(
        &mut self,
        world: &dyn WorldPort,
        footprint: &Footprint,
        pose: Pose,
        commanded_throttle: f32,
        measured_speed: f32,
        dt: f32,
    ) -> RecoveryOutcome {
        if let Some(active) = &mut self.active {
            active.remaining -= dt;
            if active.remaining <= 0.0 {
                let tier = active.tier;
                self.active = None;
                self.stuck_timer = 0.0;
                tracing::info!("recovery tier {:?} finished", tier);

                let request = match tier {
                    RecoveryTier::SmartReverse => Some(RecoveryRequest::ClearPath),
                    _ => None,
                };
                return RecoveryOutcome {
                    override_cmd: None,
                    request,
                };
            }

            let cmd = match active.tier {
                RecoveryTier::Pivot => (0.0, active.turn),
                RecoveryTier::SmartReverse
                | RecoveryTier::ExtendedReverse
                | RecoveryTier::Abandon => (-self.config.reverse_throttle, active.turn),
            };
            return RecoveryOutcome {
                override_cmd: Some(cmd),
                request: None,
            };
        }

        // Attempt counter decays after sustained genuine progress.
        if measured_speed > self.config.progress_speed {
            self.progress_timer += dt;
            if self.progress_timer >= self.config.progress_reset_time && self.attempts > 0 {
                tracing::debug!("sustained progress, attempt counter reset");
                self.attempts = 0;
            }
        } else {
            self.progress_timer = 0.0;
        }

        // Stuck: commanding throttle but not moving.
        let commanding = commanded_throttle.abs() > self.config.throttle_threshold;
        if commanding && measured_speed < self.config.speed_threshold {
            self.stuck_timer += dt;
        } else {
            self.stuck_timer = 0.0;
        }

        if self.stuck_timer < self.config.stuck_time {
            return RecoveryOutcome::default();
        }

        self.stuck_timer = 0.0;
        self.attempts += 1;
        tracing::warn!(
            "stuck at ({:.1}, {:.1}), recovery attempt {}",
            pose.position.x,
            pose.position.z,
            self.attempts
        );

        match self.attempts {
            1 => self.start(RecoveryTier::Pivot, self.config.pivot_duration, 1.0, None),
            2 => {
                let turn = self.best_reverse_turn(world, footprint, pose);
                self.start(
                    RecoveryTier::SmartReverse,
                    self.config.reverse_duration,
                    turn,
                    None,
                )
            }
            3 => {
                let turn = self.best_reverse_turn(world, footprint, pose);
                self.start(
                    RecoveryTier::ExtendedReverse,
                    self.config.extended_reverse_duration,
                    turn,
                    Some(RecoveryRequest::RejectSegment(pose.position)),
                )
            }
            _ => {
                self.attempts = 0;
                let turn = self.best_reverse_turn(world, footprint, pose);
                self.start(
                    RecoveryTier::Abandon,
                    self.config.reverse_duration,
                    turn,
                    Some(RecoveryRequest::AbandonGoal),
                )
            }
        }
    }

    fn start(
        &mut self,
        tier: RecoveryTier,
        duration: f32,
        turn: f32,
        request: Option<RecoveryRequest>,
    ) -> RecoveryOutcome {
        tracing::info!("recovery tier {:?} for {:.1}s", tier, duration);
        let cmd = match tier {
            RecoveryTier::Pivot => (0.0, turn),
            _ => (-self.config.reverse_throttle, turn),
        };
        self.active = Some(ActiveRecovery {
            tier,
            remaining: duration,
            turn,
        });
        RecoveryOutcome {
            override_cmd: Some(cmd),
            request,
        }
    }

    /// Probe reverse headings and steer toward the clearest one.
    fn best_reverse_turn(
        &self,
        world: &dyn WorldPort,
        footprint: &Footprint,
        pose: Pose,
    ) -> f32 {
        let back = pose.yaw + std::f32::consts::PI;
        let probe_distance = self.config.reverse_probe_distance;

        let mut best_offset = 0.0;
        let mut best_clear = -1.0;

        for &offset in &self.config.reverse_probe_offsets {
            let yaw = back + offset;
            let direction = Vec3::new(yaw.sin(), 0.0, yaw.cos());
            let clear = match world.sweep(pose.position, direction, probe_distance, footprint) {
                None => probe_distance,
                Some(hit) => hit.distance,
            };
            if clear > best_clear {
                best_clear = clear;
                best_offset = offset;
            }
        }

        tracing::debug!(
            "smart reverse: offset {:.2} rad, {:.1} units clear",
            best_offset,
            best_clear
        );
        best_offset.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWorld;

    fn footprint() -> Footprint {
        Footprint {
            width: 3.6,
            height: 2.4,
            safety_margin: 0.6,
        }
    }

    fn machine() -> StuckRecovery {
        StuckRecovery::new(RecoveryConfig::default())
    }

    /// Tick as stuck until a tier starts, then return its kind.
    fn force_stuck(recovery: &mut StuckRecovery, world: &FakeWorld) -> RecoveryOutcome {
        let pose = Pose::new(Vec3::ZERO, 0.0);
        for _ in 0..40 {
            let out = recovery.tick(world, &footprint(), pose, 0.8, 0.0, 0.1);
            if recovery.is_recovering() {
                return out;
            }
        }
        panic!("recovery never started");
    }

    /// Run an active tier to completion, returning its final request.
    fn drain(recovery: &mut StuckRecovery, world: &FakeWorld) -> Option<RecoveryRequest> {
        let pose = Pose::new(Vec3::ZERO, 0.0);
        for _ in 0..100 {
            let out = recovery.tick(world, &footprint(), pose, 0.0, 0.0, 0.1);
            if !recovery.is_recovering() {
                return out.request;
            }
        }
        panic!("recovery never finished");
    }

    #[test]
    fn test_no_false_stuck_with_zero_throttle() {
        let world = FakeWorld::flat();
        let mut recovery = machine();
        let pose = Pose::new(Vec3::ZERO, 0.0);

        for _ in 0..100 {
            recovery.tick(&world, &footprint(), pose, 0.0, 0.0, 0.1);
        }
        assert!(!recovery.is_recovering());
        assert_eq!(recovery.attempts(), 0);
    }

    #[test]
    fn test_escalation_order() {
        let world = FakeWorld::flat();
        let mut recovery = machine();

        // Attempt 1: pivot, zero throttle override.
        let out = force_stuck(&mut recovery, &world);
        assert_eq!(recovery.active_tier(), Some(RecoveryTier::Pivot));
        let (throttle, turn) = out.override_cmd.unwrap();
        assert!(throttle.abs() < 1e-6);
        assert!(turn.abs() > 0.5);
        assert!(drain(&mut recovery, &world).is_none());

        // Attempt 2: smart reverse, ends with a path clear.
        let out = force_stuck(&mut recovery, &world);
        assert_eq!(recovery.active_tier(), Some(RecoveryTier::SmartReverse));
        assert!(out.override_cmd.unwrap().0 < 0.0);
        assert_eq!(
            drain(&mut recovery, &world),
            Some(RecoveryRequest::ClearPath)
        );

        // Attempt 3: extended reverse, rejects the current segment.
        let out = force_stuck(&mut recovery, &world);
        assert_eq!(recovery.active_tier(), Some(RecoveryTier::ExtendedReverse));
        assert!(matches!(
            out.request,
            Some(RecoveryRequest::RejectSegment(_))
        ));
        assert!(drain(&mut recovery, &world).is_none());

        // Attempt 4: abandon, counter resets immediately.
        let out = force_stuck(&mut recovery, &world);
        assert_eq!(recovery.active_tier(), Some(RecoveryTier::Abandon));
        assert_eq!(out.request, Some(RecoveryRequest::AbandonGoal));
        assert_eq!(recovery.attempts(), 0);
    }

    #[test]
    fn test_progress_resets_attempts() {
        let world = FakeWorld::flat();
        let mut recovery = machine();
        let pose = Pose::new(Vec3::ZERO, 0.0);

        force_stuck(&mut recovery, &world);
        drain(&mut recovery, &world);
        assert_eq!(recovery.attempts(), 1);

        // Sustained speed above the progress threshold for 5 seconds.
        for _ in 0..55 {
            recovery.tick(&world, &footprint(), pose, 0.8, 2.0, 0.1);
        }
        assert_eq!(recovery.attempts(), 0);

        // Next episode starts back at tier 1.
        force_stuck(&mut recovery, &world);
        assert_eq!(recovery.active_tier(), Some(RecoveryTier::Pivot));
    }

    #[test]
    fn test_smart_reverse_prefers_clear_heading() {
        let recovery = machine();

        // Nothing behind: straight back wins.
        let open = FakeWorld::flat();
        let turn =
            recovery.best_reverse_turn(&open, &footprint(), Pose::new(Vec3::ZERO, 0.0));
        assert!(turn.abs() < 1e-6);

        // Box centered behind: the angled probes get farther before
        // contact, so the chosen heading bends away from straight back.
        let mut blocked = FakeWorld::flat();
        blocked.add_wall(Vec3::new(-3.0, 0.0, -9.0), Vec3::new(3.0, 3.0, -6.0));
        let turn =
            recovery.best_reverse_turn(&blocked, &footprint(), Pose::new(Vec3::ZERO, 0.0));
        assert!(turn.abs() > 0.5);
    }

    #[test]
    fn test_override_persists_for_duration() {
        let world = FakeWorld::flat();
        let mut recovery = machine();
        force_stuck(&mut recovery, &world);

        // Pivot lasts 1.0s; overrides remain present until it ends.
        let pose = Pose::new(Vec3::ZERO, 0.0);
        let mut override_ticks = 0;
        for _ in 0..9 {
            let out = recovery.tick(&world, &footprint(), pose, 0.0, 0.0, 0.1);
            if out.override_cmd.is_some() {
                override_ticks += 1;
            }
        }
        assert!(override_ticks >= 8);
    }
}
