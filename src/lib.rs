//! # RathaNav
//!
//! Navigation and pursuit-steering engine for autonomous ground vehicles.
//!
//! ## Overview
//!
//! RathaNav turns a destination point into per-tick throttle and turn
//! commands for a tracked or wheeled hull:
//!
//! - **Path requesting** - corner routes from the walkable-surface graph
//! - **Path verification** - swept-footprint checks with local detours
//! - **Path smoothing** - Catmull-Rom splines at drivable point spacing
//! - **Pursuit steering** - carrot chasing with a monotonic path cursor
//! - **Speed governing** - multiplicative hazard penalties, filtered
//! - **Stuck recovery** - escalating pivot/reverse/abandon maneuvers
//! - **Team memory** - shared danger, stuck and death zones
//!
//! All world access goes through the [`WorldPort`] trait, so the whole
//! pipeline runs against a deterministic fake in tests.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ratha_nav::{ActorId, NavConfig, Pose, TankDriver, TeamMemory, Vec3};
//!
//! let memory = TeamMemory::with_defaults();
//! let mut driver = TankDriver::new(NavConfig::default(), ActorId(1), memory);
//!
//! driver.set_destination(&world, Vec3::new(0.0, 0.0, 100.0));
//! loop {
//!     let out = driver.tick(&world, pose, dt);
//!     hull.apply(out.throttle, out.turn);
//! }
//! ```
//!
//! ## Coordinate System
//!
//! World coordinates are Y-up: the ground plane is XZ and a yaw of zero
//! faces +Z, increasing toward +X. Distances are world units.

mod classifier;
mod config;
mod driver;
mod error;
mod memory;
mod planning;
mod steering;
mod terrain;
mod types;
mod utils;
mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use classifier::{classify, IgnoreReason, Obstruction};
pub use config::{
    GovernorConfig, NavConfig, PlanningConfig, RecoveryConfig, SteeringConfig, VehicleConfig,
};
pub use driver::TankDriver;
pub use error::{NavError, Result};
pub use memory::{MemorySettings, TeamMemory, Zone};
pub use planning::{
    CornerPath, PathRequester, PathSmoother, PathVerifier, RouteRequest, Spline, VerifiedPath,
};
pub use steering::{
    GovernorInputs, PursuitController, RecoveryOutcome, RecoveryRequest, RecoveryTier,
    SpeedGovernor, SteeringCommand, StuckRecovery,
};
pub use terrain::{TerrainConfig, TerrainScorer};
pub use types::{ActorId, ControlOutput, Pose, Vec3};
pub use world::{Footprint, ShapeInfo, SurfaceKind, SweepHit, WorldPort};
