//! Per-tick control: pursuit steering, speed governing, stuck recovery.

mod governor;
mod pursuit;
mod recovery;

pub use governor::{GovernorInputs, SpeedGovernor};
pub use pursuit::{PursuitController, SteeringCommand};
pub use recovery::{RecoveryOutcome, RecoveryRequest, RecoveryTier, StuckRecovery};
