//! Route construction: request, physical verification, smoothing.

mod requester;
mod smoother;
mod verifier;

pub use requester::{CornerPath, PathRequester, RouteRequest};
pub use smoother::{PathSmoother, Spline};
pub use verifier::{PathVerifier, VerifiedPath};
