//! Error types for RathaNav

use thiserror::Error;

/// RathaNav error type.
///
/// Nothing in this subsystem is fatal: the worst outcome of any variant
/// is the vehicle holding position while the tactical layer picks a new
/// goal. Detour exhaustion and stuck detection are recovered internally
/// and never surface here.
#[derive(Error, Debug)]
pub enum NavError {
    #[error("no walkable surface within snap radius")]
    NoWalkableSurface,

    #[error("path verification produced a degenerate prefix")]
    PathVerificationFailed,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
