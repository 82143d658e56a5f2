//! Errors raised at the serialization and configuration boundary.
//!
//! The ledgers themselves never fail; unknown ids and denied purchases are
//! reported through `bool`/`Option` returns.

use thiserror::Error;

/// Failure to encode or decode a workshop save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save version {saved} is older than the minimum compatible version {min}")]
    IncompatibleVersion { saved: u32, min: u32 },
}

/// Failure to load a [`WorkshopConfig`](crate::WorkshopConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
