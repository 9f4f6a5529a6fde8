//! Crate error type
//!
//! Gameplay itself never fails; only loading configuration can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
