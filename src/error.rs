//! Error types for firmware target resolution.

use thiserror::Error;

use crate::license::License;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no model family '{family}' in the firmware map")]
    UnknownModel { family: String },

    #[error("model family '{family}' has no firmware for license {license:?}")]
    LicenseMismatch {
        family:  String,
        license: Option<License>,
    },

    #[error("invalid model map: {0}")]
    InvalidMap(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LookupError>;
