//! Deploy error types.

use staticship_paths::PathError;
use staticship_transfer::TransferError;
use staticship_validation::{ValidationError, Violation};

/// Errors produced during a deploy.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("environment error: {0}")]
    Environment(String),

    #[error("security violation: {0}")]
    Security(#[from] PathError),

    #[error("validation failed: {0}")]
    Validation(Violation),

    #[error("more than one input maps to deploy path {0}")]
    DuplicatePath(String),

    #[error(transparent)]
    Io(#[from] TransferError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no files to deploy")]
    NoFiles,

    #[error("cancelled")]
    Cancelled,
}

impl From<ValidationError> for DeployError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::LimitsNotInitialized => Self::Configuration(err.to_string()),
            ValidationError::Rule(violation) => Self::Validation(violation),
        }
    }
}
