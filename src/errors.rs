use std::result::Result as StdResult;

use thiserror::Error;

use crate::form::ValidationErrors;

/// Error type that captures storage, configuration, and input failures.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, TrackerError>;

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}
