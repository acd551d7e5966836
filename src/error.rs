use thiserror::Error;

use crate::config::ConfigError;

/// Application-level errors
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification-request errors
#[derive(Debug, Error)]
pub(crate) enum ClassifyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from classifier: {0}")]
    InvalidResponse(String),

    #[error("Classifier error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Failed to encode segment: {0}")]
    Encode(String),
}
