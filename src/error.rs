//! Error types for the tour engine.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Status check error: {0}")]
    Status(#[from] StatusError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse flow definitions: {0}")]
    FlowParse(#[from] serde_json::Error),

    #[error("Unknown page identifier in flow definitions: {0}")]
    UnknownPage(String),
}

/// Browser storage errors.
///
/// Callers in the tour path never surface these: a failed read is treated as
/// "flag absent" and a failed write is logged.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{scope} storage is unavailable")]
    Unavailable { scope: String },

    #[error("Write to {scope} storage rejected for key {key}: {reason}")]
    WriteRejected {
        scope: String,
        key: String,
        reason: String,
    },
}

/// Remote onboarding-status check errors.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Status request failed: {0}")]
    Request(String),

    #[error("Status endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Invalid status response: {0}")]
    InvalidResponse(String),

    #[error("Status check timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

impl From<reqwest::Error> for StatusError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
