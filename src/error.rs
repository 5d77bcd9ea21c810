//! Error types for gymdesk.

use thiserror::Error;

/// Common error type for gymdesk.
#[derive(Error, Debug)]
pub enum GymError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for GymError {
    fn from(e: sqlx::Error) -> Self {
        GymError::Database(e.to_string())
    }
}

/// Result type alias for gymdesk operations.
pub type Result<T> = std::result::Result<T, GymError>;
