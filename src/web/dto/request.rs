//! Request DTOs for the web API.
//!
//! Every schema rejects unknown fields.

use serde::Deserialize;
use validator::Validate;

use super::validation::no_control_chars;

/// Largest page of audit log entries returned at once.
pub const MAX_LOG_LIMIT: u32 = 500;

/// Default page of audit log entries.
pub const DEFAULT_LOG_LIMIT: u32 = 100;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Account email.
    #[validate(
        email(message = "Must be a valid email address"),
        custom(function = "no_control_chars")
    )]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, max = 72, message = "Password must be 1 to 72 characters"))]
    pub password: String,
}

/// Query parameters for the audit log listing.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogsQuery {
    /// Maximum number of entries.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl LogsQuery {
    /// Requested limit, defaulted and clamped.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LOG_LIMIT)
            .clamp(1, MAX_LOG_LIMIT)
    }
}
