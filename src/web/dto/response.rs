//! Response DTOs for the web API.

use serde::Serialize;

use crate::auth::{role_capabilities, SessionClaims};
use crate::db::{AuditLogEntry, Role, User};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// Identity id.
    pub id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Login response. The token itself travels only in the session cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The authenticated account.
    pub user: UserInfo,
    /// Session expiry (RFC 3339).
    pub expires_at: String,
}

/// Current session response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Identity id.
    pub id: String,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role carried by the session.
    pub role: Role,
    /// Capabilities granted to the role.
    pub capabilities: Vec<&'static str>,
    /// Session expiry (RFC 3339).
    pub expires_at: Option<String>,
    /// Previous login timestamp.
    pub last_login: Option<String>,
}

impl MeResponse {
    /// Combine the stored account with the session claims.
    pub fn new(user: &User, claims: &SessionClaims) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: claims.role,
            capabilities: role_capabilities(claims.role)
                .iter()
                .map(|c| c.as_str())
                .collect(),
            expires_at: claims.expires_at().map(|t| t.to_rfc3339()),
            last_login: user.last_login.clone(),
        }
    }
}

/// Full data export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    /// Export timestamp (RFC 3339).
    pub exported_at: String,
    /// Every account.
    pub users: Vec<UserInfo>,
    /// Every audit log entry.
    pub audit_logs: Vec<AuditLogEntry>,
}
