//! API handlers.

use std::sync::Arc;

use crate::auth::SessionKeys;
use crate::config::Config;
use crate::Database;

pub mod admin;
pub mod auth;

pub use admin::{export_data, list_logs};
pub use auth::{login, logout, me};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session signing keys.
    pub keys: Arc<SessionKeys>,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, keys: Arc<SessionKeys>, secure_cookies: bool) -> Self {
        Self {
            db,
            keys,
            secure_cookies,
        }
    }

    /// Create the state from configuration. Cookies are `Secure` in production.
    pub fn from_config(db: Database, keys: Arc<SessionKeys>, config: &Config) -> Self {
        Self::new(db, keys, config.server.environment.is_production())
    }
}
