//! gymdesk - session and permission authorization for a gym management API.
//!
//! Accounts authenticate with an email and a bcrypt-hashed password and
//! receive a signed, expiring session token in an `HttpOnly` cookie. Each
//! request is authorized by checking the role carried by the token against
//! a fixed role-to-capability table.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    has_permission, hash_password, validate_password, verify_password, Capability,
    SessionClaims, SessionKeys,
};
pub use config::Config;
pub use db::{Database, Role, User};
pub use error::{GymError, Result};
