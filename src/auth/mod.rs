//! Authentication module for gymdesk.
//!
//! This module provides password hashing, session token issuance and
//! validation, account provisioning, and role capability checks.

mod account;
mod password;
pub mod permission;
mod token;

pub use account::{authenticate, create_account, create_account_with_cost, AccountError};
pub use password::{
    hash_password, hash_password_with_cost, validate_password, verify_password, PasswordError,
    BCRYPT_COST, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use permission::{has_permission, role_capabilities, Capability};
pub use token::{SessionClaims, SessionKeys, TokenError, DEFAULT_SESSION_LIFETIME_SECS};
