//! Password hashing and verification for gymdesk.
//!
//! Uses bcrypt with a work factor of 12.

use thiserror::Error;

/// bcrypt work factor used for stored credentials.
pub const BCRYPT_COST: u32 = 12;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in bytes (bcrypt ignores anything past 72 bytes).
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} bytes")]
    TooLong,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Hash a password with bcrypt at [`BCRYPT_COST`].
///
/// The returned string embeds the salt and the cost.
///
/// # Examples
///
/// ```
/// use gymdesk::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$2b$12$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_cost(password, BCRYPT_COST)
}

/// Hash a password with an explicit bcrypt cost.
///
/// Any secret up to bcrypt's 72-byte input limit is accepted; longer ones
/// fail with [`PasswordError::TooLong`] instead of being truncated. The
/// account length policy lives in [`validate_password`].
///
/// Only seeding tools and tests should pick a cost other than [`BCRYPT_COST`].
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, PasswordError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }

    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verify a password against a stored hash.
///
/// Returns `false` both for a wrong password and for a hash that cannot be
/// parsed; callers cannot tell the two apart.
///
/// # Examples
///
/// ```
/// use gymdesk::auth::{hash_password_with_cost, verify_password};
///
/// let hash = hash_password_with_cost("my_secure_password", 4).unwrap();
/// assert!(verify_password("my_secure_password", &hash));
/// assert!(!verify_password("wrong_password", &hash));
/// ```
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!("Stored password hash could not be checked: {}", e);
            false
        }
    }
}

/// Validate password length requirements.
///
/// # Examples
///
/// ```
/// use gymdesk::validate_password;
///
/// assert!(validate_password("short").is_err());
/// assert!(validate_password("valid_password_123").is_ok());
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}
