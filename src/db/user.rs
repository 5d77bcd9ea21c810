//! User model for gymdesk.
//!
//! This module defines the User struct and Role enum for account management.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role. The set is closed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Gym member following assigned plans.
    Student,
    /// Trainer managing students, plans and payments.
    Professor,
    /// Administrator with access to audit logs and exports.
    Admin,
}

/// Error returned when parsing an unknown role name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// All roles, in ascending order of privilege.
    pub const ALL: [Role; 3] = [Role::Student, Role::Professor, Role::Admin];

    /// Convert role to its database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Professor => "PROFESSOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "PROFESSOR" => Ok(Role::Professor),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique identity identifier (UUID v4).
    pub id: String,
    /// Login email (unique, case-insensitive).
    pub email: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last login timestamp.
    pub last_login: Option<String>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Password hash (must already be hashed).
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Account role (defaults to Student).
    pub role: Role,
}

impl NewUser {
    /// Create a new student account record.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            role: Role::Student,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("STUDENT").unwrap(), Role::Student);
        assert_eq!(Role::from_str("PROFESSOR").unwrap(), Role::Professor);
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert!(Role::from_str("professor").is_err());
        assert!(Role::from_str("Admin").is_err());
        assert_eq!(
            Role::from_str("sysop"),
            Err(UnknownRole("sysop".to_string()))
        );
    }

    #[test]
    fn test_role_as_str_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&Role::Professor).unwrap(),
            "\"PROFESSOR\""
        );
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"ROOT\"").is_err());
    }

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("coach@example.com", "hash", "Coach").with_role(Role::Professor);

        assert_eq!(user.email, "coach@example.com");
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.name, "Coach");
        assert_eq!(user.role, Role::Professor);

        let student = NewUser::new("s@example.com", "hash", "S");
        assert_eq!(student.role, Role::Student);
    }
}
