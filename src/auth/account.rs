//! Account provisioning and credential checks.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use super::password::{
    hash_password_with_cost, validate_password, verify_password, PasswordError, BCRYPT_COST,
};
use crate::db::{NewUser, Role, User, UserRepository};
use crate::GymError;

/// Account creation errors.
#[derive(Error, Debug)]
pub enum AccountError {
    /// Password does not meet the policy or could not be hashed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Email is empty.
    #[error("email is required")]
    EmptyEmail,

    /// Email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Underlying storage error.
    #[error(transparent)]
    Storage(GymError),
}

impl From<GymError> for AccountError {
    fn from(e: GymError) -> Self {
        match e {
            GymError::Conflict(_) => AccountError::EmailTaken,
            other => AccountError::Storage(other),
        }
    }
}

/// Create an account, hashing the password at the standard cost.
pub async fn create_account(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
) -> Result<User, AccountError> {
    create_account_with_cost(pool, email, password, name, role, BCRYPT_COST).await
}

/// Create an account with an explicit bcrypt cost.
pub async fn create_account_with_cost(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
    cost: u32,
) -> Result<User, AccountError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AccountError::EmptyEmail);
    }

    validate_password(password)?;
    let password_hash = hash_password_with_cost(password, cost)?;
    let user = UserRepository::new(pool)
        .create(&NewUser::new(email, password_hash, name).with_role(role))
        .await?;

    info!(user_id = %user.id, role = %user.role, "Account created");
    Ok(user)
}

/// Check an email/password pair.
///
/// Returns `Ok(None)` when the email is unknown or the password does not
/// match; the two cases are indistinguishable to the caller.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> crate::Result<Option<User>> {
    let Some(user) = UserRepository::new(pool).get_by_email(email.trim()).await? else {
        return Ok(None);
    };

    if verify_password(password, &user.password_hash) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let db = Database::open_in_memory().await.unwrap();

        let user = create_account_with_cost(
            db.pool(),
            "coach@example.com",
            "password123",
            "Coach",
            Role::Professor,
            TEST_COST,
        )
        .await
        .unwrap();
        assert_ne!(user.password_hash, "password123");

        let found = authenticate(db.pool(), "coach@example.com", "password123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Professor);
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_uniform() {
        let db = Database::open_in_memory().await.unwrap();
        create_account_with_cost(
            db.pool(),
            "a@example.com",
            "password123",
            "A",
            Role::Student,
            TEST_COST,
        )
        .await
        .unwrap();

        let wrong_password = authenticate(db.pool(), "a@example.com", "wrongpass")
            .await
            .unwrap();
        let unknown_email = authenticate(db.pool(), "b@example.com", "password123")
            .await
            .unwrap();

        assert!(wrong_password.is_none());
        assert!(unknown_email.is_none());
    }

    #[tokio::test]
    async fn test_create_account_validation() {
        let db = Database::open_in_memory().await.unwrap();

        let result =
            create_account_with_cost(db.pool(), "  ", "password123", "A", Role::Student, TEST_COST)
                .await;
        assert!(matches!(result, Err(AccountError::EmptyEmail)));

        let result =
            create_account_with_cost(db.pool(), "a@example.com", "short", "A", Role::Student, TEST_COST)
                .await;
        assert!(matches!(
            result,
            Err(AccountError::Password(PasswordError::TooShort))
        ));
    }

    #[tokio::test]
    async fn test_create_account_duplicate() {
        let db = Database::open_in_memory().await.unwrap();
        create_account_with_cost(db.pool(), "a@example.com", "password123", "A", Role::Student, TEST_COST)
            .await
            .unwrap();

        let result =
            create_account_with_cost(db.pool(), "a@example.com", "password456", "B", Role::Admin, TEST_COST)
                .await;
        assert!(matches!(result, Err(AccountError::EmailTaken)));
    }
}
