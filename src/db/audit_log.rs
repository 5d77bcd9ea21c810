//! Audit log repository.
//!
//! Records security-relevant actions (logins, logouts, exports) so that
//! administrators holding `canViewLogs` can review them.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::Result;

/// Audited action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Successful login.
    Login,
    /// Failed login attempt.
    LoginFailed,
    /// Logout.
    Logout,
    /// Data export.
    Export,
}

impl AuditAction {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Export => "EXPORT",
        }
    }
}

/// Stored audit log entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    /// Entry ID.
    pub id: i64,
    /// Identity that performed the action, if known.
    pub actor_id: Option<String>,
    /// Action name.
    pub action: String,
    /// Free-form detail.
    pub detail: Option<String>,
    /// Timestamp.
    pub created_at: String,
}

/// Repository for audit log operations.
pub struct AuditLogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditLogRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn record(
        &self,
        actor_id: Option<&str>,
        action: AuditAction,
        detail: Option<&str>,
    ) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO audit_logs (actor_id, action, detail) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(actor_id)
        .bind(action.as_str())
        .bind(detail)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// List the most recent entries, newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT id, actor_id, action, detail, created_at
             FROM audit_logs ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    /// List every entry in insertion order.
    pub async fn list_all(&self) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT id, actor_id, action, detail, created_at FROM audit_logs ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};

    #[tokio::test]
    async fn test_record_and_list() {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("a@example.com", "hash", "A"))
            .await
            .unwrap();
        let repo = AuditLogRepository::new(db.pool());

        repo.record(Some(&user.id), AuditAction::Login, None)
            .await
            .unwrap();
        repo.record(None, AuditAction::LoginFailed, Some("x@example.com"))
            .await
            .unwrap();
        repo.record(Some(&user.id), AuditAction::Logout, None)
            .await
            .unwrap();

        let entries = repo.list_recent(10).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].action, "LOGOUT");
        assert_eq!(entries[1].action, "LOGIN_FAILED");
        assert_eq!(entries[1].actor_id, None);
        assert_eq!(entries[1].detail.as_deref(), Some("x@example.com"));
        assert_eq!(entries[2].actor_id.as_deref(), Some(user.id.as_str()));
    }

    #[tokio::test]
    async fn test_list_recent_limit() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AuditLogRepository::new(db.pool());

        for _ in 0..5 {
            repo.record(None, AuditAction::Export, None).await.unwrap();
        }

        assert_eq!(repo.list_recent(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_all_in_order() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = AuditLogRepository::new(db.pool());

        repo.record(None, AuditAction::Login, None).await.unwrap();
        repo.record(None, AuditAction::Export, None).await.unwrap();

        let entries = repo.list_all().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "LOGIN");
        assert_eq!(entries[1].action, "EXPORT");
    }
}
