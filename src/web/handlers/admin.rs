//! Administrative handlers gated by capability.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use super::AppState;
use crate::auth::Capability;
use crate::db::{AuditAction, AuditLogEntry, AuditLogRepository, UserRepository};
use crate::web::dto::{ApiResponse, ExportResponse, LogsQuery, UserInfo};
use crate::web::error::ApiError;
use crate::web::session::{require_capability, AuthSession};

/// GET /api/admin/logs - Recent audit entries, newest first.
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Query(query): Query<LogsQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogEntry>>>, ApiError> {
    require_capability(&claims, Capability::ViewLogs)?;

    let entries = AuditLogRepository::new(state.db.pool())
        .list_recent(query.effective_limit())
        .await?;

    Ok(Json(ApiResponse::new(entries)))
}

/// GET /api/admin/export - Every account and audit entry.
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
) -> Result<Json<ApiResponse<ExportResponse>>, ApiError> {
    require_capability(&claims, Capability::ExportData)?;

    let audit = AuditLogRepository::new(state.db.pool());
    audit
        .record(Some(&claims.sub), AuditAction::Export, None)
        .await?;

    let users = UserRepository::new(state.db.pool())
        .list_all()
        .await?
        .iter()
        .map(UserInfo::from)
        .collect::<Vec<_>>();
    let audit_logs = audit.list_all().await?;

    tracing::info!(
        user_id = %claims.sub,
        users = users.len(),
        audit_logs = audit_logs.len(),
        "Data exported"
    );

    Ok(Json(ApiResponse::new(ExportResponse {
        exported_at: chrono::Utc::now().to_rfc3339(),
        users,
        audit_logs,
    })))
}
