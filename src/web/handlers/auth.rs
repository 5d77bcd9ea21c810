//! Authentication handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use super::AppState;
use crate::auth::authenticate;
use crate::db::{AuditAction, AuditLogRepository, UserRepository};
use crate::logging::mask_email;
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, MeResponse, UserInfo, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::session::{clear_session, issue_session, AuthSession, MaybeSession};

/// Append an audit entry. Failures are logged, never surfaced.
async fn audit(state: &AppState, actor_id: Option<&str>, action: AuditAction, detail: Option<&str>) {
    if let Err(e) = AuditLogRepository::new(state.db.pool())
        .record(actor_id, action, detail)
        .await
    {
        tracing::warn!(action = action.as_str(), "Failed to record audit entry: {}", e);
    }
}

/// POST /api/auth/login - Exchange credentials for a session cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let Some(user) = authenticate(state.db.pool(), &req.email, &req.password).await? else {
        tracing::info!(email = %mask_email(&req.email), "Login failed");
        audit(&state, None, AuditAction::LoginFailed, Some(req.email.trim())).await;
        return Err(ApiError::InvalidCredentials);
    };

    let (cookie, claims) = issue_session(&state.keys, state.secure_cookies, &user.id, user.role)
        .map_err(|e| {
            tracing::error!("Failed to issue session: {}", e);
            ApiError::Internal("Failed to create session")
        })?;
    let expires_at = claims
        .expires_at()
        .map(|t| t.to_rfc3339())
        .ok_or_else(|| ApiError::Internal("Failed to create session"))?;

    if let Err(e) = UserRepository::new(state.db.pool())
        .update_last_login(&user.id)
        .await
    {
        tracing::warn!(user_id = %user.id, "Failed to update last login: {}", e);
    }
    audit(&state, Some(&user.id), AuditAction::Login, None).await;

    tracing::info!(user_id = %user.id, role = %user.role, "Login succeeded");

    let response = LoginResponse {
        user: UserInfo::from(&user),
        expires_at,
    };
    Ok((jar.add(cookie), Json(ApiResponse::new(response))))
}

/// POST /api/auth/logout - Clear the session cookie.
///
/// Always succeeds. The token itself stays valid until it expires.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<Value>>) {
    if let Some(claims) = session {
        audit(&state, Some(&claims.sub), AuditAction::Logout, None).await;
        tracing::info!(user_id = %claims.sub, "Logged out");
    }

    (
        clear_session(jar, state.secure_cookies),
        Json(ApiResponse::new(json!({ "message": "Logged out" }))),
    )
}

/// GET /api/auth/me - Describe the current session.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(&claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(ApiResponse::new(MeResponse::new(&user, &claims))))
}
