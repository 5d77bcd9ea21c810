//! Cookie transport for session tokens and request extractors.
//!
//! The token lives in the `session` cookie (`HttpOnly`, `SameSite=Lax`,
//! `Path=/`, `Secure` in production). Handlers gate access with
//! [`AuthSession`] and [`require_capability`].

use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

use crate::auth::{Capability, SessionClaims, SessionKeys, TokenError};
use crate::db::Role;
use crate::web::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Build the session cookie carrying `token`.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Issue a token for the identity and wrap it in the session cookie.
///
/// The claims are returned so callers can report the expiry.
pub fn issue_session(
    keys: &SessionKeys,
    secure: bool,
    identity_id: &str,
    role: Role,
) -> Result<(Cookie<'static>, SessionClaims), TokenError> {
    let (token, claims) = keys.issue_claims_at(identity_id, role, Utc::now())?;
    Ok((session_cookie(token, secure), claims))
}

/// Add a removal cookie to the jar, making the client drop the session.
pub fn clear_session(jar: CookieJar, secure: bool) -> CookieJar {
    let mut cookie = session_cookie(String::new(), secure);
    cookie.make_removal();
    jar.add(cookie)
}

/// Read and validate the session cookie. `None` means unauthenticated.
pub fn get_session(keys: &SessionKeys, jar: &CookieJar) -> Option<SessionClaims> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| keys.validate(cookie.value()))
}

/// Reject unless the session's role holds `capability`.
pub fn require_capability(claims: &SessionClaims, capability: Capability) -> Result<(), ApiError> {
    if claims.role.has(capability) {
        return Ok(());
    }
    tracing::warn!(
        sub = %claims.sub,
        role = %claims.role,
        capability = %capability,
        "Capability check failed"
    );
    Err(ApiError::Forbidden)
}

/// Extractor requiring a valid session.
///
/// Rejects with 401 when the cookie is missing, malformed, forged or expired.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let keys = parts
            .extensions
            .get::<Arc<SessionKeys>>()
            .ok_or_else(|| ApiError::Internal("Session keys not configured"))?;

        let jar = CookieJar::from_headers(&parts.headers);
        get_session(keys, &jar)
            .map(AuthSession)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Extractor yielding the session if one is present and valid.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(keys) = parts.extensions.get::<Arc<SessionKeys>>() else {
            return Ok(MaybeSession(None));
        };

        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeSession(get_session(keys, &jar)))
    }
}

/// Middleware injecting the session keys into request extensions.
pub async fn inject_session_keys(
    keys: Arc<SessionKeys>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(keys);
    next.run(request).await
}
