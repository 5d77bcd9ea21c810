//! Router configuration for the web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{export_data, list_logs, login, logout, me, AppState};
use super::middleware::{create_cors_layer, login_rate_limit, security_headers, RateLimitState};
use super::session::inject_session_keys;
use crate::config::ServerConfig;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &ServerConfig) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::from_config(config));
    create_router_with_rate_limit(app_state, config, rate_limit_state)
}

/// Create the main API router with an existing rate limit state.
pub fn create_router_with_rate_limit(
    app_state: Arc<AppState>,
    config: &ServerConfig,
    rate_limit_state: Arc<RateLimitState>,
) -> Router {
    let login_route = Router::new()
        .route("/login", post(login))
        .layer(middleware::from_fn(move |req, next| {
            let state = rate_limit_state.clone();
            login_rate_limit(state, req, next)
        }));

    let auth_routes = Router::new()
        .merge(login_route)
        .route("/logout", post(logout))
        .route("/me", get(me));

    let admin_routes = Router::new()
        .route("/logs", get(list_logs))
        .route("/export", get(export_data));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes);

    let keys = app_state.keys.clone();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let keys = keys.clone();
                    inject_session_keys(keys, req, next)
                })),
        )
        .with_state(app_state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
