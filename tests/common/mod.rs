//! Shared helpers for web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::SET_COOKIE;
use axum_test::{TestResponse, TestServer};
use gymdesk::auth::{create_account_with_cost, SessionKeys};
use gymdesk::config::ServerConfig;
use gymdesk::web::{create_router, AppState};
use gymdesk::{Database, Role, User};
use serde_json::json;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";
pub const TEST_PASSWORD: &str = "password123";
const TEST_COST: u32 = 4;

pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub keys: Arc<SessionKeys>,
}

/// Create a test server with an in-memory database.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_rate_limit(1000).await
}

/// Create a test server with a specific login rate limit.
pub async fn create_test_app_with_rate_limit(login_rate_limit: u32) -> TestApp {
    create_test_app_with_config(ServerConfig {
        login_rate_limit,
        ..ServerConfig::default()
    })
    .await
}

/// Create a test server from a server configuration.
pub async fn create_test_app_with_config(config: ServerConfig) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let keys = Arc::new(SessionKeys::new(TEST_SECRET, 24 * 60 * 60).unwrap());

    let app_state = Arc::new(AppState::new(db.clone(), keys.clone(), false));
    let router = create_router(app_state, &config);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, db, keys }
}

/// Create an account directly in the database.
pub async fn create_user(db: &Database, email: &str, role: Role) -> User {
    create_account_with_cost(db.pool(), email, TEST_PASSWORD, "Test User", role, TEST_COST)
        .await
        .expect("Failed to create test user")
}

/// POST /api/auth/login.
pub async fn login(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await
}

/// The raw `Set-Cookie` header of a response.
pub fn set_cookie(response: &TestResponse) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("missing Set-Cookie header")
        .to_string()
}

/// The session token carried by a response's `Set-Cookie` header.
pub fn session_token(response: &TestResponse) -> String {
    let header = set_cookie(response);
    let pair = header.split(';').next().unwrap_or_default();
    pair.strip_prefix("session=")
        .expect("Set-Cookie is not the session cookie")
        .to_string()
}

/// Create an account, log in and return the session token.
pub async fn login_as(app: &TestApp, email: &str, role: Role) -> String {
    create_user(&app.db, email, role).await;
    let response = login(&app.server, email, TEST_PASSWORD).await;
    response.assert_status_ok();
    session_token(&response)
}

/// Value of the `Cookie` request header for a session token.
pub fn cookie_header(token: &str) -> String {
    format!("session={token}")
}
