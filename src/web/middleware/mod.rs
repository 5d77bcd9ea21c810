//! Middleware for the web API.

pub mod cors;
pub mod rate_limit;
pub mod security;

pub use cors::create_cors_layer;
pub use rate_limit::{client_ip, login_rate_limit, RateLimitState};
pub use security::security_headers;
