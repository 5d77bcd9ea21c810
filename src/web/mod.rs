//! Web API module for gymdesk.
//!
//! Exposes login, logout and session introspection, plus administrative
//! routes gated by role capabilities. Sessions travel in an `HttpOnly`
//! cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod session;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_router, create_router_with_rate_limit};
pub use server::WebServer;
pub use session::{get_session, issue_session, AuthSession, MaybeSession};
