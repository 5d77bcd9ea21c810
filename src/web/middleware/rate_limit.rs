//! Per-client rate limiting for the login route.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use crate::config::ServerConfig;
use crate::web::error::ApiError;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// How often idle limiters are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// State for login rate limiting.
pub struct RateLimitState {
    limiters: RwLock<HashMap<String, Arc<IpRateLimiter>>>,
    /// Login attempts allowed per minute per client.
    requests_per_minute: u32,
    /// Whether forwarding headers identify the client.
    trust_proxy_headers: bool,
}

impl RateLimitState {
    /// Create a new rate limit state keyed on the peer address.
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            requests_per_minute,
            trust_proxy_headers: false,
        }
    }

    /// Create the state from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.login_rate_limit).with_trusted_proxy_headers(config.trust_proxy_headers)
    }

    /// Key clients on `X-Forwarded-For`/`X-Real-IP` when set by a trusted proxy.
    pub fn with_trusted_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Get or create the limiter for the given client.
    fn limiter_for(&self, ip: &str) -> Arc<IpRateLimiter> {
        {
            let read_guard = self.limiters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = self.limiters.write().unwrap_or_else(PoisonError::into_inner);

        // Double-check after acquiring write lock
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(self.burst())));
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Check whether a login attempt from `ip` is allowed.
    pub fn check(&self, ip: &str) -> bool {
        self.limiter_for(ip).check().is_ok()
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.limiters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn burst(&self) -> NonZeroU32 {
        NonZeroU32::new(self.requests_per_minute).unwrap_or(NonZeroU32::MIN)
    }

    /// Drop limiters that are not in use and have fully replenished.
    pub fn cleanup(&self) {
        let burst = self.burst();
        let mut guard = self.limiters.write().unwrap_or_else(PoisonError::into_inner);
        // A full-burst check only succeeds on a replenished limiter, which is
        // then dropped anyway.
        guard.retain(|_, limiter| {
            Arc::strong_count(limiter) > 1 || matches!(limiter.check_n(burst), Ok(Err(_)))
        });
    }

    /// Start a background task that periodically calls [`cleanup`](Self::cleanup).
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
                tracing::debug!(clients = self.tracked_clients(), "Rate limiter cleanup");
            }
        });
    }
}

/// Extract the client IP.
///
/// Forwarding headers are client-controlled unless a reverse proxy
/// overwrites them, so they are only read when `trust_proxy_headers` is set.
/// Otherwise the peer address is used, or `"unknown"` without one.
pub fn client_ip(req: &Request<Body>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_ip(req) {
            return ip;
        }
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn header_value<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn forwarded_ip(req: &Request<Body>) -> Option<String> {
    // Take the first IP in the chain
    if let Some(ip) = header_value(req, "X-Forwarded-For")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(ip.to_string());
    }

    header_value(req, "X-Real-IP").map(str::to_string)
}

/// Rate limiting middleware for the login route.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req, state.trust_proxy_headers);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }

    next.run(req).await
}
