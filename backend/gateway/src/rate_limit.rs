//! Gateway Rate Limiting Module
//!
//! Fixed-window admission gate keyed by client identity. Runs before any
//! request processing; rejected requests never reach a handler.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use promptproxy_core::ProxyError;

use crate::error::ApiError;
use crate::server::GatewayState;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Per-identity window state.
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Result of one admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    /// Remaining quota in this window.
    pub remaining: u32,
    /// Time until the current window rolls over.
    pub reset_in: Duration,
}

impl RateLimitDecision {
    /// Whole seconds until reset, rounded up so clients never retry early.
    pub fn reset_in_secs(&self) -> u64 {
        let secs = self.reset_in.as_secs();
        if self.reset_in.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// In-memory limiter. State is lost on restart.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, RateWindow>>>,
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(20, Duration::from_secs(60))
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Count a request from `identity` and decide whether it is admitted.
    pub async fn check(&self, identity: &str) -> RateLimitDecision {
        self.check_at(identity, Instant::now()).await
    }

    pub(crate) async fn check_at(&self, identity: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().await;

        let state = windows.entry(identity.to_string()).or_insert(RateWindow {
            count: 0,
            window_start: now,
        });

        if now.saturating_duration_since(state.window_start) >= self.window {
            state.count = 0;
            state.window_start = now;
            debug!(identity, "Rate limit window reset");
        }

        let reset_in = self
            .window
            .saturating_sub(now.saturating_duration_since(state.window_start));

        if state.count < self.max_requests {
            state.count += 1;
            let remaining = self.max_requests - state.count;
            debug!(identity, count = state.count, remaining, "Rate limit check: allowed");
            RateLimitDecision {
                allowed: true,
                limit: self.max_requests,
                remaining,
                reset_in,
            }
        } else {
            warn!(identity, count = state.count, "Rate limit exceeded");
            RateLimitDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_in,
            }
        }
    }

    /// Drop expired windows to free memory. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now()).await
    }

    pub(crate) async fn cleanup_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, state| now.saturating_duration_since(state.window_start) < self.window);
        before - windows.len()
    }

    /// Number of identities currently tracked.
    pub async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// Sweep expired windows once per window length, for the life of the process.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.window);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.cleanup().await;
                if removed > 0 {
                    debug!(removed, "Swept expired rate limit windows");
                }
            }
        })
    }
}

/// Identify the caller: peer IP, or the first `X-Forwarded-For` hop when the
/// proxy in front of us is trusted.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(client) = forwarded {
            return client.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(decision.reset_in_secs()));
}

/// Middleware applied to every `/api` route.
pub async fn admission_gate(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = client_identity(request.headers(), peer, state.trust_proxy);
    let decision = state.limiter.check(&identity).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        ApiError::from(ProxyError::RateLimited {
            identity,
            retry_after_secs: decision.reset_in_secs(),
        })
        .into_response()
    };
    apply_headers(response.headers_mut(), &decision);
    response
}
