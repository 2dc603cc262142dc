//! Prompt Proxy Gateway HTTP API Server
//!
//! Provides the persona and chat REST API, the per-client admission gate,
//! and static hosting of the browser UI.

pub mod chat_api;
pub mod control_ui;
pub mod error;
pub mod health_api;
pub mod rate_limit;
pub mod server;

pub use error::ApiError;
pub use rate_limit::{client_identity, RateLimitDecision, RateLimiter};
pub use server::{build_router, start_server, GatewayState, MAX_BODY_BYTES};
