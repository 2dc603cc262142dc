//! Main HTTP Gateway Server.
//!
//! Routing, shared state, and the cross-cutting layers (admission gate,
//! body limit, CORS, security headers, panic capture, tracing).

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use promptproxy_config::ProxyConfig;
use promptproxy_core::CompletionProvider;
use promptproxy_prompt::{PersonaRegistry, PromptComposer};
use promptproxy_upstream::RouterProvider;

use crate::error::server_error;
use crate::rate_limit::{admission_gate, RateLimiter};
use crate::{chat_api, control_ui, health_api};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub composer: PromptComposer,
    pub provider: Arc<dyn CompletionProvider>,
    pub limiter: RateLimiter,
    /// Honor `X-Forwarded-For` when identifying clients.
    pub trust_proxy: bool,
    pub started_at: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(
        registry: Arc<PersonaRegistry>,
        provider: Arc<dyn CompletionProvider>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            composer: PromptComposer::new(registry),
            provider,
            limiter,
            trust_proxy: false,
            started_at: Utc::now(),
        }
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// Production wiring: built-in personas and the configured completion router.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let provider = RouterProvider::new(&config.api_key, &config.model)
            .with_base_url(&config.upstream_base_url)
            .with_timeout(config.upstream_timeout());
        let limiter = RateLimiter::new(config.rate_limit_max, config.rate_limit_window());

        Self::new(Arc::new(PersonaRegistry::builtin()), Arc::new(provider), limiter)
            .with_trust_proxy(config.trust_proxy)
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(details = %details, "Request handler panicked");
    server_error(details)
}

fn cors_layer(client_origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(client_origin)
        .with_context(|| format!("Invalid client origin: {client_origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Build the full application router.
pub fn build_router(state: GatewayState, config: &ProxyConfig) -> Result<Router> {
    let api = Router::new()
        .route("/personas", get(chat_api::list_personas))
        .route("/chat", post(chat_api::chat))
        .route("/health", get(health_api::get_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn_with_state(state.clone(), admission_gate));

    let mut app = Router::new().nest("/api", api);
    if let Some(ui) = control_ui::static_files(&config.static_dir) {
        app = app.fallback_service(ui);
    }

    let app = app
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(&config.client_origin)?)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}

/// Starts the gateway and serves until interrupted.
#[instrument(skip_all, fields(addr = %config.listen_addr()))]
pub async fn start_server(config: &ProxyConfig) -> Result<()> {
    let state = GatewayState::from_config(config);
    let _sweeper = state.limiter.spawn_sweeper();
    let app = build_router(state, config)?;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %addr,
        model = %config.model,
        origin = %config.client_origin,
        "Prompt Proxy listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
