//! Caller-visible error responses.
//!
//! Lower layers return typed failures; this is the only place that picks a
//! status code and body shape.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use tracing::debug;

use promptproxy_core::{ProxyError, SubmittedPayload, ValidationErrors};

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug)]
pub enum ApiError {
    RateLimited {
        identity: String,
        retry_after_secs: u64,
    },
    InvalidRequest(ValidationErrors),
    UnknownPersona(String),
    /// The provider answered with a failure status; mirrored to the caller.
    UpstreamRejected {
        status: u16,
        message: String,
        raw: Value,
        submitted: SubmittedPayload,
    },
    UpstreamUnreachable {
        reason: String,
        timed_out: bool,
        submitted: SubmittedPayload,
    },
}

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::RateLimited {
                identity,
                retry_after_secs,
            } => ApiError::RateLimited {
                identity,
                retry_after_secs,
            },
            ProxyError::Validation(errors) => ApiError::InvalidRequest(errors),
            ProxyError::UnknownPersona(key) => ApiError::UnknownPersona(key),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited {
                identity,
                retry_after_secs,
            } => {
                debug!(identity = %identity, retry_after_secs, "Refused by admission gate");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    RATE_LIMIT_MESSAGE,
                )
                    .into_response()
            }
            ApiError::InvalidRequest(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request", "details": details })),
            )
                .into_response(),
            ApiError::UnknownPersona(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Unknown personaKey" })),
            )
                .into_response(),
            ApiError::UpstreamRejected {
                status,
                message,
                raw,
                submitted,
            } => {
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    status,
                    Json(json!({
                        "error": message,
                        "raw": raw,
                        "submittedPayload": submitted,
                    })),
                )
                    .into_response()
            }
            ApiError::UpstreamUnreachable {
                reason,
                timed_out,
                submitted,
            } => {
                let (status, error) = if timed_out {
                    (StatusCode::GATEWAY_TIMEOUT, "Upstream timed out")
                } else {
                    (StatusCode::BAD_GATEWAY, "Upstream unreachable")
                };
                (
                    status,
                    Json(json!({
                        "error": error,
                        "details": reason,
                        "submittedPayload": submitted,
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// The generic 500 body, used for failures caught at the outermost layer.
pub fn server_error(details: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Server error", "details": details.into() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptproxy_core::{ComposedPrompt, Temperature};

    fn payload() -> SubmittedPayload {
        SubmittedPayload::new(
            "m",
            ComposedPrompt::new("s", "u"),
            Temperature::from_f64(0.3).unwrap(),
        )
    }

    #[test]
    fn upstream_status_is_mirrored() {
        let response = ApiError::UpstreamRejected {
            status: 429,
            message: "quota exceeded".into(),
            raw: json!({}),
            submitted: payload(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn non_error_upstream_status_becomes_bad_gateway() {
        let response = ApiError::UpstreamRejected {
            status: 302,
            message: "moved".into(),
            raw: json!({}),
            submitted: payload(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn timeouts_and_unreachable_differ() {
        let timed_out = ApiError::UpstreamUnreachable {
            reason: "deadline".into(),
            timed_out: true,
            submitted: payload(),
        }
        .into_response();
        let refused = ApiError::UpstreamUnreachable {
            reason: "refused".into(),
            timed_out: false,
            submitted: payload(),
        }
        .into_response();
        assert_eq!(timed_out.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(refused.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = ApiError::from(ProxyError::RateLimited {
            identity: "1.2.3.4".into(),
            retry_after_secs: 42,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn lookup_and_validation_errors_are_both_400() {
        let unknown = ApiError::from(ProxyError::UnknownPersona("ghost".into())).into_response();
        let invalid =
            ApiError::from(ProxyError::Validation(ValidationErrors::default())).into_response();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
