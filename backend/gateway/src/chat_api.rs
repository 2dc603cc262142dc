//! Persona listing and chat endpoints.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use promptproxy_core::{ProxyError, SubmittedPayload, Temperature, UpstreamOutcome};
use promptproxy_logging::{ChatEvent, EventLogger};
use promptproxy_prompt::validate;

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub temperature: Temperature,
    pub result: String,
    pub submitted_payload: SubmittedPayload,
}

/// Handler for `GET /api/personas`.
pub async fn list_personas(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({ "personas": state.composer.registry().list() }))
}

/// Handler for `POST /api/chat`.
///
/// The body is read as raw bytes so malformed JSON is reported in the same
/// `Invalid request` shape as field violations.
pub async fn chat(State(state): State<GatewayState>, body: Bytes) -> Result<Json<ChatResponse>, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("chat", request_id = %request_id);
    handle_chat(state, body, request_id).instrument(span).await
}

async fn handle_chat(state: GatewayState, body: Bytes, request_id: String) -> Result<Json<ChatResponse>, ApiError> {
    let request = validate(&body).map_err(|errors| {
        EventLogger::log_event(&request_id, ChatEvent::Rejected { reason: errors.to_string() });
        ApiError::from(ProxyError::Validation(errors))
    })?;

    let prompt = state.composer.compose(&request).map_err(|err| {
        EventLogger::log_event(&request_id, ChatEvent::Rejected { reason: err.to_string() });
        ApiError::from(err)
    })?;

    EventLogger::log_event(
        &request_id,
        ChatEvent::Accepted {
            persona_key: request.persona_key.clone(),
            temperature: request.temperature.value(),
            input_chars: request.user_input.chars().count(),
        },
    );

    let start = Instant::now();
    let exchange = state.provider.send(&prompt, &request.temperature).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match exchange.outcome {
        UpstreamOutcome::Completed { text } => {
            EventLogger::log_event(
                &request_id,
                ChatEvent::Completed {
                    model: exchange.submitted.model.clone(),
                    output_chars: text.chars().count(),
                    latency_ms,
                },
            );
            Ok(Json(ChatResponse {
                temperature: request.temperature,
                result: text,
                submitted_payload: exchange.submitted,
            }))
        }
        UpstreamOutcome::Rejected {
            status,
            message,
            raw,
        } => {
            EventLogger::log_event(
                &request_id,
                ChatEvent::UpstreamFailed {
                    status: Some(status),
                    message: message.clone(),
                    latency_ms,
                },
            );
            Err(ApiError::UpstreamRejected {
                status,
                message,
                raw,
                submitted: exchange.submitted,
            })
        }
        UpstreamOutcome::Unreachable { reason, timed_out } => {
            EventLogger::log_event(
                &request_id,
                ChatEvent::UpstreamFailed {
                    status: None,
                    message: reason.clone(),
                    latency_ms,
                },
            );
            Err(ApiError::UpstreamUnreachable {
                reason,
                timed_out,
                submitted: exchange.submitted,
            })
        }
    }
}
