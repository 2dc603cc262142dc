//! Response-body parsing for OpenAI-compatible completion endpoints.
//!
//! Providers disagree on the error envelope. Seen in practice:
//! `{"error": "text"}`, `{"error": {"message": "text", ...}}` and `{"message": "text"}`.

use serde::Deserialize;
use serde_json::Value;

use promptproxy_core::NO_CONTENT_SENTINEL;

/// Message used when no readable text can be found in an error body.
pub const DEFAULT_ERROR_MESSAGE: &str = "Upstream provider error";

/// The `error` member of a provider error body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Object {
        #[serde(default)]
        message: Option<String>,
    },
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

/// Best-effort human message from an error body. Empty strings count as absent.
pub fn extract_error_message(raw: &Value) -> String {
    let Ok(envelope) = ErrorEnvelope::deserialize(raw) else {
        return DEFAULT_ERROR_MESSAGE.to_string();
    };

    let from_error = match envelope.error {
        Some(ErrorDetail::Object { message }) => message,
        Some(ErrorDetail::Text(text)) => Some(text),
        Some(ErrorDetail::Other(_)) | None => None,
    };

    from_error
        .into_iter()
        .chain(envelope.message)
        .find(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

/// Content of the first completion, or [`NO_CONTENT_SENTINEL`] when absent.
pub fn extract_completion_text(raw: &Value) -> String {
    let content = CompletionBody::deserialize(raw)
        .ok()
        .and_then(|body| body.choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);

    match content {
        Some(Value::String(text)) => text,
        None | Some(Value::Null) => NO_CONTENT_SENTINEL.to_string(),
        Some(other) => other.to_string(),
    }
}
