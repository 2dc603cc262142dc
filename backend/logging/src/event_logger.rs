//! Chat Event Logger
//!
//! Structured per-request events, emitted through `tracing` under the
//! `chat_events` target so the JSON file layer captures them as NDJSON.
//! User input is never logged, only its length.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The request passed validation and persona lookup.
    Accepted {
        persona_key: String,
        temperature: f64,
        input_chars: usize,
    },
    /// The request never reached the provider.
    Rejected { reason: String },
    Completed {
        model: String,
        output_chars: usize,
        latency_ms: u64,
    },
    UpstreamFailed {
        status: Option<u16>,
        message: String,
        latency_ms: u64,
    },
}

impl ChatEvent {
    fn is_failure(&self) -> bool {
        matches!(self, ChatEvent::Rejected { .. } | ChatEvent::UpstreamFailed { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ChatEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts free-text fields, stamps the entry, and hands it to `tracing`.
    pub fn log_event(request_id: &str, mut event: ChatEvent) -> EventLogEntry {
        match &mut event {
            ChatEvent::Rejected { reason } => *reason = redact_sensitive_data(reason),
            ChatEvent::UpstreamFailed { message, .. } => *message = redact_sensitive_data(message),
            ChatEvent::Accepted { .. } | ChatEvent::Completed { .. } => {}
        }

        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        if entry.event.is_failure() {
            warn!(target: "chat_events", event = ?entry, "Chat event");
        } else {
            info!(target: "chat_events", event = ?entry, "Chat event");
        }
        entry
    }
}
