//! Telemetry and structured logging for the Prompt Proxy gateway.
//!
//! Handles log redaction, JSON file output with rotation, and chat event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ChatEvent, EventLogEntry, EventLogger};
pub use logger::{init_logger, LoggerGuard};
pub use redact::redact_sensitive_data;
