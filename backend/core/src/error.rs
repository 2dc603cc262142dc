use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Top-level error type for the Prompt Proxy gateway.
///
/// Upstream rejections are not errors: they travel as
/// [`UpstreamOutcome`](crate::UpstreamOutcome) so the submitted payload stays attached.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("rate limit exceeded for {identity}")]
    RateLimited { identity: String, retry_after_secs: u64 },

    #[error("invalid request: {0}")]
    Validation(ValidationErrors),

    #[error("unknown persona: {0}")]
    UnknownPersona(String),
}

/// Every violation found while checking an inbound body.
///
/// Serializes as `{ "formErrors": [...], "fieldErrors": { "<field>": [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// True when at least one violation is recorded against `field`.
    pub fn names(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{field}: {}", messages.join(", ")));
        }
        f.write_str(&parts.join("; "))
    }
}
