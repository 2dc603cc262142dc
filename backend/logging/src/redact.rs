//! Log Redaction Layer
//!
//! Scrubs bearer tokens and provider API keys from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(hf_[a-zA-Z0-9]{16,}|sk-[a-zA-Z0-9\-_]{20,})").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "upstream said: invalid Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 for hf_AbCdEfGhIjKlMnOpQrSt";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("hf_AbCdEfGhIjKlMnOpQrSt"));
        assert!(clean.starts_with("upstream said: invalid Bearer [REDACTED_TOKEN]"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        let raw = "quota exceeded for model meta-llama/Meta-Llama-3-8B-Instruct";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
