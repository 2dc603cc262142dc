//! Prompt Proxy runtime configuration schema.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::defaults;
use crate::redact::redact;

/// Root configuration for the gateway process.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Bearer credential for the completion provider. Required.
    pub api_key: String,
    /// Model identifier placed in every upstream payload
    pub model: String,
    /// Base URL of the OpenAI-compatible router (without `/chat/completions`)
    pub upstream_base_url: String,
    /// Deadline for one upstream call, in seconds
    pub upstream_timeout_secs: u64,
    /// Browser origin allowed to call the API cross-origin
    pub client_origin: String,
    pub bind_address: String,
    pub port: u16,
    /// Honor `X-Forwarded-For` when identifying clients for rate limiting
    pub trust_proxy: bool,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    /// Directory of static UI assets served at `/`
    pub static_dir: String,
    pub log_dir: String,
    pub log_level: String,
}

impl ProxyConfig {
    /// A config with defaults for everything but the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: defaults::MODEL.to_string(),
            upstream_base_url: defaults::UPSTREAM_BASE_URL.to_string(),
            upstream_timeout_secs: defaults::UPSTREAM_TIMEOUT_SECS,
            client_origin: defaults::CLIENT_ORIGIN.to_string(),
            bind_address: defaults::BIND_ADDRESS.to_string(),
            port: defaults::PORT,
            trust_proxy: false,
            rate_limit_max: defaults::RATE_LIMIT_MAX,
            rate_limit_window_secs: defaults::RATE_LIMIT_WINDOW_SECS,
            static_dir: defaults::STATIC_DIR.to_string(),
            log_dir: defaults::LOG_DIR.to_string(),
            log_level: defaults::LOG_LEVEL.to_string(),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Snapshot safe to log: secrets are masked.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .map(|v| redact(&v))
            .unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyConfig({})", self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_key() {
        let config = ProxyConfig::with_api_key("hf_supersecretvalue123");
        let debug = format!("{config:?}");
        assert!(!debug.contains("supersecretvalue"));
        assert!(debug.contains("meta-llama/Meta-Llama-3-8B-Instruct"));
    }

    #[test]
    fn derived_values() {
        let config = ProxyConfig::with_api_key("k");
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(60));
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
    }
}
