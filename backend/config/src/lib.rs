//! `promptproxy-config`: runtime configuration for the Prompt Proxy gateway.
//!
//! Provides:
//! - Typed config schema with defaults
//! - Loading from the process environment (plus an optional `.env` file)
//! - Validation with errors and warnings
//! - Redaction for safe logging/display

pub mod defaults;
pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{from_env_map, load_from_env, EnvError};
pub use redact::redact;
pub use schema::ProxyConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};

/// Log validation findings and refuse configs with errors.
///
/// Call after the logger is up so warnings reach the log file.
pub fn ensure_valid(config: &ProxyConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("configuration has {} error(s)", report.errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_and_zero_quota_fails() {
        assert!(ensure_valid(&ProxyConfig::with_api_key("hf_test")).is_ok());

        let mut config = ProxyConfig::with_api_key("hf_test");
        config.rate_limit_max = 0;
        assert!(ensure_valid(&config).is_err());
    }
}
