//! Config validation: checks with user-friendly error messages.

use crate::schema::ProxyConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ProxyConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_upstream(config, &mut report);
    validate_server(config, &mut report);
    validate_rate_limit(config, &mut report);
    report
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn validate_upstream(config: &ProxyConfig, report: &mut ValidationReport) {
    if config.model.trim().is_empty() {
        report.error("model", "Model identifier cannot be empty");
    }
    if !is_http_url(&config.upstream_base_url) {
        report.error("upstreamBaseUrl", "Upstream base URL must start with http:// or https://");
    } else if config.upstream_base_url.starts_with("http://")
        && !config.upstream_base_url.contains("localhost")
        && !config.upstream_base_url.contains("127.0.0.1")
    {
        report.warn(
            "upstreamBaseUrl",
            "Upstream base URL is not HTTPS; the API key will be sent in clear text",
        );
    }
    if config.upstream_timeout_secs == 0 {
        report.error("upstreamTimeoutSecs", "upstreamTimeoutSecs must be >= 1");
    }
}

fn validate_server(config: &ProxyConfig, report: &mut ValidationReport) {
    if !is_http_url(&config.client_origin) {
        report.error("clientOrigin", "Client origin must start with http:// or https://");
    } else if config.client_origin.ends_with('/') {
        report.warn(
            "clientOrigin",
            "Browsers send origins without a trailing slash; cross-origin calls will be refused",
        );
    }
    if config.port < 1024 && config.port != 80 && config.port != 443 {
        report.warn(
            "port",
            format!(
                "Port {} requires elevated privileges; consider using a port >= 1024",
                config.port
            ),
        );
    }
}

fn validate_rate_limit(config: &ProxyConfig, report: &mut ValidationReport) {
    if config.rate_limit_max == 0 {
        report.error("rateLimitMax", "rateLimitMax must be >= 1");
    }
    if config.rate_limit_window_secs == 0 {
        report.error("rateLimitWindowSecs", "rateLimitWindowSecs must be >= 1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let report = validate(&ProxyConfig::with_api_key("k"));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn zero_limits_are_errors() {
        let mut config = ProxyConfig::with_api_key("k");
        config.upstream_timeout_secs = 0;
        config.rate_limit_max = 0;
        config.rate_limit_window_secs = 0;
        let report = validate(&config);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["upstreamTimeoutSecs", "rateLimitMax", "rateLimitWindowSecs"]
        );
    }

    #[test]
    fn plain_http_upstream_warns_unless_local() {
        let mut config = ProxyConfig::with_api_key("k");
        config.upstream_base_url = "http://llm.internal/v1".into();
        assert_eq!(validate(&config).warnings.len(), 1);

        config.upstream_base_url = "http://localhost:8000/v1".into();
        assert!(validate(&config).warnings.is_empty());

        config.upstream_base_url = "ftp://x".into();
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn trailing_slash_origin_warns() {
        let mut config = ProxyConfig::with_api_key("k");
        config.client_origin = "https://app.example.com/".into();
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "clientOrigin");
    }
}
