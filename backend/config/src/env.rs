//! Loading configuration from environment variables.
//!
//! An optional `.env` file in the working directory is read first; variables
//! already set in the process environment win.

use std::collections::HashMap;
use std::ffi::OsString;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::schema::ProxyConfig;

pub const API_KEY: &str = "API_KEY";
pub const HF_MODEL: &str = "HF_MODEL";
pub const UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";
pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const CLIENT_ORIGIN: &str = "CLIENT_ORIGIN";
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const PORT: &str = "PORT";
pub const TRUST_PROXY: &str = "TRUST_PROXY";
pub const RATE_LIMIT_MAX: &str = "RATE_LIMIT_MAX";
pub const RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";
pub const STATIC_DIR: &str = "STATIC_DIR";
pub const LOG_DIR: &str = "LOG_DIR";
pub const RUST_LOG: &str = "RUST_LOG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("Missing env var \"{0}\"; set it in the environment or a .env file")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for env var \"{var_name}\": {reason}")]
    Invalid {
        var_name: &'static str,
        value: String,
        reason: String,
    },
}

/// Read `.env` (if present) and then the process environment.
pub fn load_from_env() -> Result<ProxyConfig, EnvError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => debug!(error = %e, "Ignoring unreadable .env file"),
    }
    from_env_map(&utf8_vars(std::env::vars_os()))
}

/// Non-UTF-8 variables cannot hold any of our settings; skip them.
fn utf8_vars(vars: impl Iterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Build a config from an explicit variable map (useful for testing).
pub fn from_env_map(env: &HashMap<String, String>) -> Result<ProxyConfig, EnvError> {
    let api_key = lookup(env, API_KEY).ok_or(EnvError::Missing(API_KEY))?;
    let mut config = ProxyConfig::with_api_key(api_key);

    if let Some(model) = lookup(env, HF_MODEL) {
        config.model = model.to_string();
    }
    if let Some(url) = lookup(env, UPSTREAM_BASE_URL) {
        config.upstream_base_url = url.to_string();
    }
    if let Some(origin) = lookup(env, CLIENT_ORIGIN) {
        config.client_origin = origin.to_string();
    }
    if let Some(bind) = lookup(env, BIND_ADDRESS) {
        config.bind_address = bind.to_string();
    }
    if let Some(dir) = lookup(env, STATIC_DIR) {
        config.static_dir = dir.to_string();
    }
    if let Some(dir) = lookup(env, LOG_DIR) {
        config.log_dir = dir.to_string();
    }
    if let Some(level) = lookup(env, RUST_LOG) {
        config.log_level = level.to_string();
    }

    config.port = parse_or(env, PORT, config.port)?;
    config.upstream_timeout_secs = parse_or(env, UPSTREAM_TIMEOUT_SECS, config.upstream_timeout_secs)?;
    config.rate_limit_max = parse_or(env, RATE_LIMIT_MAX, config.rate_limit_max)?;
    config.rate_limit_window_secs = parse_or(env, RATE_LIMIT_WINDOW_SECS, config.rate_limit_window_secs)?;
    config.trust_proxy = match lookup(env, TRUST_PROXY) {
        Some(raw) => parse_bool(TRUST_PROXY, raw)?,
        None => false,
    };

    Ok(config)
}

/// Unset and empty values are treated the same.
fn lookup<'a>(env: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    env.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(env: &HashMap<String, String>, name: &'static str, default: T) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(env, name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| EnvError::Invalid {
            var_name: name,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, EnvError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EnvError::Invalid {
            var_name: name,
            value: raw.to_string(),
            reason: "expected true/false".to_string(),
        }),
    }
}
