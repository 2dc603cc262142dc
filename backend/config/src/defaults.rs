//! Default values applied when a variable is unset.

pub const MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";
pub const UPSTREAM_BASE_URL: &str = "https://router.huggingface.co/v1";
pub const UPSTREAM_TIMEOUT_SECS: u64 = 60;
pub const CLIENT_ORIGIN: &str = "http://localhost:3000";
pub const BIND_ADDRESS: &str = "0.0.0.0";
pub const PORT: u16 = 3000;
pub const RATE_LIMIT_MAX: u32 = 20;
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const STATIC_DIR: &str = "public";
pub const LOG_DIR: &str = "logs";
pub const LOG_LEVEL: &str = "info";
