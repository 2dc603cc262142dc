use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use promptproxy_core::{
    CompletionProvider, ComposedPrompt, SubmittedPayload, Temperature, UpstreamExchange,
    UpstreamOutcome,
};

use crate::envelope::{extract_completion_text, extract_error_message};

/// OpenAI-compatible chat-completions router (Hugging Face by default).
pub struct RouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Option<Duration>,
}

impl RouterProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://router.huggingface.co/v1";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Deadline for the whole exchange, connect through body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn read_response(response: Response) -> UpstreamOutcome {
        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, status = status.as_u16(), "Failed to read upstream body");
                return UpstreamOutcome::Unreachable {
                    reason: e.to_string(),
                    timed_out: e.is_timeout(),
                };
            }
        };

        let parsed = serde_json::from_slice::<Value>(&bytes);

        if !status.is_success() {
            let raw = parsed
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            let message = extract_error_message(&raw);
            warn!(status = status.as_u16(), message = %message, "Upstream rejected request");
            return UpstreamOutcome::Rejected {
                status: status.as_u16(),
                message,
                raw,
            };
        }

        match parsed {
            Ok(raw) => UpstreamOutcome::Completed {
                text: extract_completion_text(&raw),
            },
            Err(e) => {
                warn!(error = %e, "Upstream success body is not JSON");
                UpstreamOutcome::Rejected {
                    status: 502,
                    message: "Upstream returned an unreadable response".to_string(),
                    raw: Value::String(String::from_utf8_lossy(&bytes).into_owned()),
                }
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for RouterProvider {
    fn name(&self) -> &str {
        "hf-router"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, prompt: &ComposedPrompt, temperature: &Temperature) -> UpstreamExchange {
        let start = Instant::now();
        let submitted = SubmittedPayload::new(&self.model, prompt.clone(), temperature.clone());

        debug!(model = %self.model, temperature = %temperature, "Sending request to completion router");

        let mut request = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&submitted);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let outcome = match request.send().await {
            Ok(response) => Self::read_response(response).await,
            Err(e) => {
                warn!(error = %e, timed_out = e.is_timeout(), "Completion router unreachable");
                UpstreamOutcome::Unreachable {
                    reason: e.to_string(),
                    timed_out: e.is_timeout(),
                }
            }
        };

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            success = matches!(outcome, UpstreamOutcome::Completed { .. }),
            "Completion router call finished"
        );

        UpstreamExchange { submitted, outcome }
    }
}
