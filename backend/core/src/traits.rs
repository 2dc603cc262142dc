use async_trait::async_trait;

use crate::types::{ComposedPrompt, Temperature, UpstreamExchange};

/// A completion endpoint the gateway forwards composed prompts to.
///
/// `send` never fails outright: transport failures and provider rejections are
/// reported through [`UpstreamOutcome`](crate::UpstreamOutcome), always next to
/// the payload that was submitted.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "hf-router", "mock").
    fn name(&self) -> &str;

    /// Model identifier placed in every outbound payload.
    fn model(&self) -> &str;

    /// Issue exactly one completion call. No retries.
    async fn send(&self, prompt: &ComposedPrompt, temperature: &Temperature) -> UpstreamExchange;
}
