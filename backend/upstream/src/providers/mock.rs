use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use promptproxy_core::{
    CompletionProvider, ComposedPrompt, SubmittedPayload, Temperature, UpstreamExchange,
    UpstreamOutcome,
};

/// A completion provider that returns a canned outcome and counts calls.
pub struct MockProvider {
    name: String,
    model: String,
    outcome: UpstreamOutcome,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: "mock-model".to_string(),
            outcome: UpstreamOutcome::Completed {
                text: "Mock response".to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_outcome(UpstreamOutcome::Completed { text: text.into() })
    }

    pub fn with_outcome(mut self, outcome: UpstreamOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of `send` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, prompt: &ComposedPrompt, temperature: &Temperature) -> UpstreamExchange {
        self.calls.fetch_add(1, Ordering::SeqCst);
        UpstreamExchange {
            submitted: SubmittedPayload::new(&self.model, prompt.clone(), temperature.clone()),
            outcome: self.outcome.clone(),
        }
    }
}
