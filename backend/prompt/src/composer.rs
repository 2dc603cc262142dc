//! Prompt composition: persona fragment, developer rules, raw user input.

use std::sync::Arc;

use promptproxy_core::{ChatRequest, ComposedPrompt, ProxyError};

use crate::persona::PersonaRegistry;
use crate::rules::developer_rules;

/// Separator between the persona fragment and the developer rules.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Builds the system + user message pair for a validated request.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    registry: Arc<PersonaRegistry>,
}

impl PromptComposer {
    pub fn new(registry: Arc<PersonaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Deterministic: identical requests produce identical prompts.
    ///
    /// The user input is passed through untouched; bounds were enforced by the validator.
    pub fn compose(&self, request: &ChatRequest) -> Result<ComposedPrompt, ProxyError> {
        let persona = self.registry.get(&request.persona_key)?;
        let system = [persona.description, developer_rules()].join(SECTION_SEPARATOR);
        Ok(ComposedPrompt::new(system, request.user_input.clone()))
    }
}
