use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// Upper bound on `userInput`, counted in UTF-16 code units.
pub const MAX_USER_INPUT_CHARS: usize = 4000;

/// Result text used when the provider answers without any message content.
pub const NO_CONTENT_SENTINEL: &str = "(No content returned)";

/// Sampling temperature in `[0.0, 1.0]`.
///
/// Holds the JSON number exactly as the caller sent it, so `0` is echoed and
/// submitted as `0` rather than `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Temperature(Number);

impl Temperature {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;

    /// Returns `None` when the number falls outside `[MIN, MAX]`.
    pub fn new(number: Number) -> Option<Self> {
        let value = number.as_f64()?;
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(number))
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).and_then(Self::new)
    }

    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or_default()
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated inbound chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub user_input: String,
    pub persona_key: String,
    pub temperature: Temperature,
}

/// Role tag of an upstream chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Exactly one system message followed by exactly one user message.
///
/// The pair is fixed at construction; there is no way to reorder or append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    messages: [ChatMessage; 2],
}

impl ComposedPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: [
                ChatMessage {
                    role: Role::System,
                    content: system.into(),
                },
                ChatMessage {
                    role: Role::User,
                    content: user.into(),
                },
            ],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn system(&self) -> &str {
        &self.messages[0].content
    }

    pub fn user(&self) -> &str {
        &self.messages[1].content
    }
}

impl Serialize for ComposedPrompt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages.serialize(serializer)
    }
}

/// The exact JSON body sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedPayload {
    pub model: String,
    pub messages: ComposedPrompt,
    pub temperature: Temperature,
}

impl SubmittedPayload {
    pub fn new(model: impl Into<String>, messages: ComposedPrompt, temperature: Temperature) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature,
        }
    }
}

/// How a single upstream call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// 2xx with the first completion's text (or [`NO_CONTENT_SENTINEL`]).
    Completed { text: String },
    /// The provider answered with a failure status.
    Rejected {
        status: u16,
        message: String,
        raw: Value,
    },
    /// No response was received.
    Unreachable { reason: String, timed_out: bool },
}

/// An upstream outcome paired with the payload that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamExchange {
    pub submitted: SubmittedPayload,
    pub outcome: UpstreamOutcome,
}
