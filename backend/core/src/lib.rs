pub mod error;
pub mod traits;
pub mod types;

pub use error::{ProxyError, ValidationErrors};
pub use traits::CompletionProvider;
pub use types::{
    ChatMessage, ChatRequest, ComposedPrompt, Role, SubmittedPayload, Temperature,
    UpstreamExchange, UpstreamOutcome, MAX_USER_INPUT_CHARS, NO_CONTENT_SENTINEL,
};
