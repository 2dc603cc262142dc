//! Request composition for the Prompt Proxy gateway.
//!
//! Turns an untrusted request body into the exact system + user message pair
//! that is sent upstream.

pub mod composer;
pub mod persona;
pub mod rules;
pub mod validator;

pub use composer::PromptComposer;
pub use persona::{derive_label, PersonaDefinition, PersonaKey, PersonaRegistry, UnknownPersonaKey};
pub use rules::developer_rules;
pub use validator::validate;
