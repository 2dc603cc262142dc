//! Persona registry: the closed set of behavioral profiles a caller can select.
//!
//! Built once at startup and shared read-only; there is no runtime registration.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use promptproxy_core::ProxyError;

/// Every persona the gateway knows, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonaKey {
    SoftwareEngineer,
    CsTeacher,
    Musician,
    NetworkAdmin,
    Artist,
    Photographer,
    Nurse,
    Pediatrician,
}

impl PersonaKey {
    pub const ALL: [PersonaKey; 8] = [
        PersonaKey::SoftwareEngineer,
        PersonaKey::CsTeacher,
        PersonaKey::Musician,
        PersonaKey::NetworkAdmin,
        PersonaKey::Artist,
        PersonaKey::Photographer,
        PersonaKey::Nurse,
        PersonaKey::Pediatrician,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PersonaKey::SoftwareEngineer => "software_engineer",
            PersonaKey::CsTeacher => "cs_teacher",
            PersonaKey::Musician => "musician",
            PersonaKey::NetworkAdmin => "network_admin",
            PersonaKey::Artist => "artist",
            PersonaKey::Photographer => "photographer",
            PersonaKey::Nurse => "nurse",
            PersonaKey::Pediatrician => "pediatrician",
        }
    }

    /// System-prompt fragment injected ahead of the developer rules.
    pub fn description(self) -> &'static str {
        match self {
            PersonaKey::SoftwareEngineer => {
                "Adopt the perspective and communication style of a senior Software Engineer when relevant. \
                 Be precise, structured, and analytical. When tasks involve code, provide correct and maintainable \
                 solutions with brief tradeoff explanations. For non-technical tasks, respond normally while \
                 maintaining a clear and logical tone."
            }
            PersonaKey::CsTeacher => {
                "Adopt the perspective and communication style of a Computer Science teacher when relevant. \
                 Explain concepts clearly with small examples and address common misconceptions. For unrelated \
                 tasks, respond normally while keeping explanations structured and easy to understand."
            }
            PersonaKey::Musician => {
                "Adopt the creative perspective of a musician and composer when relevant. Offer imaginative and \
                 practical insights. For non-musical tasks, respond normally while maintaining a creative and \
                 expressive tone."
            }
            PersonaKey::NetworkAdmin => {
                "Adopt the practical, security-minded mindset of a Network Administrator when relevant. Provide \
                 step-by-step operational guidance for technical topics. For unrelated tasks, respond normally \
                 while remaining methodical and precise."
            }
            PersonaKey::Artist => {
                "Adopt the perspective of a visual artist when relevant. Offer advice on composition, color, and \
                 technique with clear, actionable suggestions. For unrelated tasks, respond normally while \
                 maintaining a thoughtful and creative tone."
            }
            PersonaKey::Photographer => {
                "Adopt the mindset of a photographer when relevant. Provide actionable guidance on lighting, \
                 framing, and technical settings. For unrelated tasks, respond normally while keeping responses \
                 practical and observational."
            }
            PersonaKey::Nurse => {
                "Adopt the communication style of a nurse when relevant. Provide general health information and \
                 encourage appropriate professional care without diagnosing. For unrelated tasks, respond \
                 normally while remaining calm and supportive."
            }
            PersonaKey::Pediatrician => {
                "Adopt the communication style of a pediatrician when relevant. Provide general pediatric \
                 information and safety guidance without diagnosing. For unrelated tasks, respond normally while \
                 remaining informative and reassuring."
            }
        }
    }
}

impl fmt::Display for PersonaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown persona key: {0}")]
pub struct UnknownPersonaKey(pub String);

impl From<UnknownPersonaKey> for ProxyError {
    fn from(err: UnknownPersonaKey) -> Self {
        ProxyError::UnknownPersona(err.0)
    }
}

impl FromStr for PersonaKey {
    type Err = UnknownPersonaKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonaKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownPersonaKey(s.to_string()))
    }
}

/// Turn an identifier like `cs_teacher` into `Cs Teacher`.
pub fn derive_label(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One entry of `GET /api/personas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaDefinition {
    pub key: &'static str,
    pub label: String,
    pub description: &'static str,
}

impl From<PersonaKey> for PersonaDefinition {
    fn from(key: PersonaKey) -> Self {
        Self {
            key: key.as_str(),
            label: derive_label(key.as_str()),
            description: key.description(),
        }
    }
}

/// Immutable registry of persona definitions.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<PersonaDefinition>,
}

impl PersonaRegistry {
    /// Registry holding every [`PersonaKey`] in registration order.
    pub fn builtin() -> Self {
        Self {
            personas: PersonaKey::ALL.into_iter().map(PersonaDefinition::from).collect(),
        }
    }

    pub fn list(&self) -> &[PersonaDefinition] {
        &self.personas
    }

    /// Total lookup for a known key.
    pub fn definition(&self, key: PersonaKey) -> &PersonaDefinition {
        // `personas` is built from `PersonaKey::ALL`, whose order follows the discriminants.
        &self.personas[key as usize]
    }

    /// Resolve an untrusted key string.
    pub fn get(&self, key: &str) -> Result<&PersonaDefinition, UnknownPersonaKey> {
        key.parse::<PersonaKey>().map(|k| self.definition(k))
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_capitalize_each_word() {
        assert_eq!(derive_label("cs_teacher"), "Cs Teacher");
        assert_eq!(derive_label("software_engineer"), "Software Engineer");
        assert_eq!(derive_label("nurse"), "Nurse");
        assert_eq!(derive_label("network-admin"), "Network Admin");
    }

    #[test]
    fn list_preserves_registration_order() {
        let registry = PersonaRegistry::builtin();
        let keys: Vec<&str> = registry.list().iter().map(|p| p.key).collect();
        assert_eq!(
            keys,
            vec![
                "software_engineer",
                "cs_teacher",
                "musician",
                "network_admin",
                "artist",
                "photographer",
                "nurse",
                "pediatrician",
            ]
        );
    }

    #[test]
    fn get_resolves_known_and_rejects_unknown() {
        let registry = PersonaRegistry::builtin();
        let teacher = registry.get("cs_teacher").unwrap();
        assert_eq!(teacher.label, "Cs Teacher");
        assert!(teacher.description.contains("Computer Science teacher"));

        assert_eq!(
            registry.get("ghost").unwrap_err(),
            UnknownPersonaKey("ghost".into())
        );
        // Keys are case-sensitive identifiers.
        assert!(registry.get("CS_TEACHER").is_err());
    }

    #[test]
    fn definition_matches_every_key() {
        let registry = PersonaRegistry::builtin();
        for key in PersonaKey::ALL {
            assert_eq!(registry.definition(key).key, key.as_str());
            assert_eq!(key.as_str().parse::<PersonaKey>(), Ok(key));
        }
    }
}
