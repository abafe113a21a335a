use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use super::personas::{PERSONAS, Persona};
use crate::error::{CoreError, CoreResult};

/// Numeric agent identifier. The local backend addresses agents by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u8);

impl Display for AgentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub id: AgentId,
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub system_instruction: &'static str,
    pub examples: &'static [&'static str],
    pub address: &'static str,
    pub endpoint: String,
}

impl AgentProfile {
    fn from_persona(persona: &Persona, endpoint: String) -> Self {
        Self {
            id: AgentId(persona.id),
            key: persona.key,
            name: persona.name,
            description: persona.description,
            system_instruction: persona.system_instruction,
            examples: persona.examples,
            address: persona.address,
            endpoint,
        }
    }

    pub fn greeting(&self) -> String {
        format!(
            "Hello! I'm your {}.\n\n{}\n\nHow can I help you today?",
            self.name, self.description
        )
    }
}

/// Read-only table of agent profiles, built once at startup.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    profiles: Vec<AgentProfile>,
}

impl AgentRegistry {
    /// Builds the registry from the built-in personas. `default_endpoint` yields the
    /// backend endpoint for an agent unless `overrides` names one for its key.
    pub fn builtin<F: Fn(AgentId) -> String>(
        default_endpoint: F,
        overrides: &HashMap<String, String>,
    ) -> Self {
        let profiles = PERSONAS
            .iter()
            .map(|persona| {
                let endpoint = overrides
                    .get(persona.key)
                    .cloned()
                    .unwrap_or_else(|| default_endpoint(AgentId(persona.id)));
                AgentProfile::from_persona(persona, endpoint)
            })
            .collect();

        Self { profiles }
    }

    pub fn get(&self, id: AgentId) -> CoreResult<&AgentProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Resolves an agent by key (case-insensitive) or by its numeric id as text.
    pub fn lookup(&self, selector: &str) -> CoreResult<&AgentProfile> {
        let selector = selector.trim();

        self.profiles
            .iter()
            .find(|profile| {
                profile.key.eq_ignore_ascii_case(selector) || profile.id.to_string() == selector
            })
            .ok_or_else(|| CoreError::NotFound(selector.to_string()))
    }

    pub fn profiles(&self) -> &[AgentProfile] {
        &self.profiles
    }

    pub fn is_known_key(key: &str) -> bool {
        PERSONAS.iter().any(|persona| persona.key == key)
    }
}
