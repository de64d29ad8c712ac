//! Registry of platforms, agents, and the platform code mapping between them.
//!
//! The built-in registry is built once on first use and never mutated.
//! Custom registries (tests, embedders) are assembled with [`Registry::new`]
//! and [`Registry::map`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::agents::{builtin_agents, BUILTIN_CODES};
use super::grammar::{AgentGrammar, Grammar, PlatformGrammar};
use super::ids::{AgentId, PlatformId, Target, ORIGINAL_TARGET};
use super::platforms::{builtin_platforms, MARKETPLACES};

static BUILTIN: Lazy<Registry> = Lazy::new(Registry::builtin_tables);

/// How an agent refers to a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCode {
    /// Agent-specific code token.
    Token(&'static str),
    /// Supported, but the agent infers the platform from the embedded URL.
    Implicit,
    /// The agent cannot carry items from this platform.
    Unsupported,
}

impl PlatformCode {
    pub fn is_supported(&self) -> bool {
        !matches!(self, PlatformCode::Unsupported)
    }

    pub fn token(&self) -> Option<&'static str> {
        match self {
            PlatformCode::Token(token) => Some(*token),
            _ => None,
        }
    }
}

pub struct Registry {
    platforms: Vec<PlatformGrammar>,
    agents: Vec<AgentGrammar>,
    mappings: HashMap<PlatformId, HashMap<AgentId, PlatformCode>>,
    /// Per-agent code to platform. Two agents may share a token that means
    /// different platforms, so this is never flattened.
    reverse: HashMap<AgentId, HashMap<&'static str, PlatformId>>,
}

impl Registry {
    pub fn new(platforms: Vec<PlatformGrammar>, agents: Vec<AgentGrammar>) -> Self {
        Self {
            platforms,
            agents,
            mappings: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// The shared built-in registry.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    fn builtin_tables() -> Self {
        let mut registry = Self::new(builtin_platforms(), builtin_agents());

        for (platform, row) in BUILTIN_CODES {
            for (agent, code) in row.iter() {
                registry.map(*platform, AgentId::new(*agent), *code);
            }
        }

        // Encoded-URL agents without explicit codes take every marketplace.
        let implicit: Vec<AgentId> = registry
            .agents
            .iter()
            .filter(|a| matches!(a.grammar, Grammar::EncodedUrl { .. }))
            .map(|a| a.id)
            .collect();
        for agent in implicit {
            for platform in MARKETPLACES {
                if registry.code(platform, agent).is_none() {
                    registry.map(platform, agent, PlatformCode::Implicit);
                }
            }
        }

        tracing::debug!(
            platforms = registry.platforms.len(),
            agents = registry.agents.len(),
            "Built-in registry initialised"
        );
        registry
    }

    /// Record how `agent` refers to `platform`. For reverse lookup the first
    /// platform registered under a token keeps it.
    pub fn map(&mut self, platform: PlatformId, agent: AgentId, code: PlatformCode) {
        self.mappings
            .entry(platform)
            .or_default()
            .insert(agent, code);

        if let PlatformCode::Token(token) = code {
            self.reverse
                .entry(agent)
                .or_default()
                .entry(token)
                .or_insert(platform);
        }
    }

    pub fn platforms(&self) -> &[PlatformGrammar] {
        &self.platforms
    }

    pub fn agents(&self) -> &[AgentGrammar] {
        &self.agents
    }

    pub fn platform(&self, id: PlatformId) -> Option<&PlatformGrammar> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// Resolve a user-supplied platform id to the registry's own id.
    pub fn platform_id(&self, id: &str) -> Option<PlatformId> {
        self.platforms
            .iter()
            .map(|p| p.id)
            .find(|p| p.as_str() == id)
    }

    /// Look up an agent by its domain.
    pub fn agent(&self, id: &str) -> Option<&AgentGrammar> {
        self.agents.iter().find(|a| a.id.as_str() == id)
    }

    /// Code `agent` uses for `platform`; `None` when never registered.
    pub fn code(&self, platform: PlatformId, agent: AgentId) -> Option<PlatformCode> {
        self.mappings.get(&platform)?.get(&agent).copied()
    }

    /// Whether `agent` can carry items from `platform`. Unregistered pairs
    /// are unsupported.
    pub fn supports(&self, platform: PlatformId, agent: AgentId) -> bool {
        self.code(platform, agent)
            .is_some_and(|code| code.is_supported())
    }

    /// Platform a code means within one agent's code table.
    pub fn resolve_code(&self, agent: AgentId, code: &str) -> Option<PlatformId> {
        self.reverse.get(&agent)?.get(code).copied()
    }

    /// Parse a conversion target: `"original"` or a registered agent domain.
    pub fn target(&self, id: &str) -> Option<Target> {
        if id == ORIGINAL_TARGET {
            return Some(Target::Original);
        }
        self.agent(id).map(|a| Target::Agent(a.id))
    }
}
