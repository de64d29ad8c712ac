//! Identifiers for original platforms and shipping agents.
//!
//! Both are thin wrappers over `&'static str` so the static registry can hand
//! them out by value. Lookups from user-supplied strings go through
//! [`Registry`](super::registry::Registry), which only ever returns ids it owns.

use std::fmt;

use serde::Serialize;

/// Literal accepted wherever a conversion target is named, meaning
/// "the original platform" rather than an agent.
pub const ORIGINAL_TARGET: &str = "original";

/// Identifier of an original marketplace platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlatformId(&'static str);

impl PlatformId {
    pub const TAOBAO: PlatformId = PlatformId("taobao");
    pub const TMALL: PlatformId = PlatformId("tmall");
    pub const WEIDIAN: PlatformId = PlatformId("weidian");
    pub const ALI_1688: PlatformId = PlatformId("1688");
    pub const YUPOO: PlatformId = PlatformId("yupoo");
    /// Spreadsheet host, carried as a passthrough platform only.
    pub const SHEETS: PlatformId = PlatformId("sheets");

    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Identifier of a shipping agent. The value is the agent's registered
/// domain, e.g. `superbuy.com`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AgentId(&'static str);

impl AgentId {
    pub const fn new(domain: &'static str) -> Self {
        Self(domain)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Domain matched against URL hostnames.
    pub fn domain(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Where a conversion should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Canonical URL on the original marketplace.
    Original,
    /// A specific shipping agent.
    Agent(AgentId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Original => f.write_str(ORIGINAL_TARGET),
            Target::Agent(agent) => agent.fmt(f),
        }
    }
}
