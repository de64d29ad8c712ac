//! Grammar records describing how platforms and agents encode item references.
//!
//! Each agent is a data record whose [`Grammar`] variant carries the patterns
//! used to read its URLs and the function used to write them. Parsing and
//! building dispatch on the variant; nothing here subclasses or overrides.

use regex::Regex;
use serde::Serialize;

use super::ids::{AgentId, PlatformId};
use super::reference::ReferenceExtra;

/// How an agent encodes item references in its URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GrammarKind {
    /// Item id and platform code as separate query parameters.
    Query,
    /// Whole original URL percent-encoded into one query parameter.
    EncodedUrl,
    /// Platform code and item id as path segments.
    Path,
    /// Agent-specific layout not covered by the other three.
    Special,
}

/// Platform half of an agent capture, before reverse mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedPlatform {
    /// Agent-specific code, resolved through that agent's code table.
    Code(String),
    /// The grammar can only ever mean one platform.
    Fixed(PlatformId),
}

/// Raw item reference read from an agent URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCapture {
    pub item_id: String,
    pub platform: CapturedPlatform,
}

/// Inputs for agents that address items by id and platform code.
#[derive(Debug, Clone, Copy)]
pub struct CodedRequest<'a> {
    pub item_id: &'a str,
    pub code: Option<&'a str>,
    /// Only present for agents registered as forwarding the original URL.
    pub original_url: Option<&'a str>,
}

impl CodedRequest<'_> {
    /// Platform code, empty when the mapping carries none.
    pub fn token(&self) -> &str {
        self.code.unwrap_or_default()
    }
}

/// Inputs for agents that embed the original URL.
#[derive(Debug, Clone, Copy)]
pub struct EmbedRequest<'a> {
    pub original_url: &'a str,
    pub code: Option<&'a str>,
}

pub type CodedBuild = fn(&CodedRequest<'_>) -> String;
pub type EmbedBuild = fn(&EmbedRequest<'_>) -> String;
pub type SpecialExtract = fn(&str) -> Option<AgentCapture>;

/// An agent's URL grammar: extraction patterns plus a builder.
pub enum Grammar {
    Query {
        item: Regex,
        platform: Regex,
        build: CodedBuild,
    },
    EncodedUrl {
        param: Regex,
        /// How many percent-encoding layers the agent wraps around the URL.
        layers: u8,
        build: EmbedBuild,
    },
    /// One pattern, capture 1 is the platform code and capture 2 the item id.
    Path { pattern: Regex, build: CodedBuild },
    Special {
        extract: SpecialExtract,
        build: CodedBuild,
    },
}

impl Grammar {
    pub fn kind(&self) -> GrammarKind {
        match self {
            Grammar::Query { .. } => GrammarKind::Query,
            Grammar::EncodedUrl { .. } => GrammarKind::EncodedUrl,
            Grammar::Path { .. } => GrammarKind::Path,
            Grammar::Special { .. } => GrammarKind::Special,
        }
    }
}

/// Registry entry for one shipping agent.
pub struct AgentGrammar {
    pub id: AgentId,
    pub display_name: &'static str,
    pub grammar: Grammar,
    /// Coded builds also receive the full original URL.
    pub forwards_original_url: bool,
}

impl AgentGrammar {
    pub fn query(
        domain: &'static str,
        display_name: &'static str,
        item: &str,
        platform: &str,
        build: CodedBuild,
    ) -> Self {
        Self::new(
            domain,
            display_name,
            Grammar::Query {
                item: pattern(item),
                platform: pattern(platform),
                build,
            },
        )
    }

    pub fn encoded(
        domain: &'static str,
        display_name: &'static str,
        param: &str,
        layers: u8,
        build: EmbedBuild,
    ) -> Self {
        Self::new(
            domain,
            display_name,
            Grammar::EncodedUrl {
                param: pattern(param),
                layers,
                build,
            },
        )
    }

    pub fn path(
        domain: &'static str,
        display_name: &'static str,
        path: &str,
        build: CodedBuild,
    ) -> Self {
        Self::new(
            domain,
            display_name,
            Grammar::Path {
                pattern: pattern(path),
                build,
            },
        )
    }

    pub fn special(
        domain: &'static str,
        display_name: &'static str,
        extract: SpecialExtract,
        build: CodedBuild,
    ) -> Self {
        Self::new(domain, display_name, Grammar::Special { extract, build })
    }

    /// Mark this agent as wanting the original URL in coded builds.
    pub fn forwarding_original_url(mut self) -> Self {
        self.forwards_original_url = true;
        self
    }

    pub fn kind(&self) -> GrammarKind {
        self.grammar.kind()
    }

    fn new(domain: &'static str, display_name: &'static str, grammar: Grammar) -> Self {
        Self {
            id: AgentId::new(domain),
            display_name,
            grammar,
            forwards_original_url: false,
        }
    }
}

/// Item reference read from an original-platform URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCapture {
    pub item_id: String,
    pub extra: Option<ReferenceExtra>,
}

impl PlatformCapture {
    pub fn item(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            extra: None,
        }
    }
}

/// How a platform's item reference is read.
pub enum PlatformExtractor {
    /// First capture group of a pattern run over the whole URL.
    Pattern(Regex),
    /// Named extraction for platforms that need more than one capture.
    Custom(fn(&str) -> Option<PlatformCapture>),
}

/// Registry entry for one original platform.
pub struct PlatformGrammar {
    pub id: PlatformId,
    /// Matched as a substring of the URL hostname.
    pub domain: &'static str,
    pub display_name: &'static str,
    pub extractor: PlatformExtractor,
    pub build: fn(&PlatformCapture) -> String,
}

impl PlatformGrammar {
    pub fn pattern(
        id: PlatformId,
        domain: &'static str,
        display_name: &'static str,
        item: &str,
        build: fn(&PlatformCapture) -> String,
    ) -> Self {
        Self {
            id,
            domain,
            display_name,
            extractor: PlatformExtractor::Pattern(pattern(item)),
            build,
        }
    }

    pub fn custom(
        id: PlatformId,
        domain: &'static str,
        display_name: &'static str,
        extract: fn(&str) -> Option<PlatformCapture>,
        build: fn(&PlatformCapture) -> String,
    ) -> Self {
        Self {
            id,
            domain,
            display_name,
            extractor: PlatformExtractor::Custom(extract),
            build,
        }
    }

    pub fn extract(&self, url: &str) -> Option<PlatformCapture> {
        match &self.extractor {
            PlatformExtractor::Pattern(re) => Some(PlatformCapture::item(capture(re, url)?)),
            PlatformExtractor::Custom(extract) => extract(url),
        }
    }

    /// Canonical URL for a full capture.
    pub fn build_url(&self, capture: &PlatformCapture) -> String {
        (self.build)(capture)
    }

    /// Canonical URL for a bare item id.
    pub fn build_item(&self, item_id: &str) -> String {
        self.build_url(&PlatformCapture::item(item_id))
    }
}

/// First capture group of `re` in `haystack`.
pub(crate) fn capture<'h>(re: &Regex, haystack: &'h str) -> Option<&'h str> {
    re.captures(haystack)?.get(1).map(|m| m.as_str())
}

/// Compile a registry pattern. Registry patterns are string literals
/// exercised by the registry tests.
pub(crate) fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("registry pattern must compile")
}
