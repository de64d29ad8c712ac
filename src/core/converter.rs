//! Conversion between platform and agent URLs.
//!
//! Every conversion pivots through the canonical original URL produced by
//! the parser, then renders it in the target agent's grammar.

use serde::Serialize;

use super::grammar::{CodedRequest, EmbedRequest, Grammar, GrammarKind};
use super::ids::{AgentId, PlatformId, Target};
use super::parser;
use super::reference::ParsedReference;
use super::registry::{PlatformCode, Registry};

/// One entry of a batch conversion, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub original: String,
    pub converted: Option<String>,
    pub parsed: Option<ParsedReference>,
}

/// Static description of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub id: AgentId,
    pub name: &'static str,
    pub grammar: GrammarKind,
    pub platforms: Vec<PlatformId>,
}

/// Stateless converter over a registry. Cheap to copy and share.
#[derive(Clone, Copy)]
pub struct Converter<'r> {
    registry: &'r Registry,
}

impl Converter<'static> {
    /// Converter over the built-in registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }
}

impl Default for Converter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> Converter<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn parse_url(&self, url: &str) -> Option<ParsedReference> {
        parser::parse_url(self.registry, url)
    }

    /// Convert `url` for `target`. `None` covers every failure: unparseable
    /// input and platforms the target agent cannot carry alike.
    pub fn convert(&self, url: &str, target: Target) -> Option<String> {
        let parsed = self.parse_url(url)?;
        self.render(&parsed, target)
    }

    /// Like [`convert`](Self::convert) with the target given by id, either
    /// `"original"` or an agent domain.
    pub fn convert_url(&self, url: &str, target: &str) -> Option<String> {
        self.convert(url, self.registry.target(target)?)
    }

    /// Render an already parsed reference for `target`.
    pub fn render(&self, parsed: &ParsedReference, target: Target) -> Option<String> {
        let agent_id = match target {
            Target::Original => return Some(parsed.original_url.clone()),
            Target::Agent(agent_id) => agent_id,
        };

        let agent = self.registry.agent(agent_id.as_str())?;
        let code = self
            .registry
            .code(parsed.platform_id, agent.id)
            .filter(PlatformCode::is_supported)?;

        let original_url = agent
            .forwards_original_url
            .then_some(parsed.original_url.as_str());

        let url = match &agent.grammar {
            Grammar::Query { build, .. } | Grammar::Path { build, .. } => build(&CodedRequest {
                item_id: &parsed.item_id,
                code: Some(code.token()?),
                original_url,
            }),
            // Special grammars may stand for a single platform with no code.
            Grammar::Special { build, .. } => build(&CodedRequest {
                item_id: &parsed.item_id,
                code: code.token(),
                original_url,
            }),
            Grammar::EncodedUrl { build, .. } => build(&EmbedRequest {
                original_url: &parsed.original_url,
                code: code.token(),
            }),
        };
        Some(url)
    }

    /// Convert each URL independently; failures yield `converted: None`
    /// without stopping the batch.
    pub fn convert_batch<S: AsRef<str>>(&self, urls: &[S], target: &str) -> Vec<BatchResult> {
        let target = self.registry.target(target);
        if target.is_none() {
            tracing::debug!("Batch target is not a known agent");
        }

        urls.iter()
            .map(|url| {
                let url = url.as_ref();
                let parsed = self.parse_url(url);
                let converted = match (&parsed, target) {
                    (Some(parsed), Some(target)) => self.render(parsed, target),
                    _ => None,
                };
                BatchResult {
                    original: url.to_string(),
                    converted,
                    parsed,
                }
            })
            .collect()
    }

    /// Agent ids in registry order.
    pub fn supported_agents(&self) -> Vec<AgentId> {
        self.registry.agents().iter().map(|a| a.id).collect()
    }

    /// Display name for an agent, or the id itself when unknown.
    pub fn agent_display_name<'a>(&self, agent: &'a str) -> &'a str {
        self.registry
            .agent(agent)
            .map_or(agent, |a| a.display_name)
    }

    pub fn agent_supports(&self, agent: &str, platform: &str) -> bool {
        match (self.registry.agent(agent), self.registry.platform_id(platform)) {
            (Some(agent), Some(platform)) => self.registry.supports(platform, agent.id),
            _ => false,
        }
    }

    /// Platforms an agent can carry, in registry order.
    pub fn supported_platforms(&self, agent: &str) -> Vec<PlatformId> {
        let Some(agent) = self.registry.agent(agent) else {
            return Vec::new();
        };
        self.registry
            .platforms()
            .iter()
            .map(|p| p.id)
            .filter(|p| self.registry.supports(*p, agent.id))
            .collect()
    }

    pub fn agent_info(&self, agent: &str) -> Option<AgentInfo> {
        let grammar = self.registry.agent(agent)?;
        Some(AgentInfo {
            id: grammar.id,
            name: grammar.display_name,
            grammar: grammar.kind(),
            platforms: self.supported_platforms(agent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grammar::{AgentCapture, AgentGrammar, CapturedPlatform};
    use crate::core::platforms::{builtin_platforms, MARKETPLACES, PASSTHROUGH};

    const ITEM: &str = "6543210987";

    fn converter() -> Converter<'static> {
        Converter::new()
    }

    fn platform_url(platform: PlatformId, item: &str) -> String {
        Registry::builtin().platform(platform).unwrap().build_item(item)
    }

    #[test]
    fn test_concrete_taobao_to_cnfans() {
        let c = converter();
        let source = "https://item.taobao.com/item.htm?id=123456";

        assert_eq!(
            c.convert_url(source, "cnfans.com").as_deref(),
            Some("https://cnfans.com/product?id=123456&platform=TAOBAO")
        );
        assert_eq!(
            c.convert_url(source, "original").as_deref(),
            Some("https://item.taobao.com/item.htm?id=123456")
        );
    }

    #[test]
    fn test_round_trip_through_every_supporting_agent() {
        let c = converter();
        let registry = Registry::builtin();

        for platform in MARKETPLACES {
            let source = platform_url(platform, ITEM);
            for agent in registry.agents() {
                if !registry.supports(platform, agent.id) {
                    continue;
                }
                let target = Target::Agent(agent.id);
                let built = c.convert(&source, target).unwrap_or_else(|| {
                    panic!("{} should build {platform}", agent.id)
                });

                // Coded agents that file two platforms under one token read
                // back as the first one registered. Embedded URLs keep theirs.
                let expected = match agent.kind() {
                    GrammarKind::EncodedUrl => platform,
                    _ => registry
                        .code(platform, agent.id)
                        .and_then(|code| code.token())
                        .and_then(|token| registry.resolve_code(agent.id, token))
                        .unwrap_or(platform),
                };

                let parsed = c
                    .parse_url(&built)
                    .unwrap_or_else(|| panic!("{} output did not parse: {built}", agent.id));
                assert_eq!(parsed.item_id, ITEM, "{} via {built}", agent.id);
                assert_eq!(parsed.platform_id, expected, "{} via {built}", agent.id);
                assert_eq!(parsed.agent_id, Some(agent.id));
            }
        }
    }

    #[test]
    fn test_unsupported_pairs_return_none() {
        let c = converter();
        let registry = Registry::builtin();

        let mut checked = 0;
        for platform in MARKETPLACES.into_iter().chain(PASSTHROUGH) {
            let source = match platform {
                PlatformId::YUPOO => "https://shop.x.yupoo.com/albums/1".to_string(),
                PlatformId::SHEETS => "https://docs.google.com/spreadsheets/d/abc/edit".to_string(),
                _ => platform_url(platform, ITEM),
            };
            for agent in registry.agents() {
                if registry.supports(platform, agent.id) {
                    continue;
                }
                assert_eq!(c.convert(&source, Target::Agent(agent.id)), None);
                checked += 1;
            }
        }
        assert!(checked > 52);
    }

    #[test]
    fn test_convert_to_original_is_idempotent() {
        let c = converter();
        let urls = [
            "https://item.taobao.com/item.htm?spm=x&id=11",
            "https://detail.tmall.com/item.htm?id=22&skuId=1",
            "https://weidian.com/item.html?itemID=33",
            "https://detail.1688.com/offer/44.html",
            "https://shop.x.yupoo.com/albums/55?uid=1",
            "https://shop.x.yupoo.com/",
            "https://docs.google.com/spreadsheets/d/doc_1/edit#gid=9",
            "https://hoobuy.com/product/1/66",
            "https://www.sugargoo.com/productDetail?productLink=https%253A%252F%252Fweidian.com%252Fitem.html%253FitemID%253D77",
        ];

        for url in urls {
            let once = c.convert_url(url, "original").unwrap();
            let twice = c.convert_url(&once, "original").unwrap();
            assert_eq!(once, twice, "{url}");
        }
    }

    #[test]
    fn test_batch_order_and_isolation() {
        let c = converter();
        let results = c.convert_batch(
            &[
                "https://item.taobao.com/item.htm?id=1",
                "garbage",
                "https://weidian.com/item.html?itemID=2",
            ],
            "hoobuy.com",
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].original, "https://item.taobao.com/item.htm?id=1");
        assert_eq!(
            results[0].converted.as_deref(),
            Some("https://hoobuy.com/product/1/1")
        );
        assert_eq!(results[1].converted, None);
        assert_eq!(results[1].parsed, None);
        assert_eq!(
            results[2].converted.as_deref(),
            Some("https://hoobuy.com/product/2/2")
        );
    }

    #[test]
    fn test_batch_with_unknown_target_still_parses() {
        let results = converter().convert_batch(&["https://item.taobao.com/item.htm?id=1"], "nowhere.test");
        assert_eq!(results[0].converted, None);
        assert!(results[0].parsed.is_some());
    }

    #[test]
    fn test_unknown_target_returns_none() {
        let c = converter();
        assert_eq!(
            c.convert_url("https://item.taobao.com/item.htm?id=1", "nowhere.test"),
            None
        );
    }

    #[test]
    fn test_agent_to_agent_conversion() {
        let c = converter();
        let converted = c
            .convert_url("https://www.usfans.com/product/3/901", "cssbuy.com")
            .unwrap();
        assert_eq!(converted, "https://www.cssbuy.com/item-micro-901.html");

        let converted = c
            .convert_url("https://www.cssbuy.com/item-1688-5.html", "superbuy.com")
            .unwrap();
        assert!(converted.ends_with("url=https%3A%2F%2Fdetail.1688.com%2Foffer%2F5.html"));
    }

    #[test]
    fn test_mulebuy_forwards_original_url() {
        let converted = converter()
            .convert_url("https://detail.tmall.com/item.htm?id=9", "mulebuy.com")
            .unwrap();
        assert_eq!(
            converted,
            "https://mulebuy.com/product?id=9&platform=TAOBAO&searchInfo=https%3A%2F%2Fdetail.tmall.com%2Fitem.htm%3Fid%3D9"
        );
    }

    #[test]
    fn test_registry_accessors() {
        let c = converter();

        let agents = c.supported_agents();
        assert_eq!(agents.len(), 26);
        assert_eq!(agents[0].as_str(), "mycnbox.com");
        assert_eq!(agents[25].as_str(), "cssbuy.com");

        assert_eq!(c.agent_display_name("superbuy.com"), "Superbuy");
        assert_eq!(c.agent_display_name("nowhere.test"), "nowhere.test");

        assert!(c.agent_supports("cnfans.com", "1688"));
        assert!(!c.agent_supports("hoobuy.com", "1688"));
        assert!(!c.agent_supports("cnfans.com", "yupoo"));
        assert!(!c.agent_supports("nowhere.test", "taobao"));

        assert_eq!(
            c.supported_platforms("hoobuy.com"),
            vec![PlatformId::TAOBAO, PlatformId::WEIDIAN]
        );
        assert!(c.supported_platforms("nowhere.test").is_empty());
    }

    #[test]
    fn test_agent_info() {
        let info = converter().agent_info("wemimi.com").unwrap();
        assert_eq!(info.name, "WeMiMi");
        assert_eq!(info.grammar, GrammarKind::EncodedUrl);
        assert_eq!(info.platforms, MARKETPLACES.to_vec());
        assert!(converter().agent_info("nowhere.test").is_none());
    }

    fn build_alpha(req: &CodedRequest<'_>) -> String {
        format!("https://alpha.test/p/{}/{}", req.token(), req.item_id)
    }

    fn build_beta(req: &CodedRequest<'_>) -> String {
        format!("https://beta.test/p/{}/{}", req.token(), req.item_id)
    }

    #[test]
    fn test_shared_literal_code_resolves_per_agent() {
        let mut registry = Registry::new(
            builtin_platforms(),
            vec![
                AgentGrammar::path("alpha.test", "Alpha", r"/p/(\w+)/(\d+)", build_alpha),
                AgentGrammar::path("beta.test", "Beta", r"/p/(\w+)/(\d+)", build_beta),
            ],
        );
        let alpha = AgentId::new("alpha.test");
        let beta = AgentId::new("beta.test");
        registry.map(PlatformId::TAOBAO, alpha, PlatformCode::Token("7"));
        registry.map(PlatformId::WEIDIAN, alpha, PlatformCode::Token("8"));
        registry.map(PlatformId::ALI_1688, beta, PlatformCode::Token("7"));
        registry.map(PlatformId::TAOBAO, beta, PlatformCode::Token("8"));

        let c = Converter::with_registry(&registry);
        assert_eq!(
            c.parse_url("https://alpha.test/p/7/10").map(|p| p.platform_id),
            Some(PlatformId::TAOBAO)
        );
        assert_eq!(
            c.parse_url("https://beta.test/p/7/10").map(|p| p.platform_id),
            Some(PlatformId::ALI_1688)
        );
        assert_eq!(
            c.convert_url("https://alpha.test/p/7/10", "beta.test").as_deref(),
            Some("https://beta.test/p/8/10")
        );
        assert_eq!(c.convert_url("https://alpha.test/p/8/10", "beta.test"), None);
    }

    fn fixed_taobao(url: &str) -> Option<AgentCapture> {
        let item_id = url.rsplit('/').next()?.strip_suffix(".html")?;
        Some(AgentCapture {
            item_id: item_id.to_string(),
            platform: CapturedPlatform::Fixed(PlatformId::TAOBAO),
        })
    }

    fn build_fixed(req: &CodedRequest<'_>) -> String {
        format!("https://fixed.test/goods/{}.html", req.item_id)
    }

    #[test]
    fn test_fixed_platform_special_agent_is_a_target() {
        let mut registry = Registry::new(
            builtin_platforms(),
            vec![AgentGrammar::special("fixed.test", "Fixed", fixed_taobao, build_fixed)],
        );
        registry.map(PlatformId::TAOBAO, AgentId::new("fixed.test"), PlatformCode::Implicit);

        let c = Converter::with_registry(&registry);
        assert!(c.agent_supports("fixed.test", "taobao"));
        assert_eq!(c.supported_platforms("fixed.test"), vec![PlatformId::TAOBAO]);

        let built = c
            .convert_url("https://item.taobao.com/item.htm?id=88", "fixed.test")
            .unwrap();
        assert_eq!(built, "https://fixed.test/goods/88.html");

        let parsed = c.parse_url(&built).unwrap();
        assert_eq!(parsed.platform_id, PlatformId::TAOBAO);
        assert_eq!(parsed.item_id, "88");

        assert_eq!(
            c.convert_url("https://weidian.com/item.html?itemID=88", "fixed.test"),
            None
        );
    }

    #[test]
    fn test_converter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter<'static>>();
    }
}
