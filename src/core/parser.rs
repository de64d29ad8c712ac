//! URL parsing against a [`Registry`].
//!
//! Hostnames are matched by substring in registry order, platforms first.
//! A platform whose domain matches but whose pattern misses lets the scan
//! continue; the first agent whose domain matches is final either way.

use std::borrow::Cow;

use super::grammar::{capture, AgentGrammar, CapturedPlatform, Grammar};
use super::ids::PlatformId;
use super::reference::ParsedReference;
use super::registry::Registry;

/// Parse any supported platform or agent URL. Never fails loudly: malformed
/// input, unknown domains and grammar misses all give `None`.
pub fn parse_url(registry: &Registry, url: &str) -> Option<ParsedReference> {
    let host = hostname(url)?;

    if let Some(parsed) = parse_original_host(registry, url, &host) {
        return Some(parsed);
    }

    let agent = registry
        .agents()
        .iter()
        .find(|agent| host.contains(agent.id.domain()))?;

    let parsed = parse_agent(registry, agent, url);
    if parsed.is_none() {
        tracing::debug!(agent = %agent.id, url, "Agent URL did not match its grammar");
    }
    parsed
}

/// Parse a URL only if it belongs to an original platform.
pub fn parse_original(registry: &Registry, url: &str) -> Option<ParsedReference> {
    let host = hostname(url)?;
    parse_original_host(registry, url, &host)
}

fn parse_original_host(registry: &Registry, url: &str, host: &str) -> Option<ParsedReference> {
    registry
        .platforms()
        .iter()
        .filter(|platform| host.contains(platform.domain))
        .find_map(|platform| {
            let capture = platform.extract(url)?;
            let original_url = platform.build_url(&capture);
            Some(ParsedReference::original(
                platform.id,
                capture.item_id,
                original_url,
                capture.extra,
            ))
        })
}

fn parse_agent(registry: &Registry, agent: &AgentGrammar, url: &str) -> Option<ParsedReference> {
    let (item_id, platform) = match &agent.grammar {
        Grammar::Query { item, platform, .. } => {
            let item_id = capture(item, url)?;
            let code = capture(platform, url)?;
            (item_id.to_string(), CapturedPlatform::Code(code.to_string()))
        }
        Grammar::Path { pattern, .. } => {
            let caps = pattern.captures(url)?;
            let code = caps.get(1)?.as_str();
            let item_id = caps.get(2)?.as_str();
            (item_id.to_string(), CapturedPlatform::Code(code.to_string()))
        }
        Grammar::Special { extract, .. } => {
            let capture = extract(url)?;
            (capture.item_id, capture.platform)
        }
        Grammar::EncodedUrl { param, layers, .. } => {
            let embedded = decode_layers(capture(param, url)?, *layers)?;
            let parsed = parse_original(registry, &embedded);
            if parsed.is_none() {
                tracing::debug!(agent = %agent.id, embedded = %embedded, "Embedded URL is not a platform URL");
            }
            return parsed.map(|p| p.via_agent(agent.id));
        }
    };

    let platform_id = resolve(registry, agent, &platform)?;
    let original_url = registry.platform(platform_id)?.build_item(&item_id);

    Some(ParsedReference::original(platform_id, item_id, original_url, None).via_agent(agent.id))
}

fn resolve(registry: &Registry, agent: &AgentGrammar, platform: &CapturedPlatform) -> Option<PlatformId> {
    match platform {
        CapturedPlatform::Fixed(id) => Some(*id),
        CapturedPlatform::Code(code) => {
            let resolved = registry.resolve_code(agent.id, code);
            if resolved.is_none() {
                tracing::debug!(agent = %agent.id, code = %code, "Unknown platform code");
            }
            resolved
        }
    }
}

/// Percent-decode a captured parameter. Layers past the first are only
/// peeled while the value still does not parse as a URL, so a singly
/// encoded link given to a double-encoding agent survives intact.
pub(crate) fn decode_layers(raw: &str, layers: u8) -> Option<String> {
    let mut value: Cow<'_, str> = urlencoding::decode(raw).ok()?;

    for _ in 1..layers {
        if url::Url::parse(&value).is_ok() {
            break;
        }
        value = Cow::Owned(urlencoding::decode(&value).ok()?.into_owned());
    }

    Some(value.into_owned())
}

/// Lowercased hostname, `None` for anything `url` cannot parse.
pub(crate) fn hostname(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed.host_str().map(str::to_ascii_lowercase)
}
