//! Auto-redirect policy for navigations onto agent pages.

use serde::Serialize;

use super::history::HistoryRecord;
use crate::config::Settings;
use crate::core::{Converter, ParsedReference, ORIGINAL_TARGET};

/// A navigation that should be sent to the preferred agent instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    pub converted_url: String,
    /// History entry describing the redirect.
    #[serde(skip)]
    pub record: HistoryRecord,
}

/// Decide whether `url` should be redirected to the preferred agent.
///
/// Only agent pages are redirected; marketplace pages and pages already on
/// the preferred agent are left alone, as are links the preferred agent
/// cannot carry.
pub fn plan_redirect(converter: &Converter<'_>, settings: &Settings, url: &str) -> Option<Redirect> {
    if !settings.auto_convert {
        return None;
    }

    let parsed = converter.parse_url(url)?;
    let agent = parsed.agent_id?;
    if agent.as_str() == settings.preferred_agent {
        return None;
    }

    let converted = converter.convert_url(url, &settings.preferred_agent)?;
    if converted == url {
        return None;
    }

    tracing::debug!(from = %agent, to = %settings.preferred_agent, "Redirecting agent link");
    Some(Redirect {
        record: conversion_record(&parsed, url, &converted, &settings.preferred_agent),
        converted_url: converted,
    })
}

/// History record for converting `url` (already parsed) to `target`.
pub fn conversion_record(
    parsed: &ParsedReference,
    url: &str,
    converted: &str,
    target: &str,
) -> HistoryRecord {
    HistoryRecord {
        original_url: url.to_string(),
        converted_url: converted.to_string(),
        from_agent: Some(
            parsed
                .agent_id
                .map_or(ORIGINAL_TARGET, |a| a.as_str())
                .to_string(),
        ),
        to_agent: Some(target.to_string()),
        platform: Some(parsed.platform_id.to_string()),
        item_id: Some(parsed.item_id.clone()),
    }
}
