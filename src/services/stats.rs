//! Usage statistics derived from history and favorites.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::favorites::Favorites;
use super::history::History;

/// Window counted as recent activity.
const RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_redirects: usize,
    pub total_favorites: usize,
    pub most_used_agent: Option<String>,
    pub recent_redirects: usize,
    pub agent_counts: BTreeMap<String, usize>,
}

impl Stats {
    pub fn compute(history: &History, favorites: &Favorites, now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_DAYS);

        let mut agent_counts: BTreeMap<String, usize> = BTreeMap::new();
        // First-seen order, newest first, breaks ties.
        let mut seen: Vec<&str> = Vec::new();
        let mut recent_redirects = 0;

        for entry in history.entries() {
            if entry.timestamp > cutoff {
                recent_redirects += 1;
            }
            if let Some(agent) = entry.to_agent.as_deref() {
                let count = agent_counts.entry(agent.to_string()).or_insert(0);
                if *count == 0 {
                    seen.push(agent);
                }
                *count += 1;
            }
        }

        let mut most_used: Option<(&str, usize)> = None;
        for agent in seen {
            let count = agent_counts[agent];
            if most_used.map_or(true, |(_, best)| count > best) {
                most_used = Some((agent, count));
            }
        }

        Self {
            total_redirects: history.len(),
            total_favorites: favorites.len(),
            most_used_agent: most_used.map(|(agent, _)| agent.to_string()),
            recent_redirects,
            agent_counts,
        }
    }
}
