//! Conversion history, newest first and bounded.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Millisecond stamp, unique within the store.
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub original_url: String,
    pub converted_url: String,
    #[serde(default)]
    pub from_agent: Option<String>,
    #[serde(default)]
    pub to_agent: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
}

/// Caller-supplied fields of a new history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryRecord {
    pub original_url: String,
    pub converted_url: String,
    pub from_agent: Option<String>,
    pub to_agent: Option<String>,
    pub platform: Option<String>,
    pub item_id: Option<String>,
}

/// Bounded conversion history.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    max_items: usize,
    last_id: i64,
}

impl History {
    pub fn new(max_items: usize) -> Self {
        Self::from_entries(Vec::new(), max_items)
    }

    /// Restore persisted entries, assumed newest first.
    pub fn from_entries(entries: Vec<HistoryEntry>, max_items: usize) -> Self {
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        let mut history = Self {
            entries: entries.into(),
            max_items: max_items.max(1),
            last_id,
        };
        history.entries.truncate(history.max_items);
        history
    }

    /// Record a conversion at `now`.
    pub fn add(&mut self, record: HistoryRecord, now: DateTime<Utc>) -> HistoryEntry {
        let id = next_id(&mut self.last_id, now);
        let entry = HistoryEntry {
            id,
            timestamp: now,
            original_url: record.original_url,
            converted_url: record.converted_url,
            from_agent: record.from_agent,
            to_agent: record.to_agent,
            platform: record.platform,
            item_id: record.item_id,
        };

        self.entries.push_front(entry.clone());
        self.entries.truncate(self.max_items);
        entry
    }

    /// Newest entries, all of them when `limit` is `None` or zero.
    pub fn recent(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        let limit = limit.filter(|&n| n > 0).unwrap_or(self.entries.len());
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Change the bound, dropping the oldest entries past it.
    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items.max(1);
        self.entries.truncate(self.max_items);
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Millisecond id for `now`, bumped past `last` so ids stay strictly
/// increasing when several records land in the same millisecond.
pub(crate) fn next_id(last: &mut i64, now: DateTime<Utc>) -> i64 {
    let id = now.timestamp_millis().max(*last + 1);
    *last = id;
    id
}
