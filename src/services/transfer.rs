//! Export and import of the whole store as one JSON document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::favorites::Favorite;
use super::history::HistoryEntry;
use crate::config::Settings;
use crate::error::{RedirectError, RedirectResult};

pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    #[serde(default = "Utc::now")]
    pub export_date: DateTime<Utc>,
    /// Missing fields take their defaults on import.
    pub settings: Settings,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
}

impl ExportDocument {
    pub fn new(
        settings: Settings,
        history: Vec<HistoryEntry>,
        favorites: Vec<Favorite>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: now,
            settings,
            history,
            favorites,
        }
    }

    pub fn to_json(&self) -> RedirectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an exported document. A non-empty `version` and a `settings`
    /// object are required; everything else is optional.
    pub fn from_json(json: &str) -> RedirectResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let has_version = value
            .get("version")
            .and_then(|v| v.as_str())
            .is_some_and(|v| !v.is_empty());
        if !has_version {
            return Err(RedirectError::InvalidImport("missing version".into()));
        }
        if !value.get("settings").is_some_and(|s| s.is_object()) {
            return Err(RedirectError::InvalidImport("missing settings".into()));
        }

        Ok(serde_json::from_value(value)?)
    }
}
