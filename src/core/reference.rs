//! Canonical record produced by parsing a platform or agent URL.

use serde::Serialize;

use super::ids::{AgentId, PlatformId};

/// Whether a parsed URL came from the marketplace itself or from an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Original,
    Agent,
}

/// Extra identifying details for platforms that need more than an item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceExtra {
    /// Yupoo seller subdomain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    /// Yupoo album id, when the URL names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Spreadsheet tab (`gid`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_tab: Option<String>,
}

impl ReferenceExtra {
    pub fn seller(seller: impl Into<String>) -> Self {
        Self {
            seller: Some(seller.into()),
            ..Self::default()
        }
    }

    pub fn album(self, album: impl Into<String>) -> Self {
        Self {
            album: Some(album.into()),
            ..self
        }
    }

    pub fn sheet_tab(tab: impl Into<String>) -> Self {
        Self {
            sheet_tab: Some(tab.into()),
            ..Self::default()
        }
    }
}

/// An item reference resolved to its original platform.
///
/// `original_url` is always rebuilt from the platform grammar, never copied
/// from the input, so it is the pivot every conversion routes through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReference {
    pub kind: ReferenceKind,
    pub platform_id: PlatformId,
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<ReferenceExtra>,
}

impl ParsedReference {
    /// Reference parsed straight from an original-platform URL.
    pub fn original(
        platform_id: PlatformId,
        item_id: String,
        original_url: String,
        extra: Option<ReferenceExtra>,
    ) -> Self {
        Self {
            kind: ReferenceKind::Original,
            platform_id,
            item_id,
            agent_id: None,
            original_url,
            extra,
        }
    }

    /// Re-tag this reference as having been reached through `agent`.
    pub fn via_agent(self, agent: AgentId) -> Self {
        Self {
            kind: ReferenceKind::Agent,
            agent_id: Some(agent),
            ..self
        }
    }

    pub fn is_agent(&self) -> bool {
        self.kind == ReferenceKind::Agent
    }

    /// Human label for spreadsheet tabs: `Sheet-<gid>`, or `Main` when the
    /// URL names no tab.
    pub fn sheet_label(&self) -> Option<String> {
        if self.platform_id != PlatformId::SHEETS {
            return None;
        }
        let tab = self.extra.as_ref().and_then(|e| e.sheet_tab.as_deref());
        Some(match tab {
            Some(gid) => format!("Sheet-{gid}"),
            None => "Main".to_string(),
        })
    }
}
