//! Saved item links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::next_id;
use crate::error::{RedirectError, RedirectResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
}

impl Favorite {
    /// Case-insensitive match over title, notes, tags and URL. `query` must
    /// already be lowercased.
    fn matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.notes.to_lowercase().contains(query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(query))
            || self.url.to_lowercase().contains(query)
    }
}

/// Caller-supplied fields of a new favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewFavorite {
    pub url: String,
    pub title: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub platform: Option<String>,
    pub item_id: Option<String>,
    pub agent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FavoritePatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Favorites, newest first, unique by URL.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    items: Vec<Favorite>,
    last_id: i64,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Favorite>) -> Self {
        let last_id = items.iter().map(|f| f.id).max().unwrap_or(0);
        Self { items, last_id }
    }

    pub fn add(&mut self, new: NewFavorite, now: DateTime<Utc>) -> RedirectResult<Favorite> {
        if self.items.iter().any(|f| f.url == new.url) {
            return Err(RedirectError::AlreadyExists(new.url));
        }

        let favorite = Favorite {
            id: next_id(&mut self.last_id, now),
            timestamp: now,
            url: new.url,
            title: new.title,
            notes: new.notes,
            tags: new.tags,
            platform: new.platform,
            item_id: new.item_id,
            agent: new.agent,
        };
        self.items.insert(0, favorite.clone());
        Ok(favorite)
    }

    pub fn update(&mut self, id: i64, patch: FavoritePatch) -> RedirectResult<Favorite> {
        let favorite = self
            .items
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(RedirectError::FavoriteNotFound(id))?;

        if let Some(title) = patch.title {
            favorite.title = title;
        }
        if let Some(notes) = patch.notes {
            favorite.notes = notes;
        }
        if let Some(tags) = patch.tags {
            favorite.tags = tags;
        }
        Ok(favorite.clone())
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|f| f.id != id);
        self.items.len() != before
    }

    pub fn search(&self, query: &str) -> Vec<Favorite> {
        let query = query.to_lowercase();
        self.items
            .iter()
            .filter(|f| f.matches(&query))
            .cloned()
            .collect()
    }

    pub fn items(&self) -> &[Favorite] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
