//! Settings store: user config plus conversion history and favorites.
//!
//! Config lives in a TOML file and is written on every change. History and
//! favorites share one JSON data file written after every few mutations,
//! on [`SettingsStore::flush`], and on drop.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::favorites::{Favorite, FavoritePatch, Favorites, NewFavorite};
use super::history::{History, HistoryEntry, HistoryRecord};
use super::stats::Stats;
use super::transfer::ExportDocument;
use crate::config::{Config, Settings, SettingsPatch};
use crate::core::Registry;
use crate::error::RedirectResult;

/// Mutations between data file writes.
const SAVE_DEBOUNCE_COUNT: u32 = 5;

/// On-disk shape of the data file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct DataFile {
    history: Vec<HistoryEntry>,
    favorites: Vec<Favorite>,
}

#[derive(Debug, Clone)]
struct StorePaths {
    config: PathBuf,
    data: PathBuf,
}

pub struct SettingsStore {
    config: Config,
    history: History,
    favorites: Favorites,
    /// `None` keeps everything in memory.
    paths: Option<StorePaths>,
    /// Number of data mutations since last save.
    updates_since_save: u32,
}

impl SettingsStore {
    /// Open the store at the default config and data locations.
    pub fn open() -> Self {
        Self::open_at(Config::config_path(), Self::default_data_path())
    }

    /// Open a store backed by the given files. Missing or corrupted files
    /// start empty.
    pub fn open_at(config_path: PathBuf, data_path: PathBuf) -> Self {
        let config = Config::load_from(&config_path);
        let data = load_data(&data_path);

        tracing::info!(
            history = data.history.len(),
            favorites = data.favorites.len(),
            path = %data_path.display(),
            "Settings store loaded"
        );

        Self {
            history: History::from_entries(data.history, config.history.max_items),
            favorites: Favorites::from_items(data.favorites),
            config,
            paths: Some(StorePaths {
                config: config_path,
                data: data_path,
            }),
            updates_since_save: 0,
        }
    }

    /// Store that never touches disk.
    pub fn in_memory() -> Self {
        let config = Config::default();
        Self {
            history: History::new(config.history.max_items),
            favorites: Favorites::new(),
            config,
            paths: None,
            updates_since_save: 0,
        }
    }

    /// Get the default path for the data file.
    fn default_data_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("agent-redirector")
            .join("data.json")
    }

    pub fn get(&self) -> Settings {
        self.config.settings()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Apply a partial settings update and save the config file.
    pub fn set(&mut self, patch: SettingsPatch) -> RedirectResult<Settings> {
        self.set_with(patch, Registry::builtin())
    }

    /// Like [`set`](Self::set), validating the preferred agent against
    /// `registry`.
    pub fn set_with(&mut self, patch: SettingsPatch, registry: &Registry) -> RedirectResult<Settings> {
        self.config.apply_with(patch, registry);
        self.history.set_max_items(self.config.history.max_items);

        if let Some(paths) = &self.paths {
            self.config.save_to(&paths.config)?;
        }
        Ok(self.get())
    }

    pub fn add_history(&mut self, record: HistoryRecord) -> RedirectResult<HistoryEntry> {
        let entry = self.history.add(record, Utc::now());
        self.record_update()?;
        Ok(entry)
    }

    pub fn history(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        self.history.recent(limit)
    }

    pub fn clear_history(&mut self) -> RedirectResult<()> {
        self.history.clear();
        self.record_update()
    }

    pub fn add_favorite(&mut self, new: NewFavorite) -> RedirectResult<Favorite> {
        let favorite = self.favorites.add(new, Utc::now())?;
        self.record_update()?;
        Ok(favorite)
    }

    pub fn update_favorite(&mut self, id: i64, patch: FavoritePatch) -> RedirectResult<Favorite> {
        let favorite = self.favorites.update(id, patch)?;
        self.record_update()?;
        Ok(favorite)
    }

    /// Remove a favorite. Returns whether it existed.
    pub fn remove_favorite(&mut self, id: i64) -> RedirectResult<bool> {
        let removed = self.favorites.remove(id);
        if removed {
            self.record_update()?;
        }
        Ok(removed)
    }

    pub fn favorites(&self) -> &[Favorite] {
        self.favorites.items()
    }

    pub fn search_favorites(&self, query: &str) -> Vec<Favorite> {
        self.favorites.search(query)
    }

    pub fn stats(&self) -> Stats {
        Stats::compute(&self.history, &self.favorites, Utc::now())
    }

    /// Export settings, history and favorites as pretty JSON.
    pub fn export(&self) -> RedirectResult<String> {
        ExportDocument::new(
            self.get(),
            self.history.recent(None),
            self.favorites.items().to_vec(),
            Utc::now(),
        )
        .to_json()
    }

    /// Replace settings, history and favorites with an exported document.
    /// Everything is written immediately.
    pub fn import(&mut self, json: &str) -> RedirectResult<()> {
        self.import_with(json, Registry::builtin())
    }

    pub fn import_with(&mut self, json: &str, registry: &Registry) -> RedirectResult<()> {
        let doc = ExportDocument::from_json(json)?;

        self.config = Config::from_settings_with(doc.settings, registry);
        self.history = History::from_entries(doc.history, self.config.history.max_items);
        self.favorites = Favorites::from_items(doc.favorites);

        tracing::info!(
            history = self.history.len(),
            favorites = self.favorites.len(),
            "Imported data"
        );

        if let Some(paths) = &self.paths {
            self.config.save_to(&paths.config)?;
        }
        self.save()
    }

    fn record_update(&mut self) -> RedirectResult<()> {
        self.updates_since_save += 1;

        if self.updates_since_save >= SAVE_DEBOUNCE_COUNT {
            self.save()?;
        }
        Ok(())
    }

    /// Write history and favorites to the data file now.
    pub fn save(&mut self) -> RedirectResult<()> {
        self.updates_since_save = 0;

        let Some(paths) = &self.paths else {
            return Ok(());
        };

        if let Some(parent) = paths.data.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = DataFile {
            history: self.history.recent(None),
            favorites: self.favorites.items().to_vec(),
        };
        fs::write(&paths.data, serde_json::to_string_pretty(&data)?)?;

        tracing::debug!(path = %paths.data.display(), "Data file saved");
        Ok(())
    }

    /// Write pending changes, if any.
    pub fn flush(&mut self) -> RedirectResult<()> {
        if self.updates_since_save > 0 {
            self.save()?;
        }
        Ok(())
    }
}

impl Drop for SettingsStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "Failed to flush settings store");
        }
    }
}

fn load_data(path: &Path) -> DataFile {
    if !path.exists() {
        return DataFile::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Corrupted data file, starting empty");
            DataFile::default()
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read data file");
            DataFile::default()
        }
    }
}
