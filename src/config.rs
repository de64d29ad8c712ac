use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::Registry;
use crate::error::RedirectResult;

/// Currencies prices can be shown in.
pub const SUPPORTED_CURRENCIES: [&str; 7] = ["USD", "EUR", "GBP", "CAD", "AUD", "JPY", "CNY"];

const DEFAULT_AGENT: &str = "superbuy.com";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_MAX_HISTORY: usize = 50;
const MAX_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub appearance: AppearanceConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Agent links are redirected to and converted for by default.
    pub preferred_agent: String,
    pub auto_convert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub theme: Theme,
    pub currency: String,
    pub enable_currency_conversion: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_items: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            preferred_agent: DEFAULT_AGENT.to_string(),
            auto_convert: true,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            currency: DEFAULT_CURRENCY.to_string(),
            enable_currency_conversion: true,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Flat view of the user settings, as exchanged with UI surfaces and
/// written into exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub auto_convert: bool,
    pub preferred_agent: String,
    pub currency: String,
    pub theme: Theme,
    pub enable_currency_conversion: bool,
    pub max_history_items: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

/// Partial settings update. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub auto_convert: Option<bool>,
    pub preferred_agent: Option<String>,
    pub currency: Option<String>,
    pub theme: Option<Theme>,
    pub enable_currency_conversion: Option<bool>,
    pub max_history_items: Option<usize>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("agent-redirector")
            .join("config.toml")
    }

    /// Load config from the default location, or defaults if absent.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. Unreadable or malformed files fall back to
    /// defaults rather than failing.
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config");
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Validate and clamp config values to acceptable ranges
    pub fn validate(&mut self) {
        self.validate_with(Registry::builtin());
    }

    /// Like [`validate`](Self::validate), checking the preferred agent
    /// against `registry`.
    pub fn validate_with(&mut self, registry: &Registry) {
        self.history.max_items = self.history.max_items.clamp(1, MAX_HISTORY_LIMIT);

        if registry.agent(&self.general.preferred_agent).is_none() {
            tracing::warn!(agent = %self.general.preferred_agent, "Unknown preferred agent, using default");
            self.general.preferred_agent = DEFAULT_AGENT.to_string();
        }

        self.appearance.currency = self.appearance.currency.to_ascii_uppercase();
        if !SUPPORTED_CURRENCIES.contains(&self.appearance.currency.as_str()) {
            self.appearance.currency = DEFAULT_CURRENCY.to_string();
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> RedirectResult<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> RedirectResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        tracing::info!(path = %path.display(), "Config saved");
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            auto_convert: self.general.auto_convert,
            preferred_agent: self.general.preferred_agent.clone(),
            currency: self.appearance.currency.clone(),
            theme: self.appearance.theme,
            enable_currency_conversion: self.appearance.enable_currency_conversion,
            max_history_items: self.history.max_items,
        }
    }

    /// Build a validated config from a flat settings view.
    pub fn from_settings(settings: Settings) -> Self {
        Self::from_settings_with(settings, Registry::builtin())
    }

    pub fn from_settings_with(settings: Settings, registry: &Registry) -> Self {
        let mut config = Self {
            general: GeneralConfig {
                preferred_agent: settings.preferred_agent,
                auto_convert: settings.auto_convert,
            },
            appearance: AppearanceConfig {
                theme: settings.theme,
                currency: settings.currency,
                enable_currency_conversion: settings.enable_currency_conversion,
            },
            history: HistoryConfig {
                max_items: settings.max_history_items,
            },
        };
        config.validate_with(registry);
        config
    }

    /// Apply a partial update, then re-validate.
    pub fn apply(&mut self, patch: SettingsPatch) {
        self.apply_with(patch, Registry::builtin());
    }

    pub fn apply_with(&mut self, patch: SettingsPatch, registry: &Registry) {
        if let Some(auto_convert) = patch.auto_convert {
            self.general.auto_convert = auto_convert;
        }
        if let Some(agent) = patch.preferred_agent {
            self.general.preferred_agent = agent;
        }
        if let Some(currency) = patch.currency {
            self.appearance.currency = currency;
        }
        if let Some(theme) = patch.theme {
            self.appearance.theme = theme;
        }
        if let Some(enabled) = patch.enable_currency_conversion {
            self.appearance.enable_currency_conversion = enabled;
        }
        if let Some(max_items) = patch.max_history_items {
            self.history.max_items = max_items;
        }
        self.validate_with(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.auto_convert);
        assert_eq!(settings.preferred_agent, "superbuy.com");
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.theme, Theme::Auto);
        assert!(settings.enable_currency_conversion);
        assert_eq!(settings.max_history_items, 50);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            preferred_agent = "cnfans.com"

            [appearance]
            theme = "dark"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.preferred_agent, "cnfans.com");
        assert!(config.general.auto_convert);
        assert_eq!(config.appearance.theme, Theme::Dark);
        assert_eq!(config.history.max_items, 50);
    }

    #[test]
    fn test_validate_clamps_and_resets() {
        let mut config = Config::default();
        config.history.max_items = 0;
        config.general.preferred_agent = "nowhere.test".into();
        config.appearance.currency = "btc".into();
        config.validate();

        assert_eq!(config.history.max_items, 1);
        assert_eq!(config.general.preferred_agent, "superbuy.com");
        assert_eq!(config.appearance.currency, "USD");

        config.history.max_items = 10_000;
        config.appearance.currency = "eur".into();
        config.validate();
        assert_eq!(config.history.max_items, 500);
        assert_eq!(config.appearance.currency, "EUR");
    }

    #[test]
    fn test_validate_against_custom_registry() {
        use crate::core::grammar::AgentGrammar;
        use crate::core::platforms::builtin_platforms;

        fn build(req: &crate::core::grammar::EmbedRequest<'_>) -> String {
            format!("https://solo.test/?u={}", req.original_url)
        }

        let registry = Registry::new(
            builtin_platforms(),
            vec![AgentGrammar::encoded("solo.test", "Solo", r"[?&]u=([^&]+)", 1, build)],
        );

        let mut config = Config::default();
        config.apply_with(
            SettingsPatch {
                preferred_agent: Some("solo.test".into()),
                ..Default::default()
            },
            &registry,
        );
        assert_eq!(config.general.preferred_agent, "solo.test");

        config.validate();
        assert_eq!(config.general.preferred_agent, "superbuy.com");
    }

    #[test]
    fn test_apply_patch() {
        let mut config = Config::default();
        config.apply(SettingsPatch {
            preferred_agent: Some("hoobuy.com".into()),
            max_history_items: Some(20),
            ..Default::default()
        });

        let settings = config.settings();
        assert_eq!(settings.preferred_agent, "hoobuy.com");
        assert_eq!(settings.max_history_items, 20);
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn test_patch_from_camel_case_json() {
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"autoConvert": false, "theme": "light"}"#).unwrap();
        assert_eq!(patch.auto_convert, Some(false));
        assert_eq!(patch.theme, Some(Theme::Light));
        assert_eq!(patch.currency, None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.appearance.theme = Theme::Light;
        config.general.auto_convert = false;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "general = [not toml").unwrap();

        assert_eq!(Config::load_from(&path), Config::default());
    }
}
