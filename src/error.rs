//! Error types for the settings store and message router.
//!
//! The conversion engine itself never errors; it answers `None`.

use thiserror::Error;

/// Errors that can occur outside the conversion engine
#[derive(Debug, Error)]
pub enum RedirectError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON data file, export, or message errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Import document missing required sections
    #[error("Invalid import data format: {0}")]
    InvalidImport(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Favorite not found: {0}")]
    FavoriteNotFound(i64),

    /// A favorite with the same URL is already saved
    #[error("Favorite already exists: {0}")]
    AlreadyExists(String),
}

/// Result type alias for store and router operations
pub type RedirectResult<T> = Result<T, RedirectError>;
