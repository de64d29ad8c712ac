//! Stateful services around the conversion engine.

pub mod favorites;
pub mod history;
pub mod redirect;
pub mod stats;
pub mod storage;
pub mod transfer;

pub use favorites::{Favorite, FavoritePatch, NewFavorite};
pub use history::{HistoryEntry, HistoryRecord};
pub use redirect::{plan_redirect, Redirect};
pub use stats::Stats;
pub use storage::SettingsStore;
pub use transfer::ExportDocument;
