//! Agent Redirector - convert product links between Chinese marketplaces and
//! shipping agents.
//!
//! Any supported marketplace link (Taobao, Tmall, Weidian, 1688, Yupoo,
//! Google Sheets) or shipping agent link can be parsed into a canonical
//! reference and re-rendered for any other agent.
//!
//! # Architecture
//!
//! The library is organized into these main modules:
//!
//! - [`core`] - Pure conversion engine: registry, parser, converter
//! - [`config`] - User configuration loading and validation
//! - [`services`] - Settings store, history, favorites, auto-redirect
//! - [`router`] - JSON request/response dispatcher for UI surfaces
//!
//! # Example
//!
//! ```
//! use agent_redirector::Converter;
//!
//! let converter = Converter::new();
//! let url = converter.convert_url("https://item.taobao.com/item.htm?id=123456", "cnfans.com");
//! assert_eq!(
//!     url.as_deref(),
//!     Some("https://cnfans.com/product?id=123456&platform=TAOBAO")
//! );
//! ```

pub mod config;
pub mod core;
pub mod router;
pub mod services;

mod error;

// Re-export commonly used types for convenience
pub use config::{Config, Settings, SettingsPatch};
pub use crate::core::{AgentId, BatchResult, Converter, ParsedReference, PlatformId, Registry, Target};
pub use error::{RedirectError, RedirectResult};
pub use router::{Request, Response, Router};
pub use services::SettingsStore;
