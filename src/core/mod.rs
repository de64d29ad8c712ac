//! URL conversion engine - pure, synchronous, no I/O.
//!
//! This module contains everything needed to read and write item links:
//! - Platform and agent identifiers
//! - Grammar records for every platform and agent
//! - The immutable registry and its code mappings
//! - Parsing, conversion, and batch helpers

pub mod agents;
pub mod batch;
pub mod converter;
pub mod grammar;
pub mod ids;
pub mod parser;
pub mod platforms;
pub mod reference;
pub mod registry;

pub use batch::BatchSummary;
pub use converter::{AgentInfo, BatchResult, Converter};
pub use grammar::GrammarKind;
pub use ids::{AgentId, PlatformId, Target, ORIGINAL_TARGET};
pub use platforms::taobao_image_search_url;
pub use reference::{ParsedReference, ReferenceExtra, ReferenceKind};
pub use registry::{PlatformCode, Registry};
