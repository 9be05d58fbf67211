//! # News Pipeline
//!
//! Ingests news articles from the NewsData.io feed and prepares them for
//! embedding and tabular storage.
//!
//! The core is the [`cleaning`] pipeline: a pure, single-pass batch transform
//! that validates loosely-typed records, sanitizes and normalizes their text,
//! gates them on length and annotates them with simple statistics. Everything
//! else (fetching, raw storage, feature rows, file output) wraps it.
//!
//! ```ignore
//! use news_pipeline::{PipelineConfig, process_articles};
//!
//! let raw: Vec<serde_json::Value> = load_somehow();
//! let cleaned = process_articles(&raw, &PipelineConfig::default());
//! assert!(cleaned.len() <= raw.len());
//! ```

pub mod api;
pub mod cleaning;
pub mod config;
pub mod features;
pub mod models;
pub mod outputs;
pub mod utils;

pub use cleaning::{clean_record, process_articles};
pub use config::PipelineConfig;
pub use models::{Flag, Outcome, RawRecord, RejectReason, ValidatedArticle};
