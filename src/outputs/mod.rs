//! Output writers for every stage that persists data.
//!
//! # Submodules
//!
//! - [`raw`]: stores and reloads the untouched API response
//! - [`json`]: writes the cleaned article array
//! - [`dataset`]: writes the final feature rows as JSON Lines or a JSON array
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── raw/raw_20250506_01.json
//! ├── cleaned/clean_20250506_01.json
//! └── output/data_20250506_01.jsonl
//! ```
//!
//! Every file name carries the local date and a two-digit counter. The counter
//! is bumped until the name is free, so repeated runs on one day never
//! overwrite each other.

pub mod dataset;
pub mod json;
pub mod raw;

use serde::Serialize;
use std::error::Error;

/// Pretty-print with two-space indentation. Non-ASCII text is written as-is.
pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, Box<dyn Error>> {
    Ok(serde_json::to_string_pretty(value)?)
}
