//! Pipeline configuration.
//!
//! The cleaning pipeline takes exactly three knobs. They are carried in a
//! [`PipelineConfig`] value that is handed to the batch driver and the gates;
//! nothing reads them from global state.
//!
//! A config can be loaded from YAML:
//!
//! ```yaml
//! normalize_numbers: true
//! min_length: 80
//! max_length: 50000
//! ```
//!
//! Keys that are absent keep their defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Default minimum body length, in characters.
pub const DEFAULT_MIN_LENGTH: usize = 50;
/// Default maximum body length before an article is flagged.
pub const DEFAULT_MAX_LENGTH: usize = 100_000;

/// Settings consumed by the cleaning core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Replace standalone digit runs in the body with `<NUM>`.
    pub normalize_numbers: bool,
    /// Bodies shorter than this (after normalization) are rejected.
    pub min_length: usize,
    /// Bodies longer than this are flagged `extremely_long`.
    pub max_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            normalize_numbers: false,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl PipelineConfig {
    /// Parse a config from YAML text. Missing keys keep their defaults and an
    /// empty document is the default config.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or a value has the wrong type.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, Box<dyn Error>> {
        // An empty document deserializes to unit, not a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml_str(&text)?;
        info!(?config, "Loaded pipeline config");
        Ok(config)
    }

    /// Layer command-line values over this config.
    ///
    /// `normalize_numbers` can only be switched on from the command line.
    pub fn with_overrides(
        self,
        normalize_numbers: bool,
        min_length: Option<usize>,
        max_length: Option<usize>,
    ) -> Self {
        Self {
            normalize_numbers: self.normalize_numbers || normalize_numbers,
            min_length: min_length.unwrap_or(self.min_length),
            max_length: max_length.unwrap_or(self.max_length),
        }
    }

    /// Log configurations that make one of the gate's flags unreachable or
    /// contradictory. They are allowed; the caller owns the choice.
    pub fn warn_if_inconsistent(&self) {
        if self.min_length > self.max_length {
            warn!(
                min_length = self.min_length,
                max_length = self.max_length,
                "min_length exceeds max_length; every survivor will be flagged extremely_long"
            );
        }
        if self.min_length > 100 {
            warn!(
                min_length = self.min_length,
                "min_length is above 100; the very_short flag can never fire"
            );
        }
    }
}
