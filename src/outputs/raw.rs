//! Raw API response storage.
//!
//! The response is stored verbatim before any cleaning so a run can be
//! replayed later with `--input`.

use crate::models::RawRecord;
use crate::outputs::to_pretty_json;
use crate::utils::{date_stamp, next_available_stem};
use serde_json::Value;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `data` to `{dir}/{prefix}_{YYYYMMDD}_{NN}.json` and return the path.
///
/// # Arguments
///
/// * `data` - The response exactly as received
/// * `dir` - Raw storage directory, created if missing
/// * `prefix` - File name prefix (`raw` for articles, `sources` for listings)
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), %prefix))]
pub async fn save_raw_response(data: &Value, dir: &Path, prefix: &str) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir).await?;
    let path = next_available_stem(dir, prefix, &date_stamp(), &["json"])
        .await?
        .with_extension("json");

    let json = to_pretty_json(data)?;
    if let Err(e) = fs::write(&path, json).await {
        error!(path = %path.display(), error = %e, "Failed to write raw response");
        return Err(format!("error saving raw response to {}: {e}", path.display()).into());
    }
    info!(path = %path.display(), "Wrote raw response");
    Ok(path)
}

/// Read a stored raw response back.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (`error loading raw response ...`)
/// - The contents are not valid JSON (`error parsing JSON ...`)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_raw_response(path: &Path) -> Result<Value, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| format!("error loading raw response from {}: {e}", path.display()))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("error parsing JSON from {}: {e}", path.display()))?;
    Ok(value)
}

/// The article array of a response. Missing or non-array `results` is empty.
pub fn raw_articles(response: &Value) -> &[RawRecord] {
    response
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
