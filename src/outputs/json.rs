//! Cleaned article persistence.
//!
//! Survivors of the cleaning pipeline are written as one pretty-printed JSON
//! array to `{dir}/clean_{YYYYMMDD}_{NN}.json`.

use crate::models::ValidatedArticle;
use crate::outputs::to_pretty_json;
use crate::utils::{date_stamp, next_available_stem};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write cleaned articles to the next free `clean_{YYYYMMDD}_{NN}.json` in `dir`.
///
/// # Arguments
///
/// * `articles` - Cleaned articles, written as one pretty-printed JSON array
/// * `dir` - Output directory, created if missing
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), count = articles.len()))]
pub async fn save_cleaned_articles(articles: &[ValidatedArticle], dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    info!("Ensuring cleaned directory exists");
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(error = %e, "Failed to create cleaned dir");
        return Err(e.into());
    }

    let path = next_available_stem(dir, "clean", &date_stamp(), &["json"])
        .await?
        .with_extension("json");
    let json = to_pretty_json(articles)?;

    info!(path = %path.display(), "Writing cleaned articles");
    fs::write(&path, json)
        .await
        .map_err(|e| format!("error saving cleaned articles to {}: {e}", path.display()))?;
    info!(path = %path.display(), "Wrote cleaned articles");
    Ok(path)
}
