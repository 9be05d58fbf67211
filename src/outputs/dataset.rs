//! Final dataset writer.
//!
//! Feature rows are written to `{dir}/data_{YYYYMMDD}_{NN}.{ext}`. The counter
//! skips any number already used by a file of either supported format.

use crate::features::FeatureRow;
use crate::outputs::to_pretty_json;
use crate::utils::{date_stamp, next_available_stem};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{info, instrument};

/// Serialization format of the final dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// One JSON object per line.
    #[default]
    Jsonl,
    /// A single pretty-printed JSON array.
    Json,
    /// Comma-separated values with a header row; `category` is one joined column.
    Csv,
}

impl DatasetFormat {
    pub const ALL: [DatasetFormat; 3] = [DatasetFormat::Jsonl, DatasetFormat::Json, DatasetFormat::Csv];

    pub fn extension(&self) -> &'static str {
        match self {
            DatasetFormat::Jsonl => "jsonl",
            DatasetFormat::Json => "json",
            DatasetFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for DatasetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" => Ok(DatasetFormat::Jsonl),
            "json" => Ok(DatasetFormat::Json),
            "csv" => Ok(DatasetFormat::Csv),
            other => Err(format!("unsupported format: {other} (use 'jsonl', 'json' or 'csv')")),
        }
    }
}

/// Separator between tags in the CSV `category` column.
pub const CSV_CATEGORY_SEPARATOR: &str = "|";

/// A [`FeatureRow`] flattened to scalar columns.
#[derive(Serialize)]
struct CsvRow<'a> {
    article_id: &'a str,
    title: &'a str,
    cleaned_text: &'a str,
    source: &'a str,
    url: &'a str,
    domain: &'a str,
    category: String,
    category_tag: &'a str,
    pub_datetime: Option<i64>,
    character_count: usize,
    token_count: usize,
    sentence_count: usize,
}

impl<'a> From<&'a FeatureRow> for CsvRow<'a> {
    fn from(row: &'a FeatureRow) -> Self {
        Self {
            article_id: &row.article_id,
            title: &row.title,
            cleaned_text: &row.cleaned_text,
            source: &row.source,
            url: &row.url,
            domain: &row.domain,
            category: row.category.join(CSV_CATEGORY_SEPARATOR),
            category_tag: &row.category_tag,
            pub_datetime: row.pub_datetime,
            character_count: row.character_count,
            token_count: row.token_count,
            sentence_count: row.sentence_count,
        }
    }
}

fn render_csv(rows: &[FeatureRow]) -> Result<String, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.error().to_string())?;
    Ok(String::from_utf8(bytes)?)
}

/// Render rows in `format`.
///
/// # Errors
///
/// Returns an error if a row fails to serialize.
pub fn render_rows(rows: &[FeatureRow], format: DatasetFormat) -> Result<String, Box<dyn Error>> {
    match format {
        DatasetFormat::Json => to_pretty_json(rows),
        DatasetFormat::Csv => render_csv(rows),
        DatasetFormat::Jsonl => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&serde_json::to_string(row)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Write the dataset to the next free `data_{YYYYMMDD}_{NN}` file in `dir`.
///
/// # Arguments
///
/// * `rows` - Feature rows, written in order
/// * `dir` - Output directory, created if missing
/// * `format` - Serialization format, which also picks the file extension
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, a row fails to
/// serialize, or the file cannot be written.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), rows = rows.len(), %format))]
pub async fn write_dataset(rows: &[FeatureRow], dir: &Path, format: DatasetFormat) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir).await?;
    let extensions = DatasetFormat::ALL.map(|f| f.extension());
    let path = next_available_stem(dir, "data", &date_stamp(), &extensions)
        .await?
        .with_extension(format.extension());

    let body = render_rows(rows, format)?;
    fs::write(&path, body)
        .await
        .map_err(|e| format!("error saving dataset to {}: {e}", path.display()))?;
    info!(path = %path.display(), "Wrote final dataset");
    Ok(path)
}
