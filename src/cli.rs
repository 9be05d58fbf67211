//! Command-line interface definitions for the news pipeline.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The API key and directories can also come from environment variables.

use clap::Parser;
use news_pipeline::outputs::dataset::DatasetFormat;
use std::path::PathBuf;

/// Command-line arguments for the news pipeline.
///
/// # Examples
///
/// ```sh
/// # Fetch the latest English news and run the whole pipeline
/// news_pipeline --api-key YOUR_KEY
///
/// # Two keyword feeds, three pages each, numbers replaced by <NUM>
/// news_pipeline -q climate -q energy --pages 3 --normalize-numbers
///
/// # Store the publisher listing for British sources
/// news_pipeline --list-sources --country gb
///
/// # Re-clean a stored raw response without hitting the API
/// news_pipeline --input data/raw/raw_20250506_01.json --min-length 80
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsData.io API key
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Keyword filter; repeat to fetch several feeds
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// Article language code
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Country code filter
    #[arg(long)]
    pub country: Option<String>,

    /// Number of result pages to follow per feed
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    /// Fetch the publisher listing into the raw directory and exit
    #[arg(long, conflicts_with = "input")]
    pub list_sources: bool,

    /// Clean a stored raw response instead of fetching
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for raw API responses
    #[arg(long, env = "NEWS_RAW_DIR", default_value = "data/raw")]
    pub raw_dir: PathBuf,

    /// Directory for cleaned article files
    #[arg(long, env = "NEWS_CLEANED_DIR", default_value = "data/cleaned")]
    pub cleaned_dir: PathBuf,

    /// Directory for the final dataset
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "data/output")]
    pub output_dir: PathBuf,

    /// Optional path to a pipeline YAML config
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Replace standalone numbers with <NUM>
    #[arg(long)]
    pub normalize_numbers: bool,

    /// Minimum body length in characters
    #[arg(long)]
    pub min_length: Option<usize>,

    /// Body length above which articles are flagged
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Final dataset format (jsonl, json or csv)
    #[arg(long, default_value_t = DatasetFormat::Jsonl)]
    pub format: DatasetFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["news_pipeline", "--api-key", "k"]);

        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert!(cli.queries.is_empty());
        assert_eq!(cli.language, "en");
        assert_eq!(cli.pages, 1);
        assert_eq!(cli.raw_dir, PathBuf::from("data/raw"));
        assert_eq!(cli.cleaned_dir, PathBuf::from("data/cleaned"));
        assert_eq!(cli.output_dir, PathBuf::from("data/output"));
        assert_eq!(cli.format, DatasetFormat::Jsonl);
        assert!(!cli.normalize_numbers);
        assert_eq!(cli.min_length, None);
        assert!(!cli.list_sources);
    }

    #[test]
    fn test_cli_repeated_queries_and_overrides() {
        let cli = Cli::parse_from([
            "news_pipeline",
            "-q",
            "climate",
            "-q",
            "energy",
            "--normalize-numbers",
            "--min-length",
            "80",
            "--format",
            "json",
        ]);

        assert_eq!(cli.queries, vec!["climate", "energy"]);
        assert!(cli.normalize_numbers);
        assert_eq!(cli.min_length, Some(80));
        assert_eq!(cli.format, DatasetFormat::Json);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_pipeline", "-i", "/tmp/raw.json", "-o", "/tmp/out"]);

        assert_eq!(cli.input, Some(PathBuf::from("/tmp/raw.json")));
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_cli_list_sources() {
        let cli = Cli::parse_from(["news_pipeline", "--list-sources", "--country", "gb"]);
        assert!(cli.list_sources);
        assert_eq!(cli.country.as_deref(), Some("gb"));

        assert!(Cli::try_parse_from(["news_pipeline", "--list-sources", "-i", "raw.json"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["news_pipeline", "--format", "parquet"]).is_err());
    }
}
