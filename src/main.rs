//! # News Pipeline
//!
//! Fetches articles from NewsData.io, cleans them, and writes a dataset ready
//! for embedding.
//!
//! ## Usage
//!
//! ```sh
//! news_pipeline --api-key YOUR_KEY -o ./data/output
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: Pull the latest (or keyword) feed, following `nextPage`
//! 2. **Raw storage**: Store the untouched response for replay
//! 3. **Cleaning**: Validate, sanitize, normalize, gate and annotate each record
//! 4. **Features**: Flatten survivors into feature rows
//! 5. **Output**: Write cleaned articles and the final dataset

use clap::Parser;
use news_pipeline::api::{FetchNews, NewsDataClient, NewsQuery, RetryFetch, fetch_queries};
use news_pipeline::config::PipelineConfig;
use news_pipeline::features::extract_features;
use news_pipeline::outputs::{dataset, json, raw};
use news_pipeline::process_articles;
use news_pipeline::utils::ensure_writable_dir;
use serde_json::Value;
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

/// Build the pipeline config from the optional YAML file and CLI overrides.
async fn resolve_config(args: &Cli) -> Result<PipelineConfig, Box<dyn Error>> {
    let base = match &args.config {
        Some(path) => PipelineConfig::load(path).await?,
        None => PipelineConfig::default(),
    };
    let config = base.with_overrides(args.normalize_numbers, args.min_length, args.max_length);
    config.warn_if_inconsistent();
    Ok(config)
}

/// Obtain the raw response, from disk when `--input` is given, else from the API.
///
/// Fetched responses are stored under `raw_dir` before anything else touches them.
#[instrument(level = "info", skip_all)]
async fn obtain_raw_response(args: &Cli) -> Result<Value, Box<dyn Error>> {
    if let Some(path) = &args.input {
        let response = raw::load_raw_response(path).await?;
        info!(path = %path.display(), "Loaded stored raw response");
        return Ok(response);
    }

    let Some(api_key) = args.api_key.as_deref() else {
        return Err("no API key: pass --api-key or set NEWSDATA_API_KEY (or use --input)".into());
    };
    let client = RetryFetch::new(NewsDataClient::new(api_key)?, 3, StdDuration::from_secs(1));
    let base = NewsQuery {
        country: args.country.clone(),
        ..NewsQuery::latest(args.language.clone())
    };
    let response = fetch_queries(&client, base, &args.queries, args.pages).await?;

    let path = raw::save_raw_response(&response, &args.raw_dir, "raw").await?;
    info!(path = %path.display(), "Raw data saved");
    Ok(response)
}

/// Fetch the publisher listing and store it under `raw_dir` as `sources_*.json`.
#[instrument(level = "info", skip_all)]
async fn list_sources(args: &Cli) -> Result<(), Box<dyn Error>> {
    let Some(api_key) = args.api_key.as_deref() else {
        return Err("no API key: pass --api-key or set NEWSDATA_API_KEY".into());
    };
    let client = RetryFetch::new(NewsDataClient::new(api_key)?, 3, StdDuration::from_secs(1));
    let query = NewsQuery {
        language: Some(args.language.clone()),
        country: args.country.clone(),
        ..NewsQuery::sources()
    };
    let response = client.fetch(&query).await?;
    let path = raw::save_raw_response(&response, &args.raw_dir, "sources").await?;
    info!(
        sources = raw::raw_articles(&response).len(),
        path = %path.display(),
        "Source listing saved"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_pipeline starting up");

    let args = Cli::parse();
    debug!(?args.queries, ?args.input, ?args.output_dir, "Parsed CLI arguments");

    let config = resolve_config(&args).await?;
    info!(?config, "Pipeline configuration");

    // Early check: every output dir must be writable before we spend API quota
    for dir in [&args.raw_dir, &args.cleaned_dir, &args.output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    if args.list_sources {
        if let Err(e) = list_sources(&args).await {
            error!(error = %e, "Failed to fetch the source listing");
            return Err(e);
        }
        return Ok(());
    }

    // ---- Fetch or load ----
    let response = match obtain_raw_response(&args).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Failed to obtain raw articles");
            return Err(e);
        }
    };
    let raw_articles = raw::raw_articles(&response);
    info!(count = raw_articles.len(), "Raw articles to clean");

    // ---- Clean ----
    let cleaned = process_articles(raw_articles, &config);
    info!(
        cleaned = cleaned.len(),
        removed = raw_articles.len() - cleaned.len(),
        "Cleaning complete"
    );

    let cleaned_path = json::save_cleaned_articles(&cleaned, &args.cleaned_dir).await?;
    info!(path = %cleaned_path.display(), "Cleaned articles saved");

    if cleaned.is_empty() {
        warn!("No cleaned articles to process; exiting");
        return Ok(());
    }

    // ---- Features & dataset ----
    let rows = extract_features(&cleaned);
    let dataset_path = match dataset::write_dataset(&rows, &args.output_dir, args.format).await {
        Ok(path) => path,
        Err(e) => {
            error!(error = %e, "Failed to write final dataset");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = cleaned.len(),
        dataset = %dataset_path.display(),
        "Execution complete"
    );

    Ok(())
}
