//! NewsData.io client with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`FetchNews`]: core trait for anything that turns a [`NewsQuery`] into a raw response
//! - [`NewsDataClient`]: `reqwest` implementation against the NewsData.io REST API
//! - [`RetryFetch`]: decorator that adds retries to any [`FetchNews`] implementation
//! - [`fetch_pages`] / [`fetch_queries`]: pagination and multi-query helpers
//!
//! # Retry Strategy
//!
//! - Maximum 3 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt, TryStreamExt};
use rand::{Rng, rng};
use serde_json::{Value, json};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Base URL of the NewsData.io v1 API.
pub const NEWSDATA_BASE_URL: &str = "https://newsdata.io/api/1/";

/// Number of queries fetched at the same time by [`fetch_queries`].
const PARALLEL_QUERIES: usize = 4;

/// NewsData.io endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Most recent articles.
    Latest,
    /// Keyword search over the archive window.
    Search,
    /// Publisher listing.
    Sources,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Latest => "latest",
            Endpoint::Search => "search",
            Endpoint::Sources => "sources",
        }
    }
}

/// Parameters for one API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub endpoint: Endpoint,
    /// Keyword filter (`q`).
    pub query: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    /// `nextPage` token from a previous response.
    pub page: Option<String>,
}

impl NewsQuery {
    /// Latest-news request in `language`.
    pub fn latest(language: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Latest,
            query: None,
            language: Some(language.into()),
            country: None,
            page: None,
        }
    }

    /// Keyword search in `language`.
    pub fn search(keyword: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            endpoint: Endpoint::Search,
            query: Some(keyword.into()),
            language: Some(language.into()),
            country: None,
            page: None,
        }
    }

    /// Publisher listing.
    pub fn sources() -> Self {
        Self {
            endpoint: Endpoint::Sources,
            query: None,
            language: None,
            country: None,
            page: None,
        }
    }

    /// Query-string pairs, excluding the API key.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        if let Some(q) = self.query.as_ref().filter(|q| !q.is_empty()) {
            params.push(("q", q.clone()));
        }
        if let Some(country) = &self.country {
            params.push(("country", country.clone()));
        }
        if let Some(page) = &self.page {
            params.push(("page", page.clone()));
        }
        params
    }
}

/// Trait for async news fetching.
///
/// Implementors take a query and return the API's JSON response. This lets the
/// retry decorator and the pagination helpers work against fakes in tests.
pub trait FetchNews {
    /// Perform one request.
    async fn fetch(&self, query: &NewsQuery) -> Result<Value, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchNews`] implementation.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying client to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchNews,
{
    /// Wrap `inner` with retries.
    ///
    /// ```ignore
    /// let client = NewsDataClient::new(api_key)?;
    /// let client = RetryFetch::new(client, 3, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchNews for RetryFetch<T>
where
    T: FetchNews,
{
    #[instrument(level = "info", skip_all, fields(endpoint = query.endpoint.path()))]
    async fn fetch(&self, query: &NewsQuery) -> Result<Value, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.fetch(query).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "fetch() exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// HTTP client for the NewsData.io API.
pub struct NewsDataClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
}

impl fmt::Debug for NewsDataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The key stays out of logs.
        f.debug_struct("NewsDataClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl NewsDataClient {
    /// Client against the public API with a 30 second request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Box<dyn Error>> {
        Self::with_base_url(api_key, NEWSDATA_BASE_URL)
    }

    /// Client against another deployment of the same API.
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: Url::parse(base_url)?,
        })
    }

    /// Full request URL for `query`, without the API key.
    pub fn request_url(&self, query: &NewsQuery) -> Result<Url, Box<dyn Error>> {
        let mut url = self.base_url.join(query.endpoint.path())?;
        url.query_pairs_mut().extend_pairs(query.params());
        Ok(url)
    }
}

impl FetchNews for NewsDataClient {
    #[instrument(level = "info", skip_all, fields(endpoint = query.endpoint.path()))]
    async fn fetch(&self, query: &NewsQuery) -> Result<Value, Box<dyn Error>> {
        let t0 = Instant::now();
        let url = self.request_url(query)?;
        debug!(%url, "Requesting news");

        let response = self
            .http
            .get(url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                %status,
                elapsed_ms = dt.as_millis(),
                body_preview = %truncate_for_log(&body, 300),
                "News API returned an error status"
            );
            return Err(format!("news API returned {status}").into());
        }

        let value: Value = serde_json::from_str(&body)?;
        if value.get("status").and_then(Value::as_str) == Some("error") {
            let message = value
                .pointer("/results/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(format!("news API error: {message}").into());
        }

        info!(
            elapsed_ms = dt.as_millis(),
            results = value.get("results").and_then(|r| r.as_array()).map_or(0, Vec::len),
            "Fetched news page"
        );
        Ok(value)
    }
}

/// Fetch up to `pages` pages, following `nextPage` tokens.
///
/// The returned response carries every page's `results` concatenated in page
/// order, and the last `nextPage` token seen (or `null`).
#[instrument(level = "info", skip(client, query))]
pub async fn fetch_pages<F>(client: &F, query: NewsQuery, pages: usize) -> Result<Value, Box<dyn Error>>
where
    F: FetchNews,
{
    let mut query = query;
    let mut results: Vec<Value> = Vec::new();
    let mut merged = json!({"status": "success"});

    for page in 0..pages.max(1) {
        let response = client.fetch(&query).await?;
        if !response.is_object() {
            return Err("news API returned a non-object response".into());
        }
        if let Some(items) = response.get("results").and_then(Value::as_array) {
            results.extend(items.iter().cloned());
        }
        if page == 0 {
            merged = response.clone();
        }
        let next = response
            .get("nextPage")
            .and_then(Value::as_str)
            .map(str::to_string);
        merged["nextPage"] = next.clone().map_or(Value::Null, Value::String);
        match next {
            Some(token) => query.page = Some(token),
            None => break,
        }
    }

    info!(articles = results.len(), "Fetched all pages");
    merged["totalResults"] = json!(results.len());
    merged["results"] = Value::Array(results);
    Ok(merged)
}

/// Fetch several keyword searches concurrently and merge them.
///
/// Results appear in the order the queries were given, regardless of which
/// request finishes first. An empty `queries` list falls back to the latest feed.
#[instrument(level = "info", skip(client, base))]
pub async fn fetch_queries<F>(
    client: &F,
    base: NewsQuery,
    queries: &[String],
    pages: usize,
) -> Result<Value, Box<dyn Error>>
where
    F: FetchNews,
{
    if queries.is_empty() {
        return fetch_pages(client, base, pages).await;
    }

    let responses: Vec<Value> = stream::iter(queries.iter().cloned())
        .map(|keyword| {
            let query = NewsQuery {
                endpoint: Endpoint::Latest,
                query: Some(keyword),
                page: None,
                ..base.clone()
            };
            fetch_pages(client, query, pages)
        })
        .buffered(PARALLEL_QUERIES)
        .try_collect()
        .await?;

    let results: Vec<Value> = responses
        .into_iter()
        .flat_map(|mut response| match response["results"].take() {
            Value::Array(items) => items,
            _ => Vec::new(),
        })
        .collect();
    Ok(json!({
        "status": "success",
        "totalResults": results.len(),
        "results": results,
        "nextPage": null,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serves canned responses in order and records every query it saw.
    struct FakeFeed {
        responses: Mutex<Vec<Result<Value, String>>>,
        seen: Mutex<Vec<NewsQuery>>,
    }

    impl FakeFeed {
        fn new(responses: Vec<Result<Value, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl FetchNews for FakeFeed {
        async fn fetch(&self, query: &NewsQuery) -> Result<Value, Box<dyn Error>> {
            self.seen.lock().unwrap().push(query.clone());
            match self.responses.lock().unwrap().pop() {
                Some(Ok(value)) => Ok(value),
                Some(Err(e)) => Err(e.into()),
                None => Err("no more responses".into()),
            }
        }
    }

    /// Answers any search with one article titled after the keyword.
    struct EchoFeed;

    impl FetchNews for EchoFeed {
        async fn fetch(&self, query: &NewsQuery) -> Result<Value, Box<dyn Error>> {
            let keyword = query.query.clone().unwrap_or_default();
            Ok(json!({"status": "success", "results": [{"title": keyword}], "nextPage": null}))
        }
    }

    fn page(titles: &[&str], next: Option<&str>) -> Value {
        let results: Vec<Value> = titles.iter().map(|t| json!({"title": t})).collect();
        json!({"status": "success", "results": results, "nextPage": next})
    }

    #[test]
    fn test_params_skip_absent_fields() {
        let query = NewsQuery::latest("en");
        assert_eq!(query.params(), vec![("language", "en".to_string())]);

        let mut search = NewsQuery::search("climate", "de");
        search.country = Some("at".to_string());
        search.page = Some("tok".to_string());
        assert_eq!(
            search.params(),
            vec![
                ("language", "de".to_string()),
                ("q", "climate".to_string()),
                ("country", "at".to_string()),
                ("page", "tok".to_string()),
            ]
        );
    }

    #[test]
    fn test_request_url_excludes_key() {
        let client = NewsDataClient::new("secret").unwrap();
        let url = client.request_url(&NewsQuery::search("rust lang", "en")).unwrap();
        assert_eq!(url.path(), "/api/1/search");
        assert!(url.as_str().contains("q=rust+lang"));
        assert!(!url.as_str().contains("secret"));
        assert!(!format!("{client:?}").contains("secret"));
    }

    #[test]
    fn test_sources_request_url() {
        let client = NewsDataClient::new("secret").unwrap();
        let query = NewsQuery {
            country: Some("gb".to_string()),
            ..NewsQuery::sources()
        };
        let url = client.request_url(&query).unwrap();
        assert_eq!(url.path(), "/api/1/sources");
        assert_eq!(url.query(), Some("country=gb"));
    }

    #[tokio::test]
    async fn test_transport_error_hides_key() {
        // Nothing listens on port 1, so the request fails before any response.
        let client = NewsDataClient::with_base_url("secret-key", "http://127.0.0.1:1/api/1/").unwrap();
        let err = client.fetch(&NewsQuery::latest("en")).await.unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("secret-key"), "{message}");
        assert!(!message.contains("apikey"), "{message}");
    }

    #[tokio::test]
    async fn test_fetch_pages_follows_next_page() {
        let feed = FakeFeed::new(vec![
            Ok(page(&["a", "b"], Some("p2"))),
            Ok(page(&["c"], Some("p3"))),
            Ok(page(&["d"], None)),
        ]);
        let merged = fetch_pages(&feed, NewsQuery::latest("en"), 5).await.unwrap();

        let titles: Vec<&str> = merged["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c", "d"]);
        assert_eq!(merged["totalResults"], json!(4));
        assert_eq!(merged["nextPage"], Value::Null);

        let pages: Vec<Option<String>> = feed.seen.lock().unwrap().iter().map(|q| q.page.clone()).collect();
        assert_eq!(pages, vec![None, Some("p2".to_string()), Some("p3".to_string())]);
    }

    #[tokio::test]
    async fn test_fetch_pages_stops_at_limit() {
        let feed = FakeFeed::new(vec![
            Ok(page(&["a"], Some("p2"))),
            Ok(page(&["b"], Some("p3"))),
        ]);
        let merged = fetch_pages(&feed, NewsQuery::latest("en"), 1).await.unwrap();
        assert_eq!(merged["results"].as_array().unwrap().len(), 1);
        assert_eq!(merged["nextPage"], json!("p2"));
        assert_eq!(feed.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_queries_keeps_query_order() {
        let queries = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let merged = fetch_queries(&EchoFeed, NewsQuery::latest("en"), &queries, 1)
            .await
            .unwrap();
        let titles: Vec<&str> = merged["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let feed = FakeFeed::new(vec![
            Err("timeout".to_string()),
            Err("502".to_string()),
            Ok(page(&["a"], None)),
        ]);
        let client = RetryFetch::new(feed, 3, StdDuration::from_millis(1));
        let value = client.fetch(&NewsQuery::latest("en")).await.unwrap();
        assert_eq!(value["results"][0]["title"], json!("a"));
        assert_eq!(client.inner.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let feed = FakeFeed::new(vec![Err("down".to_string()), Err("down".to_string())]);
        let client = RetryFetch::new(feed, 1, StdDuration::from_millis(1));
        let err = client.fetch(&NewsQuery::latest("en")).await.unwrap_err();
        assert_eq!(err.to_string(), "down");
        assert_eq!(client.inner.seen.lock().unwrap().len(), 2);
    }
}
