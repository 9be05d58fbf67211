//! Schema enforcement for raw feed records.
//!
//! Turns one loosely-typed [`RawRecord`] into a [`ValidatedArticle`] with every
//! field present, or rejects it. Optional fields degrade to empty values; only
//! a missing body or a text field of the wrong shape rejects the record.

use crate::cleaning::dates::parse_pub_datetime;
use crate::models::{Outcome, RawRecord, RejectReason, ValidatedArticle};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Assembled bodies shorter than this are rejected outright.
pub const MIN_BODY_CHARS: usize = 10;

/// Case-insensitive marker of a paywalled `content` stub.
const PAYWALL_MARKER: &str = "ONLY AVAILABLE";

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are all empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a scalar or composite value as text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The first truthy value among `keys`.
fn first_truthy<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_truthy(value))
}

/// The first truthy value among `keys`, stringified and trimmed.
fn first_text(record: &Map<String, Value>, keys: &[&str]) -> String {
    first_truthy(record, keys)
        .map(|value| stringify(value).trim().to_string())
        .unwrap_or_default()
}

/// A field that must be text when present.
fn text_field(record: &Map<String, Value>, field: &'static str) -> Result<String, RejectReason> {
    match record.get(field) {
        Some(value) if !is_truthy(value) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RejectReason::MalformedField { field }),
        None => Ok(String::new()),
    }
}

fn is_paywall_stub(content: &str) -> bool {
    content.to_uppercase().contains(PAYWALL_MARKER)
}

/// Optional scheme, then `//` and the authority up to the path, query or fragment.
static AUTHORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:)?//([^/?#]*)").unwrap());

/// Network location of `url` exactly as written (userinfo, case and port
/// kept), or empty when there is none. Unbalanced IPv6 brackets count as
/// unparsable.
pub fn domain_of(url: &str) -> String {
    let Some(netloc) = AUTHORITY_RE.captures(url).and_then(|caps| caps.get(1)) else {
        return String::new();
    };
    let netloc = netloc.as_str();
    if netloc.contains('[') != netloc.contains(']') {
        return String::new();
    }
    netloc.to_string()
}

/// Coerce a `category` value into unique trimmed tags.
fn categories(value: Option<&Value>) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(scalar) if is_truthy(scalar) => vec![scalar],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter(|item| is_truthy(item))
        .map(|item| stringify(item).trim().to_string())
        .filter(|tag| !tag.is_empty())
        .unique()
        .collect()
}

fn validate_object(record: &Map<String, Value>, index: usize) -> Result<ValidatedArticle, RejectReason> {
    let article_id = first_truthy(record, &["article_id"])
        .map(stringify)
        .unwrap_or_else(|| format!("article_{index:04}"));

    let title = Some(first_text(record, &["title", "headline"])).filter(|t| !t.is_empty());

    let description = text_field(record, "description")?;
    let mut content = text_field(record, "content")?;
    if is_paywall_stub(&content) {
        content.clear();
    }

    let body_text = [
        title.as_deref().unwrap_or(""),
        description.as_str(),
        content.as_str(),
    ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .join(" ");

    let length = body_text.chars().count();
    if length < MIN_BODY_CHARS {
        return Err(RejectReason::BodyTooShort { length });
    }

    let url = first_text(record, &["link", "url"]);
    let domain = domain_of(&url);

    Ok(ValidatedArticle {
        article_id,
        title,
        body_text,
        source: first_text(record, &["source_name", "source_id"]),
        domain,
        category: categories(record.get("category")),
        url,
        pub_datetime: first_truthy(record, &["pubDate", "pub_date"]).and_then(parse_pub_datetime),
        flags: Vec::new(),
        character_count: 0,
        token_count: 0,
        sentence_count: 0,
    })
}

/// Validate one raw record.
///
/// `index` is the record's position in the batch and only feeds the
/// placeholder id `article_{index:04}` used when the feed has no id.
pub fn validate_record(record: &RawRecord, index: usize) -> Outcome {
    let Some(object) = record.as_object() else {
        return Outcome::Rejected(RejectReason::NotAnObject);
    };
    match validate_object(object, index) {
        Ok(article) => Outcome::Accepted(article),
        Err(reason) => Outcome::Rejected(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accept(record: Value, index: usize) -> ValidatedArticle {
        match validate_record(&record, index) {
            Outcome::Accepted(article) => article,
            Outcome::Rejected(reason) => panic!("unexpected rejection: {reason}"),
        }
    }

    #[test]
    fn test_placeholder_id_is_zero_padded() {
        let article = accept(json!({"title": "A perfectly fine headline"}), 2);
        assert_eq!(article.article_id, "article_0002");
    }

    #[test]
    fn test_upstream_id_is_kept() {
        let article = accept(json!({"article_id": "abc123", "title": "A perfectly fine headline"}), 7);
        assert_eq!(article.article_id, "abc123");

        let numeric = accept(json!({"article_id": 42, "title": "A perfectly fine headline"}), 7);
        assert_eq!(numeric.article_id, "42");
    }

    #[test]
    fn test_empty_id_falls_back() {
        let article = accept(json!({"article_id": "", "title": "A perfectly fine headline"}), 12);
        assert_eq!(article.article_id, "article_0012");
    }

    #[test]
    fn test_body_joins_non_empty_parts() {
        let article = accept(
            json!({
                "title": "  Markets rally  ",
                "description": "   ",
                "content": "Stocks rose on Tuesday."
            }),
            0,
        );
        assert_eq!(article.title.as_deref(), Some("Markets rally"));
        assert_eq!(article.body_text, "Markets rally Stocks rose on Tuesday.");
    }

    #[test]
    fn test_headline_used_when_title_missing() {
        let article = accept(json!({"title": null, "headline": "Storm makes landfall"}), 0);
        assert_eq!(article.title.as_deref(), Some("Storm makes landfall"));
    }

    #[test]
    fn test_missing_title_is_absent() {
        let article = accept(json!({"description": "Only a description here"}), 0);
        assert_eq!(article.title, None);
        assert_eq!(article.body_text, "Only a description here");
    }

    #[test]
    fn test_paywall_content_is_dropped() {
        let article = accept(
            json!({
                "title": "Big news today",
                "content": "Only Available in paid plans"
            }),
            0,
        );
        assert_eq!(article.body_text, "Big news today");
    }

    #[test]
    fn test_short_body_is_rejected() {
        let outcome = validate_record(&json!({"title": "Too shrt"}), 0);
        assert_eq!(
            outcome.rejection(),
            Some(&RejectReason::BodyTooShort { length: 8 })
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        for record in [json!(null), json!("text"), json!([1, 2, 3]), json!(5)] {
            assert_eq!(
                validate_record(&record, 0).rejection(),
                Some(&RejectReason::NotAnObject)
            );
        }
    }

    #[test]
    fn test_non_text_content_is_rejected() {
        let outcome = validate_record(
            &json!({"title": "A perfectly fine headline", "content": ["not", "text"]}),
            0,
        );
        assert_eq!(
            outcome.rejection(),
            Some(&RejectReason::MalformedField { field: "content" })
        );
    }

    #[test]
    fn test_falsy_non_text_content_is_tolerated() {
        let article = accept(
            json!({"title": "A perfectly fine headline", "content": [], "description": 0}),
            0,
        );
        assert_eq!(article.body_text, "A perfectly fine headline");
    }

    #[test]
    fn test_source_and_url_precedence() {
        let article = accept(
            json!({
                "title": "A perfectly fine headline",
                "source_name": "",
                "source_id": " reuters ",
                "link": "https://www.reuters.com/world/story",
                "url": "https://ignored.example/"
            }),
            0,
        );
        assert_eq!(article.source, "reuters");
        assert_eq!(article.url, "https://www.reuters.com/world/story");
        assert_eq!(article.domain, "www.reuters.com");
    }

    #[test]
    fn test_domain_degrades_to_empty() {
        assert_eq!(domain_of(""), "");
        assert_eq!(domain_of("not a url"), "");
        assert_eq!(domain_of("example.com/path"), "");
        assert_eq!(domain_of("mailto:desk@example.com"), "");
        assert_eq!(domain_of("http://example.com:8080/x"), "example.com:8080");
        assert_eq!(domain_of("http://[::1/x"), "");
    }

    #[test]
    fn test_domain_is_netloc_as_written() {
        assert_eq!(domain_of("http://Example.COM:80/x"), "Example.COM:80");
        assert_eq!(domain_of("https://user@news.example.org/a?b#c"), "user@news.example.org");
        assert_eq!(domain_of("//cdn.example.net/img.png"), "cdn.example.net");
        assert_eq!(domain_of("https://news.example.org?page=2"), "news.example.org");
        assert_eq!(domain_of("http://[::1]:8080/feed"), "[::1]:8080");
    }

    #[test]
    fn test_category_coercion() {
        let list = accept(
            json!({"title": "A perfectly fine headline", "category": ["top", "", null, " world ", "top", 3]}),
            0,
        );
        assert_eq!(list.category, vec!["top", "world", "3"]);

        let scalar = accept(json!({"title": "A perfectly fine headline", "category": "sports"}), 0);
        assert_eq!(scalar.category, vec!["sports"]);

        let missing = accept(json!({"title": "A perfectly fine headline", "category": null}), 0);
        assert!(missing.category.is_empty());
    }

    #[test]
    fn test_pub_date_keys() {
        let camel = accept(
            json!({"title": "A perfectly fine headline", "pubDate": "2024-05-01T10:00:00Z"}),
            0,
        );
        assert_eq!(camel.pub_datetime, Some(1_714_557_600));

        let snake = accept(
            json!({"title": "A perfectly fine headline", "pub_date": 1_714_557_600}),
            0,
        );
        assert_eq!(snake.pub_datetime, Some(1_714_557_600));

        let garbage = accept(
            json!({"title": "A perfectly fine headline", "pubDate": "last tuesday"}),
            0,
        );
        assert_eq!(garbage.pub_datetime, None);
    }
}
