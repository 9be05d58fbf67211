//! Data models for raw and cleaned news articles.
//!
//! This module defines the record types that flow through the cleaning pipeline:
//! - [`RawRecord`]: an untyped article as delivered by the news API
//! - [`ValidatedArticle`]: the canonical in-pipeline article, rebuilt by each stage
//! - [`Outcome`] / [`RejectReason`]: the result of running a record through a gate
//!
//! Timestamps are kept as integer Unix seconds so every survivor serializes
//! to plain JSON without custom date handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw article exactly as the upstream API returned it.
///
/// Any key may be missing, `null`, or of an unexpected type.
pub type RawRecord = serde_json::Value;

/// Qualitative warnings attached by the linguistic gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Body is under 100 characters.
    VeryShort,
    /// Body is longer than the configured maximum.
    ExtremelyLong,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::VeryShort => f.write_str("very_short"),
            Flag::ExtremelyLong => f.write_str("extremely_long"),
        }
    }
}

/// A schema-checked article.
///
/// Created once per raw record by the validator. Every later stage consumes the
/// value and returns a new one, so no two stages ever alias the same record.
///
/// # Invariants
///
/// * `article_id` is always set.
/// * `body_text` is non-empty for every article that leaves the pipeline.
/// * `flags` only grows.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ValidatedArticle {
    /// Upstream id, or `article_{index:04}` when the feed omitted one.
    pub article_id: String,
    /// Headline, absent when the feed had none.
    pub title: Option<String>,
    /// Title, description and content joined by single spaces.
    pub body_text: String,
    /// Publisher name or id.
    pub source: String,
    /// Network location parsed from `url`.
    pub domain: String,
    /// Unique category tags in first-seen order.
    pub category: Vec<String>,
    /// Link to the original article.
    pub url: String,
    /// Publication time in Unix seconds.
    pub pub_datetime: Option<i64>,
    #[serde(rename = "_flags", default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub character_count: usize,
    #[serde(default)]
    pub token_count: usize,
    #[serde(default)]
    pub sentence_count: usize,
}

impl ValidatedArticle {
    /// Rebuild the article with a transformed body.
    pub fn map_body<F>(self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        let body_text = f(&self.body_text);
        Self { body_text, ..self }
    }

    /// Rebuild the article with a transformed title.
    ///
    /// A title that cleans down to nothing becomes absent.
    pub fn map_title<F>(self, f: F) -> Self
    where
        F: FnOnce(&str) -> String,
    {
        let title = self
            .title
            .as_deref()
            .map(f)
            .filter(|t| !t.is_empty());
        Self { title, ..self }
    }

    /// Apply the same transform to body and title.
    pub fn map_text<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        self.map_body(&f).map_title(&f)
    }

    /// Append a flag. Flags are never removed, and never duplicated.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
        self
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Why a record was dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The raw record was not a JSON object.
    NotAnObject,
    /// A text field held a value of the wrong shape (e.g. a list for `content`).
    MalformedField { field: &'static str },
    /// The assembled body was under the validator's hard floor.
    BodyTooShort { length: usize },
    /// Normalization left nothing behind.
    EmptyBody,
    /// The normalized body was under the configured minimum.
    BelowMinLength { length: usize, min: usize },
}

impl RejectReason {
    /// Short stable label, used as a counter key in batch reports.
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::NotAnObject => "not_an_object",
            RejectReason::MalformedField { .. } => "malformed_field",
            RejectReason::BodyTooShort { .. } => "body_too_short",
            RejectReason::EmptyBody => "empty_body",
            RejectReason::BelowMinLength { .. } => "below_min_length",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAnObject => f.write_str("record is not an object"),
            RejectReason::MalformedField { field } => {
                write!(f, "field `{field}` has an unexpected type")
            }
            RejectReason::BodyTooShort { length } => {
                write!(f, "assembled body has {length} characters (minimum 10)")
            }
            RejectReason::EmptyBody => f.write_str("body is empty after normalization"),
            RejectReason::BelowMinLength { length, min } => {
                write!(f, "body has {length} characters, below minimum {min}")
            }
        }
    }
}

/// Result of running one record through a gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted(ValidatedArticle),
    Rejected(RejectReason),
}

impl Outcome {
    /// Transform an accepted article; rejections pass through untouched.
    pub fn map<F>(self, f: F) -> Outcome
    where
        F: FnOnce(ValidatedArticle) -> ValidatedArticle,
    {
        match self {
            Outcome::Accepted(article) => Outcome::Accepted(f(article)),
            rejected => rejected,
        }
    }

    /// Run an accepted article through another gate.
    pub fn and_then<F>(self, f: F) -> Outcome
    where
        F: FnOnce(ValidatedArticle) -> Outcome,
    {
        match self {
            Outcome::Accepted(article) => f(article),
            rejected => rejected,
        }
    }

    pub fn accepted(self) -> Option<ValidatedArticle> {
        match self {
            Outcome::Accepted(article) => Some(article),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_article(body: &str) -> ValidatedArticle {
    ValidatedArticle {
        article_id: "article_0000".to_string(),
        title: Some("Sample".to_string()),
        body_text: body.to_string(),
        source: "wire".to_string(),
        domain: "example.com".to_string(),
        category: vec!["top".to_string()],
        url: "https://example.com/a".to_string(),
        pub_datetime: Some(1_714_557_600),
        flags: Vec::new(),
        character_count: 0,
        token_count: 0,
        sentence_count: 0,
    }
}
