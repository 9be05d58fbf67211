//! Flat feature rows for tabular storage and embedding.
//!
//! A [`FeatureRow`] is the per-article record handed to the dataset writer.
//! The embedding stage reads `cleaned_text` and can append its vector as an
//! extra column without touching the rest.

use crate::models::ValidatedArticle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeatureRow {
    pub article_id: String,
    /// Empty when the article had no title.
    pub title: String,
    pub cleaned_text: String,
    pub source: String,
    pub url: String,
    pub domain: String,
    pub category: Vec<String>,
    /// First category, or empty.
    pub category_tag: String,
    pub pub_datetime: Option<i64>,
    pub character_count: usize,
    pub token_count: usize,
    pub sentence_count: usize,
}

impl From<&ValidatedArticle> for FeatureRow {
    fn from(article: &ValidatedArticle) -> Self {
        Self {
            article_id: article.article_id.clone(),
            title: article.title.clone().unwrap_or_default(),
            cleaned_text: article.body_text.clone(),
            source: article.source.clone(),
            url: article.url.clone(),
            domain: article.domain.clone(),
            category: article.category.clone(),
            category_tag: article.category.first().cloned().unwrap_or_default(),
            pub_datetime: article.pub_datetime,
            character_count: article.character_count,
            token_count: article.token_count,
            sentence_count: article.sentence_count,
        }
    }
}

/// One row per cleaned article, in the same order.
pub fn extract_features(articles: &[ValidatedArticle]) -> Vec<FeatureRow> {
    articles.iter().map(FeatureRow::from).collect()
}
