//! Derived text statistics.

use crate::models::ValidatedArticle;
use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Number of non-blank segments between runs of `.`, `!` and `?`.
pub fn count_sentences(text: &str) -> usize {
    SENTENCE_SPLIT_RE
        .split(text)
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

/// Set `character_count`, `token_count` and `sentence_count` from the
/// current body, overwriting any earlier values.
pub fn annotate_statistics(article: ValidatedArticle) -> ValidatedArticle {
    let body = article.body_text.as_str();
    let character_count = body.chars().count();
    let token_count = body.split_whitespace().count();
    let sentence_count = count_sentences(body);
    ValidatedArticle {
        character_count,
        token_count,
        sentence_count,
        ..article
    }
}
