//! Length gate applied after normalization.

use crate::config::PipelineConfig;
use crate::models::{Flag, Outcome, RejectReason, ValidatedArticle};

/// Bodies under this many characters are flagged `very_short`, whatever
/// `min_length` says.
pub const VERY_SHORT_CHARS: usize = 100;

/// Reject empty or too-short bodies and flag outliers.
///
/// The article is returned unchanged apart from appended flags.
pub fn check_linguistics(article: ValidatedArticle, config: &PipelineConfig) -> Outcome {
    if article.body_text.is_empty() {
        return Outcome::Rejected(RejectReason::EmptyBody);
    }
    let length = article.body_text.chars().count();
    if length < config.min_length {
        return Outcome::Rejected(RejectReason::BelowMinLength {
            length,
            min: config.min_length,
        });
    }

    let mut article = article;
    if length > config.max_length {
        article = article.with_flag(Flag::ExtremelyLong);
    }
    if length < VERY_SHORT_CHARS {
        article = article.with_flag(Flag::VeryShort);
    }
    Outcome::Accepted(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_article;

    fn config(min_length: usize, max_length: usize) -> PipelineConfig {
        PipelineConfig {
            normalize_numbers: false,
            min_length,
            max_length,
        }
    }

    #[test]
    fn test_empty_body_rejected() {
        let outcome = check_linguistics(sample_article(""), &config(0, 1000));
        assert_eq!(outcome.rejection(), Some(&RejectReason::EmptyBody));
    }

    #[test]
    fn test_below_min_rejected() {
        let outcome = check_linguistics(sample_article("short body"), &config(50, 1000));
        assert_eq!(
            outcome.rejection(),
            Some(&RejectReason::BelowMinLength { length: 10, min: 50 })
        );
    }

    #[test]
    fn test_exactly_min_accepted() {
        let body = "x".repeat(50);
        let article = check_linguistics(sample_article(&body), &config(50, 1000))
            .accepted()
            .unwrap();
        assert_eq!(article.flags, vec![Flag::VeryShort]);
    }

    #[test]
    fn test_long_body_flagged_not_rejected() {
        let body = "y".repeat(300);
        let article = check_linguistics(sample_article(&body), &config(50, 200))
            .accepted()
            .unwrap();
        assert_eq!(article.flags, vec![Flag::ExtremelyLong]);
        assert_eq!(article.body_text, body);
    }

    #[test]
    fn test_both_flags_with_inconsistent_config() {
        let body = "z".repeat(60);
        let article = check_linguistics(sample_article(&body), &config(10, 20))
            .accepted()
            .unwrap();
        assert!(article.has_flag(Flag::ExtremelyLong));
        assert!(article.has_flag(Flag::VeryShort));
    }

    #[test]
    fn test_existing_flags_survive() {
        let body = "w".repeat(150);
        let article = sample_article(&body).with_flag(Flag::VeryShort);
        let article = check_linguistics(article, &config(50, 1000)).accepted().unwrap();
        assert_eq!(article.flags, vec![Flag::VeryShort]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let body = "é".repeat(30);
        let outcome = check_linguistics(sample_article(&body), &config(40, 1000));
        assert_eq!(
            outcome.rejection(),
            Some(&RejectReason::BelowMinLength { length: 30, min: 40 })
        );
    }
}
