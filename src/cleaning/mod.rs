//! The article cleaning pipeline.
//!
//! Each raw record runs through a strict linear sequence:
//!
//! 1. [`schema`]: validate and assemble the body (may reject)
//! 2. [`sanitize`]: strip markup, links and non-printable characters
//! 3. [`normalize`]: NFKC + lowercase + ASCII glyphs
//! 4. [`normalize`]: sentence boundary repair (body only)
//! 5. [`normalize`]: optional `<NUM>` placeholders (body only)
//! 6. [`gate`]: length check and outlier flags (may reject)
//! 7. [`stats`]: character, token and sentence counts
//!
//! Stages 2 and 3 apply to the title as well as the body. Every stage takes the
//! article by value and hands back a new one. Records never see each other,
//! so the batch could be split across threads as long as order is restored.

pub mod dates;
pub mod gate;
pub mod normalize;
pub mod sanitize;
pub mod schema;
pub mod stats;

use crate::config::PipelineConfig;
use crate::models::{Outcome, RawRecord, ValidatedArticle};
use gate::check_linguistics;
use normalize::{normalize_numbers, normalize_sentence_boundaries, normalize_unicode_and_case};
use sanitize::sanitize_text;
use schema::validate_record;
use stats::annotate_statistics;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Run a single raw record through every stage.
///
/// `index` is the record's position in its batch.
pub fn clean_record(record: &RawRecord, index: usize, config: &PipelineConfig) -> Outcome {
    validate_record(record, index)
        .map(|article| {
            article
                .map_text(sanitize_text)
                .map_text(normalize_unicode_and_case)
                .map_body(normalize_sentence_boundaries)
                .map_body(|body| normalize_numbers(body, config.normalize_numbers))
        })
        .and_then(|article| check_linguistics(article, config))
        .map(annotate_statistics)
}

/// Clean a batch of raw records.
///
/// Survivors keep their relative input order. Rejected records are skipped
/// silently; input, output and rejection counts are reported through tracing.
#[instrument(level = "info", skip_all, fields(input = raw_articles.len()))]
pub fn process_articles(raw_articles: &[RawRecord], config: &PipelineConfig) -> Vec<ValidatedArticle> {
    let mut cleaned = Vec::with_capacity(raw_articles.len());
    let mut rejected: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (index, record) in raw_articles.iter().enumerate() {
        match clean_record(record, index, config) {
            Outcome::Accepted(article) => cleaned.push(article),
            Outcome::Rejected(reason) => *rejected.entry(reason.label()).or_default() += 1,
        }
    }

    let rejected_total = raw_articles.len() - cleaned.len();
    info!(
        input = raw_articles.len(),
        output = cleaned.len(),
        rejected = rejected_total,
        "Cleaned article batch"
    );
    if rejected_total > 0 {
        debug!(?rejected, "Rejections by reason");
    }
    cleaned
}
