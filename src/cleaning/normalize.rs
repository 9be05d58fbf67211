//! Linguistic normalization stages.
//!
//! - [`normalize_unicode_and_case`]: NFKC, lowercase, ASCII quotes and dashes
//! - [`normalize_sentence_boundaries`]: spacing repairs around `.`, `!`, `?`
//! - [`normalize_numbers`]: optional `<NUM>` placeholder for digit runs

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Literal substituted for standalone digit runs.
pub const NUM_TOKEN: &str = "<NUM>";

static TERMINAL_GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])\s{2,}").unwrap());
static ORPHAN_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+[.,!?;:]+\s+").unwrap());
static LEADING_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[.,!?;:]+\s+").unwrap());
static MISSED_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])([a-z])").unwrap());
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());

fn ascii_glyph(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        other => other,
    }
}

fn fold(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    composed.to_lowercase().nfkc().map(ascii_glyph).collect()
}

/// NFKC-normalize, lowercase, and fold curly quotes and en/em dashes to ASCII.
///
/// Case mapping and compatibility composition do not commute for a handful of
/// code points, so folding repeats until the text is stable. The result is
/// therefore a fixed point and the function is idempotent.
pub fn normalize_unicode_and_case(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut current = fold(text);
    loop {
        let next = fold(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Repair spacing around sentence punctuation without rewriting words.
pub fn normalize_sentence_boundaries(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = TERMINAL_GAP_RE.replace_all(text, "$1 ");
    let text = ORPHAN_PUNCT_RE.replace_all(&text, " ");
    let text = LEADING_PUNCT_RE.replace_all(&text, "");
    let text = MISSED_BREAK_RE.replace_all(&text, "$1 $2");
    text.trim().to_string()
}

/// Replace every standalone digit run with [`NUM_TOKEN`] when `enabled`.
pub fn normalize_numbers(text: &str, enabled: bool) -> String {
    if !enabled || text.is_empty() {
        return text.to_string();
    }
    DIGIT_RUN_RE.replace_all(text, NUM_TOKEN).into_owned()
}
