//! Hard cleaning of raw article text.
//!
//! [`sanitize_text`] decodes entities, strips markup and links, drops
//! everything outside printable ASCII and whitespace, and squeezes runs of
//! whitespace and terminal punctuation. Dropping non-ASCII characters is
//! lossy on purpose: non-Latin scripts and emoji do not survive.

use once_cell::sync::Lazy;
use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

/// Character references as browsers read them: numeric ones and a set of
/// legacy names may omit the closing `;`.
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[^\t\n\x0C <&#;]{1,32};?)").unwrap()
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PUNCT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?.]{2,}").unwrap());

/// Named references that still decode without a trailing `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren", "deg",
    "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34", "gt",
    "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Windows-1252 readings of the C1 range, which pages often emit as `&#128;` and up.
const WINDOWS_1252_C1: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

fn is_forbidden_code_point(code: u32) -> bool {
    matches!(code, 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF)
        || (code & 0xFFFE) == 0xFFFE
}

/// Decode a numeric reference. NUL, surrogates and out-of-range values become
/// U+FFFD; noncharacters and stray controls vanish.
fn decode_char_ref(code: u32) -> String {
    match code {
        0 | 0xD800..=0xDFFF | 0x110000..=u32::MAX => '\u{FFFD}'.to_string(),
        0x0D => "\r".to_string(),
        0x80..=0x9F => WINDOWS_1252_C1[(code - 0x80) as usize].to_string(),
        _ if is_forbidden_code_point(code) => String::new(),
        _ => char::from_u32(code).map(String::from).unwrap_or_default(),
    }
}

/// Decode a named reference (`name` excludes the `&`). Without an exact match,
/// the longest legacy name prefixing `name` is decoded and the rest kept.
fn decode_named_ref(name: &str) -> Option<String> {
    if let Some(bare) = name.strip_suffix(';') {
        if let Some(decoded) = resolve_html5_entity(bare) {
            return Some(decoded.to_string());
        }
    } else if LEGACY_ENTITIES.contains(&name) {
        return resolve_html5_entity(name).map(str::to_string);
    }
    (2..name.len())
        .rev()
        .filter(|&end| name.is_char_boundary(end))
        .find_map(|end| {
            let prefix = &name[..end];
            LEGACY_ENTITIES
                .contains(&prefix)
                .then(|| resolve_html5_entity(prefix))
                .flatten()
                .map(|decoded| format!("{decoded}{}", &name[end..]))
        })
}

/// Decode HTML entities, named and numeric, the way an HTML parser reads
/// them. Unknown names are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let whole = &caps[0];
            let name = &caps[1];
            let decoded = match name.strip_prefix('#') {
                Some(num) => {
                    let num = num.trim_end_matches(';');
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16),
                        None => num.parse::<u32>(),
                    };
                    // Overflow is out of range too.
                    Some(decode_char_ref(code.unwrap_or(u32::MAX)))
                }
                None => decode_named_ref(name),
            };
            decoded.unwrap_or_else(|| whole.to_string())
        })
        .into_owned()
}

fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

fn strip_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").into_owned()
}

fn keep_printable(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || c.is_whitespace())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").into_owned()
}

/// `!!!` becomes `!`; a mixed run such as `?!` keeps its last mark.
fn collapse_punctuation(text: &str) -> String {
    PUNCT_RUN_RE
        .replace_all(text, |caps: &Captures| {
            caps[0].chars().last().map(String::from).unwrap_or_default()
        })
        .into_owned()
}

fn cleanup_pass(text: &str) -> String {
    let text = strip_tags(text);
    let text = strip_urls(&text);
    let text = keep_printable(&text);
    let text = collapse_whitespace(&text);
    collapse_punctuation(&text)
}

/// Sanitize one piece of raw text. Empty input yields an empty string.
///
/// Entities are decoded once. The cleanup steps then repeat until the text
/// stops changing, since dropping a character can splice a new link or tag
/// together (`ht\u{e9}tp://` becomes `http://`). Every pass after the first
/// only ever removes characters, so this terminates.
pub fn sanitize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut current = cleanup_pass(&decode_entities(text));
    loop {
        let next = cleanup_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current.trim().to_string()
}
