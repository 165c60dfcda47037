//! Title normalization for comparison.
//!
//! Dataset titles arrive from feeds and the catalog with inconsistent
//! accents, casing, spacing, punctuation, and trailing version markers.
//! [`normalize`] canonicalizes a title for equality checks;
//! [`strip_version_suffix`] removes trailing version markers and is applied
//! before normalization for title comparisons, and independently when
//! producing the human-readable name in report rows.
//!
//! Both functions are pure and total; `normalize` is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Punctuation stripped during normalization.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '-',
];

/// Trailing version markers, applied in sequence so a title can carry more
/// than one suffix form. Case-insensitive, anchored at the end.
static VERSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s+-\s+Version\s+\d+(\.\d+)*\s*$",
        r"(?i)\s+Version\s+\d+(\.\d+)*\s*$",
        r"(?i)\s+Version\s+\d+(\.\d+)*\s+.*$",
        r"(?i)\s+v\d+(\.\d+)*\s*$",
        r"(?i)\s+v\.\d+(\.\d+)*\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("version pattern"))
    .collect()
});

/// Canonicalize a title for comparison.
///
/// Pipeline, in fixed order: Unicode-decompose and drop combining marks
/// (é → e), lower-case, replace punctuation with spaces, collapse
/// whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();
    let depunctuated: String = lowered
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();
    depunctuated.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove trailing version markers such as `" - Version 1.3"` or `" v2.0"`.
///
/// Every pattern is applied in sequence (not just the first match), then
/// the result is trimmed of trailing whitespace.
pub fn strip_version_suffix(title: &str) -> String {
    let mut cleaned = title.to_string();
    for pattern in VERSION_PATTERNS.iter() {
        cleaned = pattern.replace(&cleaned, "").into_owned();
    }
    cleaned.trim_end().to_string()
}
