//! String normalization and similarity scoring for free-text search.

use unicode_normalization::UnicodeNormalization;

/// Score for an exact match after normalization.
pub const EXACT_SCORE: f64 = 1.0;
/// Score when the text starts with the query.
pub const PREFIX_SCORE: f64 = 0.9;
/// Score when the text contains the query.
pub const SUBSTRING_SCORE: f64 = 0.8;

/// Combining diacritical marks block, stripped after NFD decomposition.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// An entity name paired with its similarity to the current query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub entity_name: String,
    pub score: f64,
}

/// Lowercases, strips diacritics and trims.
///
/// `"  Лозенец  "` and `"лозенец"` normalize identically, as do `"Café"` and `"cafe"`.
/// Cyrillic `й` decomposes to `и` + breve and loses the breve, matching how search
/// input is compared everywhere else.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Levenshtein edit distance in characters (substitution, insertion and deletion cost 1).
///
/// Fills a `(len(b) + 1) × (len(a) + 1)` table; inputs are entity names, so the
/// quadratic table stays small.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let width = a.len() + 1;

    let mut table = vec![0usize; (b.len() + 1) * width];
    for (j, cell) in table.iter_mut().take(width).enumerate() {
        *cell = j;
    }
    for i in 0..=b.len() {
        table[i * width] = i;
    }

    for i in 1..=b.len() {
        for j in 1..=a.len() {
            table[i * width + j] = if b[i - 1] == a[j - 1] {
                table[(i - 1) * width + (j - 1)]
            } else {
                let substitution = table[(i - 1) * width + (j - 1)];
                let insertion = table[i * width + (j - 1)];
                let deletion = table[(i - 1) * width + j];
                substitution.min(insertion).min(deletion) + 1
            };
        }
    }

    table[b.len() * width + a.len()]
}

/// Similarity of `text` to `query`, both already normalized.
///
/// Returns:
/// - 1.0: exact match
/// - 0.9: text starts with query
/// - 0.8: text contains query
/// - otherwise `1 - distance / max(len)`, which can go negative; callers treat
///   anything at or below their threshold as no match.
pub fn score(query: &str, text: &str) -> f64 {
    if text == query {
        return EXACT_SCORE;
    }
    if text.starts_with(query) {
        return PREFIX_SCORE;
    }
    if text.contains(query) {
        return SUBSTRING_SCORE;
    }

    let max_len = query.chars().count().max(text.chars().count());
    if max_len == 0 {
        return EXACT_SCORE;
    }
    1.0 - distance(query, text) as f64 / max_len as f64
}
