//! Honorific and definite-article stripping
//!
//! Operates on already-normalized text, so honorifics are listed in their
//! normalized spelling (`الإمام` normalizes to `الامام`).

/// Honorific prefixes, most specific first. The trailing space keeps a bare
/// title such as `الشيخ` from being stripped to nothing.
pub const HONORIFIC_PREFIXES: [&str; 4] = ["الشيخ ", "شيخ ", "الامام ", "امام "];

/// Definite article.
pub const ARTICLE: &str = "ال";

/// Remove the first matching honorific, then the article from every word
/// longer than the article itself.
pub fn strip_affixes(normalized: &str) -> String {
    let mut text = normalized.trim();
    for prefix in HONORIFIC_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
            break;
        }
    }

    text.split_whitespace()
        .map(strip_article)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_article(word: &str) -> &str {
    match word.strip_prefix(ARTICLE) {
        Some(rest) if !rest.is_empty() => rest,
        _ => word,
    }
}
