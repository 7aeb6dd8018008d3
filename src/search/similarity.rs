//! Character-bigram similarity (Dice coefficient)

use std::collections::HashSet;

/// Dice coefficient over the sets of character bigrams of `a` and `b`.
///
/// Bigrams are taken over Unicode scalar values, not bytes. A one-character
/// string counts as its own single bigram. Returns 0.0 when either side is
/// empty.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_a = bigrams(a);
    let set_b = bigrams(b);
    let shared = set_a.intersection(&set_b).count();
    (2 * shared) as f64 / (set_a.len() + set_b.len()) as f64
}

fn bigrams(s: &str) -> HashSet<&str> {
    let bounds: Vec<usize> = s
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(s.len()))
        .collect();

    if bounds.len() <= 3 {
        // one or two characters
        return std::iter::once(s).collect();
    }
    bounds.windows(3).map(|w| &s[w[0]..w[2]]).collect()
}
