//! Arabic text normalization
//!
//! Maps visually or phonetically equivalent spellings onto one canonical
//! form so they compare equal:
//!
//! - alef with hamza above/below and alef with madda become bare alef
//! - alef maksura becomes yeh
//! - teh marbuta becomes heh
//! - harakat (U+064B..=U+0652) and tatweel (U+0640) are dropped
//! - whitespace runs collapse to a single space, ends are trimmed
//! - ASCII letters are lowercased

const ALEF: char = '\u{0627}';
const YEH: char = '\u{064A}';
const HEH: char = '\u{0647}';
const TATWEEL: char = '\u{0640}';

/// Canonical form of `text`. Idempotent.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| !is_harakah(*c) && *c != TATWEEL)
        .map(|c| match c {
            '\u{0623}' | '\u{0625}' | '\u{0622}' => ALEF,
            '\u{0649}' => YEH,
            '\u{0629}' => HEH,
            other => other.to_ascii_lowercase(),
        })
        .collect();

    let mut out = String::with_capacity(folded.len());
    for word in folded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn is_harakah(c: char) -> bool {
    ('\u{064B}'..='\u{0652}').contains(&c)
}
