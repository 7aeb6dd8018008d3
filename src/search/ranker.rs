//! Tiered match scoring
//!
//! A query is compared against an indexed entry through a waterfall of
//! rules, most precise first. The first rule that fires decides the score,
//! so a candidate that qualifies for a higher tier never receives a lower
//! tier's score.
//!
//! | Tier | Rule | Score |
//! |------|------|-------|
//! | 1 | normalized query equals name | 100 |
//! | 2 | name starts with normalized query | 95 |
//! | 3 | stripped name starts with stripped query | 90 |
//! | 4 | normalized query inside name | 80 |
//! | 5 | stripped query inside stripped name | 75 |
//! | 6 | single-word query prefixes a name word | 70 |
//! | 7 | multi-word coverage ≥ 0.8 / ≥ 0.5 | 75 / 55 |
//! | 8 | whole-name bigram similarity ≥ 0.6 | 52..=60 |
//! | 9 | per-word bigram similarity ≥ 0.5 | 40..=50 |
//!
//! Zero means "no match" and is dropped from results.

use std::cmp::Reverse;

use crate::search::affix::strip_affixes;
use crate::search::index::{IndexedEntry, words};
use crate::search::normalize::normalize;
use crate::search::similarity::bigram_similarity;

pub const SCORE_EXACT: u8 = 100;
pub const SCORE_PREFIX: u8 = 95;
pub const SCORE_STRIPPED_PREFIX: u8 = 90;
pub const SCORE_SUBSTRING: u8 = 80;
pub const SCORE_STRIPPED_SUBSTRING: u8 = 75;
pub const SCORE_WORD_PREFIX: u8 = 70;
pub const SCORE_HIGH_COVERAGE: u8 = 75;
pub const SCORE_PARTIAL_COVERAGE: u8 = 55;

const HIGH_COVERAGE: f64 = 0.8;
const PARTIAL_COVERAGE: f64 = 0.5;
const NAME_SIMILARITY: f64 = 0.6;
const WORD_SIMILARITY: f64 = 0.5;

/// Default number of results kept after ranking.
pub const DEFAULT_MAX_RESULTS: usize = 15;

/// A query in every form the ranker compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryForms {
    pub normalized: String,
    pub stripped: String,
    pub words: Vec<String>,
    pub stripped_words: Vec<String>,
}

impl QueryForms {
    /// Normalize and strip a raw query once.
    ///
    /// Returns `None` for blank input or input that strips to nothing;
    /// such queries match nothing and should not touch the index.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        let normalized = normalize(raw);
        let stripped = strip_affixes(&normalized);
        if stripped.is_empty() {
            return None;
        }
        Some(Self {
            words: words(&normalized),
            stripped_words: words(&stripped),
            normalized,
            stripped,
        })
    }
}

/// A scored entry, borrowed from the index snapshot it was ranked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    pub entry: &'a IndexedEntry,
    pub score: u8,
}

impl MatchCandidate<'_> {
    pub const fn entry_id(&self) -> i64 {
        self.entry.entry_id
    }
}

/// Score `entry` against `query`, 0 meaning excluded.
pub fn score(query: &QueryForms, entry: &IndexedEntry) -> u8 {
    let name = entry.normalized_name.as_str();
    let stripped = entry.stripped_name.as_str();

    if query.normalized == name {
        return SCORE_EXACT;
    }
    if name.starts_with(query.normalized.as_str()) {
        return SCORE_PREFIX;
    }
    if stripped.starts_with(query.stripped.as_str()) {
        return SCORE_STRIPPED_PREFIX;
    }
    if name.contains(query.normalized.as_str()) {
        return SCORE_SUBSTRING;
    }
    if stripped.contains(query.stripped.as_str()) {
        return SCORE_STRIPPED_SUBSTRING;
    }

    match query.words.len() {
        1 => {
            if word_prefix(query, entry) {
                return SCORE_WORD_PREFIX;
            }
        }
        n if n > 1 => {
            let ratio = coverage(query, entry);
            if ratio >= HIGH_COVERAGE {
                return SCORE_HIGH_COVERAGE;
            }
            if ratio >= PARTIAL_COVERAGE {
                return SCORE_PARTIAL_COVERAGE;
            }
        }
        _ => {}
    }

    let similarity = bigram_similarity(&query.stripped, stripped);
    if similarity >= NAME_SIMILARITY {
        return similarity_score(40.0, similarity);
    }

    entry
        .stripped_words
        .iter()
        .map(|word| bigram_similarity(&query.stripped, word))
        .find(|similarity| *similarity >= WORD_SIMILARITY)
        .map_or(0, |similarity| similarity_score(30.0, similarity))
}

/// Score every entry, drop non-matches, keep the best `limit`.
///
/// The sort is stable and keyed on score alone, so equal scores keep the
/// order of `entries`.
pub fn rank<'a>(query: &QueryForms, entries: &'a [IndexedEntry], limit: usize) -> Vec<MatchCandidate<'a>> {
    let mut candidates: Vec<MatchCandidate<'a>> = entries
        .iter()
        .filter_map(|entry| {
            let score = score(query, entry);
            (score > 0).then_some(MatchCandidate { entry, score })
        })
        .collect();
    candidates.sort_by_key(|candidate| Reverse(candidate.score));
    candidates.truncate(limit);
    candidates
}

fn word_prefix(query: &QueryForms, entry: &IndexedEntry) -> bool {
    entry
        .normalized_words
        .iter()
        .chain(&entry.stripped_words)
        .any(|word| word.starts_with(query.normalized.as_str()) || word.starts_with(query.stripped.as_str()))
}

/// Fraction of distinct query words (normalized and stripped) found as a
/// prefix or substring of some candidate word.
fn coverage(query: &QueryForms, entry: &IndexedEntry) -> f64 {
    let mut terms: Vec<&str> = Vec::with_capacity(query.words.len() + query.stripped_words.len());
    for word in query.words.iter().chain(&query.stripped_words) {
        if !terms.contains(&word.as_str()) {
            terms.push(word);
        }
    }
    if terms.is_empty() {
        return 0.0;
    }

    let matched = terms
        .iter()
        .filter(|term| {
            entry
                .normalized_words
                .iter()
                .chain(&entry.stripped_words)
                .any(|word| word.contains(**term))
        })
        .count();
    matched as f64 / terms.len() as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn similarity_score(base: f64, similarity: f64) -> u8 {
    (base + similarity * 20.0).floor() as u8
}
