//! Ranking invariants over generated corpora.

use proptest::prelude::*;

use imamdir::search::ranker::{
    SCORE_EXACT, SCORE_PREFIX, SCORE_STRIPPED_PREFIX, SCORE_STRIPPED_SUBSTRING, SCORE_SUBSTRING,
};
use imamdir::search::{
    DEFAULT_MAX_RESULTS, DirectoryEntry, IndexedEntry, MatchCandidate, QueryForms, rank, score,
};

fn name() -> impl Strategy<Value = String> {
    "[\u{0627}-\u{063A}\u{0641}-\u{064A}]{2,8}( [\u{0627}-\u{063A}\u{0641}-\u{064A}]{2,8}){0,2}"
}

fn indexed(entry_id: i64, display_name: String) -> IndexedEntry {
    IndexedEntry::from_entry(DirectoryEntry {
        entry_id,
        display_name,
        parent_id: None,
        parent_name: None,
    })
}

/// A name and a query cut out of it, sometimes behind an honorific, so the
/// prefix and substring tiers fire often.
fn name_and_slice() -> impl Strategy<Value = (String, String)> {
    (
        name(),
        any::<prop::sample::Index>(),
        any::<prop::sample::Index>(),
        any::<bool>(),
    )
        .prop_map(|(name, start, len, honorific)| {
            let chars: Vec<char> = name.chars().collect();
            let start = start.index(chars.len());
            let end = start + 1 + len.index(chars.len() - start);
            let slice: String = chars[start..end].iter().collect();
            let query = if honorific { format!("الشيخ {slice}") } else { slice };
            (name, query)
        })
}

/// Lowest score the ranking tiers promise for `entry` given the substring
/// relations between the query and the name.
fn tier_floor(query: &QueryForms, entry: &IndexedEntry) -> u8 {
    let name = entry.normalized_name.as_str();
    let stripped = entry.stripped_name.as_str();
    if query.normalized == name {
        SCORE_EXACT
    } else if name.starts_with(query.normalized.as_str()) {
        SCORE_PREFIX
    } else if stripped.starts_with(query.stripped.as_str()) {
        SCORE_STRIPPED_PREFIX
    } else if name.contains(query.normalized.as_str()) {
        SCORE_SUBSTRING
    } else if stripped.contains(query.stripped.as_str()) {
        SCORE_STRIPPED_SUBSTRING
    } else {
        0
    }
}

fn corpus() -> impl Strategy<Value = Vec<IndexedEntry>> {
    prop::collection::vec(name(), 0..40).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(idx, display_name)| indexed(idx as i64, display_name))
            .collect()
    })
}

proptest! {
    #[test]
    fn scores_stay_in_range(query in name(), entries in corpus()) {
        let query = QueryForms::parse(&query).unwrap();
        for entry in &entries {
            prop_assert!(score(&query, entry) <= 100);
        }
    }

    #[test]
    fn exact_name_always_scores_100(entries in corpus().prop_filter("non-empty", |e| !e.is_empty())) {
        let target = &entries[0];
        let query = QueryForms::parse(&target.display_name).unwrap();
        prop_assert_eq!(score(&query, target), 100);
    }

    #[test]
    fn ranking_is_sorted_capped_and_positive(query in name(), entries in corpus()) {
        let query = QueryForms::parse(&query).unwrap();
        let ranked = rank(&query, &entries, DEFAULT_MAX_RESULTS);
        prop_assert!(ranked.len() <= DEFAULT_MAX_RESULTS);
        prop_assert!(ranked.iter().all(|c| c.score > 0));
        prop_assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn ties_keep_corpus_order(query in name(), entries in corpus()) {
        let query = QueryForms::parse(&query).unwrap();
        let ranked = rank(&query, &entries, usize::MAX);
        for pair in ranked.windows(2) {
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].entry_id() < pair[1].entry_id());
            }
        }
    }

    #[test]
    fn ranking_is_deterministic(query in name(), entries in corpus()) {
        let query = QueryForms::parse(&query).unwrap();
        let first: Vec<i64> = rank(&query, &entries, DEFAULT_MAX_RESULTS)
            .iter()
            .map(MatchCandidate::entry_id)
            .collect();
        let second: Vec<i64> = rank(&query, &entries, DEFAULT_MAX_RESULTS)
            .iter()
            .map(MatchCandidate::entry_id)
            .collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn matching_tier_sets_the_score((name, raw) in name_and_slice()) {
        let Some(query) = QueryForms::parse(&raw) else {
            return Ok(());
        };
        let entry = indexed(0, name);
        let floor = tier_floor(&query, &entry);
        let scored = score(&query, &entry);
        if floor > 0 {
            prop_assert_eq!(scored, floor, "query {:?} vs {:?}", query.normalized, entry.normalized_name);
        } else {
            prop_assert!(scored <= SCORE_STRIPPED_SUBSTRING);
        }
    }

    #[test]
    fn prefix_and_substring_matches_outrank_fuzzy_ones(
        (name, raw) in name_and_slice(),
        others in prop::collection::vec(name(), 0..20),
    ) {
        let Some(query) = QueryForms::parse(&raw) else {
            return Ok(());
        };
        let entries: Vec<IndexedEntry> = std::iter::once(name)
            .chain(others)
            .enumerate()
            .map(|(idx, display_name)| indexed(idx as i64, display_name))
            .collect();

        // below 80 a coverage score can tie the stripped-substring tier
        let ranked = rank(&query, &entries, usize::MAX);
        let floors: Vec<u8> = ranked
            .iter()
            .map(|c| tier_floor(&query, c.entry))
            .map(|floor| if floor >= SCORE_SUBSTRING { floor } else { 0 })
            .collect();
        for (i, higher) in floors.iter().enumerate() {
            for lower in &floors[i + 1..] {
                prop_assert!(
                    *higher >= *lower,
                    "a tier {} match ranked above a tier {} match",
                    higher,
                    lower
                );
            }
        }
    }

    #[test]
    fn whitespace_queries_parse_to_nothing(query in "[ \t\n]{0,10}") {
        prop_assert!(QueryForms::parse(&query).is_none());
    }
}
