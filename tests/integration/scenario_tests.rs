//! End-to-end ranking behaviour through `AppContext::search`.

use imamdir::test_utils::{SAMPLE_ENTRIES, fixture_context};

use super::fixture::{context_with_entries, hit_names};

// =============================================================================
// Ranking tiers over a real store
// =============================================================================

#[test]
fn honorific_query_finds_stripped_name_first() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let hits = ctx.search("الشيخ خالد الجليل", None).unwrap();

    assert!(!hits.is_empty());
    assert_eq!(hits[0].entry_id, seeded.entry("خالد الجليل").unwrap());
    assert_eq!(hits[0].score, 90);
    assert_eq!(hits[0].parent_name.as_deref(), Some("جامع الملك خالد"));
}

#[test]
fn single_word_query_matches_word_prefix() {
    let ctx = context_with_entries(&["ياسر الدوسري", "شيخ محمد"]);
    let hits = ctx.search("الشي", None).unwrap();

    assert_eq!(hit_names(&hits), vec!["شيخ محمد"]);
    assert_eq!(hits[0].score, 70);
}

#[test]
fn close_spelling_is_included_and_distant_one_is_not() {
    let ctx = context_with_entries(&["عبدالرحيم", "سعد"]);

    let hits = ctx.search("عبدالرحمن", None).unwrap();
    assert_eq!(hit_names(&hits), vec!["عبدالرحيم"]);
    assert!((52..=60).contains(&hits[0].score));

    assert!(ctx.search("سعيد", None).unwrap().is_empty());
}

#[test]
fn equal_scores_keep_store_order() {
    let ctx = context_with_entries(&["ياسر", "محمد بن خالد", "خالد بن محمد"]);
    let hits = ctx.search("خالد محمد", None).unwrap();

    assert_eq!(hit_names(&hits), vec!["محمد بن خالد", "خالد بن محمد"]);
    assert!(hits.iter().all(|hit| hit.score == 75));
}

#[test]
fn diacritics_and_letter_variants_do_not_matter() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    // hamza-carrying alef and harakat in the query
    let hits = ctx.search("إِدْرِيس", None).unwrap();
    assert_eq!(hits[0].entry_id, seeded.entry("إدريس أبكر").unwrap());
    assert_eq!(hits[0].display_name, "إدريس أبكر");
}

// =============================================================================
// Result shape
// =============================================================================

#[test]
fn results_are_capped_and_sorted() {
    let names: Vec<String> = (0..25).map(|i| format!("محمد {i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let ctx = context_with_entries(&refs);

    let hits = ctx.search("محمد", None).unwrap();
    assert_eq!(hits.len(), 15);
    assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));

    let limited = ctx.search("محمد", Some(3)).unwrap();
    assert_eq!(limited.len(), 3);
}

#[test]
fn blank_query_returns_nothing() {
    let (ctx, _) = fixture_context(None).unwrap();
    assert!(ctx.search("", None).unwrap().is_empty());
    assert!(ctx.search("   ", None).unwrap().is_empty());
    // no index was built for a blank query
    assert_eq!(ctx.index.stats().rebuilds, 0);
}

#[test]
fn unlinked_entries_have_no_parent() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let hits = ctx.search("ماهر المعيقلي", None).unwrap();
    assert_eq!(hits[0].entry_id, seeded.entry("ماهر المعيقلي").unwrap());
    assert!(hits[0].parent_id.is_none());
    assert!(hits[0].parent_name.is_none());
}

#[test]
fn every_sample_entry_finds_itself_exactly() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    for (name, _) in SAMPLE_ENTRIES {
        let hits = ctx.search(name, None).unwrap();
        assert_eq!(hits[0].entry_id, seeded.entry(name).unwrap(), "query {name:?}");
        assert_eq!(hits[0].score, 100, "query {name:?}");
    }
}

// =============================================================================
// Location search
// =============================================================================

#[test]
fn location_search_matches_leader_names_within_an_area() {
    let (ctx, seeded) = fixture_context(None).unwrap();

    let found = ctx.db.search_locations(None, None, Some("المعيقلي")).unwrap();
    assert!(found.is_empty(), "unlinked leaders do not locate anything");

    let found = ctx.db.search_locations(Some("شمال"), None, Some("القطامي")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, seeded.locations[3]);

    let found = ctx.db.search_locations(Some("شمال"), None, None).unwrap();
    let names: Vec<&str> = found.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["جامع الأميرة سارة", "جامع الشيخ عبدالعزيز بن باز"]);

    // spelled without hamza, found through normalization
    let found = ctx.db.search_locations(None, None, Some("الاميرة")).unwrap();
    assert_eq!(found[0].id, seeded.locations[3]);
}
