//! Index staleness and invalidation completeness.

use imamdir::directory::districts_key;
use imamdir::storage::LocationDraft;
use imamdir::test_utils::fixture_context;

// =============================================================================
// Search index
// =============================================================================

#[test]
fn rename_is_invisible_until_invalidation() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let id = seeded.entry("ماهر المعيقلي").unwrap();
    assert_eq!(ctx.search("ماهر", None).unwrap()[0].entry_id, id);

    // direct store write: row count unchanged, nobody invalidates
    ctx.db.rename_entry(id, "فيصل الغزاوي").unwrap();

    let stale = ctx.search("ماهر", None).unwrap();
    assert_eq!(stale[0].entry_id, id);
    assert_eq!(stale[0].display_name, "ماهر المعيقلي");
    assert!(ctx.search("فيصل", None).unwrap().iter().all(|hit| hit.entry_id != id));

    ctx.coordinator.invalidate_all().unwrap();

    let fresh = ctx.search("فيصل", None).unwrap();
    assert_eq!(fresh[0].entry_id, id);
    assert_eq!(fresh[0].display_name, "فيصل الغزاوي");
    assert!(ctx.search("ماهر", None).unwrap().iter().all(|hit| hit.entry_id != id));
}

#[test]
fn admin_rename_is_visible_immediately() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let id = seeded.entry("بندر بليلة").unwrap();
    ctx.search("بندر", None).unwrap();

    ctx.admin().rename_entry(id, "عبدالله بصفر").unwrap();

    let hits = ctx.search("بصفر", None).unwrap();
    assert_eq!(hits[0].entry_id, id);
    assert!(ctx.search("بندر", None).unwrap().iter().all(|hit| hit.entry_id != id));
}

#[test]
fn insert_without_invalidation_is_picked_up_by_count() {
    let (ctx, _) = fixture_context(None).unwrap();
    ctx.search("خالد", None).unwrap();
    let before = ctx.index.stats();

    let added = ctx.db.create_entry("توفيق الصايغ", None).unwrap();

    let hits = ctx.search("توفيق", None).unwrap();
    assert_eq!(hits[0].entry_id, added.id);
    assert_eq!(ctx.index.stats().rebuilds, before.rebuilds + 1);
}

#[test]
fn repeated_searches_reuse_the_snapshot() {
    let (ctx, _) = fixture_context(None).unwrap();
    for _ in 0..5 {
        ctx.search("خالد", None).unwrap();
    }
    assert_eq!(ctx.index.stats().rebuilds, 1);
}

#[test]
fn relinking_updates_parent_after_admin_write() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let id = seeded.entry("سعود الشريم").unwrap();
    assert!(ctx.search("سعود الشريم", None).unwrap()[0].parent_id.is_none());

    ctx.admin().link_entry(id, Some(seeded.locations[0])).unwrap();

    let hit = &ctx.search("سعود الشريم", None).unwrap()[0];
    assert_eq!(hit.parent_id, Some(seeded.locations[0]));
    assert_eq!(hit.parent_name.as_deref(), Some("جامع الراجحي"));
}

// =============================================================================
// Cached listings
// =============================================================================

#[test]
fn every_admin_write_purges_cached_listings() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let admin = ctx.admin();

    let writes: Vec<Box<dyn Fn() + '_>> = vec![
        Box::new(|| {
            admin
                .create_location(&LocationDraft {
                    name: "جامع الحمادي".into(),
                    district: "السليمانية".into(),
                    area: "وسط".into(),
                    map_link: None,
                })
                .map(|_| ())
                .unwrap();
        }),
        Box::new(|| admin.create_entry("هاني الرفاعي", None).map(|_| ()).unwrap()),
        Box::new(|| admin.rename_entry(seeded.entries[1], "ماهر حمد المعيقلي").unwrap()),
        Box::new(|| admin.link_entry(seeded.entries[1], Some(seeded.locations[0])).unwrap()),
        Box::new(|| admin.delete_entry(seeded.entries[9]).unwrap()),
        Box::new(|| admin.delete_location(seeded.locations[4]).unwrap()),
    ];

    for (step, write) in writes.iter().enumerate() {
        ctx.listings.locations(&ctx.db).unwrap();
        ctx.listings.areas(&ctx.db).unwrap();
        ctx.listings.districts(&ctx.db, Some("شمال")).unwrap();
        assert!(ctx.cache.stats().local_entries >= 3, "step {step}");

        write();

        assert_eq!(ctx.cache.stats().local_entries, 0, "step {step}");
        assert!(ctx.index.stats().entries.is_none(), "step {step}");
    }
    assert_eq!(ctx.coordinator.invalidation_count(), writes.len() as u64);
}

#[test]
fn listings_reflect_new_area_after_write() {
    let (ctx, _) = fixture_context(None).unwrap();
    let areas = ctx.listings.areas(&ctx.db).unwrap();
    assert_eq!(areas, vec!["شرق", "شمال", "غرب"]);

    ctx.admin()
        .create_location(&LocationDraft {
            name: "جامع الحمادي".into(),
            district: "السليمانية".into(),
            area: "وسط".into(),
            map_link: None,
        })
        .unwrap();

    let areas = ctx.listings.areas(&ctx.db).unwrap();
    assert!(areas.contains(&"وسط".to_string()));
    let districts = ctx.listings.districts(&ctx.db, Some("وسط")).unwrap();
    assert_eq!(districts, vec!["السليمانية"]);
    assert!(ctx.cache.get(&districts_key(Some("وسط"))).is_some());
}

#[test]
fn verification_does_not_invalidate() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    ctx.listings.areas(&ctx.db).unwrap();

    ctx.admin().mark_verified(seeded.entries[0], "auditor").unwrap();

    assert_eq!(ctx.coordinator.invalidation_count(), 0);
    assert_eq!(ctx.cache.stats().local_entries, 1);
}
