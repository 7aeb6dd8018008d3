//! Change-request submission and review through the admin surface.

use imamdir::DirError;
use imamdir::storage::{ChangeKind, ChangeProposal, ChangeStatus, LocationDraft};
use imamdir::test_utils::fixture_context;

// =============================================================================
// Approval
// =============================================================================

#[test]
fn approving_existing_entry_swaps_leader_and_refreshes_search() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let location = seeded.locations[1];
    let outgoing = seeded.entry("خالد الجليل").unwrap();
    let incoming = seeded.entry("ماهر المعيقلي").unwrap();
    ctx.search("ماهر", None).unwrap();
    ctx.listings.locations(&ctx.db).unwrap();

    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            location_id: Some(location),
            proposed_entry_id: Some(incoming),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    assert_eq!(request.current_entry_id, Some(outgoing));
    // submission alone changes nothing visible
    assert_eq!(ctx.coordinator.invalidation_count(), 0);

    let approved = ctx.admin().approve_change_request(request.id, "admin").unwrap();
    assert_eq!(approved.status, ChangeStatus::Approved);
    assert_eq!(approved.proposed_entry_id, Some(incoming));
    assert_eq!(ctx.coordinator.invalidation_count(), 1);

    let hit = &ctx.search("ماهر المعيقلي", None).unwrap()[0];
    assert_eq!(hit.parent_id, Some(location));
    assert!(ctx.search("خالد الجليل", None).unwrap()[0].parent_id.is_none());

    let listing = ctx.listings.locations(&ctx.db).unwrap();
    let swapped = listing.iter().find(|l| l.id == location).unwrap();
    let names: Vec<&str> = swapped.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ماهر المعيقلي"]);
}

#[test]
fn approving_a_new_name_creates_the_entry() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let location = seeded.locations[3];
    let before = ctx.db.count_entries().unwrap();

    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            location_id: Some(location),
            proposed_name: Some("  علي الحذيفي ".into()),
            notes: Some("imam since ramadan".into()),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    assert_eq!(request.proposed_name.as_deref(), Some("علي الحذيفي"));

    let approved = ctx.admin().approve_change_request(request.id, "admin").unwrap();
    let created = approved.proposed_entry_id.unwrap();
    assert_eq!(ctx.db.count_entries().unwrap(), before + 1);

    let hit = &ctx.search("الحذيفي", None).unwrap()[0];
    assert_eq!(hit.entry_id, created);
    assert_eq!(hit.parent_name.as_deref(), Some("جامع الأميرة سارة"));
}

#[test]
fn approval_rolls_back_when_proposed_entry_vanished() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let location = seeded.locations[0];
    let current = seeded.entry("ياسر الدوسري").unwrap();
    let proposed = seeded.entry("بندر بليلة").unwrap();

    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            location_id: Some(location),
            proposed_entry_id: Some(proposed),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    ctx.admin().delete_entry(proposed).unwrap();
    let invalidations = ctx.coordinator.invalidation_count();

    assert!(ctx.admin().approve_change_request(request.id, "admin").is_err());

    // current leader still linked, request still pending, caches untouched
    assert_eq!(ctx.db.get_entry(current).unwrap().unwrap().location_id, Some(location));
    let stored = ctx.db.get_change_request(request.id).unwrap().unwrap();
    assert_eq!(stored.status, ChangeStatus::Pending);
    assert_eq!(ctx.coordinator.invalidation_count(), invalidations);
}

// =============================================================================
// New locations
// =============================================================================

fn furqan() -> LocationDraft {
    LocationDraft {
        name: "جامع الفرقان".into(),
        district: "النرجس".into(),
        area: "شمال".into(),
        map_link: Some("https://maps.example/furqan".into()),
    }
}

#[test]
fn approving_new_location_creates_it_with_a_named_leader() {
    let (ctx, _seeded) = fixture_context(None).unwrap();
    let districts = ctx.listings.districts(&ctx.db, Some("شمال")).unwrap();
    assert!(!districts.iter().any(|d| d == "النرجس"));
    let locations_before = ctx.listings.locations(&ctx.db).unwrap().len();

    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            new_location: Some(furqan()),
            proposed_name: Some("علي الحذيفي".into()),
            proposed_audio: Some("https://audio.example/hudhaifi.mp3".into()),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    assert_eq!(request.kind, ChangeKind::NewLocation);
    assert_eq!(request.location_id, None);
    assert_eq!(ctx.coordinator.invalidation_count(), 0);

    let approved = ctx.admin().approve_change_request(request.id, "admin").unwrap();
    let location = approved.location_id.unwrap();
    assert_eq!(ctx.coordinator.invalidation_count(), 1);

    let districts = ctx.listings.districts(&ctx.db, Some("شمال")).unwrap();
    assert!(districts.iter().any(|d| d == "النرجس"));
    let listing = ctx.listings.locations(&ctx.db).unwrap();
    assert_eq!(listing.len(), locations_before + 1);
    let created = listing.iter().find(|l| l.id == location).unwrap();
    assert_eq!(created.map_link.as_deref(), Some("https://maps.example/furqan"));
    assert_eq!(created.entries.len(), 1);
    assert_eq!(created.entries[0].name, "علي الحذيفي");
    assert_eq!(
        created.entries[0].audio_sample.as_deref(),
        Some("https://audio.example/hudhaifi.mp3")
    );

    let hit = &ctx.search("الحذيفي", None).unwrap()[0];
    assert_eq!(hit.parent_id, Some(location));
}

#[test]
fn approving_new_location_moves_an_existing_entry() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let incoming = seeded.entry("عبدالله الجهني").unwrap();
    ctx.search("الجهني", None).unwrap();

    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            new_location: Some(furqan()),
            proposed_entry_id: Some(incoming),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    let approved = ctx.admin().approve_change_request(request.id, "admin").unwrap();
    assert_eq!(approved.proposed_entry_id, Some(incoming));

    let hit = &ctx.search("عبدالله الجهني", None).unwrap()[0];
    assert_eq!(hit.entry_id, incoming);
    assert_eq!(hit.parent_name.as_deref(), Some("جامع الفرقان"));
}

#[test]
fn rejected_new_location_is_never_created() {
    let (ctx, _seeded) = fixture_context(None).unwrap();
    let before = ctx.db.list_locations_with_entries().unwrap().len();
    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            new_location: Some(furqan()),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    ctx.admin().reject_change_request(request.id, "admin", None).unwrap();

    assert_eq!(ctx.db.list_locations_with_entries().unwrap().len(), before);
    let stored = ctx.db.get_change_request(request.id).unwrap().unwrap();
    assert_eq!(stored.location_id, None);
    assert_eq!(stored.new_location.unwrap().name, "جامع الفرقان");
}

// =============================================================================
// Rejection and re-review
// =============================================================================

#[test]
fn rejection_keeps_directory_and_caches() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    ctx.listings.areas(&ctx.db).unwrap();

    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            location_id: Some(seeded.locations[2]),
            proposed_name: Some("اسم مكرر".into()),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    let rejected = ctx
        .admin()
        .reject_change_request(request.id, "admin", Some("duplicate"))
        .unwrap();

    assert_eq!(rejected.status, ChangeStatus::Rejected);
    assert_eq!(rejected.reject_reason.as_deref(), Some("duplicate"));
    assert_eq!(ctx.coordinator.invalidation_count(), 0);
    assert_eq!(ctx.cache.stats().local_entries, 1);
}

#[test]
fn reviewed_requests_cannot_be_reviewed_again() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let request = ctx
        .admin()
        .submit_change_request(&ChangeProposal {
            location_id: Some(seeded.locations[2]),
            proposed_entry_id: seeded.entry("سعود الشريم"),
            submitted_by: "community".into(),
            ..ChangeProposal::default()
        })
        .unwrap();
    ctx.admin().approve_change_request(request.id, "admin").unwrap();

    let again = ctx.admin().approve_change_request(request.id, "admin");
    assert!(matches!(again, Err(DirError::Conflict(_))));
    let reject = ctx.admin().reject_change_request(request.id, "admin", None);
    assert!(matches!(reject, Err(DirError::Conflict(_))));
}

#[test]
fn pending_filter_lists_only_open_requests() {
    let (ctx, seeded) = fixture_context(None).unwrap();
    let submit = |name: &str| {
        ctx.admin()
            .submit_change_request(&ChangeProposal {
                location_id: Some(seeded.locations[4]),
                proposed_name: Some(name.into()),
                submitted_by: "community".into(),
                ..ChangeProposal::default()
            })
            .unwrap()
    };
    let first = submit("اسم اول");
    let second = submit("اسم ثان");
    ctx.admin().reject_change_request(first.id, "admin", None).unwrap();

    let pending = ctx.db.list_change_requests(Some(ChangeStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
    assert_eq!(ctx.db.list_change_requests(None).unwrap().len(), 2);
}
