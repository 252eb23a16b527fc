//! Backfill behavior: idempotency under both policies, dry-run,
//! per-record failure isolation, scope filters.

use stride_core::entity::EntityKind;
use stride_migrate::backfill::{run_backfill, BackfillOptions};
use stride_storage::legacy::{LegacyDocument, LegacyStore};
use stride_storage::target::queries::{self, RowScope};
use stride_storage::TargetStore;

fn check_in_doc(id: &str, user: &str, pillar: &str, value: f64, ts: i64) -> LegacyDocument {
    LegacyDocument {
        id: id.to_string(),
        user_id: user.to_string(),
        body: serde_json::json!({
            "pillarId": pillar,
            "value": value,
            "note": "logged from app",
            "loggedAt": ts,
        })
        .to_string(),
        created_at: ts,
        updated_at: ts,
    }
}

fn profile_doc(user: &str, timezone: &str, ts: i64) -> LegacyDocument {
    LegacyDocument {
        id: format!("profile-{user}"),
        user_id: user.to_string(),
        body: serde_json::json!({
            "goals": ["sleep better", "move daily"],
            "timezone": timezone,
            "completedAt": ts,
        })
        .to_string(),
        created_at: ts,
        updated_at: ts,
    }
}

fn seeded_check_ins(n: usize) -> LegacyStore {
    let legacy = LegacyStore::open_in_memory().unwrap();
    for i in 0..n {
        legacy
            .insert_document(
                "pillar_check_ins",
                &check_in_doc(&format!("c{i}"), "u1", "sleep", 7.0, 1000 + i as i64),
            )
            .unwrap();
    }
    legacy
}

fn target_count(target: &TargetStore, entity: EntityKind) -> i64 {
    target
        .with_reader(|conn| match entity {
            EntityKind::CheckIn => queries::check_ins::count(conn, &RowScope::default()),
            EntityKind::OnboardingProfile => {
                queries::onboarding_profiles::count(conn, &RowScope::default())
            }
            _ => unreachable!("unused in these tests"),
        })
        .unwrap()
}

#[test]
fn skip_policy_is_idempotent() {
    let legacy = seeded_check_ins(10);
    let target = TargetStore::open_in_memory().unwrap();
    let opts = BackfillOptions::default();

    let first = run_backfill(EntityKind::CheckIn, &legacy, &target, &opts).unwrap();
    assert_eq!(first.scanned, 10);
    assert_eq!(first.created, 10);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.failed, 0);
    assert_eq!(target_count(&target, EntityKind::CheckIn), 10);

    let second = run_backfill(EntityKind::CheckIn, &legacy, &target, &opts).unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 10);
    assert_eq!(target_count(&target, EntityKind::CheckIn), 10);
}

#[test]
fn overwrite_policy_converges_to_identical_rows() {
    let legacy = LegacyStore::open_in_memory().unwrap();
    legacy
        .insert_document(
            "onboarding_profiles",
            &profile_doc("u1", "America/New_York", 5000),
        )
        .unwrap();
    let target = TargetStore::open_in_memory().unwrap();
    let opts = BackfillOptions::default();

    let first = run_backfill(EntityKind::OnboardingProfile, &legacy, &target, &opts).unwrap();
    assert_eq!(first.created, 1);
    let after_first = target
        .with_reader(|conn| queries::onboarding_profiles::find(conn, "u1"))
        .unwrap()
        .unwrap();

    let second = run_backfill(EntityKind::OnboardingProfile, &legacy, &target, &opts).unwrap();
    // Overwrite policy re-lands the row; the content must not change.
    assert_eq!(second.created, 1);
    assert_eq!(second.skipped, 0);
    let after_second = target
        .with_reader(|conn| queries::onboarding_profiles::find(conn, "u1"))
        .unwrap()
        .unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(target_count(&target, EntityKind::OnboardingProfile), 1);
}

#[test]
fn overwrite_policy_tracks_the_latest_legacy_snapshot() {
    let legacy = LegacyStore::open_in_memory().unwrap();
    legacy
        .insert_document(
            "onboarding_profiles",
            &profile_doc("u1", "America/New_York", 5000),
        )
        .unwrap();
    let target = TargetStore::open_in_memory().unwrap();
    let opts = BackfillOptions::default();

    run_backfill(EntityKind::OnboardingProfile, &legacy, &target, &opts).unwrap();

    // Live handler mutates the legacy document; the next pass overwrites.
    let mut updated = profile_doc("u1", "Europe/Berlin", 5000);
    updated.updated_at = 6000;
    legacy
        .insert_document("onboarding_profiles", &updated)
        .unwrap();

    run_backfill(EntityKind::OnboardingProfile, &legacy, &target, &opts).unwrap();
    let row = target
        .with_reader(|conn| queries::onboarding_profiles::find(conn, "u1"))
        .unwrap()
        .unwrap();
    assert_eq!(row.timezone, "Europe/Berlin");
    assert_eq!(row.updated_at, 6000);
}

#[test]
fn dry_run_classifies_without_writing() {
    let legacy = seeded_check_ins(10);
    let target = TargetStore::open_in_memory().unwrap();

    let dry = BackfillOptions {
        dry_run: true,
        ..BackfillOptions::default()
    };
    let summary = run_backfill(EntityKind::CheckIn, &legacy, &target, &dry).unwrap();
    assert_eq!(summary.scanned, 10);
    assert_eq!(summary.created, 10, "would-be creations are counted");
    assert_eq!(target_count(&target, EntityKind::CheckIn), 0, "dry run never writes");

    // Real run, then a dry run classifies everything as skipped.
    run_backfill(EntityKind::CheckIn, &legacy, &target, &BackfillOptions::default()).unwrap();
    let summary = run_backfill(EntityKind::CheckIn, &legacy, &target, &dry).unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 10);
    assert_eq!(target_count(&target, EntityKind::CheckIn), 10);
}

#[test]
fn one_bad_record_never_aborts_the_pass() {
    let legacy = LegacyStore::open_in_memory().unwrap();
    legacy
        .insert_document("pillar_check_ins", &check_in_doc("good-1", "u1", "sleep", 7.0, 100))
        .unwrap();
    // Missing required pillarId/value fields.
    legacy
        .insert_document(
            "pillar_check_ins",
            &LegacyDocument {
                id: "bad-1".to_string(),
                user_id: "u1".to_string(),
                body: serde_json::json!({ "note": "orphaned fields" }).to_string(),
                created_at: 150,
                updated_at: 150,
            },
        )
        .unwrap();
    legacy
        .insert_document("pillar_check_ins", &check_in_doc("good-2", "u1", "sleep", 8.0, 200))
        .unwrap();

    let target = TargetStore::open_in_memory().unwrap();
    let summary = run_backfill(
        EntityKind::CheckIn,
        &legacy,
        &target,
        &BackfillOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.scanned, 3);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(target_count(&target, EntityKind::CheckIn), 2);
}

#[test]
fn limit_caps_scanned_not_matched() {
    let legacy = seeded_check_ins(10);
    let target = TargetStore::open_in_memory().unwrap();

    let limited = BackfillOptions {
        limit: Some(4),
        ..BackfillOptions::default()
    };
    let summary = run_backfill(EntityKind::CheckIn, &legacy, &target, &limited).unwrap();
    assert_eq!(summary.scanned, 4);
    assert_eq!(summary.created, 4);

    // Oldest-first ordering: a repeated limited run re-scans the same
    // prefix and skips it, so progress is forward and duplicate-free.
    let summary = run_backfill(EntityKind::CheckIn, &legacy, &target, &limited).unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 4);
    assert_eq!(target_count(&target, EntityKind::CheckIn), 4);
}

#[test]
fn owner_filter_scopes_the_pass() {
    let legacy = LegacyStore::open_in_memory().unwrap();
    legacy
        .insert_document("pillar_check_ins", &check_in_doc("c1", "u1", "sleep", 7.0, 100))
        .unwrap();
    legacy
        .insert_document("pillar_check_ins", &check_in_doc("c2", "u2", "sleep", 6.0, 110))
        .unwrap();

    let target = TargetStore::open_in_memory().unwrap();
    let scoped = BackfillOptions {
        user_filter: Some("u1".to_string()),
        ..BackfillOptions::default()
    };
    let summary = run_backfill(EntityKind::CheckIn, &legacy, &target, &scoped).unwrap();
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.created, 1);
    assert_eq!(target_count(&target, EntityKind::CheckIn), 1);
}
