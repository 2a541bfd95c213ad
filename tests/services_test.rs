mod helpers;

use aide::audit::AuditLevel;
use aide::profile::{add_profile_item, search_profile, NewProfileItem};
use aide::state::types::GoalStatus;
use helpers::{insert_goal, test_services};
use serde_json::json;
use std::fs;

#[test]
fn fresh_data_dir_is_healthy() {
    let (tmp, services) = test_services();
    let report = services.check_health();

    assert!(report.is_healthy(), "{report:?}");
    assert_eq!(report.data_dir, tmp.path());
    assert_eq!(report.state.detail, "not created yet");
    assert!(!report.calendar_configured);
}

#[test]
fn health_check_flags_corrupt_state() {
    let (_tmp, services) = test_services();
    insert_goal(&services.state, "Stay healthy", 0, GoalStatus::Active);
    assert!(services.check_health().state.detail.contains("1 goals"));

    fs::write(services.state.path(), "data: [not, a, map").unwrap();
    let report = services.check_health();
    assert!(!report.is_healthy());
    assert!(!report.state.ok);
    assert!(report.profile.ok);
}

#[test]
fn stores_live_under_the_data_dir() {
    let (tmp, services) = test_services();
    assert!(services.state.path().starts_with(tmp.path()));
    assert!(services.drawings.dir().starts_with(tmp.path()));
    assert!(services.notes.root().starts_with(tmp.path()));
    assert!(services.backups_dir().starts_with(tmp.path()));
}

#[test]
fn audit_log_rotates_into_backups() {
    let (_tmp, services) = test_services();
    services.audit.record(AuditLevel::Info, "create_goal", &json!({"title": "x"}), &json!({"id": "g1"}));
    services.audit.record(AuditLevel::Error, "delete_goal", &json!({"id": "g9"}), &json!("goal g9 not found"));

    let entries = services.audit.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].level, AuditLevel::Error);
    assert_eq!(entries[0].operation, "create_goal");

    let backup = services.audit.rotate(&services.backups_dir()).unwrap().unwrap();
    assert!(backup.starts_with(services.backups_dir()));
    assert_eq!(fs::read_to_string(&backup).unwrap().lines().count(), 2);
    assert!(services.audit.entries().unwrap().is_empty());
}

#[test]
fn profile_search_matches_tags_and_content() {
    let (_tmp, services) = test_services();
    add_profile_item(
        &services.profile,
        NewProfileItem {
            category: "preferences".into(),
            content: "Prefers morning meetings".into(),
            tags: vec!["schedule".into()],
            ..Default::default()
        },
    )
    .unwrap();
    add_profile_item(
        &services.profile,
        NewProfileItem {
            category: "facts".into(),
            content: "Allergic to peanuts".into(),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(search_profile(&services.profile, "MORNING").total, 1);
    assert_eq!(search_profile(&services.profile, "sched").items[0].id, "p1");
    assert_eq!(search_profile(&services.profile, "travel").total, 0);
}

#[test]
fn profile_metadata_reads_back_as_written() {
    let (_tmp, services) = test_services();
    let metadata = json!({
        "languages": [],
        "prefs": {},
        "city": "Oslo",
        "address": {"street": null, "zip": "0150"},
    })
    .as_object()
    .unwrap()
    .clone();
    let added = add_profile_item(
        &services.profile,
        NewProfileItem {
            category: "facts".into(),
            content: "Lives in Oslo".into(),
            metadata: Some(metadata.clone()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(added.metadata.as_ref(), Some(&metadata));

    let stored = services.profile.get();
    assert_eq!(stored.items[0].metadata.as_ref(), Some(&metadata));
}
