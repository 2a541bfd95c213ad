mod helpers;

use aide::calendar::NewEvent;
use aide::error::AideError;
use aide::services::create_goal_with_event;
use aide::state::cleanup::{cleanup_state, CleanupOptions};
use aide::state::goals::{
    add_key_result, create_goal, delete_goal, list_goals, GoalFilter, NewGoal, NewKeyResult,
};
use aide::state::ideas::promote_idea;
use aide::state::open_state_store;
use aide::state::types::{GoalStatus, IdeaStatus};
use helpers::{insert_goal, insert_idea, test_state_store, FakeCalendar};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn key_result_ids_are_global_across_goals() {
    let (_tmp, store) = test_state_store();
    let a = insert_goal(&store, "A", 2, GoalStatus::Active);
    let b = insert_goal(&store, "B", 1, GoalStatus::Active);

    let state = store.get();
    let ids: Vec<&str> = state.key_result_ids().collect();
    assert_eq!(ids, vec!["kr1", "kr2", "kr3"]);

    let (_, kr) = add_key_result(
        &store,
        &a,
        NewKeyResult {
            description: "extra".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(kr.id, "kr4");

    // Deleting the goal holding kr3 does not recycle lower numbers.
    delete_goal(&store, &b).unwrap();
    let (_, kr) = add_key_result(
        &store,
        &a,
        NewKeyResult {
            description: "after delete".into(),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(kr.id, "kr5");
}

#[test]
fn concurrent_goal_creation_keeps_every_goal() {
    let (_tmp, store) = test_state_store();
    let created = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let (store, created) = (&store, &created);
            scope.spawn(move || {
                for n in 0..10 {
                    let goal = create_goal(
                        store,
                        NewGoal {
                            title: format!("worker {worker} goal {n}"),
                            key_results: vec![NewKeyResult {
                                description: "step".into(),
                                ..Default::default()
                            }],
                            ..Default::default()
                        },
                    );
                    if goal.is_ok() {
                        created.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    let state = store.get();
    assert_eq!(created.load(Ordering::SeqCst), 80);
    assert_eq!(state.data.goals.len(), 80);
    let goal_ids: HashSet<&str> = state.data.goals.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(goal_ids.len(), 80);
    let kr_ids: HashSet<&str> = state.key_result_ids().collect();
    assert_eq!(kr_ids.len(), 80);
}

#[test]
fn goal_ids_continue_after_the_highest() {
    let (_tmp, store) = test_state_store();
    insert_goal(&store, "one", 0, GoalStatus::Active);
    let two = insert_goal(&store, "two", 0, GoalStatus::Active);
    insert_goal(&store, "three", 0, GoalStatus::Active);

    delete_goal(&store, &two).unwrap();
    assert_eq!(insert_goal(&store, "four", 0, GoalStatus::Active), "g4");
}

#[test]
fn cleanup_removes_finished_goals_and_backs_up_everything() {
    let (tmp, store) = test_state_store();
    insert_goal(&store, "Ship v1", 1, GoalStatus::Completed);
    insert_goal(&store, "Old plan", 0, GoalStatus::Archived);
    let kept = insert_goal(&store, "Keep going", 0, GoalStatus::Active);
    insert_idea(&store, "stale", IdeaStatus::Archived);
    insert_idea(&store, "fresh", IdeaStatus::Raw);

    let backups = tmp.path().join("backups");
    let report = cleanup_state(&store, &backups, &CleanupOptions::default()).unwrap();

    assert_eq!(report.removed_goals.len(), 2);
    assert_eq!(report.removed_ideas.len(), 1);
    assert_eq!(report.remaining_goals, 1);
    assert_eq!(report.remaining_ideas, 1);

    let state = store.get();
    assert_eq!(state.data.goals.len(), 1);
    assert_eq!(state.data.goals[0].id, kept);

    let backup_path = report.backup_path.unwrap();
    let name = backup_path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("state-") && name.ends_with(".yaml"));
    let backup = open_state_store(&backup_path, "1.0.0").validate_file().unwrap().unwrap();
    assert_eq!(backup.data.goals.len(), 3);
    assert_eq!(backup.data.ideas.len(), 2);
}

#[test]
fn cleanup_dry_run_writes_nothing() {
    let (tmp, store) = test_state_store();
    insert_goal(&store, "Done", 0, GoalStatus::Completed);

    let options = CleanupOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = cleanup_state(&store, &tmp.path().join("backups"), &options).unwrap();
    assert_eq!(report.removed_goals.len(), 1);
    assert!(report.backup_path.is_none());
    assert!(!tmp.path().join("backups").exists());
    assert_eq!(store.get().data.goals.len(), 1);
}

#[test]
fn cleanup_respects_age_filter() {
    let (tmp, store) = test_state_store();
    insert_goal(&store, "Just finished", 0, GoalStatus::Completed);

    let options = CleanupOptions {
        older_than_days: Some(30),
        ..Default::default()
    };
    let report = cleanup_state(&store, &tmp.path().join("backups"), &options).unwrap();
    assert!(report.removed_goals.is_empty());
    assert_eq!(store.get().data.goals.len(), 1);
}

#[test]
fn promoting_an_idea_creates_a_linked_goal() {
    let (_tmp, store) = test_state_store();
    let idea = insert_idea(&store, "Learn to sail", IdeaStatus::Organized);

    let promotion = promote_idea(&store, &idea, None).unwrap();
    assert_eq!(promotion.goal.title, "Learn to sail");
    assert_eq!(promotion.idea.status, IdeaStatus::Actionable);
    assert_eq!(promotion.idea.related_goal_id.as_deref(), Some(promotion.goal.id.as_str()));

    let active = list_goals(
        &store,
        &GoalFilter {
            status: Some(GoalStatus::Active),
            ..Default::default()
        },
    );
    assert_eq!(active.total, 1);
}

#[tokio::test]
async fn goal_with_start_time_gets_a_calendar_event() {
    let (_tmp, store) = test_state_store();
    let calendar = FakeCalendar::default();

    let goal = create_goal_with_event(
        &store,
        &calendar,
        NewGoal {
            title: "Dentist".into(),
            ..Default::default()
        },
        Some(NewEvent {
            title: "Dentist".into(),
            start_time: "20-10-2026 14-30".into(),
            duration: Some("45m".into()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(goal.calendar_event_id.as_deref(), Some("evt1"));
    assert_eq!(goal.calendar_event_link.as_deref(), Some("https://calendar.example/evt1"));
    assert_eq!(store.get().goal(&goal.id).unwrap().calendar_event_id.as_deref(), Some("evt1"));
}

#[tokio::test]
async fn failed_calendar_event_rolls_back_goal() {
    let (_tmp, store) = test_state_store();
    let calendar = FakeCalendar::failing();

    let err = create_goal_with_event(
        &store,
        &calendar,
        NewGoal {
            title: "Flight".into(),
            ..Default::default()
        },
        Some(NewEvent {
            title: "Flight".into(),
            start_time: "01-11-2026 06-00".into(),
            ..Default::default()
        }),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AideError::ExternalService(_)));
    assert!(store.get().data.goals.is_empty());
}

#[tokio::test]
async fn malformed_event_times_write_nothing() {
    let (_tmp, store) = test_state_store();
    let calendar = FakeCalendar::default();

    for (start_time, duration) in [
        ("2026-10-20 14:30", None),
        ("20-10-2026 14-30", Some("2é")),
        ("20-10-2026 14-30", Some("3ч")),
        ("20-10-2026 14-30", Some("0m")),
    ] {
        let err = create_goal_with_event(
            &store,
            &calendar,
            NewGoal {
                title: "Meeting".into(),
                ..Default::default()
            },
            Some(NewEvent {
                title: "Meeting".into(),
                start_time: start_time.into(),
                duration: duration.map(String::from),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AideError::InvalidFormat(_)), "{start_time} {duration:?}");
    }

    assert!(!store.path().exists(), "no goal was written");
    assert!(calendar.created.lock().unwrap().is_empty());
}
