#![allow(dead_code)]

use aide::calendar::{
    CalendarClient, CalendarEvent, DeleteOutcome, EventHandle, EventPatch, NewEvent, SendUpdates,
};
use aide::config::AideConfig;
use aide::error::{AideError, AideResult};
use aide::services::Services;
use aide::state::goals::{create_goal, update_goal, GoalUpdate, NewGoal, NewKeyResult};
use aide::state::ideas::{create_idea, update_idea, IdeaUpdate, NewIdea};
use aide::state::types::{GoalStatus, IdeaStatus};
use aide::state::{open_state_store, StateStore};
use serde_json::{Map, Value};
use std::sync::Mutex;
use tempfile::TempDir;

/// Open a state store in a fresh temp directory. Keep the `TempDir` alive.
pub fn test_state_store() -> (TempDir, StateStore) {
    let tmp = TempDir::new().unwrap();
    let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
    (tmp, store)
}

/// Open every store rooted in a fresh temp directory.
pub fn test_services() -> (TempDir, Services) {
    let tmp = TempDir::new().unwrap();
    let services = Services::open(AideConfig::with_data_dir(tmp.path())).unwrap();
    (tmp, services)
}

/// Insert a goal with `key_results` key results and the given status.
pub fn insert_goal(store: &StateStore, title: &str, key_results: usize, status: GoalStatus) -> String {
    let goal = create_goal(
        store,
        NewGoal {
            title: title.to_string(),
            key_results: (0..key_results)
                .map(|i| NewKeyResult {
                    description: format!("{title} step {i}"),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
    )
    .unwrap();
    if status != GoalStatus::Active {
        update_goal(
            store,
            &goal.id,
            GoalUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .unwrap();
    }
    goal.id
}

pub fn insert_idea(store: &StateStore, content: &str, status: IdeaStatus) -> String {
    let idea = create_idea(
        store,
        NewIdea {
            content: content.to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    if status != IdeaStatus::Raw {
        update_idea(
            store,
            &idea.id,
            IdeaUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .unwrap();
    }
    idea.id
}

/// A partial element as a tool caller would send it.
pub fn partial_element(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

/// In-memory calendar that records created events and can be told to fail.
#[derive(Default)]
pub struct FakeCalendar {
    pub created: Mutex<Vec<NewEvent>>,
    pub fail: bool,
}

impl FakeCalendar {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn event(id: &str, title: &str) -> CalendarEvent {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "summary": title,
            "htmlLink": format!("https://calendar.example/{id}"),
        }))
        .unwrap()
    }
}

impl CalendarClient for FakeCalendar {
    async fn create_event(&self, event: NewEvent) -> AideResult<EventHandle> {
        if self.fail {
            return Err(AideError::ExternalService("calendar unavailable".into()));
        }
        // Validates the time format the same way the real client does.
        aide::calendar::time::parse_human_time(&event.start_time)?;
        let mut created = self.created.lock().unwrap();
        let id = format!("evt{}", created.len() + 1);
        let calendar_event = Self::event(&id, &event.title);
        created.push(event);
        Ok(EventHandle {
            id,
            html_link: calendar_event.html_link.clone(),
            event: calendar_event,
        })
    }

    async fn update_event(&self, event_id: &str, patch: EventPatch) -> AideResult<EventHandle> {
        let event = Self::event(event_id, patch.title.as_deref().unwrap_or("updated"));
        Ok(EventHandle {
            id: event_id.to_string(),
            html_link: event.html_link.clone(),
            event,
        })
    }

    async fn delete_event(&self, _event_id: &str, _send_updates: SendUpdates) -> AideResult<DeleteOutcome> {
        Ok(DeleteOutcome {
            is_recurring: false,
            is_recurring_master: false,
        })
    }

    async fn list_events(&self, _days: u32, _max_results: u32) -> AideResult<Vec<CalendarEvent>> {
        Ok(Vec::new())
    }
}
