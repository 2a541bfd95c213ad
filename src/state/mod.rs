//! Goals, ideas, and assistant settings kept in a single YAML state document.
//!
//! Every mutation runs inside [`DocumentStore::modify`]: it reads the whole
//! document, transforms it in memory, and writes the full document back while
//! holding the store's write lock. Arrays are never patched element-wise.

pub mod cleanup;
pub mod goals;
pub mod ideas;
pub mod types;

use serde_json::json;
use std::path::Path;

use crate::error::AideResult;
use crate::store::DocumentStore;
use types::{Settings, State, StateEntity};

pub type StateStore = DocumentStore<State>;

/// Open the state store at `path`, seeding `version` for first-run documents.
pub fn open_state_store(path: impl AsRef<Path>, version: &str) -> StateStore {
    DocumentStore::new(path.as_ref(), State::empty(version))
        .with_default_stripping(StateEntity::Root)
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Change the currency setting. Other settings and all lists are untouched.
pub fn update_settings(store: &StateStore, currency: &str) -> AideResult<Settings> {
    let currency = currency.trim();
    if currency.is_empty() {
        return Err(crate::error::AideError::InvalidFormat(
            "currency must not be empty".into(),
        ));
    }
    let state = store.update(json!({ "data": { "settings": { "currency": currency } } }))?;
    Ok(state.data.settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Document;
    use std::fs;
    use tempfile::TempDir;
    use types::{GoalStatus, Idea, IdeaStatus, KeyResult, KeyResultStatus, Objective};

    fn sample_state() -> State {
        let mut state = State::empty("1.0.0");
        state.data.goals.push(Objective {
            id: "g1".into(),
            title: "Run a marathon".into(),
            description: None,
            category: "general".into(),
            key_results: vec![KeyResult {
                id: "kr1".into(),
                description: "Run 30km in one go".into(),
                target: Some(30.0),
                current: None,
                unit: Some("km".into()),
                status: KeyResultStatus::NotStarted,
            }],
            calendar_event_id: None,
            calendar_event_link: None,
            ref_notes: vec![],
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
            status: GoalStatus::Active,
        });
        state.data.ideas.push(Idea {
            id: "i1".into(),
            content: "Try trail running".into(),
            category: "health".into(),
            tags: vec![],
            related_goal_id: Some("g1".into()),
            ref_notes: vec![],
            created_at: 1_700_000_000_000,
            status: IdeaStatus::Raw,
            priority: None,
        });
        state
    }

    #[test]
    fn stripped_file_omits_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
        store.save(&sample_state()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("status"), "default statuses should be stripped:\n{raw}");
        assert!(!raw.contains("currency"));
        assert!(!raw.contains("refNotes"));
        assert!(raw.contains("category: health"));
        assert!(!raw.contains("category: general"));
    }

    #[test]
    fn stripped_round_trip_is_semantically_equal() {
        let tmp = TempDir::new().unwrap();
        let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
        let original = sample_state();
        store.save(&original).unwrap();

        let loaded = store.load();
        assert!(!loaded.recovered);
        assert_eq!(loaded.document, original);
    }

    #[test]
    fn update_settings_keeps_goals() {
        let tmp = TempDir::new().unwrap();
        let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
        store.save(&sample_state()).unwrap();

        let settings = update_settings(&store, "EUR").unwrap();
        assert_eq!(settings.currency, "EUR");
        let state = store.get();
        assert_eq!(state.data.goals.len(), 1);
        assert_eq!(state.data.settings.currency, "EUR");
    }

    #[test]
    fn duplicate_key_result_ids_across_goals_fail_validation() {
        let mut state = sample_state();
        let mut second = state.data.goals[0].clone();
        second.id = "g2".into();
        state.data.goals.push(second);
        assert!(state.validate().is_err());
    }
}
