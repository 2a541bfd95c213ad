//! Goal (objective) and key-result operations.
//!
//! Key result ids come from one counter spanning every goal, so `kr3` is
//! unique in the whole state document, not just within its goal.

use serde::Serialize;

use super::types::{GoalStatus, KeyResult, KeyResultStatus, Objective, State};
use super::{now_millis, StateStore};
use crate::error::{AideError, AideResult};
use crate::store::ids::next_sequential_id;

#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub key_results: Vec<NewKeyResult>,
    pub ref_notes: Vec<String>,
    pub calendar_event_id: Option<String>,
    pub calendar_event_link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewKeyResult {
    pub description: String,
    pub target: Option<f64>,
    pub current: Option<f64>,
    pub unit: Option<String>,
}

/// Partial goal edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: Option<GoalStatus>,
    pub ref_notes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyResultUpdate {
    pub description: Option<String>,
    pub target: Option<f64>,
    pub current: Option<f64>,
    pub unit: Option<String>,
    pub status: Option<KeyResultStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    pub status: Option<GoalStatus>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalListing {
    pub goals: Vec<Objective>,
    pub total: usize,
}

/// Allocate ids for `new` key results, continuing the global `kr` sequence.
fn allocate_key_results(state: &State, new: Vec<NewKeyResult>) -> AideResult<Vec<KeyResult>> {
    let mut taken: Vec<String> = state.key_result_ids().map(str::to_string).collect();
    let mut out = Vec::with_capacity(new.len());
    for kr in new {
        if kr.description.trim().is_empty() {
            return Err(AideError::InvalidFormat(
                "key result description must not be empty".into(),
            ));
        }
        let id = next_sequential_id("kr", taken.iter().map(String::as_str));
        taken.push(id.clone());
        out.push(KeyResult {
            id,
            description: kr.description,
            target: kr.target,
            current: kr.current,
            unit: kr.unit,
            status: KeyResultStatus::default(),
        });
    }
    Ok(out)
}

/// Append a new goal to `state`, allocating its id and key-result ids.
pub(crate) fn push_goal(state: &mut State, input: NewGoal) -> AideResult<Objective> {
    if input.title.trim().is_empty() {
        return Err(AideError::InvalidFormat("goal title must not be empty".into()));
    }

    let id = next_sequential_id("g", state.data.goals.iter().map(|g| g.id.as_str()));
    let key_results = allocate_key_results(state, input.key_results)?;
    let now = now_millis();

    let goal = Objective {
        id,
        title: input.title,
        description: input.description,
        category: input
            .category
            .unwrap_or_else(|| super::types::DEFAULT_CATEGORY.to_string()),
        key_results,
        calendar_event_id: input.calendar_event_id,
        calendar_event_link: input.calendar_event_link,
        ref_notes: input.ref_notes,
        created_at: now,
        updated_at: now,
        status: GoalStatus::Active,
    };
    state.data.goals.push(goal.clone());
    Ok(goal)
}

pub fn create_goal(store: &StateStore, input: NewGoal) -> AideResult<Objective> {
    let goal = store.modify(|state| push_goal(state, input))?;
    tracing::info!(id = %goal.id, key_results = goal.key_results.len(), "goal created");
    Ok(goal)
}

/// Apply `edit` to the goal with `id` and persist the whole document.
fn modify_goal<F>(store: &StateStore, id: &str, edit: F) -> AideResult<Objective>
where
    F: FnOnce(&State, &mut Objective) -> AideResult<()>,
{
    store.modify(|state| {
        let index = state
            .data
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| AideError::NotFound(format!("goal {id}")))?;
        let mut goal = state.data.goals[index].clone();
        edit(state, &mut goal)?;
        goal.updated_at = now_millis();
        state.data.goals[index] = goal.clone();
        Ok(goal)
    })
}

pub fn update_goal(store: &StateStore, id: &str, update: GoalUpdate) -> AideResult<Objective> {
    modify_goal(store, id, |_, goal| {
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(AideError::InvalidFormat("goal title must not be empty".into()));
            }
            goal.title = title;
        }
        if let Some(description) = update.description {
            goal.description = Some(description);
        }
        if let Some(category) = update.category {
            goal.category = category;
        }
        if let Some(status) = update.status {
            goal.status = status;
        }
        if let Some(ref_notes) = update.ref_notes {
            goal.ref_notes = ref_notes;
        }
        Ok(())
    })
}

/// Record the calendar event created for a goal.
pub fn link_goal_event(
    store: &StateStore,
    id: &str,
    event_id: &str,
    event_link: Option<&str>,
) -> AideResult<Objective> {
    modify_goal(store, id, |_, goal| {
        goal.calendar_event_id = Some(event_id.to_string());
        goal.calendar_event_link = event_link.map(str::to_string);
        Ok(())
    })
}

pub fn delete_goal(store: &StateStore, id: &str) -> AideResult<Objective> {
    let removed = store.modify(|state| {
        let index = state
            .data
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| AideError::NotFound(format!("goal {id}")))?;
        Ok(state.data.goals.remove(index))
    })?;
    tracing::info!(id = %id, "goal deleted");
    Ok(removed)
}

pub fn list_goals(store: &StateStore, filter: &GoalFilter) -> GoalListing {
    let goals: Vec<Objective> = store
        .get()
        .data
        .goals
        .into_iter()
        .filter(|g| filter.status.map_or(true, |s| g.status == s))
        .filter(|g| {
            filter
                .category
                .as_deref()
                .map_or(true, |c| g.category.eq_ignore_ascii_case(c))
        })
        .collect();
    let total = goals.len();
    GoalListing { goals, total }
}

pub fn add_key_result(
    store: &StateStore,
    goal_id: &str,
    input: NewKeyResult,
) -> AideResult<(Objective, KeyResult)> {
    let mut added = None;
    let goal = modify_goal(store, goal_id, |state, goal| {
        let mut allocated = allocate_key_results(state, vec![input])?;
        let kr = allocated.remove(0);
        added = Some(kr.clone());
        goal.key_results.push(kr);
        Ok(())
    })?;
    let kr = added.ok_or_else(|| AideError::NotFound(format!("goal {goal_id}")))?;
    Ok((goal, kr))
}

pub fn update_key_result(
    store: &StateStore,
    goal_id: &str,
    kr_id: &str,
    update: KeyResultUpdate,
) -> AideResult<Objective> {
    modify_goal(store, goal_id, |_, goal| {
        let kr = goal
            .key_results
            .iter_mut()
            .find(|kr| kr.id == kr_id)
            .ok_or_else(|| AideError::NotFound(format!("key result {kr_id} in goal {goal_id}")))?;
        if let Some(description) = update.description {
            kr.description = description;
        }
        if let Some(target) = update.target {
            kr.target = Some(target);
        }
        if let Some(current) = update.current {
            kr.current = Some(current);
        }
        if let Some(unit) = update.unit {
            kr.unit = Some(unit);
        }
        if let Some(status) = update.status {
            kr.status = status;
        }
        Ok(())
    })
}

pub fn delete_key_result(store: &StateStore, goal_id: &str, kr_id: &str) -> AideResult<Objective> {
    modify_goal(store, goal_id, |_, goal| {
        let before = goal.key_results.len();
        goal.key_results.retain(|kr| kr.id != kr_id);
        if goal.key_results.len() == before {
            return Err(AideError::NotFound(format!(
                "key result {kr_id} in goal {goal_id}"
            )));
        }
        Ok(())
    })
}
