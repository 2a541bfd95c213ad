//! Parameters for the goal and key-result tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar::NewEvent;
use crate::error::{AideError, AideResult};
use crate::state::goals::{GoalFilter, GoalUpdate, KeyResultUpdate, NewGoal, NewKeyResult};
use crate::state::types::{GoalStatus, KeyResultStatus};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct KeyResultParams {
    #[schemars(description = "What has to be true for this key result to be met")]
    pub description: String,

    #[schemars(description = "Target value, e.g. 10")]
    pub target: Option<f64>,

    #[schemars(description = "Current value. Defaults to unset.")]
    pub current: Option<f64>,

    #[schemars(description = "Unit of target/current, e.g. 'km' or 'books'")]
    pub unit: Option<String>,
}

impl From<KeyResultParams> for NewKeyResult {
    fn from(p: KeyResultParams) -> Self {
        Self {
            description: p.description,
            target: p.target,
            current: p.current,
            unit: p.unit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateGoalParams {
    #[schemars(description = "Short goal title")]
    pub title: String,

    #[schemars(description = "Longer description of the goal")]
    pub description: Option<String>,

    #[schemars(description = "Category, e.g. 'health' or 'career'. Defaults to 'general'.")]
    pub category: Option<String>,

    #[schemars(description = "Initial key results")]
    pub key_results: Option<Vec<KeyResultParams>>,

    #[schemars(description = "Relative paths of notes referenced by this goal")]
    pub ref_notes: Option<Vec<String>>,

    #[schemars(
        description = "Optional calendar event start, format DD-MM-YYYY HH-MM. When set, a linked calendar event is created."
    )]
    pub start_time: Option<String>,

    #[schemars(description = "Calendar event end, format DD-MM-YYYY HH-MM")]
    pub end_time: Option<String>,

    #[schemars(description = "Calendar event duration, e.g. '2h' or '45m'. Used when end_time is not set.")]
    pub duration: Option<String>,

    #[schemars(description = "IANA timezone for the calendar event. Defaults to the configured timezone.")]
    pub timezone: Option<String>,
}

impl CreateGoalParams {
    pub fn into_input(self) -> (NewGoal, Option<NewEvent>) {
        let event = self.start_time.map(|start_time| NewEvent {
            title: self.title.clone(),
            description: self.description.clone(),
            start_time,
            end_time: self.end_time,
            duration: self.duration,
            timezone: self.timezone,
        });
        let goal = NewGoal {
            title: self.title,
            description: self.description,
            category: self.category,
            key_results: self
                .key_results
                .unwrap_or_default()
                .into_iter()
                .map(NewKeyResult::from)
                .collect(),
            ref_notes: self.ref_notes.unwrap_or_default(),
            calendar_event_id: None,
            calendar_event_link: None,
        };
        (goal, event)
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateGoalParams {
    #[schemars(description = "ID of the goal, e.g. 'g3'")]
    pub id: String,

    pub title: Option<String>,

    pub description: Option<String>,

    pub category: Option<String>,

    #[schemars(description = "Status: 'active', 'paused', 'completed', or 'archived'")]
    pub status: Option<String>,

    #[schemars(description = "Replaces the referenced note list")]
    pub ref_notes: Option<Vec<String>>,
}

impl UpdateGoalParams {
    pub fn into_update(self) -> AideResult<(String, GoalUpdate)> {
        let status = self
            .status
            .map(|s| s.parse::<GoalStatus>())
            .transpose()
            .map_err(AideError::InvalidFormat)?;
        Ok((
            self.id,
            GoalUpdate {
                title: self.title,
                description: self.description,
                category: self.category,
                status,
                ref_notes: self.ref_notes,
            },
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GoalIdParams {
    #[schemars(description = "ID of the goal, e.g. 'g3'")]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListGoalsParams {
    #[schemars(description = "Only goals with this status")]
    pub status: Option<String>,

    #[schemars(description = "Only goals in this category (case-insensitive)")]
    pub category: Option<String>,
}

impl ListGoalsParams {
    pub fn into_filter(self) -> AideResult<GoalFilter> {
        Ok(GoalFilter {
            status: self
                .status
                .map(|s| s.parse::<GoalStatus>())
                .transpose()
                .map_err(AideError::InvalidFormat)?,
            category: self.category,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddKeyResultParams {
    #[schemars(description = "ID of the goal to add to")]
    pub goal_id: String,

    #[serde(flatten)]
    pub key_result: KeyResultParams,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateKeyResultParams {
    pub goal_id: String,

    #[schemars(description = "ID of the key result, e.g. 'kr4'")]
    pub key_result_id: String,

    pub description: Option<String>,

    pub target: Option<f64>,

    #[schemars(description = "New current value")]
    pub current: Option<f64>,

    pub unit: Option<String>,

    #[schemars(description = "Status: 'not_started', 'in_progress', 'completed', or 'at_risk'")]
    pub status: Option<String>,
}

impl UpdateKeyResultParams {
    pub fn into_update(self) -> AideResult<(String, String, KeyResultUpdate)> {
        let status = self
            .status
            .map(|s| s.parse::<KeyResultStatus>())
            .transpose()
            .map_err(AideError::InvalidFormat)?;
        Ok((
            self.goal_id,
            self.key_result_id,
            KeyResultUpdate {
                description: self.description,
                target: self.target,
                current: self.current,
                unit: self.unit,
                status,
            },
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteKeyResultParams {
    pub goal_id: String,

    pub key_result_id: String,
}
