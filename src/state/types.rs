//! State document: goals (objectives with key results), ideas, and settings.
//!
//! Field defaults declared here via `#[serde(default)]` must agree with
//! [`StateEntity`]'s strip table, since stripped fields are restored on read.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::error::{AideError, AideResult};
use crate::store::strip::EntityKind;
use crate::store::Document;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub version: String,
    #[serde(default)]
    pub data: StateData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateData {
    #[serde(default)]
    pub goals: Vec<Objective>,
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

/// A goal with measurable key results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
    #[serde(default)]
    pub calendar_event_id: Option<String>,
    #[serde(default)]
    pub calendar_event_link: Option<String>,
    #[serde(default)]
    pub ref_notes: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
    #[serde(default)]
    pub status: GoalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    /// `kr<N>`, numbered across all goals.
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: KeyResultStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_goal_id: Option<String>,
    #[serde(default)]
    pub ref_notes: Vec<String>,
    pub created_at: i64,
    #[serde(default)]
    pub status: IdeaStatus,
    #[serde(default)]
    pub priority: Option<Priority>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.into()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Archived,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("unknown goal status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyResultStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    AtRisk,
}

impl KeyResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::AtRisk => "at_risk",
        }
    }
}

impl std::fmt::Display for KeyResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "at_risk" => Ok(Self::AtRisk),
            _ => Err(format!("unknown key result status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    #[default]
    Raw,
    Organized,
    Actionable,
    Archived,
}

impl IdeaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Organized => "organized",
            Self::Actionable => "actionable",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdeaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "organized" => Ok(Self::Organized),
            "actionable" => Ok(Self::Actionable),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("unknown idea status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

impl State {
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            data: StateData::default(),
        }
    }

    pub fn goal(&self, id: &str) -> Option<&Objective> {
        self.data.goals.iter().find(|g| g.id == id)
    }

    pub fn idea(&self, id: &str) -> Option<&Idea> {
        self.data.ideas.iter().find(|i| i.id == id)
    }

    /// Every key result id across all goals.
    pub fn key_result_ids(&self) -> impl Iterator<Item = &str> {
        self.data
            .goals
            .iter()
            .flat_map(|g| g.key_results.iter().map(|kr| kr.id.as_str()))
    }
}

impl Document for State {
    fn validate(&self) -> AideResult<()> {
        if self.version.trim().is_empty() {
            return Err(AideError::SchemaValidation("state version must not be empty".into()));
        }

        let mut goal_ids = HashSet::new();
        let mut kr_ids = HashSet::new();
        for goal in &self.data.goals {
            if goal.title.trim().is_empty() {
                return Err(AideError::SchemaValidation(format!(
                    "goal {} has an empty title",
                    goal.id
                )));
            }
            if !goal_ids.insert(goal.id.as_str()) {
                return Err(AideError::SchemaValidation(format!(
                    "duplicate goal id: {}",
                    goal.id
                )));
            }
            for kr in &goal.key_results {
                if !kr_ids.insert(kr.id.as_str()) {
                    return Err(AideError::SchemaValidation(format!(
                        "duplicate key result id: {}",
                        kr.id
                    )));
                }
            }
        }

        let mut idea_ids = HashSet::new();
        for idea in &self.data.ideas {
            if idea.content.trim().is_empty() {
                return Err(AideError::SchemaValidation(format!(
                    "idea {} has empty content",
                    idea.id
                )));
            }
            if !idea_ids.insert(idea.id.as_str()) {
                return Err(AideError::SchemaValidation(format!(
                    "duplicate idea id: {}",
                    idea.id
                )));
            }
        }

        if self.data.settings.currency.trim().is_empty() {
            return Err(AideError::SchemaValidation("currency must not be empty".into()));
        }
        Ok(())
    }
}

/// Strip table for the state document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEntity {
    Root,
    Data,
    Settings,
    Goal,
    KeyResult,
    Idea,
}

impl EntityKind for StateEntity {
    fn default_for(self, field: &str) -> Option<Value> {
        match (self, field) {
            (Self::Settings, "currency") => Some(json!(DEFAULT_CURRENCY)),
            (Self::Goal, "category") | (Self::Idea, "category") => Some(json!(DEFAULT_CATEGORY)),
            (Self::Goal, "status") => Some(json!(GoalStatus::default().as_str())),
            (Self::KeyResult, "status") => Some(json!(KeyResultStatus::default().as_str())),
            (Self::Idea, "status") => Some(json!(IdeaStatus::default().as_str())),
            _ => None,
        }
    }

    fn child(self, field: &str) -> Option<Self> {
        match (self, field) {
            (Self::Root, "data") => Some(Self::Data),
            (Self::Data, "settings") => Some(Self::Settings),
            (Self::Data, "goals") => Some(Self::Goal),
            (Self::Data, "ideas") => Some(Self::Idea),
            (Self::Goal, "keyResults") => Some(Self::KeyResult),
            _ => None,
        }
    }
}
