use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AideError, AideResult};
use crate::state::ideas::{IdeaFilter, IdeaUpdate, NewIdea};
use crate::state::types::{IdeaStatus, Priority};

fn parse_priority(priority: Option<String>) -> AideResult<Option<Priority>> {
    priority
        .map(|p| p.parse::<Priority>())
        .transpose()
        .map_err(AideError::InvalidFormat)
}

fn parse_status(status: Option<String>) -> AideResult<Option<IdeaStatus>> {
    status
        .map(|s| s.parse::<IdeaStatus>())
        .transpose()
        .map_err(AideError::InvalidFormat)
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateIdeaParams {
    #[schemars(description = "The idea itself")]
    pub content: String,

    #[schemars(description = "Category. Defaults to 'general'.")]
    pub category: Option<String>,

    #[schemars(description = "Free-form tags (lowercased, deduplicated)")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "ID of an existing goal this idea relates to")]
    pub related_goal_id: Option<String>,

    #[schemars(description = "Relative paths of notes referenced by this idea")]
    pub ref_notes: Option<Vec<String>>,

    #[schemars(description = "Priority: 'low', 'medium', or 'high'")]
    pub priority: Option<String>,
}

impl CreateIdeaParams {
    pub fn into_input(self) -> AideResult<NewIdea> {
        Ok(NewIdea {
            content: self.content,
            category: self.category,
            tags: self.tags.unwrap_or_default(),
            related_goal_id: self.related_goal_id,
            ref_notes: self.ref_notes.unwrap_or_default(),
            priority: parse_priority(self.priority)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIdeaParams {
    #[schemars(description = "ID of the idea, e.g. 'i2'")]
    pub id: String,

    pub content: Option<String>,

    pub category: Option<String>,

    #[schemars(description = "Replaces the tag list")]
    pub tags: Option<Vec<String>>,

    pub related_goal_id: Option<String>,

    pub ref_notes: Option<Vec<String>>,

    #[schemars(description = "Status: 'raw', 'organized', 'actionable', or 'archived'")]
    pub status: Option<String>,

    pub priority: Option<String>,
}

impl UpdateIdeaParams {
    pub fn into_update(self) -> AideResult<(String, IdeaUpdate)> {
        Ok((
            self.id,
            IdeaUpdate {
                content: self.content,
                category: self.category,
                tags: self.tags,
                related_goal_id: self.related_goal_id,
                ref_notes: self.ref_notes,
                status: parse_status(self.status)?,
                priority: parse_priority(self.priority)?,
            },
        ))
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IdeaIdParams {
    #[schemars(description = "ID of the idea, e.g. 'i2'")]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListIdeasParams {
    pub status: Option<String>,

    pub category: Option<String>,

    #[schemars(description = "Only ideas carrying this tag")]
    pub tag: Option<String>,
}

impl ListIdeasParams {
    pub fn into_filter(self) -> AideResult<IdeaFilter> {
        Ok(IdeaFilter {
            status: parse_status(self.status)?,
            category: self.category,
            tag: self.tag,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PromoteIdeaParams {
    #[schemars(description = "ID of the idea to turn into a goal")]
    pub id: String,

    #[schemars(description = "Goal title. Defaults to the idea's content.")]
    pub title: Option<String>,
}
