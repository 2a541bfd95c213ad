use serde::Serialize;

use super::goals::{push_goal, NewGoal};
use super::types::{Idea, IdeaStatus, Objective, Priority, State, DEFAULT_CATEGORY};
use super::{now_millis, StateStore};
use crate::error::{AideError, AideResult};
use crate::store::ids::next_sequential_id;

#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub related_goal_id: Option<String>,
    pub ref_notes: Vec<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default)]
pub struct IdeaUpdate {
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub related_goal_id: Option<String>,
    pub ref_notes: Option<Vec<String>>,
    pub status: Option<IdeaStatus>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default)]
pub struct IdeaFilter {
    pub status: Option<IdeaStatus>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdeaListing {
    pub ideas: Vec<Idea>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct Promotion {
    pub goal: Objective,
    pub idea: Idea,
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub fn create_idea(store: &StateStore, input: NewIdea) -> AideResult<Idea> {
    if input.content.trim().is_empty() {
        return Err(AideError::InvalidFormat("idea content must not be empty".into()));
    }

    let idea = store.modify(|state| {
        if let Some(goal_id) = &input.related_goal_id {
            if state.goal(goal_id).is_none() {
                return Err(AideError::NotFound(format!("goal {goal_id}")));
            }
        }

        let idea = Idea {
            id: next_sequential_id("i", state.data.ideas.iter().map(|i| i.id.as_str())),
            content: input.content,
            category: input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: normalize_tags(input.tags),
            related_goal_id: input.related_goal_id,
            ref_notes: input.ref_notes,
            created_at: now_millis(),
            status: IdeaStatus::Raw,
            priority: input.priority,
        };
        state.data.ideas.push(idea.clone());
        Ok(idea)
    })?;
    tracing::info!(id = %idea.id, "idea created");
    Ok(idea)
}

fn edit_idea(state: &mut State, id: &str, update: IdeaUpdate) -> AideResult<Idea> {
    if let Some(goal_id) = &update.related_goal_id {
        if state.goal(goal_id).is_none() {
            return Err(AideError::NotFound(format!("goal {goal_id}")));
        }
    }

    let idea = state
        .data
        .ideas
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| AideError::NotFound(format!("idea {id}")))?;

    if let Some(content) = update.content {
        if content.trim().is_empty() {
            return Err(AideError::InvalidFormat("idea content must not be empty".into()));
        }
        idea.content = content;
    }
    if let Some(category) = update.category {
        idea.category = category;
    }
    if let Some(tags) = update.tags {
        idea.tags = normalize_tags(tags);
    }
    if let Some(goal_id) = update.related_goal_id {
        idea.related_goal_id = Some(goal_id);
    }
    if let Some(ref_notes) = update.ref_notes {
        idea.ref_notes = ref_notes;
    }
    if let Some(status) = update.status {
        idea.status = status;
    }
    if let Some(priority) = update.priority {
        idea.priority = Some(priority);
    }
    Ok(idea.clone())
}

pub fn update_idea(store: &StateStore, id: &str, update: IdeaUpdate) -> AideResult<Idea> {
    store.modify(|state| edit_idea(state, id, update))
}

pub fn delete_idea(store: &StateStore, id: &str) -> AideResult<Idea> {
    store.modify(|state| {
        let index = state
            .data
            .ideas
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AideError::NotFound(format!("idea {id}")))?;
        Ok(state.data.ideas.remove(index))
    })
}

pub fn list_ideas(store: &StateStore, filter: &IdeaFilter) -> IdeaListing {
    let tag = filter.tag.as_deref().map(str::to_lowercase);
    let ideas: Vec<Idea> = store
        .get()
        .data
        .ideas
        .into_iter()
        .filter(|i| filter.status.map_or(true, |s| i.status == s))
        .filter(|i| {
            filter
                .category
                .as_deref()
                .map_or(true, |c| i.category.eq_ignore_ascii_case(c))
        })
        .filter(|i| tag.as_ref().map_or(true, |t| i.tags.contains(t)))
        .collect();
    let total = ideas.len();
    IdeaListing { ideas, total }
}

/// Turn an idea into a new goal and mark the idea actionable, linked to it.
/// Both changes land in one write.
pub fn promote_idea(
    store: &StateStore,
    idea_id: &str,
    title: Option<String>,
) -> AideResult<Promotion> {
    let promotion = store.modify(|state| {
        let idea = state
            .idea(idea_id)
            .cloned()
            .ok_or_else(|| AideError::NotFound(format!("idea {idea_id}")))?;

        let goal = push_goal(
            state,
            NewGoal {
                title: title.unwrap_or_else(|| idea.content.clone()),
                description: Some(idea.content.clone()),
                category: Some(idea.category.clone()),
                ref_notes: idea.ref_notes.clone(),
                ..Default::default()
            },
        )?;

        let idea = edit_idea(
            state,
            idea_id,
            IdeaUpdate {
                related_goal_id: Some(goal.id.clone()),
                status: Some(IdeaStatus::Actionable),
                ..Default::default()
            },
        )?;
        Ok(Promotion { goal, idea })
    })?;

    tracing::info!(idea = %promotion.idea.id, goal = %promotion.goal.id, "idea promoted");
    Ok(promotion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::open_state_store;
    use tempfile::TempDir;

    #[test]
    fn tags_are_normalized_and_filterable() {
        let tmp = TempDir::new().unwrap();
        let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
        create_idea(
            &store,
            NewIdea {
                content: "Learn woodworking".into(),
                tags: vec!["Hobby".into(), "hobby".into(), " ".into()],
                ..Default::default()
            },
        )
        .unwrap();
        create_idea(&store, NewIdea { content: "Visit Lisbon".into(), ..Default::default() }).unwrap();

        let listing = list_ideas(
            &store,
            &IdeaFilter { tag: Some("HOBBY".into()), ..Default::default() },
        );
        assert_eq!(listing.total, 1);
        assert_eq!(listing.ideas[0].tags, vec!["hobby".to_string()]);
    }

    #[test]
    fn related_goal_must_exist() {
        let tmp = TempDir::new().unwrap();
        let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
        let err = create_idea(
            &store,
            NewIdea {
                content: "x".into(),
                related_goal_id: Some("g1".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AideError::NotFound(_)));
    }

    #[test]
    fn promote_links_idea_to_new_goal() {
        let tmp = TempDir::new().unwrap();
        let store = open_state_store(tmp.path().join("state.yaml"), "1.0.0");
        let idea = create_idea(
            &store,
            NewIdea {
                content: "Start a newsletter".into(),
                category: Some("writing".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let promotion = promote_idea(&store, &idea.id, None).unwrap();
        assert_eq!(promotion.goal.title, "Start a newsletter");
        assert_eq!(promotion.goal.category, "writing");
        assert_eq!(promotion.idea.status, IdeaStatus::Actionable);
        assert_eq!(promotion.idea.related_goal_id.as_deref(), Some(promotion.goal.id.as_str()));
    }
}
