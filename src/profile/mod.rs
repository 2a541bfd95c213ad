//! User profile: categorized facts the assistant should remember about the user.

pub mod types;

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{AideError, AideResult};
use crate::store::ids::next_sequential_id;
use crate::store::DocumentStore;
use types::{Profile, ProfileEntity, ProfileItem};

pub type ProfileStore = DocumentStore<Profile>;

pub fn open_profile_store(path: impl AsRef<Path>, version: &str) -> ProfileStore {
    DocumentStore::new(path.as_ref(), Profile::empty(version))
        .with_default_stripping(ProfileEntity::Root)
}

#[derive(Debug, Clone, Default)]
pub struct NewProfileItem {
    pub category: String,
    pub content: String,
    pub tags: Vec<String>,
    pub metadata: Option<Map<String, Value>>,
    pub ref_notes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileItemUpdate {
    pub category: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Merged key-by-key into existing metadata; a `null` value removes the key.
    pub metadata: Option<Map<String, Value>>,
    pub ref_notes: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ProfileListing {
    pub items: Vec<ProfileItem>,
    pub total: usize,
}

fn non_empty(metadata: Option<Map<String, Value>>) -> Option<Map<String, Value>> {
    metadata.filter(|m| !m.is_empty())
}

pub fn add_profile_item(store: &ProfileStore, input: NewProfileItem) -> AideResult<ProfileItem> {
    if input.category.trim().is_empty() || input.content.trim().is_empty() {
        return Err(AideError::InvalidFormat(
            "profile item needs a category and content".into(),
        ));
    }

    let item = store.modify(|profile| {
        let item = ProfileItem {
            id: next_sequential_id("p", profile.items.iter().map(|i| i.id.as_str())),
            category: input.category.trim().to_string(),
            content: input.content,
            tags: input.tags,
            metadata: non_empty(input.metadata),
            ref_notes: input.ref_notes,
            created_at: chrono::Utc::now().timestamp_millis(),
            updated_at: None,
        };
        profile.items.push(item.clone());
        Ok(item)
    })?;
    tracing::info!(id = %item.id, category = %item.category, "profile item added");
    Ok(item)
}

pub fn update_profile_item(
    store: &ProfileStore,
    id: &str,
    update: ProfileItemUpdate,
) -> AideResult<ProfileItem> {
    store.modify(|profile| {
        let item = profile
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AideError::NotFound(format!("profile item {id}")))?;

        if let Some(category) = update.category {
            item.category = category;
        }
        if let Some(content) = update.content {
            item.content = content;
        }
        if let Some(tags) = update.tags {
            item.tags = tags;
        }
        if let Some(patch) = update.metadata {
            let mut metadata = item.metadata.take().unwrap_or_default();
            for (key, value) in patch {
                if value.is_null() {
                    metadata.remove(&key);
                } else {
                    metadata.insert(key, value);
                }
            }
            item.metadata = non_empty(Some(metadata));
        }
        if let Some(ref_notes) = update.ref_notes {
            item.ref_notes = ref_notes;
        }
        item.updated_at = Some(chrono::Utc::now().timestamp_millis());
        Ok(item.clone())
    })
}

pub fn delete_profile_item(store: &ProfileStore, id: &str) -> AideResult<ProfileItem> {
    store.modify(|profile| {
        let index = profile
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AideError::NotFound(format!("profile item {id}")))?;
        Ok(profile.items.remove(index))
    })
}

pub fn list_profile_items(
    store: &ProfileStore,
    category: Option<&str>,
    tag: Option<&str>,
) -> ProfileListing {
    let items: Vec<ProfileItem> = store
        .get()
        .items
        .into_iter()
        .filter(|i| category.map_or(true, |c| i.category.eq_ignore_ascii_case(c)))
        .filter(|i| tag.map_or(true, |t| i.tags.iter().any(|x| x.eq_ignore_ascii_case(t))))
        .collect();
    let total = items.len();
    ProfileListing { items, total }
}

/// Case-insensitive substring match over content, category, and tags.
pub fn search_profile(store: &ProfileStore, query: &str) -> ProfileListing {
    let needle = query.to_lowercase();
    let items: Vec<ProfileItem> = store
        .get()
        .items
        .into_iter()
        .filter(|i| {
            i.content.to_lowercase().contains(&needle)
                || i.category.to_lowercase().contains(&needle)
                || i.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .collect();
    let total = items.len();
    ProfileListing { items, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn item(category: &str, content: &str) -> NewProfileItem {
        NewProfileItem {
            category: category.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let tmp = TempDir::new().unwrap();
        let store = open_profile_store(tmp.path().join("profile.yaml"), "1.0.0");
        let a = add_profile_item(&store, item("food", "Vegetarian")).unwrap();
        let b = add_profile_item(&store, item("work", "Prefers mornings")).unwrap();
        assert_eq!(a.id, "p1");
        assert_eq!(b.id, "p2");
        assert_eq!(store.get().items.len(), 2);
    }

    #[test]
    fn metadata_patch_merges_and_removes() {
        let tmp = TempDir::new().unwrap();
        let store = open_profile_store(tmp.path().join("profile.yaml"), "1.0.0");
        let mut input = item("contact", "Dentist");
        input.metadata = Some(
            json!({"phone": "555-0100", "city": "Porto"})
                .as_object()
                .unwrap()
                .clone(),
        );
        let added = add_profile_item(&store, input).unwrap();

        let updated = update_profile_item(
            &store,
            &added.id,
            ProfileItemUpdate {
                metadata: Some(json!({"phone": null, "hours": "9-5"}).as_object().unwrap().clone()),
                ..Default::default()
            },
        )
        .unwrap();
        let metadata = updated.metadata.unwrap();
        assert!(metadata.get("phone").is_none());
        assert_eq!(metadata["city"], "Porto");
        assert_eq!(metadata["hours"], "9-5");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn search_matches_content_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        let store = open_profile_store(tmp.path().join("profile.yaml"), "1.0.0");
        add_profile_item(&store, item("food", "Allergic to peanuts")).unwrap();
        add_profile_item(&store, item("music", "Likes jazz")).unwrap();
        let found = search_profile(&store, "PEANUT");
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].category, "food");
    }

    #[test]
    fn delete_unknown_item_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = open_profile_store(tmp.path().join("profile.yaml"), "1.0.0");
        assert!(matches!(
            delete_profile_item(&store, "p7"),
            Err(AideError::NotFound(_))
        ));
    }
}
