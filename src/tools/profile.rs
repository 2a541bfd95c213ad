use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::profile::{NewProfileItem, ProfileItemUpdate};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddProfileItemParams {
    #[schemars(description = "Category, e.g. 'preference', 'health', 'contact'")]
    pub category: String,

    #[schemars(description = "The fact to remember about the user")]
    pub content: String,

    pub tags: Option<Vec<String>>,

    #[schemars(description = "Optional structured data attached to the item")]
    pub metadata: Option<Map<String, Value>>,

    #[schemars(description = "Relative paths of notes referenced by this item")]
    pub ref_notes: Option<Vec<String>>,
}

impl From<AddProfileItemParams> for NewProfileItem {
    fn from(p: AddProfileItemParams) -> Self {
        Self {
            category: p.category,
            content: p.content,
            tags: p.tags.unwrap_or_default(),
            metadata: p.metadata,
            ref_notes: p.ref_notes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateProfileItemParams {
    #[schemars(description = "ID of the profile item, e.g. 'p4'")]
    pub id: String,

    pub category: Option<String>,

    pub content: Option<String>,

    #[schemars(description = "Replaces the tag list")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Merged into existing metadata; a null value removes that key")]
    pub metadata: Option<Map<String, Value>>,

    pub ref_notes: Option<Vec<String>>,
}

impl UpdateProfileItemParams {
    pub fn into_update(self) -> (String, ProfileItemUpdate) {
        (
            self.id,
            ProfileItemUpdate {
                category: self.category,
                content: self.content,
                tags: self.tags,
                metadata: self.metadata,
                ref_notes: self.ref_notes,
            },
        )
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProfileItemIdParams {
    #[schemars(description = "ID of the profile item, e.g. 'p4'")]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListProfileItemsParams {
    pub category: Option<String>,

    pub tag: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchProfileParams {
    #[schemars(description = "Case-insensitive text matched against content, category, and tags")]
    pub query: String,
}
