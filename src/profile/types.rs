use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{AideError, AideResult};
use crate::store::strip::EntityKind;
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub version: String,
    #[serde(default)]
    pub items: Vec<ProfileItem>,
}

/// One fact about the user: a preference, a habit, a detail worth remembering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileItem {
    pub id: String,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub ref_notes: Vec<String>,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl Profile {
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            items: Vec::new(),
        }
    }
}

impl Document for Profile {
    fn validate(&self) -> AideResult<()> {
        if self.version.trim().is_empty() {
            return Err(AideError::SchemaValidation("profile version must not be empty".into()));
        }
        let mut ids = HashSet::new();
        for item in &self.items {
            if !ids.insert(item.id.as_str()) {
                return Err(AideError::SchemaValidation(format!(
                    "duplicate profile item id: {}",
                    item.id
                )));
            }
            if item.category.trim().is_empty() || item.content.trim().is_empty() {
                return Err(AideError::SchemaValidation(format!(
                    "profile item {} needs a category and content",
                    item.id
                )));
            }
        }
        Ok(())
    }
}

/// Profile items carry no defaulted scalars; stripping only removes
/// empty lists, empty metadata, and unset options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEntity {
    Root,
    Item,
}

impl EntityKind for ProfileEntity {
    fn default_for(self, _field: &str) -> Option<Value> {
        None
    }

    fn child(self, field: &str) -> Option<Self> {
        match (self, field) {
            (Self::Root, "items") => Some(Self::Item),
            _ => None,
        }
    }
}
