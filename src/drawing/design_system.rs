//! Design-system defaults: the baseline style applied to new elements.
//!
//! The document lives next to the drawings and is created with the baseline
//! on first use. It is re-read on every call so edits made between calls,
//! by a tool or by hand, take effect immediately.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::error::{AideError, AideResult};
use crate::store::{Document, DocumentStore};

pub const DESIGN_SYSTEM_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSystem {
    pub version: u32,
    pub defaults: StyleDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleDefaults {
    pub stroke_color: String,
    pub background_color: String,
    pub fill_style: String,
    pub stroke_width: f64,
    pub stroke_style: String,
    pub roughness: f64,
    pub opacity: f64,
    pub roundness: Option<Value>,
    pub font_size: f64,
    pub font_family: u32,
    pub text_align: String,
    pub vertical_align: String,
}

/// Style keys that only apply to text elements.
pub const TEXT_ONLY_KEYS: [&str; 4] = ["fontSize", "fontFamily", "textAlign", "verticalAlign"];

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".into(),
            background_color: "transparent".into(),
            fill_style: "solid".into(),
            stroke_width: 2.0,
            stroke_style: "solid".into(),
            roughness: 0.0,
            opacity: 100.0,
            roundness: Some(json!({"type": 1})),
            font_size: 20.0,
            font_family: 1,
            text_align: "left".into(),
            vertical_align: "top".into(),
        }
    }
}

impl Default for DesignSystem {
    fn default() -> Self {
        Self {
            version: DESIGN_SYSTEM_VERSION,
            defaults: StyleDefaults::default(),
        }
    }
}

impl Document for DesignSystem {
    fn validate(&self) -> AideResult<()> {
        let d = &self.defaults;
        if !(0.0..=100.0).contains(&d.opacity) {
            return Err(AideError::SchemaValidation("opacity must be within 0-100".into()));
        }
        if d.stroke_width <= 0.0 {
            return Err(AideError::SchemaValidation("strokeWidth must be positive".into()));
        }
        if d.font_size <= 0.0 {
            return Err(AideError::SchemaValidation("fontSize must be positive".into()));
        }
        Ok(())
    }
}

pub struct DesignSystemStore {
    store: DocumentStore<DesignSystem>,
}

impl DesignSystemStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            store: DocumentStore::new(path.as_ref(), DesignSystem::default()),
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Current design system, writing the baseline file if none exists.
    pub fn get(&self) -> AideResult<DesignSystem> {
        if !self.store.path().exists() {
            // Re-reads under the write lock, so a concurrent update is kept.
            let current = self.store.modify(|doc| Ok(doc.clone()))?;
            tracing::info!(path = %self.store.path().display(), "design system created");
            return Ok(current);
        }
        Ok(self.store.get())
    }

    /// Set one style default, e.g. `("strokeColor", "#1971c2")`.
    pub fn update(&self, key: &str, value: Value) -> AideResult<DesignSystem> {
        self.get()?;
        let known = serde_json::to_value(StyleDefaults::default())?;
        if known.get(key).is_none() {
            return Err(AideError::NotFound(format!("design system key {key}")));
        }
        self.store.update(json!({ "defaults": { key: value } }))
    }

    pub fn validate_file(&self) -> AideResult<Option<DesignSystem>> {
        self.store.validate_file()
    }
}
