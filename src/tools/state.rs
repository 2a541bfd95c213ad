use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::cleanup::CleanupOptions;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetStateParams {
    #[schemars(description = "Only return this section: 'goals', 'ideas', or 'settings'")]
    pub section: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateSettingsParams {
    #[schemars(description = "Currency code used for amounts, e.g. 'EUR'")]
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CleanupStateParams {
    #[schemars(description = "Remove goals with status 'completed' (default: true)")]
    pub remove_completed_goals: Option<bool>,

    #[schemars(description = "Remove goals with status 'archived' (default: true)")]
    pub remove_archived_goals: Option<bool>,

    #[schemars(description = "Remove ideas with status 'archived' (default: true)")]
    pub remove_archived_ideas: Option<bool>,

    #[schemars(description = "Alias for remove_archived_ideas; ideas have no completed status (default: false)")]
    pub remove_completed_ideas: Option<bool>,

    #[schemars(description = "Only remove items untouched for at least this many days")]
    pub older_than_days: Option<u32>,

    #[schemars(description = "Report what would be removed without writing (default: false)")]
    pub dry_run: Option<bool>,
}

impl From<CleanupStateParams> for CleanupOptions {
    fn from(p: CleanupStateParams) -> Self {
        let defaults = CleanupOptions::default();
        Self {
            remove_completed_goals: p.remove_completed_goals.unwrap_or(defaults.remove_completed_goals),
            remove_archived_goals: p.remove_archived_goals.unwrap_or(defaults.remove_archived_goals),
            remove_archived_ideas: p.remove_archived_ideas.unwrap_or(defaults.remove_archived_ideas),
            remove_completed_ideas: p.remove_completed_ideas.unwrap_or(defaults.remove_completed_ideas),
            older_than_days: p.older_than_days,
            dry_run: p.dry_run.unwrap_or(defaults.dry_run),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClearAuditLogParams {
    #[schemars(description = "Must be true; the current log is moved to the backups directory")]
    pub confirm: bool,
}
