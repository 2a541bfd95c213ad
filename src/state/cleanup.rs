//! State cleanup: drop finished goals and archived ideas after taking a backup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::types::{GoalStatus, IdeaStatus, State};
use super::{now_millis, StateStore};
use crate::error::AideResult;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleanupOptions {
    pub remove_completed_goals: bool,
    pub remove_archived_goals: bool,
    pub remove_archived_ideas: bool,
    /// Ideas have no `completed` status; this selects archived ideas, same as
    /// `remove_archived_ideas`. Kept for callers that still send it.
    pub remove_completed_ideas: bool,
    /// Only remove items not touched for at least this many days.
    pub older_than_days: Option<u32>,
    pub dry_run: bool,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            remove_completed_goals: true,
            remove_archived_goals: true,
            remove_archived_ideas: true,
            remove_completed_ideas: false,
            older_than_days: None,
            dry_run: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed_goals: Vec<String>,
    pub removed_ideas: Vec<String>,
    pub remaining_goals: usize,
    pub remaining_ideas: usize,
    pub backup_path: Option<PathBuf>,
    pub dry_run: bool,
}

/// `YYYYMMDD-HHMMSS`, used for backup file names.
fn backup_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d-%H%M%S").to_string()
}

/// `<dir>/<prefix>-<timestamp>.<extension>`, with `-2`, `-3`, ... appended
/// when a backup from the same second already exists.
pub fn backup_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = format!("{prefix}-{}", backup_timestamp());
    let mut candidate = dir.join(format!("{stem}.{extension}"));
    let mut n = 2;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}-{n}.{extension}"));
        n += 1;
    }
    candidate
}

fn is_old(timestamp_ms: i64, older_than_days: Option<u32>, now_ms: i64) -> bool {
    match older_than_days {
        None => true,
        Some(days) => now_ms - timestamp_ms >= i64::from(days) * DAY_MS,
    }
}

/// Split `state` into the report of what `options` removes and the cleaned state.
fn plan(state: &State, options: &CleanupOptions, now: i64) -> (CleanupReport, State) {
    let drop_ideas = options.remove_archived_ideas || options.remove_completed_ideas;

    let (removed_goals, kept_goals): (Vec<_>, Vec<_>) =
        state.data.goals.iter().cloned().partition(|g| {
            let eligible = (options.remove_completed_goals && g.status == GoalStatus::Completed)
                || (options.remove_archived_goals && g.status == GoalStatus::Archived);
            eligible && is_old(g.updated_at, options.older_than_days, now)
        });

    let (removed_ideas, kept_ideas): (Vec<_>, Vec<_>) =
        state.data.ideas.iter().cloned().partition(|i| {
            drop_ideas
                && i.status == IdeaStatus::Archived
                && is_old(i.created_at, options.older_than_days, now)
        });

    let report = CleanupReport {
        removed_goals: removed_goals.iter().map(|g| g.id.clone()).collect(),
        removed_ideas: removed_ideas.iter().map(|i| i.id.clone()).collect(),
        remaining_goals: kept_goals.len(),
        remaining_ideas: kept_ideas.len(),
        backup_path: None,
        dry_run: options.dry_run,
    };

    let mut cleaned = state.clone();
    cleaned.data.goals = kept_goals;
    cleaned.data.ideas = kept_ideas;
    (report, cleaned)
}

impl CleanupReport {
    fn is_noop(&self) -> bool {
        self.removed_goals.is_empty() && self.removed_ideas.is_empty()
    }
}

pub fn cleanup_state(
    store: &StateStore,
    backups_dir: &Path,
    options: &CleanupOptions,
) -> AideResult<CleanupReport> {
    if options.remove_completed_ideas {
        tracing::warn!("remove_completed_ideas selects archived ideas; ideas have no completed status");
    }

    let (preview, _) = plan(&store.get(), options, now_millis());
    if options.dry_run || preview.is_noop() {
        return Ok(preview);
    }

    // Re-plan under the write lock; the backup holds exactly what was cleaned.
    let report = store.modify(|state| {
        let (mut report, cleaned) = plan(state, options, now_millis());
        if report.is_noop() {
            return Ok(report);
        }
        let backup = backup_path(backups_dir, "state", "yaml");
        store.save_copy(state, &backup)?;
        *state = cleaned;
        report.backup_path = Some(backup);
        Ok(report)
    })?;

    if let Some(backup) = &report.backup_path {
        tracing::info!(
            goals = report.removed_goals.len(),
            ideas = report.removed_ideas.len(),
            backup = %backup.display(),
            "state cleaned up"
        );
    }
    Ok(report)
}
