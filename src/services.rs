//! The stores and collaborators a running server works against, opened from
//! one [`AideConfig`].

use serde::Serialize;
use std::path::PathBuf;

use crate::audit::AuditLog;
use crate::calendar::{CalendarClient, HttpCalendarClient, NewEvent};
use crate::config::AideConfig;
use crate::drawing::design_system::DesignSystemStore;
use crate::drawing::DrawingFiles;
use crate::error::AideResult;
use crate::notes::NoteStore;
use crate::profile::{open_profile_store, ProfileStore};
use crate::state::goals::{create_goal, delete_goal, link_goal_event, NewGoal};
use crate::state::types::Objective;
use crate::state::{open_state_store, StateStore};

pub struct Services {
    pub config: AideConfig,
    pub state: StateStore,
    pub profile: ProfileStore,
    pub design: DesignSystemStore,
    pub drawings: DrawingFiles,
    pub notes: NoteStore,
    pub audit: AuditLog,
    pub calendar: HttpCalendarClient,
}

impl Services {
    pub fn open(config: AideConfig) -> AideResult<Self> {
        let calendar = HttpCalendarClient::new(&config.calendar)?;
        let services = Self {
            state: open_state_store(config.state_path(), &config.storage.state_version),
            profile: open_profile_store(config.profile_path(), &config.storage.profile_version),
            design: DesignSystemStore::new(config.design_system_path()),
            drawings: DrawingFiles::new(config.drawings_dir()),
            notes: NoteStore::new(config.notes_dir()),
            audit: AuditLog::new(config.audit_log_path()),
            calendar,
            config,
        };
        tracing::info!(
            data_dir = %services.config.data_dir().display(),
            calendar = services.calendar.is_configured(),
            "services ready"
        );
        Ok(services)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.config.backups_dir()
    }

    /// Strict re-validation of every persisted document.
    pub fn check_health(&self) -> HealthReport {
        let state = check(self.state.validate_file().map(|doc| {
            doc.map(|s| format!("{} goals, {} ideas", s.data.goals.len(), s.data.ideas.len()))
        }));
        let profile = check(
            self.profile
                .validate_file()
                .map(|doc| doc.map(|p| format!("{} items", p.items.len()))),
        );
        let design_system = check(
            self.design
                .validate_file()
                .map(|doc| doc.map(|d| format!("version {}", d.version))),
        );
        let drawings = check(self.drawings.list().map(|l| Some(format!("{} drawings", l.len()))));
        let notes = check(self.notes.list_notes().map(|n| Some(format!("{} notes", n.len()))));

        HealthReport {
            data_dir: self.config.data_dir(),
            state,
            profile,
            design_system,
            drawings,
            notes,
            calendar_configured: self.calendar.is_configured(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub ok: bool,
    pub detail: String,
}

fn check(result: AideResult<Option<String>>) -> CheckResult {
    match result {
        Ok(Some(detail)) => CheckResult { ok: true, detail },
        Ok(None) => CheckResult {
            ok: true,
            detail: "not created yet".into(),
        },
        Err(err) => CheckResult {
            ok: false,
            detail: err.to_string(),
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub data_dir: PathBuf,
    pub state: CheckResult,
    pub profile: CheckResult,
    pub design_system: CheckResult,
    pub drawings: CheckResult,
    pub notes: CheckResult,
    pub calendar_configured: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        [&self.state, &self.profile, &self.design_system, &self.drawings, &self.notes]
            .iter()
            .all(|c| c.ok)
    }
}

/// Create a goal and, when `event` is given, a calendar event linked to it.
/// If the event cannot be created the goal is removed again.
pub async fn create_goal_with_event<C: CalendarClient>(
    state: &StateStore,
    calendar: &C,
    input: NewGoal,
    event: Option<NewEvent>,
) -> AideResult<Objective> {
    let Some(event) = event else {
        return create_goal(state, input);
    };
    event.check_times()?;
    let goal = create_goal(state, input)?;

    match calendar.create_event(event).await {
        Ok(handle) => link_goal_event(state, &goal.id, &handle.id, handle.html_link.as_deref()),
        Err(err) => {
            tracing::warn!(goal = %goal.id, error = %err, "calendar event failed, rolling back goal");
            delete_goal(state, &goal.id)?;
            Err(err)
        }
    }
}
