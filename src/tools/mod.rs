pub mod calendar;
pub mod drawings;
pub mod goals;
pub mod ideas;
pub mod media;
pub mod notes;
pub mod profile;
pub mod state;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

use calendar::{CreateEventParams, DeleteEventParams, ListEventsParams, UpdateEventParams};
use drawings::{
    AppendElementsParams, CreateDrawingParams, DrawingNameParams, ReadDrawingParams,
    ReadLibraryParams, UpdateDesignSystemParams,
};
use goals::{
    AddKeyResultParams, CreateGoalParams, DeleteKeyResultParams, GoalIdParams, ListGoalsParams,
    UpdateGoalParams, UpdateKeyResultParams,
};
use ideas::{CreateIdeaParams, IdeaIdParams, ListIdeasParams, PromoteIdeaParams, UpdateIdeaParams};
use media::{DownloadMediaParams, RunShortcutParams};
use notes::{MoveNoteParams, NotePathParams, WriteNoteParams};
use profile::{
    AddProfileItemParams, ListProfileItemsParams, ProfileItemIdParams, SearchProfileParams,
    UpdateProfileItemParams,
};
use state::{CleanupStateParams, ClearAuditLogParams, GetStateParams, UpdateSettingsParams};

use crate::audit::AuditLevel;
use crate::calendar::CalendarClient;
use crate::commands::{media_download_args, run_command, shortcut_args};
use crate::drawing::MergeOptions;
use crate::error::{AideError, AideResult};
use crate::services::{create_goal_with_event, Services};
use crate::state::cleanup::{cleanup_state, CleanupOptions};
use crate::state::goals as goal_ops;
use crate::state::ideas as idea_ops;
use crate::{profile as profile_ops, state as state_ops};

const DEFAULT_EVENT_DAYS: u32 = 7;
const DEFAULT_EVENT_LIMIT: u32 = 25;

/// Uniform result envelope returned by every tool.
#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl ToolResponse {
    pub fn success(message: Option<String>, data: Value) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn failure(error: &AideError) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"response serialization failed: {e}"}}"#)
        })
    }
}

fn request_of<P: Serialize>(params: &P) -> Value {
    serde_json::to_value(params).unwrap_or(Value::Null)
}

/// The aide MCP tool handler. Holds the opened stores and collaborators and
/// exposes every tool via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct AideTools {
    tool_router: ToolRouter<Self>,
    services: Arc<Services>,
}

impl AideTools {
    /// Run store work off the async runtime.
    async fn blocking<T, F>(&self, work: F) -> AideResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Services) -> AideResult<T> + Send + 'static,
    {
        let services = Arc::clone(&self.services);
        tokio::task::spawn_blocking(move || work(&services))
            .await
            .map_err(|e| AideError::Task(e.to_string()))?
    }

    /// Convert an outcome into the response envelope and append it to the audit log.
    fn finish<T: Serialize>(
        &self,
        operation: &str,
        request: Value,
        outcome: AideResult<T>,
        message: impl FnOnce(&T) -> String,
    ) -> Result<String, String> {
        let outcome = outcome.and_then(|data| {
            let message = message(&data);
            Ok((message, serde_json::to_value(&data)?))
        });
        match outcome {
            Ok((message, data)) => {
                tracing::debug!(operation, "tool succeeded");
                self.services
                    .audit
                    .record(AuditLevel::Info, operation, &request, &json!({ "message": message }));
                Ok(ToolResponse::success(Some(message), data).to_json())
            }
            Err(err) => {
                tracing::warn!(operation, kind = err.kind(), error = %err, "tool failed");
                self.services.audit.record(
                    AuditLevel::Error,
                    operation,
                    &request,
                    &json!({ "kind": err.kind(), "error": err.to_string() }),
                );
                Err(ToolResponse::failure(&err).to_json())
            }
        }
    }
}

#[tool_router]
impl AideTools {
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            services,
        }
    }

    // ---- state ----

    #[tool(description = "Read the state document (goals, ideas, settings), optionally a single section.")]
    async fn get_state(&self, Parameters(params): Parameters<GetStateParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                let loaded = s.state.load();
                let data = loaded.document.data;
                let value = match params.section.as_deref() {
                    None => serde_json::to_value(&data)?,
                    Some("goals") => serde_json::to_value(&data.goals)?,
                    Some("ideas") => serde_json::to_value(&data.ideas)?,
                    Some("settings") => serde_json::to_value(&data.settings)?,
                    Some(other) => {
                        return Err(AideError::InvalidFormat(format!("unknown state section: {other}")))
                    }
                };
                Ok((value, loaded.recovered))
            })
            .await;
        let recovered = matches!(outcome, Ok((_, true)));
        self.finish("get_state", request, outcome.map(|(value, _)| value), |_| {
            if recovered {
                "State file was unreadable; showing defaults".into()
            } else {
                "State loaded".into()
            }
        })
    }

    #[tool(description = "Update assistant settings (currency).")]
    async fn update_settings(
        &self,
        Parameters(params): Parameters<UpdateSettingsParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| state_ops::update_settings(&s.state, &params.currency))
            .await;
        self.finish("update_settings", request, outcome, |s| {
            format!("Currency set to {}", s.currency)
        })
    }

    #[tool(description = "Remove completed/archived goals and archived ideas. A backup of the full state is written first.")]
    async fn cleanup_state(
        &self,
        Parameters(params): Parameters<CleanupStateParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let options = CleanupOptions::from(params);
        let outcome = self
            .blocking(move |s| cleanup_state(&s.state, &s.backups_dir(), &options))
            .await;
        self.finish("cleanup_state", request, outcome, |r| {
            let verb = if r.dry_run { "Would remove" } else { "Removed" };
            format!("{verb} {} goals and {} ideas", r.removed_goals.len(), r.removed_ideas.len())
        })
    }

    #[tool(description = "Move the audit log to the backups directory and start a new one. Requires confirm=true.")]
    async fn clear_audit_log(
        &self,
        Parameters(params): Parameters<ClearAuditLogParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = if params.confirm {
            self.blocking(|s| s.audit.rotate(&s.backups_dir())).await
        } else {
            Err(AideError::InvalidFormat("confirm must be true to clear the audit log".into()))
        };
        self.finish("clear_audit_log", request, outcome, |backup: &Option<PathBuf>| match backup {
            Some(path) => format!("Audit log moved to {}", path.display()),
            None => "Audit log was empty".into(),
        })
    }

    // ---- goals ----

    #[tool(description = "Create a goal with optional key results. Give start_time to also create a linked calendar event.")]
    async fn create_goal(&self, Parameters(params): Parameters<CreateGoalParams>) -> Result<String, String> {
        let request = request_of(&params);
        let (goal, event) = params.into_input();
        let outcome = match event {
            None => self.blocking(move |s| goal_ops::create_goal(&s.state, goal)).await,
            Some(event) => {
                create_goal_with_event(&self.services.state, &self.services.calendar, goal, Some(event)).await
            }
        };
        self.finish("create_goal", request, outcome, |g| format!("Goal {} created", g.id))
    }

    #[tool(description = "Update a goal's title, description, category, status, or referenced notes.")]
    async fn update_goal(&self, Parameters(params): Parameters<UpdateGoalParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.into_update() {
            Ok((id, update)) => self.blocking(move |s| goal_ops::update_goal(&s.state, &id, update)).await,
            Err(err) => Err(err),
        };
        self.finish("update_goal", request, outcome, |g| format!("Goal {} updated", g.id))
    }

    #[tool(description = "Delete a goal and its key results.")]
    async fn delete_goal(&self, Parameters(params): Parameters<GoalIdParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| goal_ops::delete_goal(&s.state, &params.id))
            .await;
        self.finish("delete_goal", request, outcome, |g| format!("Goal {} deleted", g.id))
    }

    #[tool(description = "List goals, optionally filtered by status and category.")]
    async fn list_goals(&self, Parameters(params): Parameters<ListGoalsParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.into_filter() {
            Ok(filter) => self.blocking(move |s| Ok(goal_ops::list_goals(&s.state, &filter))).await,
            Err(err) => Err(err),
        };
        self.finish("list_goals", request, outcome, |l| format!("{} goals", l.total))
    }

    #[tool(description = "Add a key result to a goal. Key result ids are unique across all goals.")]
    async fn add_key_result(
        &self,
        Parameters(params): Parameters<AddKeyResultParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                goal_ops::add_key_result(&s.state, &params.goal_id, params.key_result.into())
                    .map(|(_, kr)| kr)
            })
            .await;
        self.finish("add_key_result", request, outcome, |kr| {
            format!("Key result {} added", kr.id)
        })
    }

    #[tool(description = "Update a key result's progress, target, or status.")]
    async fn update_key_result(
        &self,
        Parameters(params): Parameters<UpdateKeyResultParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.into_update() {
            Ok((goal_id, kr_id, update)) => {
                self.blocking(move |s| goal_ops::update_key_result(&s.state, &goal_id, &kr_id, update))
                    .await
            }
            Err(err) => Err(err),
        };
        self.finish("update_key_result", request, outcome, |g| {
            format!("Goal {} updated", g.id)
        })
    }

    #[tool(description = "Remove a key result from a goal.")]
    async fn delete_key_result(
        &self,
        Parameters(params): Parameters<DeleteKeyResultParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                goal_ops::delete_key_result(&s.state, &params.goal_id, &params.key_result_id)
            })
            .await;
        self.finish("delete_key_result", request, outcome, |g| {
            format!("Key result removed from goal {}", g.id)
        })
    }

    // ---- ideas ----

    #[tool(description = "Capture an idea with optional category, tags, priority, and related goal.")]
    async fn create_idea(&self, Parameters(params): Parameters<CreateIdeaParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.into_input() {
            Ok(input) => self.blocking(move |s| idea_ops::create_idea(&s.state, input)).await,
            Err(err) => Err(err),
        };
        self.finish("create_idea", request, outcome, |i| format!("Idea {} created", i.id))
    }

    #[tool(description = "Update an idea's content, category, tags, status, priority, or related goal.")]
    async fn update_idea(&self, Parameters(params): Parameters<UpdateIdeaParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.into_update() {
            Ok((id, update)) => self.blocking(move |s| idea_ops::update_idea(&s.state, &id, update)).await,
            Err(err) => Err(err),
        };
        self.finish("update_idea", request, outcome, |i| format!("Idea {} updated", i.id))
    }

    #[tool(description = "Delete an idea.")]
    async fn delete_idea(&self, Parameters(params): Parameters<IdeaIdParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| idea_ops::delete_idea(&s.state, &params.id))
            .await;
        self.finish("delete_idea", request, outcome, |i| format!("Idea {} deleted", i.id))
    }

    #[tool(description = "List ideas, optionally filtered by status, category, and tag.")]
    async fn list_ideas(&self, Parameters(params): Parameters<ListIdeasParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.into_filter() {
            Ok(filter) => self.blocking(move |s| Ok(idea_ops::list_ideas(&s.state, &filter))).await,
            Err(err) => Err(err),
        };
        self.finish("list_ideas", request, outcome, |l| format!("{} ideas", l.total))
    }

    #[tool(description = "Turn an idea into a new goal. The idea becomes actionable and is linked to the goal.")]
    async fn promote_idea(&self, Parameters(params): Parameters<PromoteIdeaParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| idea_ops::promote_idea(&s.state, &params.id, params.title))
            .await;
        self.finish("promote_idea", request, outcome, |p| {
            format!("Idea {} promoted to goal {}", p.idea.id, p.goal.id)
        })
    }

    // ---- profile ----

    #[tool(description = "Read the full user profile.")]
    async fn get_profile(&self) -> Result<String, String> {
        let outcome = self.blocking(|s| Ok(s.profile.get())).await;
        self.finish("get_profile", Value::Null, outcome, |p| {
            format!("{} profile items", p.items.len())
        })
    }

    #[tool(description = "Remember a fact about the user under a category.")]
    async fn add_profile_item(
        &self,
        Parameters(params): Parameters<AddProfileItemParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| profile_ops::add_profile_item(&s.profile, params.into()))
            .await;
        self.finish("add_profile_item", request, outcome, |i| {
            format!("Profile item {} added", i.id)
        })
    }

    #[tool(description = "Update a profile item. Metadata is merged; a null value removes a key.")]
    async fn update_profile_item(
        &self,
        Parameters(params): Parameters<UpdateProfileItemParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let (id, update) = params.into_update();
        let outcome = self
            .blocking(move |s| profile_ops::update_profile_item(&s.profile, &id, update))
            .await;
        self.finish("update_profile_item", request, outcome, |i| {
            format!("Profile item {} updated", i.id)
        })
    }

    #[tool(description = "Delete a profile item.")]
    async fn delete_profile_item(
        &self,
        Parameters(params): Parameters<ProfileItemIdParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| profile_ops::delete_profile_item(&s.profile, &params.id))
            .await;
        self.finish("delete_profile_item", request, outcome, |i| {
            format!("Profile item {} deleted", i.id)
        })
    }

    #[tool(description = "List profile items, optionally filtered by category and tag.")]
    async fn list_profile_items(
        &self,
        Parameters(params): Parameters<ListProfileItemsParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                Ok(profile_ops::list_profile_items(
                    &s.profile,
                    params.category.as_deref(),
                    params.tag.as_deref(),
                ))
            })
            .await;
        self.finish("list_profile_items", request, outcome, |l| {
            format!("{} profile items", l.total)
        })
    }

    #[tool(description = "Search profile items by text (case-insensitive).")]
    async fn search_profile(
        &self,
        Parameters(params): Parameters<SearchProfileParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| Ok(profile_ops::search_profile(&s.profile, &params.query)))
            .await;
        self.finish("search_profile", request, outcome, |l| format!("{} matches", l.total))
    }

    // ---- drawings ----

    #[tool(description = "Create an empty Excalidraw drawing.")]
    async fn create_drawing(
        &self,
        Parameters(params): Parameters<CreateDrawingParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let name = params.name.clone();
        let outcome = self
            .blocking(move |s| s.drawings.create(&params.name, params.title))
            .await;
        self.finish("create_drawing", request, outcome, |_| format!("Drawing {name} created"))
    }

    #[tool(description = "Read a drawing. By default fields equal to their defaults are omitted.")]
    async fn read_drawing(&self, Parameters(params): Parameters<ReadDrawingParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                if params.compressed.unwrap_or(true) {
                    s.drawings.read_compressed(&params.name)
                } else {
                    s.drawings.read(&params.name)
                }
            })
            .await;
        self.finish("read_drawing", request, outcome, |d| {
            format!("{} elements", d.elements.len())
        })
    }

    #[tool(description = "Append elements to a drawing. Missing style fields come from the design system.")]
    async fn append_elements(
        &self,
        Parameters(params): Parameters<AppendElementsParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let options = MergeOptions {
            regenerate_ids: params.regenerate_ids.unwrap_or(true),
        };
        let outcome = self
            .blocking(move |s| {
                s.drawings
                    .append_elements(&params.name, params.elements, &s.design, options)
            })
            .await;
        self.finish("append_elements", request, outcome, |r| {
            format!("Added {} elements to {}", r.added_ids.len(), r.name)
        })
    }

    #[tool(description = "Summarize a drawing: element count, counts per type, and bounding box.")]
    async fn drawing_summary(
        &self,
        Parameters(params): Parameters<DrawingNameParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| s.drawings.summary(&params.name))
            .await;
        self.finish("drawing_summary", request, outcome, |summary| {
            format!("{} elements", summary.total)
        })
    }

    #[tool(description = "List drawings with their titles and element counts.")]
    async fn list_drawings(&self) -> Result<String, String> {
        let outcome = self.blocking(|s| s.drawings.list()).await;
        self.finish("list_drawings", Value::Null, outcome, |l| format!("{} drawings", l.len()))
    }

    #[tool(description = "Delete a drawing file.")]
    async fn delete_drawing(
        &self,
        Parameters(params): Parameters<DrawingNameParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let name = params.name.clone();
        let outcome = self
            .blocking(move |s| s.drawings.delete(&params.name).map(|()| json!({ "name": params.name })))
            .await;
        self.finish("delete_drawing", request, outcome, |_| format!("Drawing {name} deleted"))
    }

    #[tool(description = "Read an Excalidraw library. Legacy libraries are normalized to libraryItems.")]
    async fn read_library(&self, Parameters(params): Parameters<ReadLibraryParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| s.drawings.read_library(&params.name))
            .await;
        self.finish("read_library", request, outcome, |l| {
            format!("{} library items", l.library_items.len())
        })
    }

    #[tool(description = "Read the design system: the style defaults applied to new elements.")]
    async fn get_design_system(&self) -> Result<String, String> {
        let outcome = self.blocking(|s| s.design.get()).await;
        self.finish("get_design_system", Value::Null, outcome, |d| {
            format!("Design system version {}", d.version)
        })
    }

    #[tool(description = "Set one design-system default, e.g. key='strokeColor' value='#1971c2'.")]
    async fn update_design_system(
        &self,
        Parameters(params): Parameters<UpdateDesignSystemParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let key = params.key.clone();
        let outcome = self
            .blocking(move |s| s.design.update(&params.key, params.value))
            .await;
        self.finish("update_design_system", request, outcome, |_| format!("{key} updated"))
    }

    // ---- notes ----

    #[tool(description = "Write a markdown note. Give a path, or a title to generate a unique path.")]
    async fn write_note(&self, Parameters(params): Parameters<WriteNoteParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                let path = match (params.path, params.title) {
                    (Some(path), _) => path,
                    (None, Some(title)) => s.notes.generate_note_path(&title),
                    (None, None) => {
                        return Err(AideError::InvalidFormat("write_note needs a path or a title".into()))
                    }
                };
                s.notes.write_note(&path, &params.content)?;
                Ok(json!({ "path": path }))
            })
            .await;
        self.finish("write_note", request, outcome, |v| {
            format!("Note written to {}", v["path"].as_str().unwrap_or_default())
        })
    }

    #[tool(description = "Read a markdown note.")]
    async fn read_note(&self, Parameters(params): Parameters<NotePathParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self.blocking(move |s| s.notes.read_note(&params.path)).await;
        self.finish("read_note", request, outcome, |n| format!("Read {}", n.path))
    }

    #[tool(description = "Delete a markdown note.")]
    async fn delete_note(&self, Parameters(params): Parameters<NotePathParams>) -> Result<String, String> {
        let request = request_of(&params);
        let path = params.path.clone();
        let outcome = self
            .blocking(move |s| s.notes.delete_note(&params.path).map(|()| json!({ "path": params.path })))
            .await;
        self.finish("delete_note", request, outcome, |_| format!("Deleted {path}"))
    }

    #[tool(description = "Move or rename a markdown note.")]
    async fn move_note(&self, Parameters(params): Parameters<MoveNoteParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .blocking(move |s| {
                s.notes.move_note(&params.old_path, &params.new_path)?;
                Ok(json!({ "from": params.old_path, "to": params.new_path }))
            })
            .await;
        self.finish("move_note", request, outcome, |_| "Note moved".into())
    }

    #[tool(description = "List every markdown note path.")]
    async fn list_notes(&self) -> Result<String, String> {
        let outcome = self.blocking(|s| s.notes.list_notes()).await;
        self.finish("list_notes", Value::Null, outcome, |n| format!("{} notes", n.len()))
    }

    // ---- calendar ----

    #[tool(description = "Create a calendar event. Times use DD-MM-YYYY HH-MM; give end_time or duration ('2h', '30m').")]
    async fn create_event(&self, Parameters(params): Parameters<CreateEventParams>) -> Result<String, String> {
        let request = request_of(&params);
        let (event, goal_id) = params.into_event();
        let outcome = self.create_event_for(event, goal_id).await;
        self.finish("create_event", request, outcome, |h| format!("Event {} created", h.id))
    }

    #[tool(description = "Update a calendar event's title, description, or timing.")]
    async fn update_event(&self, Parameters(params): Parameters<UpdateEventParams>) -> Result<String, String> {
        let request = request_of(&params);
        let (event_id, patch) = params.into_patch();
        let outcome = self.services.calendar.update_event(&event_id, patch).await;
        self.finish("update_event", request, outcome, |h| format!("Event {} updated", h.id))
    }

    #[tool(description = "Delete a calendar event.")]
    async fn delete_event(&self, Parameters(params): Parameters<DeleteEventParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = match params.send_updates() {
            Ok(send_updates) => {
                self.services
                    .calendar
                    .delete_event(&params.event_id, send_updates)
                    .await
            }
            Err(err) => Err(err),
        };
        self.finish("delete_event", request, outcome, |o| {
            if o.is_recurring_master {
                "Recurring series deleted".into()
            } else {
                "Event deleted".into()
            }
        })
    }

    #[tool(description = "List upcoming calendar events.")]
    async fn list_events(&self, Parameters(params): Parameters<ListEventsParams>) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self
            .services
            .calendar
            .list_events(
                params.days.unwrap_or(DEFAULT_EVENT_DAYS),
                params.max_results.unwrap_or(DEFAULT_EVENT_LIMIT),
            )
            .await;
        self.finish("list_events", request, outcome, |events| {
            format!("{} events", events.len())
        })
    }

    // ---- media & shortcuts ----

    #[tool(description = "Download a video or its audio with the configured downloader.")]
    async fn download_media(
        &self,
        Parameters(params): Parameters<DownloadMediaParams>,
    ) -> Result<String, String> {
        let request = request_of(&params);
        let outcome = self.download(params).await;
        self.finish("download_media", request, outcome, |_| "Download finished".into())
    }

    #[tool(description = "Run a named automation shortcut, optionally with input and output files.")]
    async fn run_shortcut(&self, Parameters(params): Parameters<RunShortcutParams>) -> Result<String, String> {
        let request = request_of(&params);
        let name = params.name.clone();
        let outcome = async {
            let args = shortcut_args(
                &params.name,
                params.input_path.as_deref().map(std::path::Path::new),
                params.output_path.as_deref().map(std::path::Path::new),
            )?;
            run_command(&self.services.config.shortcuts.runner, &args).await
        }
        .await;
        self.finish("run_shortcut", request, outcome, |_| format!("Shortcut {name} finished"))
    }
}

impl AideTools {
    async fn create_event_for(
        &self,
        event: crate::calendar::NewEvent,
        goal_id: Option<String>,
    ) -> AideResult<crate::calendar::EventHandle> {
        if let Some(goal_id) = goal_id.clone() {
            self.blocking(move |s| {
                s.state
                    .get()
                    .goal(&goal_id)
                    .map(|_| ())
                    .ok_or_else(|| AideError::NotFound(format!("goal {goal_id}")))
            })
            .await?;
        }
        let handle = self.services.calendar.create_event(event).await?;
        if let Some(goal_id) = goal_id {
            let (event_id, link) = (handle.id.clone(), handle.html_link.clone());
            self.blocking(move |s| {
                state_ops::goals::link_goal_event(&s.state, &goal_id, &event_id, link.as_deref())
            })
            .await?;
        }
        Ok(handle)
    }

    async fn download(&self, params: DownloadMediaParams) -> AideResult<crate::commands::CommandOutput> {
        let config = &self.services.config;
        let request = params.into_request(&config.media.default_format)?;
        let output_dir = config.media_output_dir();
        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| AideError::io(&output_dir, e))?;
        let args = media_download_args(&request, &output_dir)?;
        run_command(&config.media.downloader, &args).await
    }
}

#[tool_handler]
impl ServerHandler for AideTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "aide is a personal assistant server. Goals, ideas, and settings live in the \
                 state document (get_state, create_goal, create_idea, ...); facts about the \
                 user in the profile (get_profile, add_profile_item); diagrams in Excalidraw \
                 drawings (create_drawing, append_elements, read_drawing); plus notes, \
                 calendar events, media downloads, and shortcuts. Every tool returns \
                 {success, message, data | error, timestamp}."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
