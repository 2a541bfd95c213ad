//! Calendar collaborator: a small async interface over a remote calendar,
//! plus parsing of the human-entry time format used by the tools.

pub mod http;
pub mod time;

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::AideResult;

pub use http::HttpCalendarClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a date instead of a date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub recurring_event_id: Option<String>,
    #[serde(default)]
    pub recurrence: Vec<String>,
}

/// A new event in human-entry form. Times are `DD-MM-YYYY HH-MM`; the end is
/// either explicit, derived from `duration` (`<N>h` / `<N>m`), or the
/// configured default duration.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub timezone: Option<String>,
}

impl NewEvent {
    /// Parse the start and any explicit end or duration without contacting
    /// the calendar. An event with neither uses the client's default duration.
    pub fn check_times(&self) -> AideResult<()> {
        let start = time::parse_human_time(&self.start_time)?;
        if let Some(end) = &self.end_time {
            time::resolve_end(start, Some(end), None, "")?;
        } else if let Some(duration) = &self.duration {
            time::resolve_end(start, None, Some(duration), "")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHandle {
    pub id: String,
    pub html_link: Option<String>,
    pub event: CalendarEvent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendUpdates {
    All,
    ExternalOnly,
    #[default]
    None,
}

impl SendUpdates {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ExternalOnly => "externalOnly",
            Self::None => "none",
        }
    }
}

impl std::str::FromStr for SendUpdates {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "externalOnly" | "external_only" => Ok(Self::ExternalOnly),
            "none" => Ok(Self::None),
            _ => Err(format!("unknown sendUpdates value: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    /// The deleted event is one instance of a recurring series.
    pub is_recurring: bool,
    /// The deleted event was the series itself.
    pub is_recurring_master: bool,
}

pub trait CalendarClient: Send + Sync {
    fn create_event(&self, event: NewEvent) -> impl Future<Output = AideResult<EventHandle>> + Send;

    fn update_event(
        &self,
        event_id: &str,
        patch: EventPatch,
    ) -> impl Future<Output = AideResult<EventHandle>> + Send;

    fn delete_event(
        &self,
        event_id: &str,
        send_updates: SendUpdates,
    ) -> impl Future<Output = AideResult<DeleteOutcome>> + Send;

    /// Upcoming events within `days` from now.
    fn list_events(
        &self,
        days: u32,
        max_results: u32,
    ) -> impl Future<Output = AideResult<Vec<CalendarEvent>>> + Send;
}
