use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::calendar::{EventPatch, NewEvent, SendUpdates};
use crate::error::{AideError, AideResult};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateEventParams {
    pub title: String,

    pub description: Option<String>,

    #[schemars(description = "Start, format DD-MM-YYYY HH-MM")]
    pub start_time: String,

    #[schemars(description = "End, format DD-MM-YYYY HH-MM")]
    pub end_time: Option<String>,

    #[schemars(description = "Duration such as '2h' or '30m', used when end_time is not set")]
    pub duration: Option<String>,

    #[schemars(description = "IANA timezone. Defaults to the configured timezone.")]
    pub timezone: Option<String>,

    #[schemars(description = "Goal to link the new event to")]
    pub goal_id: Option<String>,
}

impl CreateEventParams {
    pub fn into_event(self) -> (NewEvent, Option<String>) {
        (
            NewEvent {
                title: self.title,
                description: self.description,
                start_time: self.start_time,
                end_time: self.end_time,
                duration: self.duration,
                timezone: self.timezone,
            },
            self.goal_id,
        )
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateEventParams {
    pub event_id: String,

    pub title: Option<String>,

    pub description: Option<String>,

    #[schemars(description = "New start, format DD-MM-YYYY HH-MM")]
    pub start_time: Option<String>,

    #[schemars(description = "New end, format DD-MM-YYYY HH-MM")]
    pub end_time: Option<String>,

    pub duration: Option<String>,

    pub timezone: Option<String>,
}

impl UpdateEventParams {
    pub fn into_patch(self) -> (String, EventPatch) {
        (
            self.event_id,
            EventPatch {
                title: self.title,
                description: self.description,
                start_time: self.start_time,
                end_time: self.end_time,
                duration: self.duration,
                timezone: self.timezone,
            },
        )
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteEventParams {
    pub event_id: String,

    #[schemars(description = "Notify guests: 'all', 'externalOnly', or 'none' (default)")]
    pub send_updates: Option<String>,
}

impl DeleteEventParams {
    pub fn send_updates(&self) -> AideResult<SendUpdates> {
        self.send_updates
            .as_deref()
            .map(str::parse::<SendUpdates>)
            .transpose()
            .map(Option::unwrap_or_default)
            .map_err(AideError::InvalidFormat)
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListEventsParams {
    #[schemars(description = "How many days ahead to look (default: 7)")]
    pub days: Option<u32>,

    #[schemars(description = "Maximum number of events (default: 25)")]
    pub max_results: Option<u32>,
}
