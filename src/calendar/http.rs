//! REST client for a Google Calendar v3 style API.

use chrono::{Duration, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::time::{parse_human_time, resolve_end, API_TIME_FORMAT};
use super::{
    CalendarClient, CalendarEvent, DeleteOutcome, EventHandle, EventPatch, NewEvent, SendUpdates,
};
use crate::config::CalendarConfig;
use crate::error::{AideError, AideResult};

pub struct HttpCalendarClient {
    client: reqwest::Client,
    base_url: String,
    calendar_id: String,
    access_token: Option<String>,
    timezone: String,
    default_duration: String,
}

const RFC3339_UTC: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

impl HttpCalendarClient {
    pub fn new(config: &CalendarConfig) -> AideResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AideError::ExternalService(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            access_token: config.access_token.clone(),
            timezone: config.timezone.clone(),
            default_duration: config.default_duration.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    fn token(&self) -> AideResult<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            AideError::ExternalService(
                "calendar access token not configured (set AIDE_CALENDAR_TOKEN)".into(),
            )
        })
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }

    fn event_url(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_url(), urlencoding::encode(event_id))
    }

    fn time_field(&self, at: NaiveDateTime, timezone: Option<&str>) -> Value {
        json!({
            "dateTime": at.format(API_TIME_FORMAT).to_string(),
            "timeZone": timezone.unwrap_or(&self.timezone),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> AideResult<T> {
        let response = request
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| AideError::ExternalService(format!("calendar request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(AideError::ExternalService(format!(
                "calendar API returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AideError::Serialization(format!("failed to parse calendar response: {e}")))
    }

    async fn fetch_event(&self, event_id: &str) -> AideResult<CalendarEvent> {
        self.send(self.client.get(self.event_url(event_id))).await
    }
}

fn handle(event: CalendarEvent) -> EventHandle {
    EventHandle {
        id: event.id.clone(),
        html_link: event.html_link.clone(),
        event,
    }
}

/// Existing event's start as a naive local time, used when a patch changes
/// only the duration or end.
fn event_start(event: &CalendarEvent) -> Option<NaiveDateTime> {
    let raw = event.start.as_ref()?.date_time.as_deref()?;
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, API_TIME_FORMAT))
        .ok()
}

impl CalendarClient for HttpCalendarClient {
    async fn create_event(&self, event: NewEvent) -> AideResult<EventHandle> {
        let start = parse_human_time(&event.start_time)?;
        let end = resolve_end(
            start,
            event.end_time.as_deref(),
            event.duration.as_deref(),
            &self.default_duration,
        )?;
        let tz = event.timezone.as_deref();

        let mut body = json!({
            "summary": event.title,
            "start": self.time_field(start, tz),
            "end": self.time_field(end, tz),
        });
        if let Some(description) = event.description {
            body["description"] = Value::String(description);
        }

        let created: CalendarEvent = self
            .send(self.client.post(self.events_url()).json(&body))
            .await?;
        tracing::info!(event_id = %created.id, "calendar event created");
        Ok(handle(created))
    }

    async fn update_event(&self, event_id: &str, patch: EventPatch) -> AideResult<EventHandle> {
        let mut body = Map::new();
        if let Some(title) = patch.title {
            body.insert("summary".into(), Value::String(title));
        }
        if let Some(description) = patch.description {
            body.insert("description".into(), Value::String(description));
        }

        let tz = patch.timezone.as_deref();
        let retimed = patch.start_time.is_some() || patch.end_time.is_some() || patch.duration.is_some();
        if retimed {
            let start = match patch.start_time.as_deref() {
                Some(start) => parse_human_time(start)?,
                None => {
                    let existing = self.fetch_event(event_id).await?;
                    event_start(&existing).ok_or_else(|| {
                        AideError::InvalidFormat(format!("event {event_id} has no timed start"))
                    })?
                }
            };
            let end = resolve_end(
                start,
                patch.end_time.as_deref(),
                patch.duration.as_deref(),
                &self.default_duration,
            )?;
            body.insert("start".into(), self.time_field(start, tz));
            body.insert("end".into(), self.time_field(end, tz));
        }

        let updated: CalendarEvent = self
            .send(self.client.patch(self.event_url(event_id)).json(&body))
            .await?;
        tracing::info!(event_id = %updated.id, "calendar event updated");
        Ok(handle(updated))
    }

    async fn delete_event(&self, event_id: &str, send_updates: SendUpdates) -> AideResult<DeleteOutcome> {
        let existing = self.fetch_event(event_id).await?;
        let outcome = DeleteOutcome {
            is_recurring: existing.recurring_event_id.is_some(),
            is_recurring_master: !existing.recurrence.is_empty(),
        };

        let response = self
            .client
            .delete(self.event_url(event_id))
            .query(&[("sendUpdates", send_updates.as_str())])
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| AideError::ExternalService(format!("calendar request failed: {e}")))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(AideError::ExternalService(format!(
                "calendar API returned {status} deleting {event_id}"
            )));
        }

        tracing::info!(event_id, recurring = outcome.is_recurring, "calendar event deleted");
        Ok(outcome)
    }

    async fn list_events(&self, days: u32, max_results: u32) -> AideResult<Vec<CalendarEvent>> {
        let now = Utc::now();
        let until = now + Duration::days(i64::from(days));
        let request = self.client.get(self.events_url()).query(&[
            ("timeMin", now.format(RFC3339_UTC).to_string()),
            ("timeMax", until.format(RFC3339_UTC).to_string()),
            ("maxResults", max_results.max(1).to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ]);
        let list: EventList = self.send(request).await?;
        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_percent_encoded_in_paths() {
        let config = CalendarConfig {
            base_url: "https://cal.example/v3".into(),
            calendar_id: "team@group.calendar".into(),
            ..CalendarConfig::default()
        };
        let client = HttpCalendarClient::new(&config).unwrap();
        assert_eq!(
            client.event_url("a/b c"),
            "https://cal.example/v3/calendars/team%40group.calendar/events/a%2Fb%20c"
        );
    }

    #[test]
    fn urls_are_built_from_config() {
        let config = CalendarConfig {
            base_url: "https://cal.example/v3/".into(),
            ..CalendarConfig::default()
        };
        let client = HttpCalendarClient::new(&config).unwrap();
        assert_eq!(client.events_url(), "https://cal.example/v3/calendars/primary/events");
        assert_eq!(client.event_url("abc"), "https://cal.example/v3/calendars/primary/events/abc");
        assert!(!client.is_configured());
    }

    #[test]
    fn reads_existing_start() {
        let event: CalendarEvent = serde_json::from_value(json!({
            "id": "e1",
            "start": {"dateTime": "2026-10-16T09:30:00+02:00"}
        }))
        .unwrap();
        let start = event_start(&event).unwrap();
        assert_eq!(start.format(API_TIME_FORMAT).to_string(), "2026-10-16T09:30:00");
    }

    #[tokio::test]
    async fn missing_token_is_external_service_error() {
        let client = HttpCalendarClient::new(&CalendarConfig::default()).unwrap();
        let err = client.list_events(7, 10).await.unwrap_err();
        assert!(matches!(err, AideError::ExternalService(_)));
    }
}
