use crate::components::event_extractor::Event;
use crate::utils::time::{main_card_description, to_rfc3339_in};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Holds the event link for entries written by this tool
    pub location: Option<String>,
    pub start_date_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date_time: Option<String>,
    pub end_date: Option<String>,
}

/// Start or end of a Google Calendar event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Event resource as returned by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub start: EventDateTime,
    #[serde(default)]
    pub end: EventDateTime,
}

/// One page of `events.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

impl From<GoogleEvent> for CalendarEvent {
    fn from(event: GoogleEvent) -> Self {
        Self {
            id: event.id,
            summary: event.summary,
            description: event.description,
            location: event.location,
            start_date_time: event.start.date_time,
            start_date: event.start.date,
            end_date_time: event.end.date_time,
            end_date: event.end.date,
        }
    }
}

/// Body sent to `events.insert` and `events.update`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

impl EventPayload {
    /// Payload for a scraped event, timestamps rendered in `tz`
    pub fn from_event(event: &Event, tz: Tz) -> Self {
        Self {
            summary: event.name.clone(),
            location: event.link.clone(),
            description: main_card_description(event.main_time),
            start: EventDateTime {
                date_time: Some(to_rfc3339_in(event.calendar_start(), tz)),
                date: None,
            },
            end: EventDateTime {
                date_time: Some(to_rfc3339_in(event.end_time, tz)),
                date: None,
            },
        }
    }
}
