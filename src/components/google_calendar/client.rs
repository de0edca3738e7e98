use super::models::{CalendarEvent, EventPayload, GoogleEvent, GoogleEventList};
use super::token::CredentialProvider;
use crate::error::{auth_error, config_error, google_calendar_error, SyncResult};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Operations the reconciler needs from a calendar
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// Entries starting at or after `time_min`
    async fn list_upcoming(&self, time_min: DateTime<Utc>) -> SyncResult<Vec<CalendarEvent>>;

    /// Overwrite the entry `id`
    async fn update_event(&self, id: &str, payload: &EventPayload) -> SyncResult<CalendarEvent>;

    /// Create a new entry
    async fn insert_event(&self, payload: &EventPayload) -> SyncResult<CalendarEvent>;
}

/// Google Calendar v3 REST client for a single calendar
pub struct GoogleCalendarClient {
    client: Client,
    events_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl GoogleCalendarClient {
    pub fn new(
        api_base: &str,
        calendar_id: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> SyncResult<Self> {
        let mut events_url = Url::parse(api_base)
            .map_err(|e| config_error(&format!("Invalid calendar API base {}: {}", api_base, e)))?;
        events_url
            .path_segments_mut()
            .map_err(|_| config_error(&format!("Calendar API base {} cannot be a base", api_base)))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);

        Ok(Self {
            client: Client::new(),
            events_url,
            credentials,
        })
    }

    fn event_url(&self, id: &str) -> Url {
        let mut url = self.events_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url
    }

    async fn authorized(&self, request: RequestBuilder) -> SyncResult<RequestBuilder> {
        let access_token = self.credentials.access_token().await?;
        Ok(request.bearer_auth(access_token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> SyncResult<T> {
        let response = self.authorized(request).await?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            let message = format!("Failed to {}: HTTP {} - {}", action, status, error_body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => auth_error(&message),
                _ => google_calendar_error(&message),
            });
        }

        // A cut-off body surfaces as a network error; a complete but invalid one does not
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            google_calendar_error(&format!("Failed to parse {} response: {}", action, e))
        })
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_upcoming(&self, time_min: DateTime<Utc>) -> SyncResult<Vec<CalendarEvent>> {
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url.clone();
            url.query_pairs_mut().append_pair("timeMin", &time_min);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: GoogleEventList = self.send(self.client.get(url), "list events").await?;
            debug!("Fetched {} calendar entries", page.items.len());
            events.extend(page.items.into_iter().map(CalendarEvent::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!("Found {} upcoming calendar entries", events.len());
        Ok(events)
    }

    async fn update_event(&self, id: &str, payload: &EventPayload) -> SyncResult<CalendarEvent> {
        let request = self.client.put(self.event_url(id)).json(payload);
        let event: GoogleEvent = self.send(request, "update event").await?;
        Ok(event.into())
    }

    async fn insert_event(&self, payload: &EventPayload) -> SyncResult<CalendarEvent> {
        let request = self.client.post(self.events_url.clone()).json(payload);
        let event: GoogleEvent = self.send(request, "insert event").await?;
        Ok(event.into())
    }
}
