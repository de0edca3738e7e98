use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fightcal::components::event_extractor::Event;
use fightcal::components::google_calendar::{
    CalendarApi, CredentialProvider, EventPayload, GoogleCalendarClient, StoredToken,
};
use fightcal::error::{Error, SyncResult};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Credentials that never expire
struct StaticCredentials;

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn load(&self) -> SyncResult<StoredToken> {
        Ok(StoredToken {
            access_token: "test-token".to_string(),
            refresh_token: None,
            expires_at: i64::MAX / 2,
        })
    }

    async fn refresh(&self, token: &StoredToken) -> SyncResult<StoredToken> {
        Ok(token.clone())
    }

    async fn persist(&self, _token: &StoredToken) -> SyncResult<()> {
        Ok(())
    }
}

fn client(server: &MockServer) -> GoogleCalendarClient {
    GoogleCalendarClient::new(&server.uri(), "primary", Arc::new(StaticCredentials)).unwrap()
}

fn payload() -> EventPayload {
    let prelims = Utc.with_ymd_and_hms(2025, 4, 12, 22, 0, 0).unwrap();
    let main = Utc.with_ymd_and_hms(2025, 4, 13, 2, 0, 0).unwrap();
    let event = Event::new(
        "UFC-314".to_string(),
        "https://www.ufc.com/event/ufc-314".to_string(),
        prelims,
        main,
    )
    .unwrap();
    EventPayload::from_event(&event, chrono_tz::UTC)
}

#[tokio::test]
async fn test_list_upcoming_follows_pages() {
    let mock_server = MockServer::start().await;
    let time_min = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("pageToken", "page-2"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "e2", "start": { "date": "2025-04-20" }, "end": { "date": "2025-04-21" } }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("timeMin", "2025-04-01T00:00:00Z"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "e1",
                    "summary": "UFC-314",
                    "location": "https://www.ufc.com/event/ufc-314",
                    "start": { "dateTime": "2025-04-12T22:00:00Z" },
                    "end": { "dateTime": "2025-04-13T05:00:00Z" }
                }
            ],
            "nextPageToken": "page-2"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    let events = client(&mock_server).list_upcoming(time_min).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "e1");
    assert_eq!(events[0].location.as_deref(), Some("https://www.ufc.com/event/ufc-314"));
    assert_eq!(events[1].id, "e2");
    assert_eq!(events[1].start_date.as_deref(), Some("2025-04-20"));
}

#[tokio::test]
async fn test_update_puts_payload_to_event() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/abc123"))
        .and(body_json(json!({
            "summary": "UFC-314",
            "location": "https://www.ufc.com/event/ufc-314",
            "description": "The main card starts at: 07:00 PM (Pacific Time)",
            "start": { "dateTime": "2025-04-12T22:00:00+00:00" },
            "end": { "dateTime": "2025-04-13T05:00:00+00:00" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc123" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let updated = client(&mock_server)
        .update_event("abc123", &payload())
        .await
        .unwrap();

    assert_eq!(updated.id, "abc123");
}

#[tokio::test]
async fn test_insert_returns_new_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "fresh-id" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = client(&mock_server).insert_event(&payload()).await.unwrap();

    assert_eq!(created.id, "fresh-id");
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .list_upcoming(Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_malformed_response_is_not_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"kind\": "))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).insert_event(&payload()).await.unwrap_err();

    assert!(matches!(err, Error::GoogleCalendar(_)));
    assert_eq!(err.network_kind(), None);
}

#[tokio::test]
async fn test_server_error_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .update_event("gone", &payload())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GoogleCalendar(msg) if msg.contains("404")));
}
