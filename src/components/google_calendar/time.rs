use super::models::CalendarEvent;
use crate::error::{google_calendar_error, SyncResult};
use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;

/// Get event start time as DateTime
pub fn get_event_start(event: &CalendarEvent) -> SyncResult<Option<DateTime<FixedOffset>>> {
    match &event.start_date_time {
        Some(start_time) => DateTime::parse_from_rfc3339(start_time)
            .map(Some)
            .map_err(|e| google_calendar_error(&format!("Failed to parse datetime: {}", e))),
        None => Ok(None),
    }
}

/// Calendar date the event starts on, as seen in `tz`
pub fn get_event_start_date(event: &CalendarEvent, tz: Tz) -> SyncResult<Option<NaiveDate>> {
    if let Some(start) = get_event_start(event)? {
        Ok(Some(start.with_timezone(&tz).date_naive()))
    } else if let Some(start_date) = &event.start_date {
        let date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
            .map_err(|e| google_calendar_error(&format!("Failed to parse date: {}", e)))?;
        Ok(Some(date))
    } else {
        Ok(None)
    }
}
