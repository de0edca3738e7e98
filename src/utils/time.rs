use crate::error::{config_error, SyncResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone the main card description is written in
pub const DESCRIPTION_TZ: Tz = chrono_tz::America::Los_Angeles;

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> SyncResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))
}

/// Parse a Unix-seconds timestamp attribute, `None` for empty or invalid input
pub fn parse_unix_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let seconds = raw.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}

/// Format an instant as RFC 3339 with the offset of `tz`
pub fn to_rfc3339_in(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Calendar date of an instant as seen in `tz`
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Human-readable main card start used as the calendar description
pub fn main_card_description(main_time: DateTime<Utc>) -> String {
    let pacific = main_time.with_timezone(&DESCRIPTION_TZ);
    format!(
        "The main card starts at: {}",
        pacific.format("%I:%M %p (Pacific Time)")
    )
}
