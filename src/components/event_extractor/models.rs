use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Assumed length of an event from the main card start
pub const EVENT_DURATION_HOURS: i64 = 3;

/// One upcoming event scraped from the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    /// Absolute event page URL, stable across runs
    pub link: String,
    /// Early card start, or prelims start when there is no early card
    pub prelim_time: DateTime<Utc>,
    pub main_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Event {
    /// Build an event, deriving the end from the main card start.
    /// `None` when the end falls outside the representable range.
    pub fn new(
        name: String,
        link: String,
        prelim_time: DateTime<Utc>,
        main_time: DateTime<Utc>,
    ) -> Option<Self> {
        let end_time = main_time.checked_add_signed(Duration::hours(EVENT_DURATION_HOURS))?;
        Some(Self {
            name,
            link,
            prelim_time,
            main_time,
            end_time,
        })
    }

    /// When the calendar entry starts
    pub fn calendar_start(&self) -> DateTime<Utc> {
        self.prelim_time
    }
}

/// Why a card on the page did not produce an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing element {0}")]
    MissingElement(&'static str),
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),
    #[error("malformed timestamp in {attribute}: {value:?}")]
    MalformedTimestamp {
        attribute: &'static str,
        value: String,
    },
    #[error("no event link")]
    MissingLink,
    #[error("invalid event link {0:?}")]
    InvalidLink(String),
    #[error("duplicate event link {0}")]
    DuplicateLink(String),
}

/// A skipped card and the reason it was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDiagnostic {
    /// Position of the card on the page, 0-based
    pub index: usize,
    pub reason: SkipReason,
}

/// Result of scraping one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Upcoming events in page order
    pub events: Vec<Event>,
    pub diagnostics: Vec<SkipDiagnostic>,
    /// Cards dropped because the main card already started
    pub past: usize,
}
