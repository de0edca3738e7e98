mod client;
pub mod models;
pub mod time;
pub mod token;

pub use client::{CalendarApi, GoogleCalendarClient};
pub use models::{CalendarEvent, EventDateTime, EventPayload};
pub use token::{CredentialProvider, FileCredentialProvider, StoredToken};
