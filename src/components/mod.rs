// Export components
pub mod event_extractor;
pub mod google_calendar;
pub mod reconciler;
pub mod sync_driver;

// Re-export the pieces a run is assembled from
pub use event_extractor::{EventExtractor, HttpEventSource};
pub use google_calendar::{FileCredentialProvider, GoogleCalendarClient};
pub use reconciler::Reconciler;
pub use sync_driver::SyncDriver;
