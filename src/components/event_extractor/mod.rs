//! Scraping of the events listing page.
//!
//! Cards that cannot be read are reported as [`SkipDiagnostic`]s instead of
//! failing the whole page.

pub mod models;
pub mod naming;
mod parser;
mod source;

pub use models::{Event, Extraction, SkipDiagnostic, SkipReason, EVENT_DURATION_HOURS};
pub use naming::NamingRules;
pub use parser::EventExtractor;
pub use source::{EventSource, HttpEventSource};
