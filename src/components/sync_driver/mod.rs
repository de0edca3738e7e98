mod retry;

pub use retry::{RetryOverrides, RetryPolicy, DEFAULT_MAX_ATTEMPTS};

use crate::components::event_extractor::{EventExtractor, EventSource, SkipDiagnostic};
use crate::components::google_calendar::CalendarApi;
use crate::components::reconciler::{ReconcileReport, Reconciler};
use crate::error::SyncResult;
use chrono::Utc;
use tracing::{info, warn};

/// What one successful extract+reconcile pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Upcoming events found on the page
    pub scraped: usize,
    /// Cards dropped because they already started
    pub past: usize,
    pub skipped: Vec<SkipDiagnostic>,
    pub report: ReconcileReport,
}

/// Result of a run that did not hit a non-retryable error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed { attempts: u32, summary: SyncSummary },
    /// Every attempt failed with a retryable error
    GaveUp { attempts: u32, last_error: String },
}

/// Runs extractor then reconciler under a retry policy
pub struct SyncDriver<S, C> {
    source: S,
    calendar: C,
    extractor: EventExtractor,
    reconciler: Reconciler,
    policy: RetryPolicy,
}

impl<S: EventSource, C: CalendarApi> SyncDriver<S, C> {
    pub fn new(
        source: S,
        calendar: C,
        extractor: EventExtractor,
        reconciler: Reconciler,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            calendar,
            extractor,
            reconciler,
            policy,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// Run the whole sequence, retrying it on allow-listed network errors
    pub async fn run(&self) -> SyncResult<SyncOutcome> {
        let mut attempt = 1;
        loop {
            match self.run_once().await {
                Ok(summary) => {
                    return Ok(SyncOutcome::Completed {
                        attempts: attempt,
                        summary,
                    })
                }
                Err(e) if self.policy.is_retryable(&e) => {
                    if attempt >= self.policy.max_attempts {
                        warn!("Giving up after {} attempts: {}", attempt, e);
                        return Ok(SyncOutcome::GaveUp {
                            attempts: attempt,
                            last_error: e.to_string(),
                        });
                    }
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, self.policy.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One extract+reconcile pass
    pub async fn run_once(&self) -> SyncResult<SyncSummary> {
        let now = Utc::now();

        let html = self.source.fetch_page().await?;
        let extraction = self.extractor.extract(&html, now);
        info!(
            "Scraped {} upcoming events ({} past, {} skipped)",
            extraction.events.len(),
            extraction.past,
            extraction.diagnostics.len()
        );

        let existing = self.calendar.list_upcoming(now).await?;
        let report = self
            .reconciler
            .reconcile(&self.calendar, &extraction.events, &existing)
            .await?;
        info!(
            "Updated {} and inserted {} calendar entries",
            report.updated(),
            report.inserted()
        );

        Ok(SyncSummary {
            scraped: extraction.events.len(),
            past: extraction.past,
            skipped: extraction.diagnostics,
            report,
        })
    }
}
