//! Matching of scraped events to existing calendar entries.
//!
//! Every scraped event results in exactly one remote write: an update of the
//! matched entry or an insert. Entries are never deleted; unmatched ones are
//! only reported as stale.

mod report;

pub use report::{Action, ReconcileOutcome, ReconcileReport, ReconcileWarning};

use crate::components::event_extractor::Event;
use crate::components::google_calendar::time::get_event_start_date;
use crate::components::google_calendar::{CalendarApi, CalendarEvent, EventPayload};
use crate::error::{config_error, Error, SyncResult};
use crate::utils::time::local_date;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Attribute used to recognize an existing entry as the same event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Calendar date of the entry start
    #[default]
    StartDate,
    /// Entry location, which holds the event link
    Link,
}

impl FromStr for MatchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" | "start_date" => Ok(MatchStrategy::StartDate),
            "link" => Ok(MatchStrategy::Link),
            other => Err(config_error(&format!(
                "Unknown MATCH_STRATEGY '{}', expected 'date' or 'link'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MatchKey {
    Date(NaiveDate),
    Link(String),
}

/// Decides update-vs-insert for each scraped event and performs the write
#[derive(Debug, Clone)]
pub struct Reconciler {
    strategy: MatchStrategy,
    timezone: Tz,
}

impl Reconciler {
    pub fn new(strategy: MatchStrategy, timezone: Tz) -> Self {
        Self { strategy, timezone }
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    fn event_key(&self, event: &Event) -> MatchKey {
        match self.strategy {
            MatchStrategy::StartDate => {
                MatchKey::Date(local_date(event.calendar_start(), self.timezone))
            }
            MatchStrategy::Link => MatchKey::Link(event.link.clone()),
        }
    }

    fn entry_key(&self, entry: &CalendarEvent) -> SyncResult<Option<MatchKey>> {
        Ok(match self.strategy {
            MatchStrategy::StartDate => {
                get_event_start_date(entry, self.timezone)?.map(MatchKey::Date)
            }
            MatchStrategy::Link => entry.location.clone().map(MatchKey::Link),
        })
    }

    /// Write every event to the calendar, updating matched entries in place
    pub async fn reconcile(
        &self,
        calendar: &dyn CalendarApi,
        events: &[Event],
        existing: &[CalendarEvent],
    ) -> SyncResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        let mut index: HashMap<MatchKey, Vec<usize>> = HashMap::new();
        for (i, entry) in existing.iter().enumerate() {
            match self.entry_key(entry) {
                Ok(Some(key)) => index.entry(key).or_default().push(i),
                Ok(None) => debug!("Calendar entry {} has no match key", entry.id),
                Err(e) => {
                    warn!("Ignoring calendar entry {}: {}", entry.id, e);
                    report.warnings.push(ReconcileWarning::UnreadableEntry {
                        id: entry.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let keys: Vec<MatchKey> = events.iter().map(|e| self.event_key(e)).collect();
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut assigned: Vec<Option<usize>> = vec![None; events.len()];

        // Entries already carrying the event link win over other same-key entries
        for (slot, (event, key)) in assigned.iter_mut().zip(events.iter().zip(&keys)) {
            let exact = index.get(key).and_then(|candidates| {
                candidates.iter().copied().find(|i| {
                    !claimed.contains(i)
                        && existing[*i].location.as_deref() == Some(event.link.as_str())
                })
            });
            if let Some(i) = exact {
                claimed.insert(i);
                *slot = Some(i);
            }
        }
        for (slot, key) in assigned.iter_mut().zip(&keys) {
            if slot.is_some() {
                continue;
            }
            let free = index
                .get(key)
                .and_then(|candidates| candidates.iter().copied().find(|i| !claimed.contains(i)));
            if let Some(i) = free {
                claimed.insert(i);
                *slot = Some(i);
            }
        }

        let mut keys_written: HashMap<&MatchKey, &str> = HashMap::new();

        for ((event, key), slot) in events.iter().zip(&keys).zip(assigned) {
            if let (Some(previous), MatchKey::Date(date)) = (keys_written.get(key), key) {
                warn!(
                    "{} starts on {} like {}, writing it as a separate entry",
                    event.link, date, previous
                );
                report.warnings.push(ReconcileWarning::SharedStartDate {
                    date: *date,
                    link: event.link.clone(),
                    other_link: previous.to_string(),
                });
            }

            let payload = EventPayload::from_event(event, self.timezone);

            let outcome = match slot {
                Some(i) => {
                    let id = &existing[i].id;
                    info!("Updating calendar entry {} for {}", id, event.name);
                    calendar.update_event(id, &payload).await?;
                    ReconcileOutcome {
                        link: event.link.clone(),
                        entry_id: id.clone(),
                        action: Action::Updated,
                    }
                }
                None => {
                    info!("Inserting calendar entry for {}", event.name);
                    let created = calendar.insert_event(&payload).await?;
                    ReconcileOutcome {
                        link: event.link.clone(),
                        entry_id: created.id,
                        action: Action::Inserted,
                    }
                }
            };

            report.outcomes.push(outcome);
            keys_written.entry(key).or_insert(event.link.as_str());
        }

        report.stale = existing
            .iter()
            .enumerate()
            .filter(|(i, _)| !claimed.contains(i))
            .map(|(_, entry)| entry.id.clone())
            .collect();
        if !report.stale.is_empty() {
            info!(
                "{} calendar entries were not matched by any scraped event and are left untouched",
                report.stale.len()
            );
        }

        Ok(report)
    }
}
