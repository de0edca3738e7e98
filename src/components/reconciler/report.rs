use chrono::NaiveDate;

/// Remote write performed for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Updated,
    Inserted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub link: String,
    /// Id of the calendar entry that now holds the event
    pub entry_id: String,
    pub action: Action,
}

/// Something worth a look that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// Two scraped events start on the same date
    SharedStartDate {
        date: NaiveDate,
        link: String,
        other_link: String,
    },
    /// An existing entry whose start could not be read
    UnreadableEntry { id: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// One outcome per scraped event, in input order
    pub outcomes: Vec<ReconcileOutcome>,
    pub warnings: Vec<ReconcileWarning>,
    /// Ids of existing entries no event matched
    pub stale: Vec<String>,
}

impl ReconcileReport {
    pub fn updated(&self) -> usize {
        self.count(Action::Updated)
    }

    pub fn inserted(&self) -> usize {
        self.count(Action::Inserted)
    }

    fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}
