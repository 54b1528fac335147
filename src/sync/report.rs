// Sync run results.
// Per-row outcomes and the counts reported at the end of a run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geocode::Coordinates;

use super::notify::NotificationField;

/// Terminal state of one row in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RowOutcome {
    /// Inactive or address-less row whose coordinates were queued for clearing.
    Cleared,
    /// Address unchanged and coordinates present.
    Skipped,
    /// Inactive or address-less row with nothing to clear.
    Untouched,
    /// Geocoded; coordinates queued and hash updated.
    Updated { coordinates: Coordinates },
    /// Geocoder found no candidate; retried next run.
    NotFound,
    /// Geocoding failed; retried next run.
    Failed { error: String },
}

impl RowOutcome {
    /// Whether the row gets a coordinate write this run.
    pub fn is_write(&self) -> bool {
        matches!(self, RowOutcome::Cleared | RowOutcome::Updated { .. })
    }
}

/// Outcome of one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowResult {
    pub entity_id: String,
    pub row: u32,
    pub label: String,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

/// Summary of a completed sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Rows parsed across all targets.
    pub rows_seen: usize,
    /// Rows that needed geocoding.
    pub candidates: usize,
    pub updated: usize,
    pub cleared: usize,
    pub skipped: usize,
    pub untouched: usize,
    pub not_found: usize,
    pub failed: usize,
    /// Range updates sent in the batched write.
    pub writes: usize,
    pub rows: Vec<RowResult>,
}

impl SyncReport {
    /// Empty report stamped with the current time.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            rows_seen: 0,
            candidates: 0,
            updated: 0,
            cleared: 0,
            skipped: 0,
            untouched: 0,
            not_found: 0,
            failed: 0,
            writes: 0,
            rows: Vec::new(),
        }
    }

    /// Count and keep one row outcome.
    pub fn record(&mut self, result: RowResult) {
        self.rows_seen += 1;
        match &result.outcome {
            RowOutcome::Cleared => self.cleared += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Untouched => self.untouched += 1,
            RowOutcome::Updated { .. } => {
                self.candidates += 1;
                self.updated += 1;
            }
            RowOutcome::NotFound => {
                self.candidates += 1;
                self.not_found += 1;
            }
            RowOutcome::Failed { .. } => {
                self.candidates += 1;
                self.failed += 1;
            }
        }
        self.rows.push(result);
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Whether any coordinates were written or cleared.
    pub fn changed(&self) -> bool {
        self.updated + self.cleared > 0
    }

    /// Rows whose geocoding failed.
    pub fn failures(&self) -> impl Iterator<Item = &RowResult> {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, RowOutcome::Failed { .. }))
    }

    /// Fields for the run summary notification.
    pub fn summary_fields(&self) -> Vec<NotificationField> {
        vec![
            NotificationField::new("Processed", self.candidates),
            NotificationField::new("Updated", format!("{}/{}", self.updated, self.candidates)),
            NotificationField::new("Cleared", self.cleared),
            NotificationField::new("Not found", self.not_found),
            NotificationField::new("Failed", self.failed),
        ]
    }
}
