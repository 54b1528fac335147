// Incremental geocoding sync.
// Reads address rows, geocodes only what changed, and writes coordinates back in one batch.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{Result, SyncError};
use crate::geocode::Geocoder;
use crate::limiter::RateLimiter;
use crate::sheets::{DocumentStore, PendingWrite};

use super::hash::address_hash;
use super::hash_store::{AddressHashes, HashStore};
use super::notify::NotificationSink;
use super::report::{RowOutcome, RowResult, SyncReport};
use super::target::{AddressRow, SyncTarget};

/// Title of the run summary notification.
const NOTIFICATION_TITLE: &str = "Address geocoding sync";

/// What a run does with one row, decided before any call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Blank both coordinate cells.
    Clear,
    /// Nothing to write.
    Untouched,
    /// Address unchanged since it was last geocoded and coordinates present.
    Skip,
    /// Look up the address; `hash` is stored if the lookup succeeds.
    Geocode { hash: String },
}

/// Keeps the coordinate columns of each target consistent with its address columns.
///
/// Document reads and the final batched write go through the shared limiter.
/// The geocoder is expected to carry its own limiting and retries
/// (see [`ResilientGeocoder`](crate::geocode::ResilientGeocoder)).
pub struct GeocodingSyncPipeline {
    store: Arc<dyn DocumentStore>,
    limiter: Arc<RateLimiter>,
    geocoder: Arc<dyn Geocoder>,
    hashes: Arc<dyn HashStore>,
    notifier: Option<Arc<dyn NotificationSink>>,
    targets: Vec<SyncTarget>,
    pacing: Duration,
    notify: bool,
    running: tokio::sync::Mutex<()>,
}

impl GeocodingSyncPipeline {
    /// Create a pipeline over the given collaborators and settings.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        limiter: Arc<RateLimiter>,
        geocoder: Arc<dyn Geocoder>,
        hashes: Arc<dyn HashStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            store,
            limiter,
            geocoder,
            hashes,
            notifier: None,
            targets: config.targets.clone(),
            pacing: config.pacing(),
            notify: config.notify,
            running: tokio::sync::Mutex::new(()),
        }
    }

    /// Send run summaries to `notifier` when rows changed.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Targets covered by each run, in processing order.
    pub fn targets(&self) -> &[SyncTarget] {
        &self.targets
    }

    /// Classify a row against the hash stored for its entity.
    ///
    /// Inactive and address-less rows are cleared regardless of the stored hash.
    /// A missing coordinate forces a lookup even when the hash matches.
    pub fn decide(row: &AddressRow, stored_hash: Option<&str>) -> RowAction {
        if row.inactive || row.address.is_empty() {
            return if row.has_any_coordinate() {
                RowAction::Clear
            } else {
                RowAction::Untouched
            };
        }

        let hash = address_hash(&row.address);
        if stored_hash == Some(hash.as_str()) && row.has_coordinates() {
            RowAction::Skip
        } else {
            RowAction::Geocode { hash }
        }
    }

    /// Run one sync over every target.
    ///
    /// Every target is read before the first geocode call, so a read failure
    /// aborts the run without spending geocoding quota. Geocoding failures are
    /// recorded per row and never abort the run; a failed batched write does.
    /// Hash persistence and notification failures are logged only.
    pub async fn run(&self) -> Result<SyncReport> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| SyncError::AlreadyRunning)?;

        info!(targets = self.targets.len(), "sync run started");
        let mut report = SyncReport::start();

        let mut hashes = match self.hashes.load().await {
            Ok(hashes) => hashes,
            Err(e) => {
                warn!(error = %e, "could not load address hashes, starting empty");
                AddressHashes::new()
            }
        };

        let mut sheets = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let range = target.read_range();
            let values = self.limiter.execute(|| self.store.get(&range)).await?;
            let rows = target.parse_rows(&values);
            debug!(namespace = %target.namespace, %range, rows = rows.len(), "rows read");
            sheets.push((target, rows));
        }

        let mut writes: Vec<PendingWrite> = Vec::new();
        let mut hashes_dirty = false;
        let mut geocode_calls = 0usize;

        for (target, rows) in sheets {
            for row in rows {
                let action = Self::decide(&row, hashes.get(&row.entity_id).map(String::as_str));
                let outcome = match action {
                    RowAction::Clear => {
                        debug!(entity = %row.entity_id, row = row.row, "clearing coordinates");
                        writes.extend(target.coordinate_writes(row.row, String::new(), String::new()));
                        RowOutcome::Cleared
                    }
                    RowAction::Untouched => RowOutcome::Untouched,
                    RowAction::Skip => RowOutcome::Skipped,
                    RowAction::Geocode { hash } => {
                        if geocode_calls > 0 {
                            tokio::time::sleep(self.pacing).await;
                        }
                        geocode_calls += 1;

                        match self.geocoder.geocode(&row.address).await {
                            Ok(Some(coordinates)) => {
                                let (lat, lng) = coordinates.to_cells();
                                writes.extend(target.coordinate_writes(row.row, lat, lng));
                                hashes.insert(row.entity_id.clone(), hash);
                                hashes_dirty = true;
                                debug!(
                                    entity = %row.entity_id,
                                    lat = coordinates.lat,
                                    lng = coordinates.lng,
                                    "geocoded"
                                );
                                RowOutcome::Updated { coordinates }
                            }
                            Ok(None) => {
                                warn!(
                                    entity = %row.entity_id,
                                    label = %row.label,
                                    address = %row.address,
                                    "no geocoding match"
                                );
                                RowOutcome::NotFound
                            }
                            Err(e) => {
                                error!(
                                    entity = %row.entity_id,
                                    address = %row.address,
                                    error = %e,
                                    "geocoding failed"
                                );
                                RowOutcome::Failed {
                                    error: e.to_string(),
                                }
                            }
                        }
                    }
                };

                report.record(RowResult {
                    entity_id: row.entity_id,
                    row: row.row,
                    label: row.label,
                    outcome,
                });
            }
        }

        if !writes.is_empty() {
            let ack = self
                .limiter
                .execute(|| self.store.batch_update(&writes))
                .await
                .map_err(|e| SyncError::WriteFailed(Box::new(e)))?;
            report.writes = writes.len();
            debug!(
                ranges = ack.total_updated_ranges,
                cells = ack.total_updated_cells,
                "batched write committed"
            );
        }

        if hashes_dirty {
            if let Err(e) = self.hashes.save(&hashes).await {
                warn!(error = %e, "could not save address hashes");
            }
        }

        report.finish();
        info!(
            rows = report.rows_seen,
            candidates = report.candidates,
            updated = report.updated,
            cleared = report.cleared,
            not_found = report.not_found,
            failed = report.failed,
            "sync run finished"
        );

        if self.notify && report.changed() {
            if let Some(notifier) = &self.notifier {
                if let Err(e) = notifier
                    .notify(NOTIFICATION_TITLE, &report.summary_fields())
                    .await
                {
                    warn!(error = %e, "could not send sync notification");
                }
            }
        }

        Ok(report)
    }
}
