// ── Central in-memory state ──
//
// Owns alerts, logs and the latest network snapshot. A mutation observers
// care about becomes visible and is pushed in one hub commit, made while
// the collection's writer lock is still held, so event order matches
// mutation order and no joiner sees a change both ways.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use super::collection::{BoundedCollection, Inserted, Publish};
use crate::config::{HealthThresholds, RetentionConfig};
use crate::error::CoreError;
use crate::health;
use crate::hub::{Hub, InitialData, PushEvent};
use crate::model::{self, Alert, AlertStatus, HealthReport, LogEntry, NetworkSnapshot};

pub struct DataStore {
    alerts: BoundedCollection<Alert>,
    logs: BoundedCollection<LogEntry>,
    network: ArcSwap<NetworkSnapshot>,
    hub: Arc<Hub>,
}

impl DataStore {
    pub fn new(retention: RetentionConfig, hub: Arc<Hub>) -> Self {
        Self {
            alerts: BoundedCollection::new(retention.alerts),
            logs: BoundedCollection::new(retention.logs),
            network: ArcSwap::from_pointee(NetworkSnapshot::empty(model::now_millis())),
            hub,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Record a new alert and push `new-alert`.
    ///
    /// Fails with [`CoreError::DuplicateAlert`] if an alert with the same
    /// id is still retained.
    pub fn append_alert(&self, alert: Alert) -> Result<Arc<Alert>, CoreError> {
        let id = alert.id.clone();
        let outcome = self.alerts.insert_unique(alert, |alert, publish| {
            self.announce(&PushEvent::NewAlert(Arc::clone(alert)), publish);
        });

        match outcome {
            Inserted::Added { entity, evicted } => {
                if let Some(old) = evicted {
                    debug!(evicted = %old.id, "alert retention cap reached");
                }
                Ok(entity)
            }
            Inserted::Duplicate => Err(CoreError::DuplicateAlert { id }),
        }
    }

    /// Replace the status of alert `id` and push exactly one `alert-updated`.
    ///
    /// An unknown id leaves the store untouched and pushes nothing.
    pub fn set_alert_status(&self, id: &str, status: AlertStatus) -> Result<Arc<Alert>, CoreError> {
        self.alerts
            .update(
                id,
                |alert| alert.with_status(status),
                |alert, publish| {
                    self.announce(&PushEvent::AlertUpdated(Arc::clone(alert)), publish);
                },
            )
            .ok_or_else(|| CoreError::AlertNotFound { id: id.to_owned() })
    }

    /// Append a log entry and push `new-log`.
    pub fn append_log(&self, entry: LogEntry) -> Arc<LogEntry> {
        let (entry, _evicted) = self.logs.insert(entry, |entry, publish| {
            self.announce(&PushEvent::NewLog(Arc::clone(entry)), publish);
        });
        entry
    }

    /// Atomically publish a new network snapshot. Readers see either the
    /// old snapshot or the new one, never a mix.
    pub fn replace_network_snapshot(&self, snapshot: NetworkSnapshot) -> Arc<NetworkSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.network.store(Arc::clone(&snapshot));
        snapshot
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Retained alerts, newest first.
    pub fn alerts(&self) -> Arc<Vec<Arc<Alert>>> {
        self.alerts.snapshot()
    }

    /// Retained log entries, newest first.
    pub fn logs(&self) -> Arc<Vec<Arc<LogEntry>>> {
        self.logs.snapshot()
    }

    pub fn network(&self) -> Arc<NetworkSnapshot> {
        self.network.load_full()
    }

    pub fn alert(&self, id: &str) -> Option<Arc<Alert>> {
        self.alerts.get(id)
    }

    /// Evaluate health over the current state.
    pub fn health(&self, thresholds: &HealthThresholds, now: i64) -> HealthReport {
        health::evaluate(&self.alerts(), &self.logs(), &self.network(), thresholds, now)
    }

    /// Point-in-time copy of everything a new observer needs.
    pub fn initial_data(&self, thresholds: &HealthThresholds, now: i64) -> InitialData {
        let alerts = self.alerts();
        let logs = self.logs();
        let network_data = self.network();
        let health = health::evaluate(&alerts, &logs, &network_data, thresholds, now);

        InitialData {
            alerts,
            logs,
            network_data,
            health,
        }
    }

    fn announce(&self, event: &PushEvent, publish: Publish<'_>) {
        self.hub.commit(event, publish);
    }
}
