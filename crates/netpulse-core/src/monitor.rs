// ── Monitor facade ──
//
// Lifecycle and query surface for the telemetry core. Owns the store,
// the hub and the sampler, and runs the two periodic tasks that keep
// observers up to date.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::health;
use crate::hub::{DeliveryReport, Hub, Observer, ObserverId, PushEvent};
use crate::model::{self, Alert, AlertStatus, HealthReport, LogEntry, NetworkSnapshot};
use crate::sampler::{CounterSource, Sampler};
use crate::store::DataStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Reads are served from
/// store snapshots; mutations go through the store and are pushed to
/// every observer before the call returns.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    store: Arc<DataStore>,
    hub: Arc<Hub>,
    sampler: Mutex<Sampler>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Create a monitor. Does NOT sample or broadcast until
    /// [`start()`](Self::start) is called.
    pub fn new(config: MonitorConfig, source: Arc<dyn CounterSource>) -> Self {
        let hub = Arc::new(Hub::new(config.observer_queue_depth));
        let store = Arc::new(DataStore::new(config.retention, Arc::clone(&hub)));
        let sampler = Sampler::new(source, config.interfaces.clone(), config.sample_interval);

        Self {
            inner: Arc::new(MonitorInner {
                config,
                store,
                hub,
                sampler: Mutex::new(sampler),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Take an immediate first sample, then spawn the sampler and
    /// broadcaster tasks. Calling `start` on a running monitor is a no-op.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Internal("monitor has been shut down".into()));
        }

        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            debug!("monitor already running");
            return Ok(());
        }

        if let Err(e) = self.sample_once().await {
            warn!(error = %e, "initial network sample failed");
        }

        let config = &self.inner.config;
        {
            let monitor = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(sampler_task(monitor, config.sample_interval, cancel)));
        }
        {
            let monitor = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(broadcast_task(
                monitor,
                config.broadcast_interval,
                cancel,
            )));
        }

        info!(
            sample_ms = u64::try_from(config.sample_interval.as_millis()).unwrap_or(u64::MAX),
            broadcast_ms = u64::try_from(config.broadcast_interval.as_millis()).unwrap_or(u64::MAX),
            "monitor started"
        );
        Ok(())
    }

    /// Stop the background tasks and wait for them to finish.
    /// A monitor that has been shut down cannot be started again.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        info!("monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled()
            && self
                .inner
                .task_handles
                .try_lock()
                .map(|handles| handles.iter().any(|h| !h.is_finished()))
                .unwrap_or(true)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Retained alerts, newest first.
    pub fn alerts(&self) -> Arc<Vec<Arc<Alert>>> {
        self.inner.store.alerts()
    }

    /// Retained log entries, newest first.
    pub fn logs(&self) -> Arc<Vec<Arc<LogEntry>>> {
        self.inner.store.logs()
    }

    pub fn network(&self) -> Arc<NetworkSnapshot> {
        self.inner.store.network()
    }

    /// Health evaluated over the current state, stamped now.
    pub fn health(&self) -> HealthReport {
        self.inner
            .store
            .health(&self.inner.config.thresholds, model::now_millis())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Set the status of alert `id` from its textual form
    /// (`"Active"`, `"Investigating"` or `"Resolved"`, any case).
    pub fn set_alert_status(&self, id: &str, status: &str) -> Result<Arc<Alert>, CoreError> {
        let status: AlertStatus = status.parse().map_err(|_| CoreError::InvalidStatus {
            value: status.to_owned(),
        })?;
        let updated = self.inner.store.set_alert_status(id, status)?;
        info!(alert = %id, %status, "alert status updated");
        Ok(updated)
    }

    pub fn append_alert(&self, alert: Alert) -> Result<Arc<Alert>, CoreError> {
        let alert = self.inner.store.append_alert(alert)?;
        debug!(alert = %alert.id, severity = %alert.severity, "alert recorded");
        Ok(alert)
    }

    pub fn append_log(&self, entry: LogEntry) -> Arc<LogEntry> {
        self.inner.store.append_log(entry)
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register an observer. Its first frame is always `initial-data`.
    pub fn join(&self) -> Result<Observer, CoreError> {
        let store = &self.inner.store;
        let thresholds = &self.inner.config.thresholds;
        self.inner
            .hub
            .join_with(|| store.initial_data(thresholds, model::now_millis()))
    }

    pub fn leave(&self, id: ObserverId) -> bool {
        self.inner.hub.leave(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.hub.observer_count()
    }

    // ── Tick steps ───────────────────────────────────────────────────

    /// Sample once and publish the result. On error the previous
    /// snapshot stays current.
    pub async fn sample_once(&self) -> Result<Arc<NetworkSnapshot>, CoreError> {
        let snapshot = self.inner.sampler.lock().await.sample().await?;
        debug!(
            interfaces = snapshot.interfaces.len(),
            rx = snapshot.total.rx_bytes_per_sec,
            tx = snapshot.total.tx_bytes_per_sec,
            "network sampled"
        );
        Ok(self.inner.store.replace_network_snapshot(snapshot))
    }

    /// Push `network-update` followed by `health-update` as one run.
    /// Skipped when nobody is listening.
    pub fn broadcast_tick(&self) -> Option<Vec<DeliveryReport>> {
        if self.inner.hub.observer_count() == 0 {
            return None;
        }

        // Health is evaluated over the same snapshot that is pushed.
        let store = &self.inner.store;
        let network = store.network();
        let health = health::evaluate(
            &store.alerts(),
            &store.logs(),
            &network,
            &self.inner.config.thresholds,
            model::now_millis(),
        );
        let events = [PushEvent::NetworkUpdate(network), PushEvent::HealthUpdate(health)];
        Some(self.inner.hub.push_all(&events))
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn sampler_task(monitor: Monitor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // `start` already took the first sample

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match monitor.sample_once().await {
                    Ok(_) => {}
                    Err(CoreError::SampleInFlight) => {
                        debug!("previous counter read still running, skipping tick");
                    }
                    Err(e) => {
                        warn!(error = %e, "network sample failed, keeping previous snapshot");
                    }
                }
            }
        }
    }
    debug!("sampler task stopped");
}

async fn broadcast_task(monitor: Monitor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Some(reports) = monitor.broadcast_tick() {
                    let dropped: usize = reports.iter().map(|r| r.dropped.len()).sum();
                    debug!(
                        delivered = reports.first().map_or(0, |r| r.delivered),
                        dropped,
                        "broadcast tick"
                    );
                }
            }
        }
    }
    debug!("broadcast task stopped");
}
