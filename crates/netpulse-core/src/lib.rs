//! Real-time network telemetry and alert broadcast core.
//!
//! This crate owns the sampling loop, domain model, in-memory state and
//! observer fan-out for the netpulse server:
//!
//! - **[`Monitor`]**: Central facade. [`start()`](Monitor::start) takes a
//!   first counter sample, then spawns the sampler and broadcaster tasks.
//!   Queries are answered from store snapshots; the alert-status mutation
//!   is validated here and delegated to the store.
//!
//! - **[`DataStore`]**: Bounded, newest-first alert and log collections
//!   (`parking_lot::Mutex` writers, `tokio::sync::watch` snapshots) plus the
//!   latest [`NetworkSnapshot`] behind an `ArcSwap`. Mutations push their
//!   event to the hub before the writer lock is released.
//!
//! - **[`Hub`]**: Observer registry on a `DashMap`. Each [`Observer`] owns a
//!   bounded frame queue; [`Hub::push`] encodes once and never blocks.
//!
//! - **[`Sampler`]**: Reads a [`CounterSource`] on the blocking pool and
//!   turns cumulative counters into byte rates via an owned [`RateTracker`].
//!
//! - **[`health::evaluate`]**: Pure classification of alert, log and
//!   traffic state into a per-service [`HealthReport`].

pub mod config;
pub mod error;
pub mod health;
pub mod hub;
pub mod model;
pub mod monitor;
pub mod sampler;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{HealthThresholds, MonitorConfig, RetentionConfig};
pub use error::CoreError;
pub use hub::{DeliveryReport, Frame, Hub, InitialData, Observer, ObserverId, PushEvent};
pub use monitor::Monitor;
pub use sampler::{
    CounterSource, InterfaceFilter, RateTracker, Sampler, ScriptedSource, SysinfoSource,
};
pub use store::DataStore;

pub use model::{
    Alert, AlertStatus, HealthReport, InterfaceCounters, InterfaceRate, LogEntry, LogLevel,
    NetworkSnapshot, NetworkTotals, Service, ServiceHealth, ServiceStatus, Severity,
};
