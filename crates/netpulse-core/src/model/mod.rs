// ── Domain model ──
//
// Canonical types for alerts, logs, network snapshots and derived
// service health. Field names serialize in camelCase, which is the
// wire shape observers and HTTP consumers expect.

pub mod alert;
pub mod health;
pub mod log;
pub mod network;

pub use alert::{Alert, AlertStatus, Severity};
pub use health::{HealthReport, Service, ServiceHealth, ServiceStatus};
pub use log::{LogEntry, LogLevel};
pub use network::{InterfaceCounters, InterfaceRate, NetworkSnapshot, NetworkTotals};

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
