// ── Health evaluator ──
//
// Pure mapping from (alerts, logs, network) to a per-service report.
// No state, no I/O: safe to call on every tick and every request.

use std::sync::Arc;

use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::config::HealthThresholds;
use crate::model::{
    Alert, HealthReport, LogEntry, NetworkSnapshot, Service, ServiceHealth, ServiceStatus,
};

/// Classify every [`Service`] against `thresholds`, stamped at `now`.
///
/// Rules are independent of one another:
/// - Firewall degrades on more than `error_log_limit` ERROR logs.
/// - IDS Engine and Alert System degrade on more than
///   `critical_alert_limit` Critical alerts.
/// - Traffic Monitor degrades when combined rx+tx exceeds
///   `traffic_bytes_per_sec`.
pub fn evaluate(
    alerts: &[Arc<Alert>],
    logs: &[Arc<LogEntry>],
    network: &NetworkSnapshot,
    thresholds: &HealthThresholds,
    now: i64,
) -> HealthReport {
    let critical_alerts = alerts.iter().filter(|a| a.is_critical()).count();
    let error_logs = logs.iter().filter(|l| l.is_error()).count();
    let heavy_traffic = network.total.combined() > thresholds.traffic_bytes_per_sec;

    let services: IndexMap<Service, ServiceHealth> = Service::iter()
        .map(|service| {
            let degraded = match service {
                Service::Firewall => error_logs > thresholds.error_log_limit,
                Service::IdsEngine | Service::AlertSystem => {
                    critical_alerts > thresholds.critical_alert_limit
                }
                Service::TrafficMonitor => heavy_traffic,
            };
            let status = ServiceStatus::degraded_if(degraded);
            let health = ServiceHealth {
                status,
                uptime: service.uptime(status).to_owned(),
                last_checked: now,
            };
            (service, health)
        })
        .collect();

    HealthReport {
        timestamp: now,
        services,
    }
}
