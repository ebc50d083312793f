// ── Runtime monitor configuration ──
//
// These types describe how the monitor samples, retains and classifies.
// They never touch disk: the binary builds a `MonitorConfig` (usually via
// netpulse-config) and hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sampler::InterfaceFilter;

/// Default cadence for both the sampler and the broadcaster.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);

/// Bounded in-memory retention per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Maximum alerts kept; the oldest is evicted on insert.
    pub alerts: usize,
    /// Maximum log entries kept; the oldest is evicted on insert.
    pub logs: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            alerts: 20,
            logs: 50,
        }
    }
}

/// Thresholds beyond which a service is reported as degraded.
///
/// Each limit is exclusive: a service degrades when the observed value is
/// strictly greater than the limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// ERROR-level log count above which the firewall degrades.
    pub error_log_limit: usize,
    /// Critical alert count above which the IDS engine and alert system degrade.
    pub critical_alert_limit: usize,
    /// Combined rx+tx bytes/sec above which the traffic monitor degrades.
    pub traffic_bytes_per_sec: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            error_log_limit: 10,
            critical_alert_limit: 0,
            traffic_bytes_per_sec: 10.0 * 1024.0 * 1024.0,
        }
    }
}

/// Configuration for a single [`Monitor`](crate::Monitor).
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// How often interface counters are read. Also the per-read deadline.
    pub sample_interval: Duration,
    /// How often `network-update` and `health-update` are pushed.
    pub broadcast_interval: Duration,
    pub retention: RetentionConfig,
    pub thresholds: HealthThresholds,
    pub interfaces: InterfaceFilter,
    /// Frames buffered per observer before it is treated as unreachable.
    pub observer_queue_depth: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_TICK,
            broadcast_interval: DEFAULT_TICK,
            retention: RetentionConfig::default(),
            thresholds: HealthThresholds::default(),
            interfaces: InterfaceFilter::default(),
            observer_queue_depth: 64,
        }
    }
}
