// ── Derived service health types ──

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Services whose status is derived from alert, log and traffic state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Service {
    Firewall,
    #[serde(rename = "IDS Engine")]
    #[strum(serialize = "IDS Engine")]
    IdsEngine,
    #[serde(rename = "Traffic Monitor")]
    #[strum(serialize = "Traffic Monitor")]
    TrafficMonitor,
    #[serde(rename = "Alert System")]
    #[strum(serialize = "Alert System")]
    AlertSystem,
}

impl Service {
    /// Reported uptime for a service in the given state.
    ///
    /// This is a fixed label per (service, status) pair, not a measurement.
    pub fn uptime(self, status: ServiceStatus) -> &'static str {
        match (self, status) {
            (Self::Firewall, ServiceStatus::Operational) => "99.9%",
            (Self::Firewall, ServiceStatus::Degraded) => "98.5%",
            (Self::IdsEngine, ServiceStatus::Operational) => "99.8%",
            (Self::IdsEngine, ServiceStatus::Degraded) => "98.0%",
            (Self::TrafficMonitor, ServiceStatus::Operational) => "100%",
            (Self::TrafficMonitor, ServiceStatus::Degraded) => "99.0%",
            (Self::AlertSystem, ServiceStatus::Operational) => "99.7%",
            (Self::AlertSystem, ServiceStatus::Degraded) => "97.5%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ServiceStatus {
    Operational,
    Degraded,
}

impl ServiceStatus {
    pub fn degraded_if(condition: bool) -> Self {
        if condition {
            Self::Degraded
        } else {
            Self::Operational
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    pub status: ServiceStatus,
    pub uptime: String,
    pub last_checked: i64,
}

/// Per-service status at one evaluation instant. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub timestamp: i64,
    pub services: IndexMap<Service, ServiceHealth>,
}

impl HealthReport {
    pub fn status_of(&self, service: Service) -> Option<ServiceStatus> {
        self.services.get(&service).map(|s| s.status)
    }

    pub fn degraded_services(&self) -> impl Iterator<Item = Service> + '_ {
        self.services
            .iter()
            .filter(|(_, h)| h.status == ServiceStatus::Degraded)
            .map(|(s, _)| *s)
    }
}
