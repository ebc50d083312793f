// ── Alert domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Triage state of an alert. The only mutable part of an [`Alert`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum AlertStatus {
    Active,
    Investigating,
    Resolved,
}

/// A detection raised by an external detector and tracked in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    /// Detector-specific classification, e.g. `"Port Scan"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub destination: String,
    pub status: AlertStatus,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// Copy of this alert with `status` replaced and every other field kept.
    pub fn with_status(&self, status: AlertStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}
