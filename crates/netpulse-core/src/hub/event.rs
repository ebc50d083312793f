// ── Push events ──
//
// Every message sent to an observer is one `PushEvent`, encoded as a
// `{"type": ..., "data": ...}` envelope.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::error::CoreError;
use crate::model::{Alert, HealthReport, LogEntry, NetworkSnapshot};

/// Tagged event with a fixed payload schema per tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PushEvent {
    /// Sent once, immediately after an observer joins.
    InitialData(InitialData),
    /// Sent every broadcast tick.
    NetworkUpdate(Arc<NetworkSnapshot>),
    /// Sent every broadcast tick, after `network-update`.
    HealthUpdate(HealthReport),
    /// Sent after a successful status mutation, carrying the full record.
    AlertUpdated(Arc<Alert>),
    NewAlert(Arc<Alert>),
    NewLog(Arc<LogEntry>),
}

impl PushEvent {
    /// Wire name of this event, e.g. `"alert-updated"`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// Point-in-time copy of everything an observer needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialData {
    pub alerts: Arc<Vec<Arc<Alert>>>,
    pub logs: Arc<Vec<Arc<LogEntry>>>,
    pub network_data: Arc<NetworkSnapshot>,
    pub health: HealthReport,
}

/// One encoded event, shared by every observer it is delivered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Arc<str>);

impl Frame {
    pub fn encode(event: &PushEvent) -> Result<Self, CoreError> {
        let text = serde_json::to_string(event)?;
        Ok(Self(Arc::from(text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the frame back into an event. Used by observers and tests.
    pub fn decode(&self) -> Result<PushEvent, CoreError> {
        Ok(serde_json::from_str(&self.0)?)
    }

    /// True if both frames share the same underlying buffer.
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
