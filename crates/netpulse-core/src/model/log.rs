// ── Log entry domain types ──

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
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A component log line retained for display. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: i64,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
}

impl LogEntry {
    /// Build an entry stamped now with a fresh random id.
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: super::now_millis(),
            level,
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn level_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"WARN\"");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    }

    #[test]
    fn new_entries_get_distinct_ids() {
        let a = LogEntry::new(LogLevel::Info, "firewall", "rule reloaded");
        let b = LogEntry::new(LogLevel::Info, "firewall", "rule reloaded");
        assert_ne!(a.id, b.id);
        assert!(!a.is_error());
    }
}
