// ── Interface selection ──
//
// Which interfaces contribute to a snapshot is pinned by configuration
// rather than guessed from platform naming.

use serde::{Deserialize, Serialize};

/// Selection rules applied to every counter read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceFilter {
    /// Drop loopback interfaces (`lo`, `lo0`, "Loopback Pseudo-Interface 1").
    pub exclude_loopback: bool,
    /// If non-empty, only these interface names are sampled.
    pub include: Vec<String>,
    /// Interface names that are never sampled.
    pub exclude: Vec<String>,
}

impl Default for InterfaceFilter {
    fn default() -> Self {
        Self {
            exclude_loopback: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl InterfaceFilter {
    pub fn allows(&self, name: &str) -> bool {
        if self.exclude_loopback && is_loopback(name) {
            return false;
        }
        if self.exclude.iter().any(|n| n == name) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|n| n == name)
    }
}

/// Loopback naming across Linux (`lo`), BSD/macOS (`lo0`) and Windows.
pub fn is_loopback(name: &str) -> bool {
    if name.to_ascii_lowercase().starts_with("loopback") {
        return true;
    }
    name.strip_prefix("lo")
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_names_are_recognised() {
        assert!(is_loopback("lo"));
        assert!(is_loopback("lo0"));
        assert!(is_loopback("Loopback Pseudo-Interface 1"));
        assert!(!is_loopback("eth0"));
        assert!(!is_loopback("lorawan0"));
        assert!(!is_loopback("wlo1"));
    }

    #[test]
    fn default_filter_only_drops_loopback() {
        let filter = InterfaceFilter::default();
        assert!(filter.allows("eth0"));
        assert!(filter.allows("docker0"));
        assert!(!filter.allows("lo"));
    }

    #[test]
    fn loopback_can_be_kept_explicitly() {
        let filter = InterfaceFilter {
            exclude_loopback: false,
            ..InterfaceFilter::default()
        };
        assert!(filter.allows("lo0"));
    }

    #[test]
    fn include_list_narrows_and_exclude_wins() {
        let filter = InterfaceFilter {
            exclude_loopback: true,
            include: vec!["eth0".into(), "wlan0".into()],
            exclude: vec!["wlan0".into()],
        };
        assert!(filter.allows("eth0"));
        assert!(!filter.allows("wlan0"));
        assert!(!filter.allows("docker0"));
    }
}
