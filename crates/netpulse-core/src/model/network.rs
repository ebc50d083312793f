// ── Network counter and rate types ──

use serde::{Deserialize, Serialize};

/// Raw cumulative byte counters for one interface, as last read from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub name: String,
    pub rx_bytes_cumulative: u64,
    pub tx_bytes_cumulative: u64,
}

impl InterfaceCounters {
    pub fn new(name: impl Into<String>, rx: u64, tx: u64) -> Self {
        Self {
            name: name.into(),
            rx_bytes_cumulative: rx,
            tx_bytes_cumulative: tx,
        }
    }
}

/// Per-interface counters and derived bytes/sec rates for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRate {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_rate: f64,
    pub tx_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTotals {
    pub rx_bytes_per_sec: f64,
    pub tx_bytes_per_sec: f64,
}

impl NetworkTotals {
    pub fn combined(&self) -> f64 {
        self.rx_bytes_per_sec + self.tx_bytes_per_sec
    }
}

/// Immutable point-in-time view of host network throughput.
///
/// [`NetworkSnapshot::from_rates`] computes `total` from the per-interface
/// rates; the sampler builds every snapshot through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub timestamp: i64,
    pub interfaces: Vec<InterfaceRate>,
    pub total: NetworkTotals,
}

impl NetworkSnapshot {
    /// Snapshot with no interfaces and zero throughput.
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            interfaces: Vec::new(),
            total: NetworkTotals::default(),
        }
    }

    pub fn from_rates(timestamp: i64, interfaces: Vec<InterfaceRate>) -> Self {
        let total = interfaces
            .iter()
            .fold(NetworkTotals::default(), |acc, iface| NetworkTotals {
                rx_bytes_per_sec: acc.rx_bytes_per_sec + iface.rx_rate,
                tx_bytes_per_sec: acc.tx_bytes_per_sec + iface.tx_rate,
            });

        Self {
            timestamp,
            interfaces,
            total,
        }
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceRate> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn rate(name: &str, rx_rate: f64, tx_rate: f64) -> InterfaceRate {
        InterfaceRate {
            name: name.into(),
            rx_bytes: 0,
            tx_bytes: 0,
            rx_rate,
            tx_rate,
        }
    }

    #[test]
    fn totals_are_sum_of_interfaces() {
        let snap = NetworkSnapshot::from_rates(
            1,
            vec![rate("eth0", 2000.0, 10.0), rate("wlan0", 500.5, 0.5)],
        );
        assert_eq!(snap.total.rx_bytes_per_sec, 2500.5);
        assert_eq!(snap.total.tx_bytes_per_sec, 10.5);
        assert_eq!(snap.total.combined(), 2511.0);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let snap = NetworkSnapshot::from_rates(7, vec![rate("eth0", 1.0, 2.0)]);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["total"]["rxBytesPerSec"], 1.0);
        assert_eq!(json["interfaces"][0]["txRate"], 2.0);
        assert_eq!(json["interfaces"][0]["rxBytes"], 0);
    }

    #[test]
    fn empty_snapshot_has_zero_totals() {
        let snap = NetworkSnapshot::empty(5);
        assert!(snap.interfaces.is_empty());
        assert_eq!(snap.total, NetworkTotals::default());
        assert!(snap.interface("eth0").is_none());
    }
}
