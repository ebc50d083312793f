// ── Counter-delta rate computation ──
//
// Converts cumulative counters into bytes/sec using each interface's own
// previous sample. The prior-sample table is an owned value so it can be
// inspected and reset without touching process-wide state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::model::{InterfaceCounters, InterfaceRate};

#[derive(Debug, Clone, Copy)]
struct PriorSample {
    rx: u64,
    tx: u64,
    at: Instant,
}

/// Last observed counters per interface name.
#[derive(Debug, Clone, Default)]
pub struct RateTracker {
    prior: HashMap<String, PriorSample>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interfaces with a recorded prior sample.
    pub fn len(&self) -> usize {
        self.prior.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prior.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prior.contains_key(name)
    }

    /// Forget every prior sample; the next observation reads as a first tick.
    pub fn reset(&mut self) {
        self.prior.clear();
    }

    /// Fold one read into the table and return per-interface rates.
    ///
    /// Rows sharing a name are summed first. An interface seen for the first
    /// time reports a zero rate. A counter that went backwards reports zero
    /// for that direction. Interfaces absent from `counters` are forgotten.
    pub fn observe(&mut self, counters: Vec<InterfaceCounters>, at: Instant) -> Vec<InterfaceRate> {
        let merged = merge_by_name(counters);

        let rates = merged
            .iter()
            .map(|(name, &(rx, tx))| {
                let (rx_rate, tx_rate) = match self.prior.get(name) {
                    Some(prev) => {
                        let elapsed = at.saturating_duration_since(prev.at);
                        (
                            per_second(rx.saturating_sub(prev.rx), elapsed),
                            per_second(tx.saturating_sub(prev.tx), elapsed),
                        )
                    }
                    None => (0.0, 0.0),
                };

                InterfaceRate {
                    name: name.clone(),
                    rx_bytes: rx,
                    tx_bytes: tx,
                    rx_rate,
                    tx_rate,
                }
            })
            .collect();

        self.prior.retain(|name, _| merged.contains_key(name));
        for (name, (rx, tx)) in merged {
            self.prior.insert(name, PriorSample { rx, tx, at });
        }

        rates
    }
}

fn merge_by_name(counters: Vec<InterfaceCounters>) -> IndexMap<String, (u64, u64)> {
    let mut merged: IndexMap<String, (u64, u64)> = IndexMap::with_capacity(counters.len());
    for c in counters {
        let entry = merged.entry(c.name).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(c.rx_bytes_cumulative);
        entry.1 = entry.1.saturating_add(c.tx_bytes_cumulative);
    }
    merged
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn per_second(delta: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { delta as f64 / secs } else { 0.0 }
}
