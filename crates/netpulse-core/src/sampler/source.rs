// ── Counter sources ──
//
// A `CounterSource` yields the host's cumulative per-interface byte
// counters. Reads are blocking; the sampler runs them on the blocking
// pool under a deadline.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::Networks;

use crate::error::CoreError;
use crate::model::InterfaceCounters;

/// Platform query for cumulative interface byte counters.
pub trait CounterSource: Send + Sync + 'static {
    /// Read the current counters for every interface the host exposes.
    fn read_counters(&self) -> Result<Vec<InterfaceCounters>, CoreError>;
}

// ── SysinfoSource ────────────────────────────────────────────────────

/// Cross-platform source backed by `sysinfo::Networks`.
pub struct SysinfoSource {
    networks: Mutex<Networks>,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SysinfoSource {
    fn read_counters(&self) -> Result<Vec<InterfaceCounters>, CoreError> {
        let mut networks = self
            .networks
            .try_lock()
            .ok_or_else(|| CoreError::CounterSource {
                message: "another counter read is in progress".into(),
            })?;
        // `true` drops interfaces that vanished since the last refresh.
        networks.refresh(true);

        let mut counters: Vec<InterfaceCounters> = networks
            .iter()
            .map(|(name, data)| {
                InterfaceCounters::new(
                    name.clone(),
                    data.total_received(),
                    data.total_transmitted(),
                )
            })
            .collect();
        counters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(counters)
    }
}

// ── ScriptedSource ───────────────────────────────────────────────────

type Step = Result<Vec<InterfaceCounters>, String>;

/// Deterministic source that replays a queued sequence of reads.
///
/// Cheaply cloneable; clones share the same queue, so a test can keep a
/// handle and enqueue further reads after handing the source to a monitor.
/// Once the queue is drained every read fails.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    steps: Arc<Mutex<VecDeque<Step>>>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block every read for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful read.
    pub fn push(&self, counters: Vec<InterfaceCounters>) -> &Self {
        self.steps.lock().push_back(Ok(counters));
        self
    }

    /// Queue a failed read.
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        self.steps.lock().push_back(Err(message.into()));
        self
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }
}

impl CounterSource for ScriptedSource {
    fn read_counters(&self) -> Result<Vec<InterfaceCounters>, CoreError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.steps.lock().pop_front() {
            Some(Ok(counters)) => Ok(counters),
            Some(Err(message)) => Err(CoreError::CounterSource { message }),
            None => Err(CoreError::CounterSource {
                message: "scripted source exhausted".into(),
            }),
        }
    }
}
