// ── Counter sampler ──
//
// One `Sampler` per monitor: reads counters through a `CounterSource`,
// filters interfaces, folds the read into its `RateTracker` and builds
// the next `NetworkSnapshot`.

mod filter;
mod rate;
mod source;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::trace;

pub use filter::{InterfaceFilter, is_loopback};
pub use rate::RateTracker;
pub use source::{CounterSource, ScriptedSource, SysinfoSource};

use crate::error::CoreError;
use crate::model::{self, InterfaceCounters, NetworkSnapshot};

type CounterRead = Result<(Vec<InterfaceCounters>, Instant), CoreError>;

pub struct Sampler {
    source: Arc<dyn CounterSource>,
    tracker: RateTracker,
    filter: InterfaceFilter,
    deadline: Duration,
    /// A read that outlived its deadline and has not been collected yet.
    pending: Option<JoinHandle<CounterRead>>,
}

impl Sampler {
    pub fn new(
        source: Arc<dyn CounterSource>,
        filter: InterfaceFilter,
        deadline: Duration,
    ) -> Self {
        Self {
            source,
            tracker: RateTracker::new(),
            filter,
            deadline,
            pending: None,
        }
    }

    pub fn tracker(&self) -> &RateTracker {
        &self.tracker
    }

    /// True while a timed-out read is still running on the blocking pool.
    pub fn read_in_flight(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Read the source once and compute the next snapshot.
    ///
    /// The read runs on the blocking pool under the deadline. A read that
    /// misses it is kept, not abandoned: until it finishes every call fails
    /// with [`CoreError::SampleInFlight`] without starting another read,
    /// and the first call after it finishes folds its result in. On any
    /// error the tracker is left untouched.
    pub async fn sample(&mut self) -> Result<NetworkSnapshot, CoreError> {
        let mut read = match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                self.pending = Some(handle);
                return Err(CoreError::SampleInFlight);
            }
            Some(handle) => handle,
            None => {
                let source = Arc::clone(&self.source);
                tokio::task::spawn_blocking(move || {
                    source.read_counters().map(|counters| (counters, Instant::now()))
                })
            }
        };

        let Ok(joined) = tokio::time::timeout(self.deadline, &mut read).await else {
            self.pending = Some(read);
            return Err(CoreError::SampleTimeout {
                timeout_ms: u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX),
            });
        };

        let (counters, at) =
            joined.map_err(|e| CoreError::Internal(format!("counter read task failed: {e}")))??;
        Ok(self.compute(counters, at, model::now_millis()))
    }

    /// Pure step: filter a read, update rates and assemble the snapshot.
    pub fn compute(
        &mut self,
        counters: Vec<InterfaceCounters>,
        at: Instant,
        timestamp: i64,
    ) -> NetworkSnapshot {
        let selected: Vec<InterfaceCounters> = counters
            .into_iter()
            .filter(|c| self.filter.allows(&c.name))
            .collect();
        trace!(interfaces = selected.len(), "computing network snapshot");

        let rates = self.tracker.observe(selected, at);
        NetworkSnapshot::from_rates(timestamp, rates)
    }
}
