// ── Broadcast hub ──
//
// Tracks connected observers and fans encoded events out to them.
// Each observer owns a bounded outbound queue drained by its transport
// task; the hub only ever `try_send`s, so one slow or dead peer can
// never hold up delivery to the rest.

mod event;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

pub use event::{Frame, InitialData, PushEvent};

use crate::error::CoreError;

/// Identity of one observer connection. Never reused within a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs-{}", self.0)
    }
}

/// Receiving end of an observer's outbound queue.
///
/// Handed to the transport that owns the peer. Dropping it makes the
/// next push to this observer fail, which removes it from the hub.
pub struct Observer {
    id: ObserverId,
    frames: mpsc::Receiver<Frame>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next frame. `None` once the hub has dropped this observer.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    /// Take a queued frame without waiting.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.frames.try_recv().ok()
    }
}

/// Outcome of a single [`Hub::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// Observers removed because their queue was closed or full.
    pub dropped: Vec<ObserverId>,
}

pub struct Hub {
    observers: DashMap<ObserverId, mpsc::Sender<Frame>>,
    next_id: AtomicU64,
    /// Orders joins against pushes so a joiner's initial snapshot and the
    /// events that follow it form one gapless sequence.
    sequence: Mutex<()>,
    queue_depth: usize,
}

impl Hub {
    pub fn new(queue_depth: usize) -> Self {
        Self {
            observers: DashMap::new(),
            next_id: AtomicU64::new(1),
            sequence: Mutex::new(()),
            queue_depth: queue_depth.max(1),
        }
    }

    /// Register a new observer and queue its `initial-data` event.
    ///
    /// `snapshot` runs while pushes are held off, so the observer sees
    /// exactly the state it was given plus every event published after.
    pub fn join_with(
        &self,
        snapshot: impl FnOnce() -> InitialData,
    ) -> Result<Observer, CoreError> {
        let _sequence = self.sequence.lock();

        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, frames) = mpsc::channel(self.queue_depth);

        let frame = Frame::encode(&PushEvent::InitialData(snapshot()))?;
        tx.try_send(frame)
            .map_err(|e| CoreError::Internal(format!("initial frame rejected: {e}")))?;

        self.observers.insert(id, tx);
        info!(observer = %id, observers = self.observers.len(), "observer joined");

        Ok(Observer { id, frames })
    }

    /// Deregister an observer. Returns `false` if it was already gone.
    pub fn leave(&self, id: ObserverId) -> bool {
        let removed = self.observers.remove(&id).is_some();
        if removed {
            info!(observer = %id, observers = self.observers.len(), "observer left");
        }
        removed
    }

    /// Encode `event` once and queue the same frame for every observer.
    pub fn push(&self, event: &PushEvent) -> DeliveryReport {
        self.push_all(std::slice::from_ref(event))
            .pop()
            .unwrap_or_default()
    }

    /// Make a state change visible and announce it as one step.
    ///
    /// `publish` runs under the same lock that [`join_with`](Self::join_with)
    /// holds while snapshotting, so a joiner either sees the change in its
    /// `initial-data` or receives `event`, never both.
    pub fn commit(&self, event: &PushEvent, publish: impl FnOnce()) -> DeliveryReport {
        let frame = Frame::encode(event);

        let _sequence = self.sequence.lock();
        publish();
        match frame {
            Ok(frame) => self.deliver(event.kind(), &frame),
            Err(e) => {
                error!(event = event.kind(), error = %e, "failed to encode event");
                DeliveryReport::default()
            }
        }
    }

    /// Push several events as one uninterrupted run: no observer can join
    /// between them. Returns one report per event that encoded.
    pub fn push_all(&self, events: &[PushEvent]) -> Vec<DeliveryReport> {
        let frames: Vec<(&'static str, Frame)> = events
            .iter()
            .filter_map(|event| match Frame::encode(event) {
                Ok(frame) => Some((event.kind(), frame)),
                Err(e) => {
                    error!(event = event.kind(), error = %e, "failed to encode event");
                    None
                }
            })
            .collect();

        let _sequence = self.sequence.lock();
        frames
            .into_iter()
            .map(|(kind, frame)| self.deliver(kind, &frame))
            .collect()
    }

    fn deliver(&self, kind: &'static str, frame: &Frame) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for entry in &self.observers {
            match entry.value().try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(observer = %entry.key(), "observer queue full, disconnecting");
                    report.dropped.push(*entry.key());
                }
                Err(TrySendError::Closed(_)) => report.dropped.push(*entry.key()),
            }
        }

        // Removal happens after iteration releases the shard locks.
        for id in &report.dropped {
            if self.observers.remove(id).is_some() {
                debug!(observer = %id, event = kind, "dropped unreachable observer");
            }
        }

        report
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn is_registered(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }
}
