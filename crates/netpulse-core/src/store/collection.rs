// ── Bounded collection ──
//
// Newest-first storage with a fixed capacity. Writers serialize on a
// single mutex; readers only ever touch the published `watch` snapshot.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::model::{Alert, LogEntry};

/// Entities that carry a stable lookup key.
pub(crate) trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Alert {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for LogEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Result of a keyed insert.
#[derive(Debug)]
pub(crate) enum Inserted<T> {
    Added {
        entity: Arc<T>,
        evicted: Option<Arc<T>>,
    },
    Duplicate,
}

/// Makes a pending change visible to readers.
///
/// Passed to every commit hook, which must call it exactly once. The hook
/// decides what else happens in the same critical section.
pub(crate) type Publish<'a> = &'a dyn Fn();

/// A capacity-bounded collection for a single entity type.
///
/// Index 0 is always the most recently inserted entity. A mutation is
/// applied under the writer lock, then handed to the caller's commit hook
/// together with a [`Publish`] callback; the snapshot readers see only
/// changes once that callback runs.
pub(crate) struct BoundedCollection<T: Keyed + Send + Sync + 'static> {
    entries: Mutex<VecDeque<Arc<T>>>,
    capacity: usize,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed + Send + Sync + 'static> BoundedCollection<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            snapshot,
        }
    }

    /// Insert at the front, evicting the oldest entity when full.
    ///
    /// Returns the stored entity and whatever was evicted to make room.
    pub(crate) fn insert(
        &self,
        entity: T,
        commit: impl FnOnce(&Arc<T>, Publish<'_>),
    ) -> (Arc<T>, Option<Arc<T>>) {
        let mut entries = self.entries.lock();
        let entity = Arc::new(entity);
        let evicted = push_front(&mut entries, Arc::clone(&entity), self.capacity);
        commit(&entity, &|| self.publish(&entries));
        (entity, evicted)
    }

    /// Like [`insert`](Self::insert), but refuses an entity whose key is
    /// already present. A refused insert leaves the collection untouched
    /// and never runs `commit`.
    pub(crate) fn insert_unique(
        &self,
        entity: T,
        commit: impl FnOnce(&Arc<T>, Publish<'_>),
    ) -> Inserted<T> {
        let mut entries = self.entries.lock();
        if entries.iter().any(|e| e.key() == entity.key()) {
            return Inserted::Duplicate;
        }

        let entity = Arc::new(entity);
        let evicted = push_front(&mut entries, Arc::clone(&entity), self.capacity);
        commit(&entity, &|| self.publish(&entries));
        Inserted::Added { entity, evicted }
    }

    /// Replace the entity stored under `key` with `f(current)`, in place.
    ///
    /// Returns `None` without running `commit` if `key` is unknown.
    pub(crate) fn update(
        &self,
        key: &str,
        f: impl FnOnce(&T) -> T,
        commit: impl FnOnce(&Arc<T>, Publish<'_>),
    ) -> Option<Arc<T>> {
        let mut entries = self.entries.lock();
        let slot = entries.iter_mut().find(|e| e.key() == key)?;

        let updated = Arc::new(f(&**slot));
        *slot = Arc::clone(&updated);
        commit(&updated, &|| self.publish(&entries));
        Some(updated)
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|e| e.key() == key)
            .map(Arc::clone)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    fn publish(&self, entries: &VecDeque<Arc<T>>) {
        let values: Vec<Arc<T>> = entries.iter().map(Arc::clone).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}

fn push_front<T>(
    entries: &mut VecDeque<Arc<T>>,
    entity: Arc<T>,
    capacity: usize,
) -> Option<Arc<T>> {
    entries.push_front(entity);
    if entries.len() > capacity {
        entries.pop_back()
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::model::LogLevel;

    fn log(id: &str) -> LogEntry {
        LogEntry {
            id: id.into(),
            timestamp: 0,
            level: LogLevel::Info,
            component: "test".into(),
            message: id.into(),
        }
    }

    fn publish_only<T>(_: &Arc<T>, publish: Publish<'_>) {
        publish();
    }

    fn ids(col: &BoundedCollection<LogEntry>) -> Vec<String> {
        col.snapshot().iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn newest_entry_comes_first() {
        let col = BoundedCollection::new(5);
        col.insert(log("a"), publish_only);
        col.insert(log("b"), publish_only);
        col.insert(log("c"), publish_only);

        assert_eq!(ids(&col), ["c", "b", "a"]);
    }

    #[test]
    fn insert_past_capacity_evicts_oldest() {
        let col = BoundedCollection::new(2);
        assert!(col.insert(log("a"), publish_only).1.is_none());
        assert!(col.insert(log("b"), publish_only).1.is_none());
        let (stored, evicted) = col.insert(log("c"), publish_only);

        assert_eq!(stored.id, "c");
        assert_eq!(evicted.unwrap().id, "a");
        assert_eq!(ids(&col), ["c", "b"]);
        assert_eq!(col.snapshot().len(), 2);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let col = BoundedCollection::new(0);
        col.insert(log("a"), publish_only);
        col.insert(log("b"), publish_only);
        assert_eq!(ids(&col), ["b"]);
    }

    #[test]
    fn insert_unique_refuses_duplicate_keys() {
        let col = BoundedCollection::new(4);
        col.insert(log("a"), publish_only);
        let before = col.snapshot();

        let committed = Cell::new(false);
        let outcome = col.insert_unique(log("a"), |_, publish| {
            committed.set(true);
            publish();
        });

        assert!(matches!(outcome, Inserted::Duplicate));
        assert!(!committed.get());
        assert!(Arc::ptr_eq(&before, &col.snapshot()));
    }

    #[test]
    fn update_replaces_in_place() {
        let col = BoundedCollection::new(4);
        col.insert(log("a"), publish_only);
        col.insert(log("b"), publish_only);

        let updated = col
            .update(
                "a",
                |e| LogEntry {
                    message: "changed".into(),
                    ..e.clone()
                },
                publish_only,
            )
            .unwrap();

        assert_eq!(updated.message, "changed");
        assert_eq!(ids(&col), ["b", "a"]);
        assert_eq!(col.get("a").unwrap().message, "changed");
    }

    #[test]
    fn update_of_unknown_key_publishes_nothing() {
        let col = BoundedCollection::new(4);
        col.insert(log("a"), publish_only);
        let before = col.snapshot();

        let committed = Cell::new(false);
        let outcome = col.update("missing", LogEntry::clone, |_, publish| {
            committed.set(true);
            publish();
        });

        assert!(outcome.is_none());
        assert!(!committed.get());
        assert!(Arc::ptr_eq(&before, &col.snapshot()));
    }

    #[test]
    fn change_is_invisible_until_published() {
        let col = BoundedCollection::new(4);

        col.insert(log("a"), |entity, publish| {
            assert!(col.snapshot().is_empty());
            publish();
            assert_eq!(col.snapshot()[0].id, entity.id);
        });
        assert_eq!(col.snapshot().len(), 1);
    }
}
