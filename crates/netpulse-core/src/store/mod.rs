// ── In-memory state store ──
//
// Bounded, newest-first collections with snapshot reads and
// push-on-mutation through the broadcast hub.

mod collection;
mod data_store;

pub use data_store::DataStore;
