//! Process-wide resource entry store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::watch;

use crate::FetchError;

/// Mutable state of one cache entry.
#[derive(Debug, Default)]
pub(crate) struct EntryState {
    /// Last successful (or optimistically mutated) value. A fetched JSON
    /// `null` is stored as `Some(Value::Null)` — "loaded and empty" is a
    /// distinct state from "never loaded".
    pub data: Option<Value>,
    /// Last fetch failure. Cleared on the next successful fetch or mutation.
    pub error: Option<FetchError>,
    /// Whether a fetch for this entry is currently in flight.
    pub is_validating: bool,
}

/// One cache entry: state plus a generation channel bumped on every change.
pub(crate) struct Entry {
    pub state: Mutex<EntryState>,
    generation: watch::Sender<u64>,
}

impl Entry {
    fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            state: Mutex::new(EntryState::default()),
            generation,
        }
    }

    /// Bump the generation counter, waking all subscribers.
    pub fn bump(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    /// Subscribe to generation changes.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

/// Page-lifetime store of cache entries, keyed by logical resource key.
///
/// Entries are created on first observation of a key and live for the store's
/// lifetime; a superseded key's entry simply goes unread. Entries are
/// independent — locking is per entry, never across keys.
#[derive(Clone, Default)]
pub struct ResourceStore {
    entries: Arc<Mutex<HashMap<String, Arc<Entry>>>>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the entry for a key.
    pub(crate) fn entry(&self, key: &str) -> Arc<Entry> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Entry::new()))
            .clone()
    }

    /// Whether an entry exists for a key (it may not have data yet).
    pub fn contains(&self, key: &str) -> bool {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.contains_key(key)
    }
}
