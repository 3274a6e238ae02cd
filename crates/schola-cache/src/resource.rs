//! Resource handles: key + fetcher bound to the shared store.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::store::{Entry, EntryState, ResourceStore};
use crate::FetchError;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Lazily evaluated resource key. `None` means "inactive, do not fetch";
/// re-evaluated before every fetch attempt so a key that depends on external
/// state (e.g. the current account) re-keys the resource when that state
/// changes.
pub type KeyFn = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Async fetcher producing the resource value.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<Result<Value, FetchError>> + Send + Sync>;

/// Build a [`Fetcher`] from an async closure.
pub fn fetcher<F, Fut>(f: F) -> Fetcher
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as BoxFuture<Result<Value, FetchError>>)
}

/// Build a [`KeyFn`] that always yields the same key.
pub fn fixed_key(key: impl Into<String>) -> KeyFn {
    let key = key.into();
    Arc::new(move || Some(key.clone()))
}

/// Point-in-time view of a cache entry.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Cached value, if any response has been stored.
    pub data: Option<Value>,
    /// Last fetch failure, if any.
    pub error: Option<FetchError>,
    /// Whether a fetch is in flight.
    pub is_validating: bool,
    /// Whether any response (value or error) has arrived.
    pub has_initial_response: bool,
    /// Whether the response arrived and its value is semantically empty.
    /// Always false before `has_initial_response`.
    pub is_empty: bool,
}

impl Snapshot {
    /// Snapshot of an inactive resource (key resolved to `None`).
    pub fn inactive() -> Self {
        Self {
            data: None,
            error: None,
            is_validating: false,
            has_initial_response: false,
            is_empty: false,
        }
    }

    fn from_state(state: &EntryState) -> Self {
        let has_initial_response = state.data.is_some() || state.error.is_some();
        let is_empty = has_initial_response
            && state.data.as_ref().map(value_is_empty).unwrap_or(true);
        Self {
            data: state.data.clone(),
            error: state.error.clone(),
            is_validating: state.is_validating,
            has_initial_response,
            is_empty,
        }
    }

    /// Deserialize the cached value. A cached JSON `null` reads as absent.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.data.clone()?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = %e, "cached value does not match expected shape");
                None
            }
        }
    }
}

/// Whether a JSON value is semantically empty: null, empty string, empty
/// array, or empty object.
pub fn value_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn lock_state(entry: &Entry) -> MutexGuard<'_, EntryState> {
    match entry.state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A logical resource: a key function and a fetcher bound to the shared
/// store. Cloning is cheap; clones observe the same cache entries.
#[derive(Clone)]
pub struct Resource {
    store: ResourceStore,
    key_fn: KeyFn,
    fetcher: Fetcher,
}

impl Resource {
    pub fn new(store: ResourceStore, key_fn: KeyFn, fetcher: Fetcher) -> Self {
        Self {
            store,
            key_fn,
            fetcher,
        }
    }

    /// A resource with a fixed key.
    pub fn keyed(store: ResourceStore, key: impl Into<String>, fetcher: Fetcher) -> Self {
        Self::new(store, fixed_key(key), fetcher)
    }

    /// Evaluate the key function.
    pub fn key(&self) -> Option<String> {
        (self.key_fn)()
    }

    /// Read the current snapshot without triggering a fetch.
    pub fn read(&self) -> Snapshot {
        match self.key() {
            Some(key) => Snapshot::from_state(&lock_state(&self.store.entry(&key))),
            None => Snapshot::inactive(),
        }
    }

    /// Read the snapshot, fetching first if this key has never produced a
    /// response. Concurrent callers share a single in-flight fetch.
    pub async fn ensure(&self) -> Snapshot {
        self.fetch(false).await
    }

    /// Force a refetch, replacing data on success and recording the error on
    /// failure. Previous data is retained while validating and on failure
    /// (stale-while-revalidate).
    pub async fn revalidate(&self) -> Snapshot {
        self.fetch(true).await
    }

    /// SWR-style mutate: with a value, replace the cached data immediately
    /// and synchronously; with `None`, force a refetch.
    pub async fn mutate(&self, value: Option<Value>) -> Snapshot {
        match value {
            Some(v) => {
                self.mutate_with(v);
                self.read()
            }
            None => self.revalidate().await,
        }
    }

    /// Replace the cached value synchronously, without any network call.
    /// The new value is visible to the next `read` before any round trip
    /// completes. Clears a previously recorded error.
    pub fn mutate_with(&self, value: Value) {
        let Some(key) = self.key() else {
            tracing::warn!("optimistic mutate on an inactive resource; ignored");
            return;
        };
        let entry = self.store.entry(&key);
        {
            let mut state = lock_state(&entry);
            state.data = Some(value);
            state.error = None;
        }
        entry.bump();
    }

    /// Subscribe to change notifications for the current key. `None` while
    /// the resource is inactive.
    pub fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        let key = self.key()?;
        Some(self.store.entry(&key).watch())
    }

    async fn fetch(&self, force: bool) -> Snapshot {
        let Some(key) = self.key() else {
            return Snapshot::inactive();
        };
        let entry = self.store.entry(&key);

        // Decide under the lock; never hold it across an await.
        let waiter = {
            let mut state = lock_state(&entry);
            if state.is_validating {
                Some(entry.watch())
            } else if !force && (state.data.is_some() || state.error.is_some()) {
                return Snapshot::from_state(&state);
            } else {
                state.is_validating = true;
                None
            }
        };

        if let Some(mut rx) = waiter {
            // Attach to the in-flight fetch for this key.
            let _ = rx.changed().await;
            return Snapshot::from_state(&lock_state(&entry));
        }

        let result = (self.fetcher)().await;
        {
            let mut state = lock_state(&entry);
            match result {
                Ok(value) => {
                    state.data = Some(value);
                    state.error = None;
                }
                Err(error) => {
                    // Keep stale data so the UI does not flash to empty.
                    tracing::debug!(key = %key, error = %error, "resource fetch failed");
                    state.error = Some(error);
                }
            }
            state.is_validating = false;
        }
        entry.bump();
        Snapshot::from_state(&lock_state(&entry))
    }
}
