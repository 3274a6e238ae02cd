//! The managed-courses hook (administrator scan).
//!
//! Only queryable once the current account is admin-confirmed: the key
//! function returns `None` otherwise, so no ledger query is ever issued for
//! a non-admin. The scan walks purchase indices from highest to lowest so
//! the newest purchases surface first in admin views.

use std::sync::Arc;

use schola_cache::{resource::fetcher, FetchError, KeyFn, Resource, ResourceStore, Snapshot};
use schola_ledger::normalize::normalize_managed;
use schola_types::course::ManagedCourse;
use schola_types::Address;

use crate::connection::Connection;
use crate::hooks::account::AdminAllowlist;

/// Derived view of the managed-courses resource.
#[derive(Debug, Clone)]
pub struct ManagedCoursesView {
    /// All purchase records, newest first.
    pub courses: Vec<ManagedCourse>,
    /// Raw cache snapshot.
    pub cache: Snapshot,
}

/// Scans every purchase record on the ledger for the admin view.
pub struct ManagedCoursesHook {
    resource: Resource,
}

impl ManagedCoursesHook {
    pub fn new(
        store: ResourceStore,
        connection: &Connection,
        account: Resource,
        allowlist: Arc<AdminAllowlist>,
    ) -> Self {
        let key_fn: KeyFn = Arc::new(move || {
            account
                .read()
                .data_as::<Address>()
                .filter(|a| allowlist.contains(a))
                .map(|a| format!("marketplace/managed/{a}"))
        });

        let marketplace = connection.marketplace.clone();
        let resource = Resource::new(
            store,
            key_fn,
            fetcher(move || {
                let marketplace = marketplace.clone();
                async move {
                    let count = marketplace
                        .course_count()
                        .await
                        .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                    let mut courses = Vec::with_capacity(count as usize);
                    // Highest index first: most recent purchases on top.
                    for index in (0..count).rev() {
                        let hash = marketplace
                            .course_hash_at_index(index)
                            .await
                            .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                        let record = marketplace
                            .course_by_hash(hash)
                            .await
                            .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                        if record.is_absent() {
                            tracing::debug!(index, %hash, "skipping missing record");
                            continue;
                        }
                        let normalized = normalize_managed(hash, &record)
                            .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                        courses.push(normalized);
                    }
                    serde_json::to_value(courses)
                        .map_err(|e| FetchError::invalid_input(e.to_string()))
                }
            }),
        );

        Self { resource }
    }

    /// Read the current view, fetching on first observation of the key.
    pub async fn ensure(&self) -> ManagedCoursesView {
        let snapshot = self.resource.ensure().await;
        Self::view(snapshot)
    }

    /// Read the current view without fetching.
    pub fn read(&self) -> ManagedCoursesView {
        Self::view(self.resource.read())
    }

    /// The underlying cache resource.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn view(cache: Snapshot) -> ManagedCoursesView {
        ManagedCoursesView {
            courses: cache.data_as().unwrap_or_default(),
            cache,
        }
    }
}
