//! Owned-course hooks.
//!
//! The bulk hook scans the whole catalog against the ledger for the current
//! account; the single-course hook answers one (course, account) pair, where
//! an absent record is a valid terminal state rather than an error. Both are
//! keyed by the account address, so switching accounts re-keys the resource
//! and triggers a fresh scan; no query is issued while the account is absent.

use std::collections::HashMap;
use std::sync::Arc;

use schola_cache::{resource::fetcher, FetchError, KeyFn, Resource, ResourceStore, Snapshot};
use schola_ledger::normalize::normalize_owned;
use schola_proof::course_fingerprint;
use schola_types::course::{CatalogCourse, OwnedCourse};
use schola_types::Address;
use serde_json::Value;

use crate::connection::Connection;

fn account_of(account: &Resource) -> Option<Address> {
    account.read().data_as::<Address>()
}

/// Derived view of the owned-courses resource.
#[derive(Debug, Clone)]
pub struct OwnedCoursesView {
    /// Normalized owned courses, in catalog order.
    pub courses: Vec<OwnedCourse>,
    /// Course id → owned course, for O(1) membership checks. Rebuilt from
    /// the collection on every read.
    pub lookup: HashMap<String, OwnedCourse>,
    /// Raw cache snapshot.
    pub cache: Snapshot,
}

/// Scans the catalog for courses owned by the current account.
#[derive(Clone)]
pub struct OwnedCoursesHook {
    resource: Resource,
}

impl OwnedCoursesHook {
    pub fn new(
        store: ResourceStore,
        connection: &Connection,
        catalog: Arc<Vec<CatalogCourse>>,
        account: Resource,
    ) -> Self {
        let key_account = account.clone();
        let key_fn: KeyFn = Arc::new(move || {
            account_of(&key_account).map(|a| format!("marketplace/owned/{a}"))
        });

        let marketplace = connection.marketplace.clone();
        let resource = Resource::new(
            store,
            key_fn,
            fetcher(move || {
                let marketplace = marketplace.clone();
                let catalog = catalog.clone();
                let account = account.clone();
                async move {
                    let Some(account) = account_of(&account) else {
                        return Err(FetchError::no_account("account is not available"));
                    };
                    let mut owned = Vec::new();
                    for course in catalog.iter() {
                        let hash = match course_fingerprint(&course.id, &account) {
                            Ok(hash) => hash,
                            Err(error) => {
                                tracing::warn!(course_id = %course.id, %error,
                                    "skipping course with invalid identifier");
                                continue;
                            }
                        };
                        let record = marketplace
                            .course_by_hash(hash)
                            .await
                            .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                        if record.is_absent() {
                            continue;
                        }
                        let normalized = normalize_owned(course, hash, &record)
                            .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                        owned.push(normalized);
                    }
                    serde_json::to_value(owned)
                        .map_err(|e| FetchError::invalid_input(e.to_string()))
                }
            }),
        );

        Self { resource }
    }

    /// Read the current view, fetching on first observation of the key.
    pub async fn ensure(&self) -> OwnedCoursesView {
        let snapshot = self.resource.ensure().await;
        Self::view(snapshot)
    }

    /// Read the current view without fetching.
    pub fn read(&self) -> OwnedCoursesView {
        Self::view(self.resource.read())
    }

    /// The underlying cache resource (mutated by the checkout on purchase).
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn view(cache: Snapshot) -> OwnedCoursesView {
        let courses: Vec<OwnedCourse> = cache.data_as().unwrap_or_default();
        let lookup = courses
            .iter()
            .map(|course| (course.id.clone(), course.clone()))
            .collect();
        OwnedCoursesView {
            courses,
            lookup,
            cache,
        }
    }
}

/// Derived view of a single owned-course resource.
#[derive(Debug, Clone)]
pub struct OwnedCourseView {
    /// The ownership record, or `None` when this account never purchased
    /// the course (or the response is still pending — check the snapshot).
    pub course: Option<OwnedCourse>,
    /// Raw cache snapshot.
    pub cache: Snapshot,
}

/// Answers ownership for one catalog course and the current account.
pub struct OwnedCourseHook {
    resource: Resource,
}

impl OwnedCourseHook {
    pub fn new(
        store: ResourceStore,
        connection: &Connection,
        course: CatalogCourse,
        account: Resource,
    ) -> Self {
        let key_account = account.clone();
        let key_course_id = course.id.clone();
        let key_fn: KeyFn = Arc::new(move || {
            account_of(&key_account)
                .map(|a| format!("marketplace/owned/{a}/{key_course_id}"))
        });

        let marketplace = connection.marketplace.clone();
        let resource = Resource::new(
            store,
            key_fn,
            fetcher(move || {
                let marketplace = marketplace.clone();
                let course = course.clone();
                let account = account.clone();
                async move {
                    let Some(account) = account_of(&account) else {
                        return Err(FetchError::no_account("account is not available"));
                    };
                    let hash = course_fingerprint(&course.id, &account)
                        .map_err(|e| FetchError::invalid_input(e.to_string()))?;
                    let record = marketplace
                        .course_by_hash(hash)
                        .await
                        .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                    if record.is_absent() {
                        // Never purchased: a valid terminal state.
                        return Ok(Value::Null);
                    }
                    let normalized = normalize_owned(&course, hash, &record)
                        .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                    serde_json::to_value(normalized)
                        .map_err(|e| FetchError::invalid_input(e.to_string()))
                }
            }),
        );

        Self { resource }
    }

    /// Read the current view, fetching on first observation of the key.
    pub async fn ensure(&self) -> OwnedCourseView {
        let snapshot = self.resource.ensure().await;
        Self::view(snapshot)
    }

    /// Read the current view without fetching.
    pub fn read(&self) -> OwnedCourseView {
        Self::view(self.resource.read())
    }

    fn view(cache: Snapshot) -> OwnedCourseView {
        OwnedCourseView {
            course: cache.data_as(),
            cache,
        }
    }
}
