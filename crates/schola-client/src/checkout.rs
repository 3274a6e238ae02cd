//! Purchase orchestration.
//!
//! Executes purchase and repurchase transactions against the marketplace and
//! reflects the expected post-transaction state in the owned-courses cache
//! immediately, before any confirmation refetch. When the local merge result
//! cannot be derived with certainty, the checkout falls back to a forced
//! refetch rather than synthesizing data.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use schola_ledger::TxReceipt;
use schola_proof::{course_fingerprint, course_id_block, verification_fingerprint};
use schola_types::course::{CatalogCourse, CourseState, OwnedCourse};
use schola_types::{units, Address};

use crate::connection::Connection;
use crate::hooks::owned::OwnedCoursesHook;
use crate::notify::TxNotifier;

/// Error type for write-path operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The write transaction reverted or failed to submit.
    #[error("transaction failed: {message}")]
    Transaction {
        /// Underlying revert or failure message.
        message: String,
    },

    /// The order is malformed (missing email, bad course id).
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// A purchase submission.
#[derive(Debug, Clone)]
pub struct PurchaseOrder {
    /// Buyer email; required for a first purchase, unused on repurchase.
    pub email: Option<String>,
    /// Attached value in wei.
    pub value_wei: u128,
}

type BusySet = Arc<Mutex<HashSet<String>>>;

/// Marks a course id busy for the duration of one outstanding transaction.
/// Cleared on drop, so both success and failure paths release the marker.
struct BusyGuard {
    busy: BusySet,
    course_id: String,
}

impl BusyGuard {
    fn hold(busy: BusySet, course_id: String) -> Self {
        lock(&busy).insert(course_id.clone());
        Self { busy, course_id }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        lock(&self.busy).remove(&self.course_id);
    }
}

fn lock(busy: &BusySet) -> MutexGuard<'_, HashSet<String>> {
    match busy.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Orchestrates purchase transactions and the optimistic cache updates that
/// follow them.
pub struct Checkout {
    connection: Connection,
    owned: OwnedCoursesHook,
    busy: BusySet,
    notifier: TxNotifier,
}

impl Checkout {
    pub fn new(connection: Connection, owned: OwnedCoursesHook, notifier: TxNotifier) -> Self {
        Self {
            connection,
            owned,
            busy: Arc::new(Mutex::new(HashSet::new())),
            notifier,
        }
    }

    /// Whether a transaction for this course is outstanding. UI controls
    /// bound to the course disable themselves while this is true.
    pub fn is_busy(&self, course_id: &str) -> bool {
        lock(&self.busy).contains(course_id)
    }

    /// The owned-courses hook this checkout mutates.
    pub fn owned_courses(&self) -> &OwnedCoursesHook {
        &self.owned
    }

    /// First-time purchase.
    ///
    /// Computes the course fingerprint and the email-bound verification
    /// proof, submits the transaction, and on success appends the new owned
    /// course (state purchased) to the cached collection without waiting for
    /// a refetch.
    pub async fn purchase(
        &self,
        course: &CatalogCourse,
        account: Address,
        order: &PurchaseOrder,
    ) -> Result<TxReceipt> {
        let email = order
            .email
            .as_deref()
            .ok_or_else(|| CheckoutError::InvalidOrder("email is required".to_string()))?;
        let block = course_id_block(&course.id)
            .map_err(|e| CheckoutError::InvalidOrder(e.to_string()))?;
        let hash = course_fingerprint(&course.id, &account)
            .map_err(|e| CheckoutError::InvalidOrder(e.to_string()))?;
        let proof = verification_fingerprint(email, &hash)
            .map_err(|e| CheckoutError::InvalidOrder(e.to_string()))?;

        let _busy = BusyGuard::hold(self.busy.clone(), course.id.clone());
        let marketplace = self.connection.marketplace.clone();
        let value_wei = order.value_wei;
        let receipt = self
            .notifier
            .watch(&course.title, async move {
                marketplace
                    .purchase(block, proof, account, value_wei)
                    .await
                    .map_err(|e| CheckoutError::Transaction {
                        message: e.to_string(),
                    })
            })
            .await?;

        let mut courses = self.owned.read().courses;
        courses.push(OwnedCourse {
            id: course.id.clone(),
            slug: course.slug.clone(),
            title: course.title.clone(),
            owned_course_id: None,
            hash,
            proof,
            owner: account,
            price_wei: order.value_wei,
            price: units::format_eth(order.value_wei),
            state: CourseState::Purchased,
        });
        self.apply(courses).await;

        Ok(receipt)
    }

    /// Repurchase of a previously deactivated course.
    ///
    /// Submits with the fingerprint only — the proof is immutable from the
    /// first purchase. On success the cached entry's state flips to
    /// purchased in place; if the entry is not cached, the collection is
    /// refetched instead of guessed at.
    pub async fn repurchase(
        &self,
        course: &CatalogCourse,
        account: Address,
        value_wei: u128,
    ) -> Result<TxReceipt> {
        let hash = course_fingerprint(&course.id, &account)
            .map_err(|e| CheckoutError::InvalidOrder(e.to_string()))?;

        let _busy = BusyGuard::hold(self.busy.clone(), course.id.clone());
        let marketplace = self.connection.marketplace.clone();
        let receipt = self
            .notifier
            .watch(&course.title, async move {
                marketplace
                    .repurchase(hash, account, value_wei)
                    .await
                    .map_err(|e| CheckoutError::Transaction {
                        message: e.to_string(),
                    })
            })
            .await?;

        let mut courses = self.owned.read().courses;
        match courses.iter().position(|c| c.id == course.id) {
            Some(index) => {
                if let Some(entry) = courses.get_mut(index) {
                    entry.state = CourseState::Purchased;
                }
                self.apply(courses).await;
            }
            None => {
                // Not derivable locally; refetch the authoritative state.
                self.owned.resource().revalidate().await;
            }
        }

        Ok(receipt)
    }

    async fn apply(&self, courses: Vec<OwnedCourse>) {
        match serde_json::to_value(&courses) {
            Ok(value) => self.owned.resource().mutate_with(value),
            Err(error) => {
                tracing::warn!(%error, "optimistic merge not serializable, refetching");
                self.owned.resource().revalidate().await;
            }
        }
    }
}
