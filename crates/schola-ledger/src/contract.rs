//! The marketplace method contract.
//!
//! The client consumes the contract exclusively through this trait: reads are
//! free `call`-style queries, writes are state-changing `send`-style
//! transactions requiring a signing account (and, for purchases, an attached
//! value). Every write resolves to a receipt or a revert message; the client
//! treats both as opaque.

use schola_types::{Address, Fingerprint, COURSE_ID_BLOCK_LEN};
use serde::{Deserialize, Serialize};

use crate::{BoxFuture, Result};

/// A course ownership record as stored on the ledger.
///
/// The ledger's record mapping has no absence notion: querying an unknown
/// fingerprint yields a record whose owner is the zero address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    /// Purchase index (order of purchase across all accounts).
    pub id: u64,
    /// Paid price in wei. Zeroed when the course is deactivated.
    pub price: u128,
    /// Purchase verification proof.
    pub proof: Fingerprint,
    /// Purchasing account; zero address when no record exists.
    pub owner: Address,
    /// Raw state code (see `CourseState::from_code`).
    pub state: u8,
}

impl CourseRecord {
    /// The record returned for fingerprints with no purchase.
    pub fn absent() -> Self {
        Self {
            id: 0,
            price: 0,
            proof: Fingerprint::ZERO,
            owner: Address::ZERO,
            state: 0,
        }
    }

    /// Whether this is the "no record" sentinel.
    pub fn is_absent(&self) -> bool {
        self.owner.is_zero()
    }
}

/// Receipt of a successfully mined write transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: Fingerprint,
    /// Block the transaction was included in.
    pub block: u64,
}

/// The course-marketplace contract surface.
///
/// Object-safe; implementations wrap a deployed contract (or the in-memory
/// marketplace). Authorization is enforced by the ledger itself — client-side
/// gating is advisory only, and admin-only calls from other accounts come
/// back as [`LedgerError::Transaction`](crate::LedgerError::Transaction).
pub trait Marketplace: Send + Sync {
    // Reads (`call`-style, no state change).

    /// Total number of purchases ever made.
    fn course_count(&self) -> BoxFuture<'_, Result<u64>>;

    /// Fingerprint of the purchase at an index (0-based, purchase order).
    fn course_hash_at_index(&self, index: u64) -> BoxFuture<'_, Result<Fingerprint>>;

    /// Full record for a fingerprint. Absent purchases come back with a zero
    /// owner, never as an error.
    fn course_by_hash(&self, hash: Fingerprint) -> BoxFuture<'_, Result<CourseRecord>>;

    /// The contract administrator.
    fn contract_owner(&self) -> BoxFuture<'_, Result<Address>>;

    // Writes (`send`-style, state-changing).

    /// First-time purchase: course id block plus the email-bound proof, with
    /// the paid value attached.
    fn purchase(
        &self,
        course_id: [u8; COURSE_ID_BLOCK_LEN],
        proof: Fingerprint,
        from: Address,
        value_wei: u128,
    ) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Repurchase of a previously deactivated course. No new proof — the
    /// proof is immutable from the first purchase.
    fn repurchase(
        &self,
        hash: Fingerprint,
        from: Address,
        value_wei: u128,
    ) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: activate a purchased course.
    fn activate(&self, hash: Fingerprint, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: deactivate a purchased course, refunding the buyer.
    fn deactivate(&self, hash: Fingerprint, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: withdraw part of the contract balance.
    fn withdraw(&self, amount_wei: u128, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: drain the whole balance. Only while stopped.
    fn emergency_withdraw(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: hand the contract to a new administrator.
    fn transfer_ownership(
        &self,
        new_owner: Address,
        from: Address,
    ) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: pause state-changing entry points.
    fn stop(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: resume after a stop.
    fn resume(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;

    /// Administrator: remove the contract. Only while stopped.
    fn self_destruct(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>>;
}
