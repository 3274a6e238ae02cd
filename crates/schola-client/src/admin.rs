//! Administrator desk.
//!
//! Admin-side operations against the marketplace: course state transitions,
//! record search by fingerprint, purchase verification by email, and the
//! treasury entry points. Every call is submitted as-is; the ledger rejects
//! unauthorized senders, so nothing here pre-validates admin rights.

use schola_ledger::normalize::normalize_managed;
use schola_ledger::{LedgerError, TxReceipt};
use schola_types::course::ManagedCourse;
use schola_types::{Address, Fingerprint};

use crate::checkout::{CheckoutError, Result};
use crate::connection::Connection;
use crate::notify::TxNotifier;

/// Administrator operations sharing the transaction notice bus.
pub struct AdminDesk {
    connection: Connection,
    notifier: TxNotifier,
}

impl AdminDesk {
    pub fn new(connection: Connection, notifier: TxNotifier) -> Self {
        Self {
            connection,
            notifier,
        }
    }

    /// Activate a purchased course.
    pub async fn activate(&self, hash: Fingerprint, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("activate course", async move {
                marketplace.activate(hash, from).await.map_err(wrap)
            })
            .await
    }

    /// Deactivate a purchased course, refunding the buyer.
    pub async fn deactivate(&self, hash: Fingerprint, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("deactivate course", async move {
                marketplace.deactivate(hash, from).await.map_err(wrap)
            })
            .await
    }

    /// The contract administrator's address.
    pub async fn contract_owner(&self) -> std::result::Result<Address, LedgerError> {
        self.connection.marketplace.contract_owner().await
    }

    /// Look up a purchase record from a pasted fingerprint string.
    ///
    /// Malformed input and unknown fingerprints both answer `None`; only a
    /// failed ledger call is an error.
    pub async fn search_by_hash(
        &self,
        text: &str,
    ) -> std::result::Result<Option<ManagedCourse>, LedgerError> {
        let Ok(hash) = Fingerprint::from_hex(text.trim()) else {
            tracing::debug!(input = text, "search input is not a fingerprint");
            return Ok(None);
        };
        let record = self.connection.marketplace.course_by_hash(hash).await?;
        if record.is_absent() {
            return Ok(None);
        }
        normalize_managed(hash, &record).map(Some)
    }

    /// Verify a purchase claim: recompute the proof from the supplied email
    /// and compare with the proof stored on the record. An empty email never
    /// verifies.
    pub fn verify_claim(&self, email: &str, course: &ManagedCourse) -> bool {
        schola_proof::verify_claim(email, &course.hash, &course.proof).unwrap_or(false)
    }

    /// Withdraw part of the contract balance.
    pub async fn withdraw(&self, amount_wei: u128, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("withdraw", async move {
                marketplace.withdraw(amount_wei, from).await.map_err(wrap)
            })
            .await
    }

    /// Drain the whole contract balance. Only while stopped.
    pub async fn emergency_withdraw(&self, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("emergency withdraw", async move {
                marketplace.emergency_withdraw(from).await.map_err(wrap)
            })
            .await
    }

    /// Hand the contract to a new administrator.
    pub async fn transfer_ownership(
        &self,
        new_owner: Address,
        from: Address,
    ) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("transfer ownership", async move {
                marketplace
                    .transfer_ownership(new_owner, from)
                    .await
                    .map_err(wrap)
            })
            .await
    }

    /// Pause state-changing entry points.
    pub async fn stop(&self, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("stop contract", async move {
                marketplace.stop(from).await.map_err(wrap)
            })
            .await
    }

    /// Resume after a stop.
    pub async fn resume(&self, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("resume contract", async move {
                marketplace.resume(from).await.map_err(wrap)
            })
            .await
    }

    /// Remove the contract. Only while stopped.
    pub async fn self_destruct(&self, from: Address) -> Result<TxReceipt> {
        let marketplace = self.connection.marketplace.clone();
        self.notifier
            .watch("self destruct", async move {
                marketplace.self_destruct(from).await.map_err(wrap)
            })
            .await
    }
}

fn wrap(error: LedgerError) -> CheckoutError {
    CheckoutError::Transaction {
        message: error.to_string(),
    }
}
