//! In-memory marketplace.
//!
//! Implements [`Marketplace`] against process-local state with the deployed
//! contract's revert rules, so the client stack can run end to end without a
//! chain. Purchase order is preserved in an index list; the record mapping
//! answers unknown fingerprints with the zero-owner sentinel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use schola_proof::course_fingerprint_from_block;
use schola_types::{Address, Fingerprint, COURSE_ID_BLOCK_LEN};

use crate::contract::{CourseRecord, Marketplace, TxReceipt};
use crate::{BoxFuture, LedgerError, Result};

struct Inner {
    owner: Address,
    stopped: bool,
    destroyed: bool,
    balance: u128,
    records: HashMap<Fingerprint, CourseRecord>,
    index: Vec<Fingerprint>,
    tx_counter: u64,
}

impl Inner {
    fn receipt(&mut self) -> TxReceipt {
        self.tx_counter += 1;
        let mut hash = [0u8; 32];
        hash[..8].copy_from_slice(&self.tx_counter.to_be_bytes());
        TxReceipt {
            tx_hash: Fingerprint(hash),
            block: self.tx_counter,
        }
    }

    fn require_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(LedgerError::Transaction(
                "contract has been destroyed".to_string(),
            ));
        }
        Ok(())
    }

    fn require_owner(&self, from: Address) -> Result<()> {
        if from != self.owner {
            return Err(LedgerError::Transaction(
                "only the contract owner can perform this action".to_string(),
            ));
        }
        Ok(())
    }

    fn require_running(&self) -> Result<()> {
        if self.stopped {
            return Err(LedgerError::Transaction("contract is stopped".to_string()));
        }
        Ok(())
    }

    fn require_stopped(&self) -> Result<()> {
        if !self.stopped {
            return Err(LedgerError::Transaction(
                "contract is not stopped".to_string(),
            ));
        }
        Ok(())
    }
}

/// Process-local [`Marketplace`] with contract revert semantics.
#[derive(Clone)]
pub struct MemoryMarketplace {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryMarketplace {
    /// Create a marketplace administered by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                owner,
                stopped: false,
                destroyed: false,
                balance: 0,
                records: HashMap::new(),
                index: Vec::new(),
                tx_counter: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Current contract balance in wei.
    pub fn balance(&self) -> u128 {
        self.lock().balance
    }

    fn with_inner<T: Send + 'static>(
        &self,
        f: impl FnOnce(&mut Inner) -> Result<T> + Send + 'static,
    ) -> BoxFuture<'_, Result<T>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = match inner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut guard)
        })
    }
}

impl Marketplace for MemoryMarketplace {
    fn course_count(&self) -> BoxFuture<'_, Result<u64>> {
        self.with_inner(|inner| Ok(inner.index.len() as u64))
    }

    fn course_hash_at_index(&self, index: u64) -> BoxFuture<'_, Result<Fingerprint>> {
        self.with_inner(move |inner| {
            inner
                .index
                .get(index as usize)
                .copied()
                .ok_or_else(|| LedgerError::Call(format!("no purchase at index {index}")))
        })
    }

    fn course_by_hash(&self, hash: Fingerprint) -> BoxFuture<'_, Result<CourseRecord>> {
        self.with_inner(move |inner| {
            Ok(inner
                .records
                .get(&hash)
                .cloned()
                .unwrap_or_else(CourseRecord::absent))
        })
    }

    fn contract_owner(&self) -> BoxFuture<'_, Result<Address>> {
        self.with_inner(|inner| Ok(inner.owner))
    }

    fn purchase(
        &self,
        course_id: [u8; COURSE_ID_BLOCK_LEN],
        proof: Fingerprint,
        from: Address,
        value_wei: u128,
    ) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_running()?;
            let hash = course_fingerprint_from_block(&course_id, &from);
            if inner.records.contains_key(&hash) {
                return Err(LedgerError::Transaction(
                    "course has already been bought".to_string(),
                ));
            }
            let record = CourseRecord {
                id: inner.index.len() as u64,
                price: value_wei,
                proof,
                owner: from,
                state: 0,
            };
            inner.records.insert(hash, record);
            inner.index.push(hash);
            inner.balance += value_wei;
            tracing::debug!(%hash, buyer = %from, value = %value_wei, "course purchased");
            Ok(inner.receipt())
        })
    }

    fn repurchase(
        &self,
        hash: Fingerprint,
        from: Address,
        value_wei: u128,
    ) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_running()?;
            let record = inner
                .records
                .get_mut(&hash)
                .ok_or_else(|| LedgerError::Transaction("course is not created".to_string()))?;
            if record.owner != from {
                return Err(LedgerError::Transaction(
                    "sender is not the course owner".to_string(),
                ));
            }
            if record.state != 2 {
                return Err(LedgerError::Transaction(
                    "course is not deactivated".to_string(),
                ));
            }
            record.state = 0;
            record.price = value_wei;
            inner.balance += value_wei;
            Ok(inner.receipt())
        })
    }

    fn activate(&self, hash: Fingerprint, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            let record = inner
                .records
                .get_mut(&hash)
                .ok_or_else(|| LedgerError::Transaction("course is not created".to_string()))?;
            if record.state != 0 {
                return Err(LedgerError::Transaction(
                    "course does not have purchased state".to_string(),
                ));
            }
            record.state = 1;
            Ok(inner.receipt())
        })
    }

    fn deactivate(&self, hash: Fingerprint, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            let record = inner
                .records
                .get_mut(&hash)
                .ok_or_else(|| LedgerError::Transaction("course is not created".to_string()))?;
            if record.state != 0 {
                return Err(LedgerError::Transaction(
                    "course does not have purchased state".to_string(),
                ));
            }
            // The buyer is refunded; the stored price is zeroed.
            let refund = record.price;
            record.state = 2;
            record.price = 0;
            inner.balance = inner.balance.saturating_sub(refund);
            Ok(inner.receipt())
        })
    }

    fn withdraw(&self, amount_wei: u128, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            if amount_wei > inner.balance {
                return Err(LedgerError::Transaction(
                    "withdrawal exceeds contract balance".to_string(),
                ));
            }
            inner.balance -= amount_wei;
            Ok(inner.receipt())
        })
    }

    fn emergency_withdraw(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            inner.require_stopped()?;
            inner.balance = 0;
            Ok(inner.receipt())
        })
    }

    fn transfer_ownership(
        &self,
        new_owner: Address,
        from: Address,
    ) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            inner.owner = new_owner;
            Ok(inner.receipt())
        })
    }

    fn stop(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            inner.stopped = true;
            Ok(inner.receipt())
        })
    }

    fn resume(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            inner.stopped = false;
            Ok(inner.receipt())
        })
    }

    fn self_destruct(&self, from: Address) -> BoxFuture<'_, Result<TxReceipt>> {
        self.with_inner(move |inner| {
            inner.require_alive()?;
            inner.require_owner(from)?;
            inner.require_stopped()?;
            inner.balance = 0;
            inner.destroyed = true;
            Ok(inner.receipt())
        })
    }
}

#[cfg(test)]
mod tests {
    use schola_proof::{course_fingerprint, course_id_block, verification_fingerprint};

    use super::*;

    const ADMIN: Address = Address([0xad; 20]);
    const BUYER: Address = Address([0x01; 20]);
    const VALUE: u128 = 900_000_000;

    async fn buy(market: &MemoryMarketplace, course_id: &str, from: Address) -> Fingerprint {
        let block = course_id_block(course_id).expect("block");
        let hash = course_fingerprint(course_id, &from).expect("fingerprint");
        let proof = verification_fingerprint("buyer@example.com", &hash).expect("proof");
        market
            .purchase(block, proof, from, VALUE)
            .await
            .expect("purchase");
        hash
    }

    #[tokio::test]
    async fn test_purchase_creates_record() {
        let market = MemoryMarketplace::new(ADMIN);
        let hash = buy(&market, "c1", BUYER).await;

        assert_eq!(market.course_count().await.expect("count"), 1);
        assert_eq!(
            market.course_hash_at_index(0).await.expect("hash"),
            hash
        );

        let record = market.course_by_hash(hash).await.expect("record");
        assert_eq!(record.owner, BUYER);
        assert_eq!(record.price, VALUE);
        assert_eq!(record.state, 0);
        assert_eq!(market.balance(), VALUE);
    }

    #[tokio::test]
    async fn test_unknown_hash_yields_absent_record() {
        let market = MemoryMarketplace::new(ADMIN);
        let record = market
            .course_by_hash(Fingerprint([0x77; 32]))
            .await
            .expect("record");
        assert!(record.is_absent());
    }

    #[tokio::test]
    async fn test_duplicate_purchase_reverts() {
        let market = MemoryMarketplace::new(ADMIN);
        buy(&market, "c1", BUYER).await;

        let block = course_id_block("c1").expect("block");
        let result = market
            .purchase(block, Fingerprint([0x22; 32]), BUYER, VALUE)
            .await;
        assert!(matches!(result, Err(LedgerError::Transaction(_))));
    }

    #[tokio::test]
    async fn test_activate_requires_owner() {
        let market = MemoryMarketplace::new(ADMIN);
        let hash = buy(&market, "c1", BUYER).await;

        assert!(market.activate(hash, BUYER).await.is_err());
        market.activate(hash, ADMIN).await.expect("activate");
        let record = market.course_by_hash(hash).await.expect("record");
        assert_eq!(record.state, 1);
    }

    #[tokio::test]
    async fn test_deactivate_refunds_and_zeroes_price() {
        let market = MemoryMarketplace::new(ADMIN);
        let hash = buy(&market, "c1", BUYER).await;

        market.deactivate(hash, ADMIN).await.expect("deactivate");
        let record = market.course_by_hash(hash).await.expect("record");
        assert_eq!(record.state, 2);
        assert_eq!(record.price, 0);
        assert_eq!(market.balance(), 0);
    }

    #[tokio::test]
    async fn test_activate_rejects_deactivated_course() {
        let market = MemoryMarketplace::new(ADMIN);
        let hash = buy(&market, "c1", BUYER).await;
        market.deactivate(hash, ADMIN).await.expect("deactivate");

        assert!(market.activate(hash, ADMIN).await.is_err());
    }

    #[tokio::test]
    async fn test_repurchase_rules() {
        let market = MemoryMarketplace::new(ADMIN);
        let hash = buy(&market, "c1", BUYER).await;

        // Not deactivated yet.
        assert!(market.repurchase(hash, BUYER, VALUE).await.is_err());

        market.deactivate(hash, ADMIN).await.expect("deactivate");

        // Unknown record.
        assert!(market
            .repurchase(Fingerprint([0x55; 32]), BUYER, VALUE)
            .await
            .is_err());

        // Only the original buyer may repurchase.
        assert!(market
            .repurchase(hash, Address([0x02; 20]), VALUE)
            .await
            .is_err());

        market.repurchase(hash, BUYER, VALUE).await.expect("repurchase");
        let record = market.course_by_hash(hash).await.expect("record");
        assert_eq!(record.state, 0);
        assert_eq!(record.price, VALUE);
        assert_eq!(market.balance(), VALUE);
    }

    #[tokio::test]
    async fn test_withdraw_limited_by_balance() {
        let market = MemoryMarketplace::new(ADMIN);
        buy(&market, "c1", BUYER).await;

        assert!(market.withdraw(VALUE + 1, ADMIN).await.is_err());
        assert!(market.withdraw(VALUE, BUYER).await.is_err());
        market.withdraw(VALUE, ADMIN).await.expect("withdraw");
        assert_eq!(market.balance(), 0);
    }

    #[tokio::test]
    async fn test_emergency_paths_require_stopped() {
        let market = MemoryMarketplace::new(ADMIN);
        buy(&market, "c1", BUYER).await;

        assert!(market.emergency_withdraw(ADMIN).await.is_err());
        assert!(market.self_destruct(ADMIN).await.is_err());

        market.stop(ADMIN).await.expect("stop");
        // Purchases are rejected while stopped.
        let block = course_id_block("c2").expect("block");
        assert!(market
            .purchase(block, Fingerprint([0x33; 32]), BUYER, VALUE)
            .await
            .is_err());

        market.emergency_withdraw(ADMIN).await.expect("emergency");
        assert_eq!(market.balance(), 0);

        market.resume(ADMIN).await.expect("resume");
        buy(&market, "c2", BUYER).await;
    }

    #[tokio::test]
    async fn test_self_destruct_disables_writes() {
        let market = MemoryMarketplace::new(ADMIN);
        market.stop(ADMIN).await.expect("stop");
        market.self_destruct(ADMIN).await.expect("destruct");

        let block = course_id_block("c1").expect("block");
        assert!(market
            .purchase(block, Fingerprint([0x33; 32]), BUYER, VALUE)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_transfer_ownership() {
        let market = MemoryMarketplace::new(ADMIN);
        let new_admin = Address([0x09; 20]);

        assert!(market.transfer_ownership(new_admin, BUYER).await.is_err());
        market
            .transfer_ownership(new_admin, ADMIN)
            .await
            .expect("transfer");
        assert_eq!(market.contract_owner().await.expect("owner"), new_admin);

        // The previous owner has no rights anymore.
        assert!(market.stop(ADMIN).await.is_err());
        market.stop(new_admin).await.expect("stop");
    }
}
