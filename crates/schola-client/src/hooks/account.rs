//! The account hook.
//!
//! Fetches the first unlocked wallet account, mirrors account-changed
//! notifications into the cache entry, and derives `is_admin` by testing the
//! hashed address against the allow-list. Only digests are ever compared;
//! the allow-list never holds a plaintext address.

use std::collections::HashSet;
use std::sync::Arc;

use schola_cache::{resource::fetcher, FetchError, Resource, ResourceStore, Snapshot};
use schola_proof::admin_digest;
use schola_types::{Address, Fingerprint};
use schola_wallet::{WalletError, WalletNotification};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::connection::Connection;

/// Cache key for the current account. One per connection; switching accounts
/// mutates this entry rather than re-keying it.
pub const ACCOUNT_KEY: &str = "wallet/accounts";

/// Digest of the default administrator address.
pub const DEFAULT_ADMIN_DIGEST: &str =
    "0x3b2e0c5fd9a54c8a8f6d7e9b1c4a2d853e6f90b17a8c2d4e5f60718293a4b5c6";

/// Hashed admin allow-list.
#[derive(Debug, Clone)]
pub struct AdminAllowlist {
    digests: HashSet<Fingerprint>,
}

impl AdminAllowlist {
    /// Build from precomputed digests.
    pub fn from_digests(digests: impl IntoIterator<Item = Fingerprint>) -> Self {
        Self {
            digests: digests.into_iter().collect(),
        }
    }

    /// Build from hex digest strings (config format).
    pub fn from_hex(digests: &[String]) -> schola_types::Result<Self> {
        let parsed = digests
            .iter()
            .map(|s| Fingerprint::from_hex(s))
            .collect::<schola_types::Result<HashSet<_>>>()?;
        Ok(Self { digests: parsed })
    }

    /// Allow-list containing exactly these accounts, hashed immediately.
    pub fn from_accounts(accounts: &[Address]) -> Self {
        Self::from_digests(accounts.iter().map(admin_digest))
    }

    /// Membership test by hashed address.
    pub fn contains(&self, account: &Address) -> bool {
        self.digests.contains(&admin_digest(account))
    }
}

impl Default for AdminAllowlist {
    fn default() -> Self {
        // The compiled-in digest is valid hex by construction.
        let digests = Fingerprint::from_hex(DEFAULT_ADMIN_DIGEST)
            .map(|fp| HashSet::from([fp]))
            .unwrap_or_default();
        Self { digests }
    }
}

/// Derived view of the account resource.
#[derive(Debug, Clone)]
pub struct AccountView {
    /// Current account address, once fetched.
    pub address: Option<Address>,
    /// Whether the hashed address is in the admin allow-list.
    pub is_admin: bool,
    /// Raw cache snapshot.
    pub cache: Snapshot,
}

/// Binds the wallet account to the cache and owns the account-changed
/// listener. The listener lives exactly as long as the hook: dropping the
/// hook aborts it, so no subscription outlives its provider.
pub struct AccountHook {
    resource: Resource,
    allowlist: Arc<AdminAllowlist>,
    listener: JoinHandle<()>,
}

impl AccountHook {
    /// Create the hook and start mirroring account-changed notifications
    /// into the cache entry. Must be called within a tokio runtime.
    pub fn new(
        store: ResourceStore,
        connection: &Connection,
        notifications: broadcast::Receiver<WalletNotification>,
        allowlist: Arc<AdminAllowlist>,
    ) -> Self {
        let provider = connection.provider.clone();
        let resource = Resource::keyed(
            store,
            ACCOUNT_KEY,
            fetcher(move || {
                let provider = provider.clone();
                async move {
                    let accounts = provider
                        .accounts()
                        .await
                        .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                    let first = accounts
                        .first()
                        .copied()
                        .ok_or_else(|| FetchError::no_account(WalletError::NoAccount.to_string()))?;
                    serde_json::to_value(first)
                        .map_err(|e| FetchError::invalid_input(e.to_string()))
                }
            }),
        );

        let listener = spawn_account_listener(notifications, resource.clone());

        Self {
            resource,
            allowlist,
            listener,
        }
    }

    /// Read the current view, fetching on first observation.
    pub async fn ensure(&self) -> AccountView {
        let snapshot = self.resource.ensure().await;
        self.view(snapshot)
    }

    /// Read the current view without fetching.
    pub fn read(&self) -> AccountView {
        self.view(self.resource.read())
    }

    /// The underlying cache resource (used by dependent hooks for keying).
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn view(&self, cache: Snapshot) -> AccountView {
        let address = cache.data_as::<Address>();
        let is_admin = address
            .as_ref()
            .map(|a| self.allowlist.contains(a))
            .unwrap_or(false);
        AccountView {
            address,
            is_admin,
            cache,
        }
    }
}

impl Drop for AccountHook {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn spawn_account_listener(
    mut notifications: broadcast::Receiver<WalletNotification>,
    resource: Resource,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(WalletNotification::AccountChanged(account)) => {
                    let value = match account {
                        Some(address) => {
                            serde_json::to_value(address).unwrap_or(Value::Null)
                        }
                        None => Value::Null,
                    };
                    resource.mutate_with(value);
                }
                // The bridge already requested a reload.
                Ok(WalletNotification::NetworkChanged) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "account listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
