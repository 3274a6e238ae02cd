//! The network hook.
//!
//! Resolves the provider's chain id to a human-readable name once per
//! connection. Network changes are not mutated in place: the bridge reloads
//! the page instead, so this entry is only ever fetched against one chain.

use schola_cache::{resource::fetcher, FetchError, Resource, ResourceStore, Snapshot};
use schola_wallet::networks;

use crate::connection::Connection;

/// Cache key for the resolved network name.
pub const NETWORK_KEY: &str = "wallet/network";

/// Derived view of the network resource.
#[derive(Debug, Clone)]
pub struct NetworkView {
    /// Resolved network name, once fetched.
    pub name: Option<String>,
    /// Name of the network the contract is deployed on.
    pub target: &'static str,
    /// Whether the wallet is on the target network.
    pub is_supported: bool,
    /// Raw cache snapshot.
    pub cache: Snapshot,
}

/// Binds the wallet's network to the cache.
pub struct NetworkHook {
    resource: Resource,
    target: &'static str,
}

impl NetworkHook {
    /// Create the hook. Fails when the configured target chain id is not in
    /// the networks table — that is a deployment mistake, not a user state.
    pub fn new(
        store: ResourceStore,
        connection: &Connection,
        target_chain_id: u64,
    ) -> schola_wallet::Result<Self> {
        let target = networks::resolve(target_chain_id)?;
        let provider = connection.provider.clone();
        let resource = Resource::keyed(
            store,
            NETWORK_KEY,
            fetcher(move || {
                let provider = provider.clone();
                async move {
                    let chain_id = provider
                        .chain_id()
                        .await
                        .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                    let name = networks::resolve(chain_id)
                        .map_err(|e| FetchError::new(e.code(), e.to_string()))?;
                    Ok(serde_json::Value::String(name.to_string()))
                }
            }),
        );
        Ok(Self { resource, target })
    }

    /// Read the current view, fetching on first observation.
    pub async fn ensure(&self) -> NetworkView {
        let snapshot = self.resource.ensure().await;
        self.view(snapshot)
    }

    /// Read the current view without fetching.
    pub fn read(&self) -> NetworkView {
        self.view(self.resource.read())
    }

    /// The target network name.
    pub fn target(&self) -> &'static str {
        self.target
    }

    fn view(&self, cache: Snapshot) -> NetworkView {
        let name = cache.data_as::<String>();
        let is_supported = name.as_deref() == Some(self.target);
        NetworkView {
            name,
            target: self.target,
            is_supported,
            cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use schola_ledger::MemoryMarketplace;
    use schola_types::Address;
    use schola_wallet::StubProvider;

    use super::*;

    fn connection(chain_id: u64) -> Connection {
        Connection::new(
            Arc::new(StubProvider::new(chain_id)),
            Arc::new(MemoryMarketplace::new(Address([0xad; 20]))),
        )
    }

    #[tokio::test]
    async fn test_resolves_and_supports_target() {
        let hook = NetworkHook::new(ResourceStore::new(), &connection(1337), 1337)
            .expect("known target");
        let view = hook.ensure().await;
        assert_eq!(view.name.as_deref(), Some("Ganache"));
        assert_eq!(view.target, "Ganache");
        assert!(view.is_supported);
    }

    #[tokio::test]
    async fn test_wrong_network_is_unsupported() {
        let hook =
            NetworkHook::new(ResourceStore::new(), &connection(1), 1337).expect("known target");
        let view = hook.ensure().await;
        assert_eq!(view.name.as_deref(), Some("Ethereum Main Network"));
        assert!(!view.is_supported);
    }

    #[tokio::test]
    async fn test_unmapped_chain_surfaces_error() {
        let hook = NetworkHook::new(ResourceStore::new(), &connection(31337), 1337)
            .expect("known target");
        let view = hook.ensure().await;
        assert_eq!(view.name, None);
        let error = view.cache.error.expect("error");
        assert_eq!(error.code, schola_cache::codes::NETWORK_UNRESOLVED);
    }

    #[tokio::test]
    async fn test_unknown_target_is_a_setup_error() {
        assert!(NetworkHook::new(ResourceStore::new(), &connection(1337), 31337).is_err());
    }
}
