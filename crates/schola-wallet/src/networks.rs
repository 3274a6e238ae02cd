//! Chain id → network name table.

use crate::{Result, WalletError};

/// Known networks, by wallet-extension chain id.
pub const NETWORKS: &[(u64, &str)] = &[
    (1, "Ethereum Main Network"),
    (3, "Ropsten Test Network"),
    (4, "Rinkeby Test Network"),
    (5, "Goerli Test Network"),
    (42, "Kovan Test Network"),
    (56, "Binance Smart Chain"),
    (1337, "Ganache"),
];

/// Look up a network name.
pub fn network_name(chain_id: u64) -> Option<&'static str> {
    NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
}

/// Resolve a chain id to its name, failing on unmapped ids.
pub fn resolve(chain_id: u64) -> Result<&'static str> {
    network_name(chain_id).ok_or(WalletError::UnresolvedNetwork(chain_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_networks() {
        assert_eq!(network_name(1), Some("Ethereum Main Network"));
        assert_eq!(network_name(1337), Some("Ganache"));
    }

    #[test]
    fn test_unknown_chain_id() {
        assert!(network_name(31337).is_none());
        assert!(matches!(
            resolve(31337),
            Err(WalletError::UnresolvedNetwork(31337))
        ));
    }
}
