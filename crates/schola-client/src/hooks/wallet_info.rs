//! Combined wallet status.

use crate::hooks::account::{AccountHook, AccountView};
use crate::hooks::network::{NetworkHook, NetworkView};

/// Pure composition of the account and network views. No independent fetch.
#[derive(Debug, Clone)]
pub struct WalletInfo {
    pub account: AccountView,
    pub network: NetworkView,
    /// Neither the account nor the network has reported yet.
    pub is_connecting: bool,
    /// An account is present and the network is the supported one.
    pub has_connected_wallet: bool,
}

/// Compose the current wallet status from the two hooks' snapshots.
pub fn wallet_info(account: &AccountHook, network: &NetworkHook) -> WalletInfo {
    let account = account.read();
    let network = network.read();
    let is_connecting =
        !account.cache.has_initial_response && !network.cache.has_initial_response;
    let has_connected_wallet = account.address.is_some() && network.is_supported;
    WalletInfo {
        account,
        network,
        is_connecting,
        has_connected_wallet,
    }
}
