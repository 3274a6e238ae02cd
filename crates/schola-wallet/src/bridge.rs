//! The wallet bridge.
//!
//! Obtains one wallet connection per page load and exposes
//! `{is_loading, require_install, connect()}`. Provider events are consumed
//! by exactly one listener: chain changes trigger the reload policy, account
//! changes are republished as typed notifications for the hook layer to act
//! on. The bridge itself never touches cache state.

use std::sync::Arc;

use schola_types::Address;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::provider::SharedProvider;
use crate::reload::Reloader;
use crate::{ProviderEvent, Result, WalletError};

/// Typed notification published by the bridge.
///
/// Invalidation is explicit: the hook layer mutates the account cache entry
/// on `AccountChanged`; `NetworkChanged` accompanies the coarse reload and
/// carries no payload on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletNotification {
    /// The first unlocked account changed, or no account remains.
    AccountChanged(Option<Address>),
    /// The selected chain changed; a reload has been requested.
    NetworkChanged,
}

/// Bridge between the wallet extension and the rest of the client.
pub struct WalletBridge {
    provider: Option<SharedProvider>,
    reloader: Arc<dyn Reloader>,
    notifications: broadcast::Sender<WalletNotification>,
    listener: Option<JoinHandle<()>>,
    resolved: bool,
}

impl WalletBridge {
    /// A bridge whose provider detection has not completed yet.
    pub fn pending(reloader: Arc<dyn Reloader>) -> Self {
        let (notifications, _) = broadcast::channel(16);
        Self {
            provider: None,
            reloader,
            notifications,
            listener: None,
            resolved: false,
        }
    }

    /// A bridge with detection already resolved. Must be called from within
    /// a tokio runtime: the event listener is spawned here.
    pub fn detect(provider: Option<SharedProvider>, reloader: Arc<dyn Reloader>) -> Self {
        let mut bridge = Self::pending(reloader);
        bridge.resolve(provider);
        bridge
    }

    /// Complete the loading sequence with the detection outcome. Registers
    /// the single provider-event listener; calling again is a no-op.
    pub fn resolve(&mut self, provider: Option<SharedProvider>) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        match provider {
            Some(provider) => {
                self.listener = Some(spawn_listener(
                    provider.events(),
                    self.notifications.clone(),
                    self.reloader.clone(),
                ));
                self.provider = Some(provider);
            }
            None => {
                tracing::error!("wallet extension not found, please install it");
            }
        }
    }

    /// Whether the provider loading sequence is still running.
    pub fn is_loading(&self) -> bool {
        !self.resolved
    }

    /// True iff the loading sequence completed and no extension was found.
    pub fn require_install(&self) -> bool {
        self.resolved && self.provider.is_none()
    }

    /// The detected provider, if any.
    pub fn provider(&self) -> Option<SharedProvider> {
        self.provider.clone()
    }

    /// Subscribe to bridge notifications.
    pub fn notifications(&self) -> broadcast::Receiver<WalletNotification> {
        self.notifications.subscribe()
    }

    /// Request wallet authorization.
    ///
    /// On rejection the error is logged and a full reload is requested:
    /// wallet-level authorization failures are not recoverable from
    /// application state.
    pub async fn connect(&self) -> Result<Vec<Address>> {
        let Some(provider) = &self.provider else {
            tracing::error!("cannot connect, wallet extension is not available");
            return Err(WalletError::ProviderUnavailable);
        };
        match provider.request_accounts().await {
            Ok(accounts) => Ok(accounts),
            Err(error) => {
                tracing::error!(%error, "cannot retrieve account");
                self.reloader.request_reload("wallet authorization failed");
                Err(error)
            }
        }
    }
}

impl Drop for WalletBridge {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

fn spawn_listener(
    mut events: broadcast::Receiver<ProviderEvent>,
    notifications: broadcast::Sender<WalletNotification>,
    reloader: Arc<dyn Reloader>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ProviderEvent::AccountsChanged(accounts)) => {
                    let first = accounts.first().copied();
                    tracing::debug!(account = ?first, "wallet account changed");
                    let _ = notifications.send(WalletNotification::AccountChanged(first));
                }
                Ok(ProviderEvent::ChainChanged(chain_id)) => {
                    tracing::info!(chain_id, "wallet network changed, reloading");
                    let _ = notifications.send(WalletNotification::NetworkChanged);
                    reloader.request_reload("wallet network changed");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "wallet event listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
