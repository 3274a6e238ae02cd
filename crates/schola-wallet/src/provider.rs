//! Wallet provider trait and events.

use std::sync::{Arc, Mutex, MutexGuard};

use schola_types::Address;
use tokio::sync::broadcast;

use crate::{BoxFuture, Result, WalletError};

/// Low-level events emitted by the wallet extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The unlocked account list changed (possibly to empty).
    AccountsChanged(Vec<Address>),
    /// The selected chain changed.
    ChainChanged(u64),
}

/// The external wallet extension surface.
///
/// One provider exists per page load; it is owned by the bridge and shared
/// read-only by every resource hook. Events are delivered at most once per
/// underlying extension event through the broadcast channel.
pub trait WalletProvider: Send + Sync {
    /// Currently authorized accounts, without prompting.
    fn accounts(&self) -> BoxFuture<'_, Result<Vec<Address>>>;

    /// Request authorization; opens the extension's prompt.
    fn request_accounts(&self) -> BoxFuture<'_, Result<Vec<Address>>>;

    /// Currently selected chain id.
    fn chain_id(&self) -> BoxFuture<'_, Result<u64>>;

    /// Subscribe to provider events.
    fn events(&self) -> broadcast::Receiver<ProviderEvent>;
}

struct StubState {
    accounts: Vec<Address>,
    chain_id: u64,
    reject_authorization: bool,
}

/// Scriptable in-process provider.
///
/// Stands in for the browser extension: tests (and the demo wiring) drive
/// account and chain changes through it and observe the same event flow the
/// real extension produces.
pub struct StubProvider {
    state: Mutex<StubState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl StubProvider {
    /// A provider on the given chain with no authorized accounts.
    pub fn new(chain_id: u64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(StubState {
                accounts: Vec::new(),
                chain_id,
                reject_authorization: false,
            }),
            events,
        }
    }

    /// A provider with pre-authorized accounts.
    pub fn with_accounts(chain_id: u64, accounts: Vec<Address>) -> Self {
        let provider = Self::new(chain_id);
        provider.lock().accounts = accounts;
        provider
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Replace the account list and emit `AccountsChanged`.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts.clone();
        let _ = self.events.send(ProviderEvent::AccountsChanged(accounts));
    }

    /// Switch chains and emit `ChainChanged`.
    pub fn switch_chain(&self, chain_id: u64) {
        self.lock().chain_id = chain_id;
        let _ = self.events.send(ProviderEvent::ChainChanged(chain_id));
    }

    /// Make subsequent authorization prompts fail.
    pub fn set_reject_authorization(&self, reject: bool) {
        self.lock().reject_authorization = reject;
    }
}

impl WalletProvider for StubProvider {
    fn accounts(&self) -> BoxFuture<'_, Result<Vec<Address>>> {
        let accounts = self.lock().accounts.clone();
        Box::pin(async move { Ok(accounts) })
    }

    fn request_accounts(&self) -> BoxFuture<'_, Result<Vec<Address>>> {
        let (reject, accounts) = {
            let state = self.lock();
            (state.reject_authorization, state.accounts.clone())
        };
        Box::pin(async move {
            if reject {
                return Err(WalletError::Rejected(
                    "user denied account authorization".to_string(),
                ));
            }
            Ok(accounts)
        })
    }

    fn chain_id(&self) -> BoxFuture<'_, Result<u64>> {
        let chain_id = self.lock().chain_id;
        Box::pin(async move { Ok(chain_id) })
    }

    fn events(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Convenience alias for the shared provider handle.
pub type SharedProvider = Arc<dyn WalletProvider>;
