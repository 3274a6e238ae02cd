//! # schola-wallet
//!
//! The provider bridge: wraps the external wallet extension behind a trait,
//! forwards its low-level events (account list changed, chain changed) as
//! typed notifications, and owns the page-reload recovery policy for
//! network changes and authorization failures.
//!
//! ## Modules
//!
//! - [`provider`] — the [`WalletProvider`] trait, provider events, stub provider
//! - [`bridge`] — the [`WalletBridge`]: detection, `connect()`, notifications
//! - [`networks`] — chain id → network name table
//! - [`reload`] — the [`Reloader`] full-page-reload policy object

pub mod bridge;
pub mod networks;
pub mod provider;
pub mod reload;

pub use bridge::{WalletBridge, WalletNotification};
pub use provider::{ProviderEvent, StubProvider, WalletProvider};
pub use reload::{CountingReloader, LogReloader, Reloader};

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by the object-safe [`WalletProvider`] trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The wallet has no unlocked account.
    #[error("cannot retrieve an account, please refresh the browser")]
    NoAccount,

    /// The reported chain id is not in the networks table.
    #[error("cannot resolve network for chain id {0}")]
    UnresolvedNetwork(u64),

    /// The wallet extension was not found.
    #[error("wallet extension is not available")]
    ProviderUnavailable,

    /// The user rejected the authorization prompt.
    #[error("wallet authorization rejected: {0}")]
    Rejected(String),

    /// A provider RPC call failed.
    #[error("provider call failed: {0}")]
    Call(String),
}

impl WalletError {
    /// Stable error code for cache-entry surfacing.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::NoAccount => "NO_ACCOUNT",
            WalletError::UnresolvedNetwork(_) => "NETWORK_UNRESOLVED",
            WalletError::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            WalletError::Rejected(_) => "PROVIDER_UNAVAILABLE",
            WalletError::Call(_) => "LEDGER_CALL",
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;
