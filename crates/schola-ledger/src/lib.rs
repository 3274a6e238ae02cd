//! # schola-ledger
//!
//! The marketplace contract surface: the read/write method contract the
//! client consumes, raw on-chain course records, the ownership normalizer,
//! and an in-memory marketplace used until a real chain binding is wired in.
//!
//! ## Modules
//!
//! - [`contract`] — the [`Marketplace`] trait and record types
//! - [`normalize`] — raw record + catalog course → normalized ownership view
//! - [`memory`] — in-memory marketplace with contract revert semantics

pub mod contract;
pub mod memory;
pub mod normalize;

pub use contract::{CourseRecord, Marketplace, TxReceipt};
pub use memory::MemoryMarketplace;

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by the object-safe [`Marketplace`] trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// On-chain state code outside the known table.
    #[error("unknown course state code: {0}")]
    UnknownState(u8),

    /// A write transaction reverted or failed, with the underlying message.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// A read call failed (node or transport trouble, bad index).
    #[error("ledger call failed: {0}")]
    Call(String),
}

impl LedgerError {
    /// Stable error code for cache-entry surfacing.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::UnknownState(_) => "UNKNOWN_STATE",
            LedgerError::Transaction(_) => "TX_FAILED",
            LedgerError::Call(_) => "LEDGER_CALL",
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
