//! # schola-cache
//!
//! Keyed reactive cache for asynchronous resources: one entry per logical
//! resource key, de-duplicated fetch-on-demand, synchronous optimistic
//! mutation, and stale-while-revalidate semantics.
//!
//! A resource binds a lazily evaluated key (a key of `None` means "inactive,
//! do not fetch") to an async fetcher producing a JSON value. Identical keys
//! observed from multiple call sites share one in-flight request and one
//! cached result. Entries are independent; there is no cross-key locking.

pub mod resource;
pub mod store;

use serde::{Deserialize, Serialize};

pub use resource::{BoxFuture, Fetcher, KeyFn, Resource, Snapshot};
pub use store::ResourceStore;

/// Stable error codes surfaced through cache entries.
pub mod codes {
    pub const NO_ACCOUNT: &str = "NO_ACCOUNT";
    pub const NETWORK_UNRESOLVED: &str = "NETWORK_UNRESOLVED";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const UNKNOWN_STATE: &str = "UNKNOWN_STATE";
    pub const TX_FAILED: &str = "TX_FAILED";
    pub const PROVIDER_UNAVAILABLE: &str = "PROVIDER_UNAVAILABLE";
    pub const LEDGER_CALL: &str = "LEDGER_CALL";
}

/// A fetch failure captured on a cache entry.
///
/// Fetch-time errors are never thrown at readers; they surface through the
/// entry's `error` field with a stable code and the underlying message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct FetchError {
    /// Stable error code (see [`codes`]).
    pub code: String,
    /// Human-readable failure message.
    pub message: String,
}

impl FetchError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn no_account(message: impl Into<String>) -> Self {
        Self::new(codes::NO_ACCOUNT, message)
    }

    pub fn network_unresolved(message: impl Into<String>) -> Self {
        Self::new(codes::NETWORK_UNRESOLVED, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_INPUT, message)
    }

    pub fn unknown_state(message: impl Into<String>) -> Self {
        Self::new(codes::UNKNOWN_STATE, message)
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::new(codes::PROVIDER_UNAVAILABLE, message)
    }

    pub fn ledger_call(message: impl Into<String>) -> Self {
        Self::new(codes::LEDGER_CALL, message)
    }
}
