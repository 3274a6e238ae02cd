//! # schola-types
//!
//! Shared domain types used across the schola workspace: account addresses,
//! fingerprints, catalog and ownership records, and currency units.

pub mod address;
pub mod course;
pub mod fingerprint;
pub mod units;

pub use address::Address;
pub use course::{CatalogCourse, CourseState, ManagedCourse, OwnedCourse};
pub use fingerprint::Fingerprint;

/// Wei per ETH (1 ETH = 10^18 wei).
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Micro-USD per USD, the fixed-point unit used for fiat rates.
pub const MICRO_USD_PER_USD: u64 = 1_000_000;

/// Byte width of the fixed course-id block fed into the course fingerprint.
pub const COURSE_ID_BLOCK_LEN: usize = 16;

/// Error types for domain value parsing and conversion.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// Malformed account address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed fingerprint.
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Malformed or out-of-range currency amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

pub type Result<T> = std::result::Result<T, TypeError>;
