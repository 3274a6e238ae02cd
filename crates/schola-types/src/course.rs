//! Catalog and ownership course records.

use serde::{Deserialize, Serialize};

use crate::{Address, Fingerprint};

/// Lifecycle state of an owned course, as stored on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseState {
    /// Paid for, not yet reviewed by the administrator.
    Purchased,
    /// Activated by the administrator; content is accessible.
    Activated,
    /// Deactivated by the administrator; the payment was refunded.
    Deactivated,
}

impl CourseState {
    /// Decode the on-chain state code. Unmapped codes yield `None`; callers
    /// must treat that as an error, never as a default state.
    pub fn from_code(code: u8) -> Option<CourseState> {
        match code {
            0 => Some(CourseState::Purchased),
            1 => Some(CourseState::Activated),
            2 => Some(CourseState::Deactivated),
            _ => None,
        }
    }

    /// The on-chain state code.
    pub fn code(&self) -> u8 {
        match self {
            CourseState::Purchased => 0,
            CourseState::Activated => 1,
            CourseState::Deactivated => 2,
        }
    }
}

/// A course as supplied by the static catalog. Read-only input; this core
/// never mutates catalog records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCourse {
    /// Catalog identifier, at most 16 bytes of UTF-8.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// List price in whole USD.
    pub price_usd: u64,
}

/// A catalog course merged with its on-chain ownership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCourse {
    /// Catalog identifier.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Purchase index assigned by the ledger. `None` on an optimistic entry
    /// that has not been refetched yet.
    pub owned_course_id: Option<u64>,
    /// Fingerprint addressing this (course, account) record.
    pub hash: Fingerprint,
    /// Purchase verification proof stored at first purchase.
    pub proof: Fingerprint,
    /// Purchasing account.
    pub owner: Address,
    /// Paid price in wei. Transactions must use this value.
    pub price_wei: u128,
    /// Paid price as an exact ETH decimal string, for display only.
    pub price: String,
    /// Current ownership state.
    pub state: CourseState,
}

/// An ownership record as the administrator sees it: on-chain fields only,
/// no catalog join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedCourse {
    /// Fingerprint addressing this record.
    pub hash: Fingerprint,
    /// Purchase index assigned by the ledger.
    pub owned_course_id: u64,
    /// Purchase verification proof.
    pub proof: Fingerprint,
    /// Purchasing account.
    pub owner: Address,
    /// Paid price in wei.
    pub price_wei: u128,
    /// Paid price as an exact ETH decimal string.
    pub price: String,
    /// Current ownership state.
    pub state: CourseState,
}
