//! Account addresses.
//!
//! A 20-byte wallet address, rendered as lowercase `0x`-prefixed hex. The
//! all-zero address is the ledger's "no record" sentinel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TypeError;

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address, used by the ledger to mark absent records.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Whether this is the zero/null address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a `0x`-prefixed 40-digit hex address.
    pub fn from_hex(s: &str) -> crate::Result<Address> {
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidAddress(format!("missing 0x prefix: {s}")))?;
        if stripped.len() != 40 {
            return Err(TypeError::InvalidAddress(format!(
                "expected 40 hex digits, got {}",
                stripped.len()
            )));
        }
        let raw = hex::decode(stripped)
            .map_err(|e| TypeError::InvalidAddress(format!("{s}: {e}")))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&raw);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> crate::Result<Address> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
