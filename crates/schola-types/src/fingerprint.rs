//! Fingerprints.
//!
//! A 32-byte digest used as the unique identifier of a (course, account)
//! ownership record and as the purchase verification proof.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TypeError;

/// A 32-byte digest, rendered as lowercase `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// The all-zero fingerprint.
    pub const ZERO: Fingerprint = Fingerprint([0u8; 32]);

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a `0x`-prefixed 64-digit hex fingerprint.
    pub fn from_hex(s: &str) -> crate::Result<Fingerprint> {
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidFingerprint(format!("missing 0x prefix: {s}")))?;
        if stripped.len() != 64 {
            return Err(TypeError::InvalidFingerprint(format!(
                "expected 64 hex digits, got {}",
                stripped.len()
            )));
        }
        let raw = hex::decode(stripped)
            .map_err(|e| TypeError::InvalidFingerprint(format!("{s}: {e}")))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&raw);
        Ok(Fingerprint(out))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

impl FromStr for Fingerprint {
    type Err = TypeError;

    fn from_str(s: &str) -> crate::Result<Fingerprint> {
        Fingerprint::from_hex(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
