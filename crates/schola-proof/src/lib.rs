//! # schola-proof
//!
//! Domain-separated BLAKE3 fingerprints for course ownership and purchase
//! verification. Cross-domain collisions are prevented by mandatory domain
//! separation: every digest is computed in derive-key mode under one of the
//! registered context strings below.
//!
//! All functions are pure: the same inputs always yield the same digest, so
//! the purchase path and every later lookup agree on a record's identity
//! without shared state.

use schola_types::{Address, Fingerprint, COURSE_ID_BLOCK_LEN};

/// Registered BLAKE3 context strings. Using an unregistered context string
/// is a protocol violation.
pub mod contexts {
    pub const COURSE_FINGERPRINT: &str = "schola v1 course-fingerprint";
    pub const EMAIL_DIGEST: &str = "schola v1 email-digest";
    pub const PURCHASE_PROOF: &str = "schola v1 purchase-proof";
    pub const ADMIN_DIGEST: &str = "schola v1 admin-digest";

    /// All registered context strings. Used for validation.
    pub const ALL_CONTEXTS: &[&str] = &[
        COURSE_FINGERPRINT,
        EMAIL_DIGEST,
        PURCHASE_PROOF,
        ADMIN_DIGEST,
    ];
}

/// Error types for fingerprint computation.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// Malformed fingerprint input (course id, address, or email).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ProofError>;

/// Derive a 32-byte digest under a registered context string.
fn derive(context: &str, material: &[u8]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(material);
    let mut out = [0u8; 32];
    out.copy_from_slice(hasher.finalize().as_bytes());
    Fingerprint(out)
}

/// Encode a course id into the fixed 16-byte block fed into the course
/// fingerprint.
///
/// The id must be 1..=16 bytes of UTF-8; shorter ids are right-zero-padded.
/// Over-length ids fail — the codec never silently truncates.
pub fn course_id_block(course_id: &str) -> Result<[u8; COURSE_ID_BLOCK_LEN]> {
    let raw = course_id.as_bytes();
    if raw.is_empty() {
        return Err(ProofError::InvalidInput("empty course id".to_string()));
    }
    if raw.len() > COURSE_ID_BLOCK_LEN {
        return Err(ProofError::InvalidInput(format!(
            "course id longer than {COURSE_ID_BLOCK_LEN} bytes: {course_id:?}"
        )));
    }
    let mut block = [0u8; COURSE_ID_BLOCK_LEN];
    block[..raw.len()].copy_from_slice(raw);
    Ok(block)
}

/// Compute the fingerprint identifying a (course, account) ownership record.
///
/// Material is the fixed-width course-id block followed by the 20-byte
/// account address, so the digest is order-sensitive in both inputs.
pub fn course_fingerprint(course_id: &str, account: &Address) -> Result<Fingerprint> {
    let block = course_id_block(course_id)?;
    Ok(course_fingerprint_from_block(&block, account))
}

/// Fingerprint from an already-encoded course-id block. This is the
/// computation the ledger performs on its side of a purchase; both ends must
/// agree on it for purchase and lookup to address the same record.
pub fn course_fingerprint_from_block(
    block: &[u8; COURSE_ID_BLOCK_LEN],
    account: &Address,
) -> Fingerprint {
    let mut material = [0u8; COURSE_ID_BLOCK_LEN + 20];
    material[..COURSE_ID_BLOCK_LEN].copy_from_slice(block);
    material[COURSE_ID_BLOCK_LEN..].copy_from_slice(account.as_bytes());
    derive(contexts::COURSE_FINGERPRINT, &material)
}

/// Digest of a purchaser email. The plaintext email never reaches the ledger;
/// only this digest feeds into the verification proof.
pub fn email_digest(email: &str) -> Result<Fingerprint> {
    if email.is_empty() {
        return Err(ProofError::InvalidInput("empty email".to_string()));
    }
    Ok(derive(contexts::EMAIL_DIGEST, email.as_bytes()))
}

/// Compute the purchase verification proof from an email and a course
/// fingerprint.
///
/// Stored on the record at first purchase; reproducible only from the exact
/// (email, fingerprint) pair.
pub fn verification_fingerprint(email: &str, course_fp: &Fingerprint) -> Result<Fingerprint> {
    let digest = email_digest(email)?;
    let mut material = [0u8; 64];
    material[..32].copy_from_slice(digest.as_bytes());
    material[32..].copy_from_slice(course_fp.as_bytes());
    Ok(derive(contexts::PURCHASE_PROOF, &material))
}

/// Verify an ownership claim: recompute the proof from a user-supplied email
/// and the known course fingerprint, then compare with the stored proof.
pub fn verify_claim(email: &str, course_fp: &Fingerprint, stored: &Fingerprint) -> Result<bool> {
    Ok(verification_fingerprint(email, course_fp)? == *stored)
}

/// Digest of an account address for the hashed admin allow-list. Membership
/// tests compare these digests; plaintext addresses are never compared.
pub fn admin_digest(account: &Address) -> Fingerprint {
    derive(contexts::ADMIN_DIGEST, account.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn test_course_fingerprint_deterministic() {
        let a = addr(0x11);
        let fp1 = course_fingerprint("c1", &a).expect("fingerprint");
        let fp2 = course_fingerprint("c1", &a).expect("fingerprint");
        assert_eq!(fp1, fp2);
    }

    #[test]
    fn test_course_fingerprint_distinct_courses() {
        let a = addr(0x11);
        let fp1 = course_fingerprint("c1", &a).expect("fingerprint");
        let fp2 = course_fingerprint("c2", &a).expect("fingerprint");
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn test_course_fingerprint_distinct_accounts() {
        let fp1 = course_fingerprint("c1", &addr(0x11)).expect("fingerprint");
        let fp2 = course_fingerprint("c1", &addr(0x22)).expect("fingerprint");
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn test_course_id_block_pads_right() {
        let block = course_id_block("c1").expect("block");
        assert_eq!(&block[..2], b"c1");
        assert!(block[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_course_id_never_truncates() {
        assert!(course_id_block("").is_err());
        assert!(course_id_block("seventeen-bytes!!").is_err());
        // Exactly 16 bytes is fine.
        assert!(course_id_block("sixteen-bytes-ok").is_ok());
    }

    #[test]
    fn test_verification_roundtrip() {
        let fp = course_fingerprint("c1", &addr(0x11)).expect("fingerprint");
        let stored = verification_fingerprint("buyer@example.com", &fp).expect("proof");
        assert!(verify_claim("buyer@example.com", &fp, &stored).expect("verify"));
        assert!(!verify_claim("other@example.com", &fp, &stored).expect("verify"));
    }

    #[test]
    fn test_verification_rejects_empty_email() {
        let fp = course_fingerprint("c1", &addr(0x11)).expect("fingerprint");
        assert!(verification_fingerprint("", &fp).is_err());
    }

    #[test]
    fn test_domains_do_not_collide() {
        // The same 20 bytes of material under different contexts must differ.
        let a = addr(0x33);
        let admin = admin_digest(&a);
        let email = derive(contexts::EMAIL_DIGEST, a.as_bytes());
        assert_ne!(admin, email);
    }

    #[test]
    fn test_admin_digest_stable() {
        let a = addr(0x44);
        assert_eq!(admin_digest(&a), admin_digest(&a));
        assert_ne!(admin_digest(&a), admin_digest(&addr(0x45)));
    }
}
