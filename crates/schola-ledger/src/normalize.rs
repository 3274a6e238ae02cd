//! Ownership normalization.
//!
//! Merges static catalog fields with raw on-chain fields into the views the
//! UI reads. State codes decode through the fixed table; an unmapped code is
//! an error, never a silent default. Display prices are exact decimal
//! strings; the original wei amount rides along for anything that feeds back
//! into a transaction.

use schola_types::course::{CatalogCourse, CourseState, ManagedCourse, OwnedCourse};
use schola_types::{units, Fingerprint};

use crate::contract::CourseRecord;
use crate::{LedgerError, Result};

fn decode_state(code: u8) -> Result<CourseState> {
    CourseState::from_code(code).ok_or(LedgerError::UnknownState(code))
}

/// Merge a catalog course with its on-chain record.
pub fn normalize_owned(
    course: &CatalogCourse,
    hash: Fingerprint,
    record: &CourseRecord,
) -> Result<OwnedCourse> {
    Ok(OwnedCourse {
        id: course.id.clone(),
        slug: course.slug.clone(),
        title: course.title.clone(),
        owned_course_id: Some(record.id),
        hash,
        proof: record.proof,
        owner: record.owner,
        price_wei: record.price,
        price: units::format_eth(record.price),
        state: decode_state(record.state)?,
    })
}

/// Normalize a record for the administrator view, where only on-chain fields
/// and the addressing fingerprint are of interest.
pub fn normalize_managed(hash: Fingerprint, record: &CourseRecord) -> Result<ManagedCourse> {
    Ok(ManagedCourse {
        hash,
        owned_course_id: record.id,
        proof: record.proof,
        owner: record.owner,
        price_wei: record.price,
        price: units::format_eth(record.price),
        state: decode_state(record.state)?,
    })
}

#[cfg(test)]
mod tests {
    use schola_types::Address;

    use super::*;

    fn catalog_course() -> CatalogCourse {
        CatalogCourse {
            id: "c1".to_string(),
            slug: "intro-to-solidity".to_string(),
            title: "Intro to Solidity".to_string(),
            price_usd: 15,
        }
    }

    fn record(state: u8) -> CourseRecord {
        CourseRecord {
            id: 3,
            price: 1_500_000_000_000_000_000,
            proof: Fingerprint([0xaa; 32]),
            owner: Address([0x11; 20]),
            state,
        }
    }

    #[test]
    fn test_normalize_owned_merges_fields() {
        let owned =
            normalize_owned(&catalog_course(), Fingerprint([0xbb; 32]), &record(0)).expect("normalize");
        assert_eq!(owned.id, "c1");
        assert_eq!(owned.title, "Intro to Solidity");
        assert_eq!(owned.owned_course_id, Some(3));
        assert_eq!(owned.state, CourseState::Purchased);
        assert_eq!(owned.price, "1.5");
        assert_eq!(owned.price_wei, 1_500_000_000_000_000_000);
    }

    #[test]
    fn test_normalize_decodes_all_states() {
        for (code, state) in [
            (0, CourseState::Purchased),
            (1, CourseState::Activated),
            (2, CourseState::Deactivated),
        ] {
            let managed =
                normalize_managed(Fingerprint([0xbb; 32]), &record(code)).expect("normalize");
            assert_eq!(managed.state, state);
        }
    }

    #[test]
    fn test_normalize_rejects_unknown_state() {
        let err = normalize_managed(Fingerprint([0xbb; 32]), &record(9));
        assert!(matches!(err, Err(LedgerError::UnknownState(9))));
    }

    #[test]
    fn test_display_price_is_exact() {
        let mut r = record(0);
        r.price = schola_types::WEI_PER_ETH + 1;
        let managed = normalize_managed(Fingerprint([0xbb; 32]), &r).expect("normalize");
        assert_eq!(managed.price, "1.000000000000000001");
    }
}
