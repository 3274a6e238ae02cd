//! Purchase path scenarios: catalog scan, optimistic append, in-place
//! repurchase, busy markers, and failure handling.

use schola_client::checkout::PurchaseOrder;
use schola_integration_tests::{catalog, rig, ADMIN, BUYER};
use schola_ledger::Marketplace;
use schola_proof::course_fingerprint;
use schola_types::course::CourseState;

const VALUE: u128 = 900_000_000;

fn order(email: &str) -> PurchaseOrder {
    PurchaseOrder {
        email: Some(email.to_string()),
        value_wei: VALUE,
    }
}

#[tokio::test]
async fn owned_scan_collects_only_purchased_courses() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;

    // Buyer owns c1 only, purchased out of band.
    let c1 = catalog().remove(0);
    let hash = course_fingerprint(&c1.id, &BUYER).expect("fingerprint");
    let proof = schola_proof::verification_fingerprint("buyer@example.com", &hash).expect("proof");
    rig.marketplace
        .purchase(
            schola_proof::course_id_block(&c1.id).expect("block"),
            proof,
            BUYER,
            VALUE,
        )
        .await
        .expect("seed purchase");

    let owned = hooks.owned_courses.ensure().await;
    assert_eq!(owned.courses.len(), 1);
    assert_eq!(owned.courses[0].id, "c1");
    assert_eq!(owned.courses[0].state, CourseState::Purchased);
    assert!(owned.lookup.contains_key("c1"));
    assert!(!owned.lookup.contains_key("c2"));
    assert!(!owned.cache.is_empty);
}

#[tokio::test]
async fn owned_scan_is_empty_before_any_purchase() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;

    let owned = hooks.owned_courses.ensure().await;
    assert!(owned.courses.is_empty());
    assert!(owned.cache.has_initial_response);
    assert!(owned.cache.is_empty);
}

#[tokio::test]
async fn no_scan_while_account_is_absent() {
    let rig = rig(Vec::new(), &[]);
    let hooks = rig.session.hooks().expect("hooks");

    let owned = hooks.owned_courses.ensure().await;
    assert!(!owned.cache.has_initial_response, "key is inactive");
    assert!(owned.courses.is_empty());
}

#[tokio::test]
async fn purchase_appends_optimistically_before_any_refetch() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;
    let before = hooks.owned_courses.ensure().await;
    assert!(before.courses.is_empty());

    let c1 = catalog().remove(0);
    hooks
        .checkout
        .purchase(&c1, BUYER, &order("buyer@example.com"))
        .await
        .expect("purchase");

    // No refetch: read() goes straight to the cache.
    let after = hooks.owned_courses.read();
    assert_eq!(after.courses.len(), 1);
    let entry = &after.courses[0];
    assert_eq!(entry.id, "c1");
    assert_eq!(entry.state, CourseState::Purchased);
    assert_eq!(entry.owner, BUYER);
    assert_eq!(entry.price_wei, VALUE);
    assert_eq!(entry.owned_course_id, None, "ledger index unknown until refetch");
    assert!(after.lookup.contains_key("c1"));

    // A later authoritative refetch converges to the same course.
    let refetched = hooks.owned_courses.resource().revalidate().await;
    assert!(refetched.error.is_none());
    let converged = hooks.owned_courses.read();
    assert_eq!(converged.courses.len(), 1);
    assert_eq!(converged.courses[0].owned_course_id, Some(0));
}

#[tokio::test]
async fn repurchase_flips_state_in_place() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;
    hooks.owned_courses.ensure().await;

    let courses = catalog();
    let c1 = &courses[0];
    let c2 = &courses[1];
    hooks
        .checkout
        .purchase(c1, BUYER, &order("buyer@example.com"))
        .await
        .expect("purchase c1");
    hooks
        .checkout
        .purchase(c2, BUYER, &order("buyer@example.com"))
        .await
        .expect("purchase c2");

    // Admin deactivates c2; the client refetches the authoritative state.
    let c2_hash = course_fingerprint(&c2.id, &BUYER).expect("fingerprint");
    rig.marketplace
        .deactivate(c2_hash, ADMIN)
        .await
        .expect("deactivate");
    hooks.owned_courses.resource().revalidate().await;
    let deactivated = hooks.owned_courses.read();
    assert_eq!(
        deactivated.lookup["c2"].state,
        CourseState::Deactivated
    );

    hooks
        .checkout
        .repurchase(c2, BUYER, VALUE)
        .await
        .expect("repurchase");

    let after = hooks.owned_courses.read();
    assert_eq!(after.courses.len(), 2, "collection length unchanged");
    assert_eq!(after.lookup["c2"].state, CourseState::Purchased);
    assert_eq!(after.lookup["c1"].state, CourseState::Purchased);
}

#[tokio::test]
async fn repurchase_of_uncached_entry_falls_back_to_refetch() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;

    // Seed a deactivated purchase out of band, then clear the local view to
    // an empty optimistic state so the entry cannot be found locally.
    let c1 = catalog().remove(0);
    let hash = course_fingerprint(&c1.id, &BUYER).expect("fingerprint");
    let proof = schola_proof::verification_fingerprint("buyer@example.com", &hash).expect("proof");
    rig.marketplace
        .purchase(
            schola_proof::course_id_block(&c1.id).expect("block"),
            proof,
            BUYER,
            VALUE,
        )
        .await
        .expect("seed purchase");
    rig.marketplace.deactivate(hash, ADMIN).await.expect("deactivate");
    hooks
        .owned_courses
        .resource()
        .mutate_with(serde_json::json!([]));

    hooks
        .checkout
        .repurchase(&c1, BUYER, VALUE)
        .await
        .expect("repurchase");

    // The fallback refetch restored the authoritative collection.
    let after = hooks.owned_courses.read();
    assert_eq!(after.courses.len(), 1);
    assert_eq!(after.lookup["c1"].state, CourseState::Purchased);
}

#[tokio::test]
async fn failed_purchase_leaves_cache_untouched_and_clears_busy() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;
    hooks.owned_courses.ensure().await;

    let c1 = catalog().remove(0);
    hooks
        .checkout
        .purchase(&c1, BUYER, &order("buyer@example.com"))
        .await
        .expect("first purchase");

    // Second purchase of the same course reverts on the ledger.
    let result = hooks
        .checkout
        .purchase(&c1, BUYER, &order("buyer@example.com"))
        .await;
    assert!(result.is_err());
    assert!(!hooks.checkout.is_busy("c1"), "busy marker cleared on failure");

    let after = hooks.owned_courses.read();
    assert_eq!(after.courses.len(), 1, "no duplicate optimistic entry");
}

#[tokio::test]
async fn purchase_requires_email() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;

    let c1 = catalog().remove(0);
    let result = hooks
        .checkout
        .purchase(
            &c1,
            BUYER,
            &PurchaseOrder {
                email: None,
                value_wei: VALUE,
            },
        )
        .await;
    assert!(result.is_err());
    assert!(!hooks.checkout.is_busy("c1"));
}

#[tokio::test]
async fn busy_marker_cleared_after_success() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;
    hooks.owned_courses.ensure().await;

    let c1 = catalog().remove(0);
    assert!(!hooks.checkout.is_busy("c1"));
    hooks
        .checkout
        .purchase(&c1, BUYER, &order("buyer@example.com"))
        .await
        .expect("purchase");
    assert!(!hooks.checkout.is_busy("c1"));
}
