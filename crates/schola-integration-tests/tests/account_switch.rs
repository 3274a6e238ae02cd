//! Provider event scenarios: account switching re-keys owned data, network
//! changes reload, authorization failures reload.

use std::time::Duration;

use schola_client::checkout::PurchaseOrder;
use schola_integration_tests::{catalog, rig, BUYER, OTHER_BUYER};
use tokio::time::timeout;

const VALUE: u128 = 900_000_000;

/// Wait until the account cache entry reflects a provider event.
async fn wait_for_account_change(hooks: &schola_client::SessionHooks) {
    let mut rx = hooks
        .account
        .resource()
        .subscribe()
        .expect("account key is fixed");
    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("timely account mutation")
        .expect("channel open");
}

#[tokio::test]
async fn switching_accounts_rekeys_owned_courses() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;
    hooks.owned_courses.ensure().await;

    // The first buyer owns c1.
    let c1 = catalog().remove(0);
    hooks
        .checkout
        .purchase(
            &c1,
            BUYER,
            &PurchaseOrder {
                email: Some("buyer@example.com".to_string()),
                value_wei: VALUE,
            },
        )
        .await
        .expect("purchase");
    assert_eq!(hooks.owned_courses.read().courses.len(), 1);

    // The wallet switches to another account.
    rig.provider.set_accounts(vec![OTHER_BUYER]);
    wait_for_account_change(hooks).await;
    assert_eq!(hooks.account.read().address, Some(OTHER_BUYER));

    // The owned-courses key now names the new account: fresh fetch, empty
    // result, and no leakage from the previous account's entry.
    let owned = hooks.owned_courses.ensure().await;
    assert!(owned.courses.is_empty());
    assert!(owned.cache.has_initial_response);
    assert!(owned.cache.is_empty);
}

#[tokio::test]
async fn switching_back_reuses_the_cached_entry() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;
    hooks.owned_courses.ensure().await;

    let c1 = catalog().remove(0);
    hooks
        .checkout
        .purchase(
            &c1,
            BUYER,
            &PurchaseOrder {
                email: Some("buyer@example.com".to_string()),
                value_wei: VALUE,
            },
        )
        .await
        .expect("purchase");

    rig.provider.set_accounts(vec![OTHER_BUYER]);
    wait_for_account_change(hooks).await;
    hooks.owned_courses.ensure().await;

    rig.provider.set_accounts(vec![BUYER]);
    wait_for_account_change(hooks).await;

    // The original key's entry is still in the store; no refetch needed and
    // the optimistic purchase is still visible.
    let owned = hooks.owned_courses.read();
    assert_eq!(owned.courses.len(), 1);
    assert_eq!(owned.courses[0].id, "c1");
}

#[tokio::test]
async fn locking_the_wallet_empties_the_account() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    hooks.account.ensure().await;

    rig.provider.set_accounts(Vec::new());
    wait_for_account_change(hooks).await;

    let account = hooks.account.read();
    assert_eq!(account.address, None);
    assert!(account.cache.is_empty);

    // With the account gone, the owned-courses key goes inactive again.
    let owned = hooks.owned_courses.read();
    assert!(!owned.cache.has_initial_response);
}

#[tokio::test]
async fn network_change_requests_exactly_one_reload() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");
    let mut notifications = rig.session.bridge().notifications();

    rig.provider.switch_chain(1);
    let notification = timeout(Duration::from_secs(1), notifications.recv())
        .await
        .expect("timely")
        .expect("notification");
    assert_eq!(notification, schola_wallet::WalletNotification::NetworkChanged);
    assert_eq!(rig.reloader.count(), 1);

    // The account entry is untouched by a network change.
    assert!(hooks.account.read().cache.data.is_none());
}

#[tokio::test]
async fn rejected_authorization_requests_reload() {
    let rig = rig(vec![BUYER], &[]);
    rig.provider.set_reject_authorization(true);

    assert!(rig.session.connect().await.is_err());
    assert_eq!(rig.reloader.count(), 1);
}

#[tokio::test]
async fn wallet_info_tracks_connection_state() {
    let rig = rig(vec![BUYER], &[]);
    let hooks = rig.session.hooks().expect("hooks");

    let info = hooks.wallet_info();
    assert!(info.is_connecting);
    assert!(!info.has_connected_wallet);

    hooks.account.ensure().await;
    hooks.network.ensure().await;

    let info = hooks.wallet_info();
    assert!(!info.is_connecting);
    assert!(info.has_connected_wallet, "account present on the target chain");
}
