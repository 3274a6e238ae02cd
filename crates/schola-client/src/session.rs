//! Session wiring.
//!
//! One [`ClientSession`] exists per page load. It owns the bridge, the
//! shared resource store, and every hook; nothing else holds ambient state.
//! Dropping the session tears the listener tasks down with it.

use std::sync::Arc;

use anyhow::Context;
use schola_cache::ResourceStore;
use schola_ledger::Marketplace;
use schola_types::course::CatalogCourse;
use schola_types::Address;
use schola_wallet::provider::SharedProvider;
use schola_wallet::{Reloader, WalletBridge};

use crate::admin::AdminDesk;
use crate::checkout::Checkout;
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::hooks::account::{AccountHook, AdminAllowlist};
use crate::hooks::managed::ManagedCoursesHook;
use crate::hooks::network::NetworkHook;
use crate::hooks::owned::{OwnedCourseHook, OwnedCoursesHook};
use crate::hooks::wallet_info::{wallet_info, WalletInfo};
use crate::notify::TxNotifier;
use crate::price::{PriceHook, RateSource};

/// Hooks available once a wallet provider was detected.
pub struct SessionHooks {
    pub connection: Connection,
    pub account: AccountHook,
    pub network: NetworkHook,
    pub owned_courses: OwnedCoursesHook,
    pub managed_courses: ManagedCoursesHook,
    pub checkout: Checkout,
    pub admin: AdminDesk,
}

impl SessionHooks {
    /// Combined wallet status.
    pub fn wallet_info(&self) -> WalletInfo {
        wallet_info(&self.account, &self.network)
    }
}

/// Everything the UI needs for one page load.
pub struct ClientSession {
    store: ResourceStore,
    config: ClientConfig,
    catalog: Arc<Vec<CatalogCourse>>,
    bridge: WalletBridge,
    notifier: TxNotifier,
    price: PriceHook,
    hooks: Option<SessionHooks>,
}

impl ClientSession {
    /// Wire up a session from the detection outcome and its collaborators.
    /// Must be called within a tokio runtime (listener tasks are spawned).
    pub fn bootstrap(
        provider: Option<SharedProvider>,
        marketplace: Arc<dyn Marketplace>,
        reloader: Arc<dyn Reloader>,
        rate_source: Arc<dyn RateSource>,
        catalog: Vec<CatalogCourse>,
        config: ClientConfig,
    ) -> anyhow::Result<Self> {
        let store = ResourceStore::new();
        let notifier = TxNotifier::default();
        let catalog = Arc::new(catalog);
        let allowlist = Arc::new(
            AdminAllowlist::from_hex(&config.admin.allowlist)
                .context("parsing admin allow-list digests")?,
        );
        let price = PriceHook::new(
            store.clone(),
            rate_source,
            config.pricing.course_price_usd,
        );

        let bridge = WalletBridge::detect(provider, reloader);
        let hooks = match bridge.provider() {
            Some(provider) => {
                let connection = Connection::new(provider, marketplace);
                let account = AccountHook::new(
                    store.clone(),
                    &connection,
                    bridge.notifications(),
                    allowlist.clone(),
                );
                let network =
                    NetworkHook::new(store.clone(), &connection, config.network.target_chain_id)
                        .context("resolving target network")?;
                let owned_courses = OwnedCoursesHook::new(
                    store.clone(),
                    &connection,
                    catalog.clone(),
                    account.resource().clone(),
                );
                let managed_courses = ManagedCoursesHook::new(
                    store.clone(),
                    &connection,
                    account.resource().clone(),
                    allowlist.clone(),
                );
                let checkout =
                    Checkout::new(connection.clone(), owned_courses.clone(), notifier.clone());
                let admin = AdminDesk::new(connection.clone(), notifier.clone());
                Some(SessionHooks {
                    connection,
                    account,
                    network,
                    owned_courses,
                    managed_courses,
                    checkout,
                    admin,
                })
            }
            None => None,
        };

        Ok(Self {
            store,
            config,
            catalog,
            bridge,
            notifier,
            price,
            hooks,
        })
    }

    /// The shared resource store.
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The course catalog this session serves.
    pub fn catalog(&self) -> &[CatalogCourse] {
        &self.catalog
    }

    /// The wallet bridge.
    pub fn bridge(&self) -> &WalletBridge {
        &self.bridge
    }

    /// True iff no wallet extension was found.
    pub fn require_install(&self) -> bool {
        self.bridge.require_install()
    }

    /// Request wallet authorization (see [`WalletBridge::connect`]).
    pub async fn connect(&self) -> schola_wallet::Result<Vec<Address>> {
        self.bridge.connect().await
    }

    /// The transaction notice bus.
    pub fn notifier(&self) -> &TxNotifier {
        &self.notifier
    }

    /// The ETH price hook.
    pub fn price(&self) -> &PriceHook {
        &self.price
    }

    /// Provider-backed hooks; `None` when the extension is missing.
    pub fn hooks(&self) -> Option<&SessionHooks> {
        self.hooks.as_ref()
    }

    /// Build a single-course ownership hook (one per course page).
    pub fn owned_course(&self, course: CatalogCourse) -> Option<OwnedCourseHook> {
        let hooks = self.hooks.as_ref()?;
        Some(OwnedCourseHook::new(
            self.store.clone(),
            &hooks.connection,
            course,
            hooks.account.resource().clone(),
        ))
    }
}
