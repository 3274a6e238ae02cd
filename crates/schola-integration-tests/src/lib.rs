//! Shared helpers for integration scenarios.

use std::sync::Arc;

use schola_client::config::ClientConfig;
use schola_client::price::StubRateSource;
use schola_client::ClientSession;
use schola_ledger::MemoryMarketplace;
use schola_proof::admin_digest;
use schola_types::course::CatalogCourse;
use schola_types::Address;
use schola_wallet::{CountingReloader, StubProvider};

/// Contract administrator account.
pub const ADMIN: Address = Address([0xad; 20]);
/// First buyer account.
pub const BUYER: Address = Address([0x01; 20]);
/// Second buyer account.
pub const OTHER_BUYER: Address = Address([0x02; 20]);

/// Ganache, the default target chain.
pub const CHAIN_ID: u64 = 1337;

/// Initialize test logging once; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A two-course catalog: `c1` and `c2`.
pub fn catalog() -> Vec<CatalogCourse> {
    vec![
        CatalogCourse {
            id: "c1".to_string(),
            slug: "intro-to-solidity".to_string(),
            title: "Intro to Solidity".to_string(),
            price_usd: 15,
        },
        CatalogCourse {
            id: "c2".to_string(),
            slug: "advanced-evm".to_string(),
            title: "Advanced EVM".to_string(),
            price_usd: 15,
        },
    ]
}

/// A fully wired session over stub collaborators.
pub struct TestRig {
    pub session: ClientSession,
    pub provider: Arc<StubProvider>,
    pub marketplace: MemoryMarketplace,
    pub reloader: Arc<CountingReloader>,
}

/// Boot a session with the given wallet accounts; `admins` go into the
/// hashed allow-list (digests only, as in production config).
pub fn rig(accounts: Vec<Address>, admins: &[Address]) -> TestRig {
    init_tracing();
    let provider = Arc::new(StubProvider::with_accounts(CHAIN_ID, accounts));
    let marketplace = MemoryMarketplace::new(ADMIN);
    let reloader = Arc::new(CountingReloader::new());

    let mut config = ClientConfig::default();
    config.admin.allowlist = admins
        .iter()
        .map(|a| admin_digest(a).to_string())
        .collect();

    let session = ClientSession::bootstrap(
        Some(provider.clone()),
        Arc::new(marketplace.clone()),
        reloader.clone(),
        Arc::new(StubRateSource::new()),
        catalog(),
        config,
    )
    .expect("session bootstrap");

    TestRig {
        session,
        provider,
        marketplace,
        reloader,
    }
}
