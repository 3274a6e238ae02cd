//! The injected connection value.

use std::sync::Arc;

use schola_ledger::Marketplace;
use schola_wallet::provider::SharedProvider;

/// The wallet provider and marketplace handle every hook works against.
///
/// Created once per page load and passed to each hook explicitly; nothing in
/// this crate reaches for ambient global state. The provider and its event
/// emitter are shared read-only.
#[derive(Clone)]
pub struct Connection {
    /// The detected wallet provider.
    pub provider: SharedProvider,
    /// The deployed marketplace contract.
    pub marketplace: Arc<dyn Marketplace>,
}

impl Connection {
    pub fn new(provider: SharedProvider, marketplace: Arc<dyn Marketplace>) -> Self {
        Self {
            provider,
            marketplace,
        }
    }
}
