//! ETH price peer cache.
//!
//! A cache entry like any other resource, fed by a pluggable rate source.
//! Rates are carried in micro-USD per ETH and all conversion is integer
//! arithmetic; the embedding application decides how often to call
//! `revalidate` (see `pricing.refresh_interval_secs` in the config).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use schola_cache::{resource::fetcher, BoxFuture, FetchError, Resource, ResourceStore, Snapshot};
use schola_types::{units, MICRO_USD_PER_USD, WEI_PER_ETH};

/// Cache key for the ETH/USD rate.
pub const PRICE_KEY: &str = "price/eth-usd";

/// Default stub rate: 1 ETH = 3000 USD.
pub const DEFAULT_USD_PER_ETH_MICRO: u64 = 3_000 * MICRO_USD_PER_USD;

/// Source of the ETH/USD exchange rate, in micro-USD per ETH.
pub trait RateSource: Send + Sync {
    fn usd_per_eth_micro(&self) -> BoxFuture<Result<u64, FetchError>>;
}

/// Fixed-rate source used until a real feed is wired in.
#[derive(Clone)]
pub struct StubRateSource {
    rate: Arc<AtomicU64>,
}

impl StubRateSource {
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_USD_PER_ETH_MICRO)
    }

    pub fn with_rate(rate_micro_usd: u64) -> Self {
        Self {
            rate: Arc::new(AtomicU64::new(rate_micro_usd)),
        }
    }

    /// Adjust the rate (development/testing only).
    pub fn dev_set_rate(&self, rate_micro_usd: u64) {
        tracing::warn!(new_rate = rate_micro_usd, "stub rate source: rate changed (dev only)");
        self.rate.store(rate_micro_usd, Ordering::SeqCst);
    }
}

impl Default for StubRateSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RateSource for StubRateSource {
    fn usd_per_eth_micro(&self) -> BoxFuture<Result<u64, FetchError>> {
        let rate = self.rate.load(Ordering::SeqCst);
        Box::pin(async move { Ok(rate) })
    }
}

/// Wei equivalent of a whole-USD price at the given rate. `None` on a zero
/// rate.
pub fn usd_to_wei(price_usd: u64, usd_per_eth_micro: u64) -> Option<u128> {
    if usd_per_eth_micro == 0 {
        return None;
    }
    let price_micro = (price_usd as u128).checked_mul(MICRO_USD_PER_USD as u128)?;
    price_micro
        .checked_mul(WEI_PER_ETH)
        .map(|n| n / usd_per_eth_micro as u128)
}

/// Derived view of the price resource.
#[derive(Debug, Clone)]
pub struct PriceView {
    /// Current rate in micro-USD per ETH, once fetched.
    pub usd_per_eth_micro: Option<u64>,
    /// Course list price converted to wei at the current rate.
    pub per_item_wei: Option<u128>,
    /// The same amount as an exact ETH decimal string.
    pub per_item_eth: Option<String>,
    /// Raw cache snapshot.
    pub cache: Snapshot,
}

/// Binds the ETH/USD rate to the cache and derives per-course pricing.
pub struct PriceHook {
    resource: Resource,
    course_price_usd: u64,
}

impl PriceHook {
    pub fn new(store: ResourceStore, source: Arc<dyn RateSource>, course_price_usd: u64) -> Self {
        let resource = Resource::keyed(
            store,
            PRICE_KEY,
            fetcher(move || {
                let source = source.clone();
                async move {
                    let rate = source.usd_per_eth_micro().await?;
                    Ok(serde_json::Value::from(rate))
                }
            }),
        );
        Self {
            resource,
            course_price_usd,
        }
    }

    /// Read the current view, fetching on first observation.
    pub async fn ensure(&self) -> PriceView {
        let snapshot = self.resource.ensure().await;
        self.view(snapshot)
    }

    /// Read the current view without fetching.
    pub fn read(&self) -> PriceView {
        self.view(self.resource.read())
    }

    /// Refresh the rate.
    pub async fn revalidate(&self) -> PriceView {
        let snapshot = self.resource.revalidate().await;
        self.view(snapshot)
    }

    fn view(&self, cache: Snapshot) -> PriceView {
        let usd_per_eth_micro = cache.data_as::<u64>();
        let per_item_wei =
            usd_per_eth_micro.and_then(|rate| usd_to_wei(self.course_price_usd, rate));
        let per_item_eth = per_item_wei.map(units::format_eth);
        PriceView {
            usd_per_eth_micro,
            per_item_wei,
            per_item_eth,
            cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_to_wei_exact() {
        // 15 USD at 3000 USD/ETH is exactly 0.005 ETH.
        let wei = usd_to_wei(15, DEFAULT_USD_PER_ETH_MICRO).expect("rate");
        assert_eq!(wei, WEI_PER_ETH / 200);
        assert_eq!(units::format_eth(wei), "0.005");
    }

    #[test]
    fn test_usd_to_wei_zero_rate() {
        assert_eq!(usd_to_wei(15, 0), None);
    }

    #[tokio::test]
    async fn test_price_hook_derives_per_item() {
        let hook = PriceHook::new(
            ResourceStore::new(),
            Arc::new(StubRateSource::new()),
            15,
        );
        let view = hook.ensure().await;
        assert_eq!(view.usd_per_eth_micro, Some(DEFAULT_USD_PER_ETH_MICRO));
        assert_eq!(view.per_item_eth.as_deref(), Some("0.005"));
    }

    #[tokio::test]
    async fn test_revalidate_picks_up_new_rate() {
        let source = StubRateSource::new();
        let hook = PriceHook::new(ResourceStore::new(), Arc::new(source.clone()), 15);
        hook.ensure().await;

        source.dev_set_rate(1_500 * MICRO_USD_PER_USD);
        let view = hook.revalidate().await;
        assert_eq!(view.per_item_eth.as_deref(), Some("0.01"));
    }
}
