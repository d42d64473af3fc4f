//! Fee sources, one per network family.

mod arbitrum;
pub use arbitrum::ArbitrumGasPrices;

mod meteorology;
pub use meteorology::{MeteorologyClient, MeteorologyData, MeteorologyResponse};

mod optimism;
pub use optimism::OptimismGasPrices;

mod polygon;
pub use polygon::{PolygonGasStation, PolygonStationPrices};

use crate::{
    error::FetchError,
    types::{ConfirmationTimes, Network, Speed},
};
use alloy::primitives::U256;
use async_trait::async_trait;
use std::{collections::BTreeMap, fmt::Debug, sync::Arc, time::Duration};

/// Suggested fees of a tier on a dynamic base fee network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559TierQuote {
    /// Maximum total fee per gas in wei.
    pub max_fee_per_gas: U256,
    /// Priority fee per gas in wei.
    pub max_priority_fee_per_gas: U256,
}

/// Fee quote of a dynamic base fee network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Quote {
    /// Suggested fees by tier.
    pub tiers: BTreeMap<Speed, Eip1559TierQuote>,
    /// Base fee expected for the next blocks, in wei.
    pub base_fee_suggestion: U256,
    /// Base fee of the latest block, in wei.
    pub current_base_fee: U256,
    /// Base fee trend as reported by the oracle.
    pub trend: i64,
    /// Expected confirmation times by priority fee.
    pub confirmation_time_by_priority_fee: ConfirmationTimes,
}

/// A gas price with its expected wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedWait {
    /// Gas price in wei.
    pub price: U256,
    /// Expected wait.
    pub wait: Duration,
}

impl PricedWait {
    /// Creates a [`PricedWait`] from a wait in minutes.
    pub fn new(price: U256, wait_minutes: f64) -> Self {
        Self { price, wait: Duration::from_secs_f64(wait_minutes * 60.0) }
    }
}

/// Fee quote of a flat gas price network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyQuote {
    /// Cheapest price, if the source distinguishes it.
    pub safe_low: Option<PricedWait>,
    /// Typical price.
    pub average: PricedWait,
    /// Fast price.
    pub fast: PricedWait,
    /// Fastest price, if the source distinguishes it.
    pub fastest: Option<PricedWait>,
}

/// A network native fee quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawQuote {
    /// Base fee plus priority fee.
    Eip1559(Eip1559Quote),
    /// Flat gas price.
    Legacy(LegacyQuote),
}

/// A source of fee quotes.
#[async_trait]
pub trait FeeSource: Debug + Send + Sync {
    /// Fetches the current quote for `network`.
    async fn fetch_quote(&self, network: Network) -> Result<RawQuote, FetchError>;
}

/// Routes every network to the fee source serving it.
#[derive(Debug, Clone, Default)]
pub struct FeeSources {
    sources: BTreeMap<Network, Arc<dyn FeeSource>>,
}

impl FeeSources {
    /// Registers the source serving `network`.
    pub fn with_source(mut self, network: Network, source: Arc<dyn FeeSource>) -> Self {
        self.sources.insert(network, source);
        self
    }

    /// Returns the source serving `network`.
    pub fn get(&self, network: Network) -> Option<Arc<dyn FeeSource>> {
        self.sources.get(&network).cloned()
    }

    /// Networks with a registered source.
    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.sources.keys().copied()
    }
}

/// Parses a decimal or `0x` prefixed wei amount.
pub(crate) fn parse_wei(value: &str) -> Result<U256, FetchError> {
    value.trim().parse().map_err(|_| FetchError::InvalidResponse(format!("invalid amount {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wei_amounts() {
        assert_eq!(parse_wei("1000").unwrap(), U256::from(1000));
        assert_eq!(parse_wei("0x10").unwrap(), U256::from(16));
        assert!(parse_wei("ten").is_err());
    }

    #[test]
    fn waits_in_minutes() {
        assert_eq!(PricedWait::new(U256::ZERO, 0.5).wait, Duration::from_secs(30));
        assert_eq!(PricedWait::new(U256::ZERO, 1.0).wait, Duration::from_secs(60));
    }
}
