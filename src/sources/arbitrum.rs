use super::{FeeSource, LegacyQuote, PricedWait, RawQuote};
use crate::{
    constants::{
        ARBITRUM_AVERAGE_MULTIPLIER, ARBITRUM_FAST_MULTIPLIER, ARBITRUM_SAFE_LOW_MULTIPLIER,
        L2_AVERAGE_WAIT_MINUTES, L2_FAST_WAIT_MINUTES, L2_SAFE_LOW_WAIT_MINUTES,
    },
    error::FetchError,
    provider::GasPriceSource,
    types::Network,
};
use alloy::primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Derives Arbitrum tiers from the node reported gas price.
#[derive(Debug, Clone)]
pub struct ArbitrumGasPrices {
    provider: Arc<dyn GasPriceSource>,
}

impl ArbitrumGasPrices {
    /// Creates a new [`ArbitrumGasPrices`] reading from `provider`.
    pub fn new(provider: Arc<dyn GasPriceSource>) -> Self {
        Self { provider }
    }

    /// Scales the node price down into tiers.
    pub fn quote_from_price(price: U256) -> LegacyQuote {
        let scaled = |percent: u64| price * U256::from(percent) / U256::from(100);
        LegacyQuote {
            safe_low: Some(PricedWait::new(
                scaled(ARBITRUM_SAFE_LOW_MULTIPLIER),
                L2_SAFE_LOW_WAIT_MINUTES,
            )),
            average: PricedWait::new(scaled(ARBITRUM_AVERAGE_MULTIPLIER), L2_AVERAGE_WAIT_MINUTES),
            fast: PricedWait::new(scaled(ARBITRUM_FAST_MULTIPLIER), L2_FAST_WAIT_MINUTES),
            fastest: None,
        }
    }
}

#[async_trait]
impl FeeSource for ArbitrumGasPrices {
    #[instrument(skip(self))]
    async fn fetch_quote(&self, network: Network) -> Result<RawQuote, FetchError> {
        if network != Network::Arbitrum {
            return Err(FetchError::UnsupportedNetwork(network));
        }

        let price = U256::from(self.provider.gas_price().await?);
        debug!(%price, "Arbitrum node gas price.");

        Ok(RawQuote::Legacy(Self::quote_from_price(price)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug)]
    struct FixedPrice(u128);

    #[async_trait]
    impl GasPriceSource for FixedPrice {
        async fn gas_price(&self) -> Result<u128, FetchError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn scales_node_price() {
        let source = ArbitrumGasPrices::new(Arc::new(FixedPrice(1_000_000_000)));
        let RawQuote::Legacy(quote) = source.fetch_quote(Network::Arbitrum).await.unwrap() else {
            panic!("expected a legacy quote");
        };

        assert_eq!(quote.fast.price, U256::from(700_000_000u64));
        assert_eq!(quote.average.price, U256::from(500_000_000u64));
        assert_eq!(quote.safe_low.unwrap().price, U256::from(400_000_000u64));
        assert_eq!(quote.fastest, None);

        assert_eq!(quote.fast.wait, Duration::from_secs(12));
        assert_eq!(quote.average.wait, Duration::from_secs(30));
        assert_eq!(quote.safe_low.unwrap().wait, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn rejects_other_networks() {
        let source = ArbitrumGasPrices::new(Arc::new(FixedPrice(1)));
        assert!(source.fetch_quote(Network::Optimism).await.is_err());
    }
}
