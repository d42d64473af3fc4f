use super::{FeeSource, LegacyQuote, PricedWait, RawQuote};
use crate::{
    constants::{L2_AVERAGE_WAIT_MINUTES, L2_FAST_WAIT_MINUTES, L2_SAFE_LOW_WAIT_MINUTES},
    error::FetchError,
    provider::GasPriceSource,
    types::Network,
};
use alloy::primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Quotes the node reported Optimism gas price for every tier.
///
/// The L1 data fee is not part of the quote and must be supplied separately.
#[derive(Debug, Clone)]
pub struct OptimismGasPrices {
    provider: Arc<dyn GasPriceSource>,
}

impl OptimismGasPrices {
    /// Creates a new [`OptimismGasPrices`] reading from `provider`.
    pub fn new(provider: Arc<dyn GasPriceSource>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl FeeSource for OptimismGasPrices {
    #[instrument(skip(self))]
    async fn fetch_quote(&self, network: Network) -> Result<RawQuote, FetchError> {
        if network != Network::Optimism {
            return Err(FetchError::UnsupportedNetwork(network));
        }

        let price = U256::from(self.provider.gas_price().await?);
        debug!(%price, "Optimism node gas price.");

        Ok(RawQuote::Legacy(LegacyQuote {
            safe_low: Some(PricedWait::new(price, L2_SAFE_LOW_WAIT_MINUTES)),
            average: PricedWait::new(price, L2_AVERAGE_WAIT_MINUTES),
            fast: PricedWait::new(price, L2_FAST_WAIT_MINUTES),
            fastest: None,
        }))
    }
}
