use super::{FeeSource, LegacyQuote, PricedWait, RawQuote};
use crate::{
    constants::{
        DEFAULT_POLYGON_STATION_URL, L2_AVERAGE_WAIT_MINUTES, L2_FAST_WAIT_MINUTES,
        L2_SAFE_LOW_WAIT_MINUTES,
    },
    error::FetchError,
    types::Network,
};
use alloy::primitives::U256;
use async_trait::async_trait;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{error, instrument, trace};

/// Gas prices served by the Polygon gas station, in decimal gwei.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolygonStationPrices {
    /// Cheapest price.
    #[serde(rename = "SafeGasPrice")]
    pub safe_gas_price: String,
    /// Proposed price.
    #[serde(rename = "ProposeGasPrice")]
    pub propose_gas_price: String,
    /// Fast price.
    #[serde(rename = "FastGasPrice")]
    pub fast_gas_price: String,
}

impl PolygonStationPrices {
    /// Converts the station prices into a quote.
    ///
    /// Prices are rounded up to the next whole gwei.
    pub fn into_quote(self) -> Result<LegacyQuote, FetchError> {
        Ok(LegacyQuote {
            safe_low: None,
            average: PricedWait::new(ceil_gwei(&self.safe_gas_price)?, L2_SAFE_LOW_WAIT_MINUTES),
            fast: PricedWait::new(ceil_gwei(&self.propose_gas_price)?, L2_AVERAGE_WAIT_MINUTES),
            fastest: Some(PricedWait::new(ceil_gwei(&self.fast_gas_price)?, L2_FAST_WAIT_MINUTES)),
        })
    }
}

/// Station payload, either bare or wrapped in an explorer API envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StationResponse {
    Envelope { result: PolygonStationPrices },
    Bare(PolygonStationPrices),
}

impl From<StationResponse> for PolygonStationPrices {
    fn from(response: StationResponse) -> Self {
        match response {
            StationResponse::Envelope { result } | StationResponse::Bare(result) => result,
        }
    }
}

/// Parses decimal gwei, rounds it up and converts it to wei.
fn ceil_gwei(value: &str) -> Result<U256, FetchError> {
    let gwei = Decimal::from_str(value.trim())
        .ok()
        .filter(|gwei| !gwei.is_sign_negative())
        .and_then(|gwei| gwei.ceil().to_u64())
        .ok_or_else(|| FetchError::InvalidResponse(format!("invalid gas price {value}")))?;
    Ok(U256::from(gwei) * U256::from(1_000_000_000u64))
}

/// Client of the Polygon gas station.
#[derive(Debug, Clone)]
pub struct PolygonGasStation {
    /// HTTP client for making requests.
    client: reqwest::Client,
    /// Station URL.
    url: String,
}

impl Default for PolygonGasStation {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonGasStation {
    /// Creates a new [`PolygonGasStation`].
    pub fn new() -> Self {
        Self { client: reqwest::Client::new(), url: DEFAULT_POLYGON_STATION_URL.to_string() }
    }

    /// Configures the station url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Fetches the current station prices.
    pub async fn get_prices(&self) -> Result<PolygonStationPrices, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .inspect_err(|err| error!(%err, url = %self.url, "Failed to fetch polygon gas station."))?
            .json::<StationResponse>()
            .await?;

        trace!(?response, "Polygon gas station response.");
        Ok(response.into())
    }
}

#[async_trait]
impl FeeSource for PolygonGasStation {
    #[instrument(skip(self))]
    async fn fetch_quote(&self, network: Network) -> Result<RawQuote, FetchError> {
        if network != Network::Polygon {
            return Err(FetchError::UnsupportedNetwork(network));
        }
        Ok(RawQuote::Legacy(self.get_prices().await?.into_quote()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gwei(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000_000u64)
    }

    #[test]
    fn rounds_prices_up() {
        let prices: PolygonStationPrices = serde_json::from_str(
            r#"{"SafeGasPrice": "30.2", "ProposeGasPrice": "35.8", "FastGasPrice": "40.1"}"#,
        )
        .unwrap();
        let quote = prices.into_quote().unwrap();

        assert_eq!(quote.average.price, gwei(31));
        assert_eq!(quote.fast.price, gwei(36));
        assert_eq!(quote.fastest.unwrap().price, gwei(41));
        assert_eq!(quote.safe_low, None);
        assert_eq!(quote.average.wait, Duration::from_secs(60));
    }

    #[test]
    fn whole_prices_are_kept() {
        assert_eq!(ceil_gwei("30").unwrap(), gwei(30));
        assert_eq!(ceil_gwei("30.0").unwrap(), gwei(30));
        assert!(ceil_gwei("-1").is_err());
        assert!(ceil_gwei("cheap").is_err());
    }

    #[test]
    fn explorer_envelope() {
        let response: StationResponse = serde_json::from_str(
            r#"{
                "status": "1",
                "message": "OK",
                "result": {
                    "LastBlock": "50000000",
                    "SafeGasPrice": "30.2",
                    "ProposeGasPrice": "35.8",
                    "FastGasPrice": "40.1"
                }
            }"#,
        )
        .unwrap();
        let prices = PolygonStationPrices::from(response);
        assert_eq!(prices.propose_gas_price, "35.8");
    }

    #[tokio::test]
    async fn rejects_other_networks() {
        assert!(matches!(
            PolygonGasStation::new().fetch_quote(Network::Mainnet).await,
            Err(FetchError::UnsupportedNetwork(Network::Mainnet))
        ));
    }
}
