use super::{Eip1559Quote, Eip1559TierQuote, FeeSource, RawQuote, parse_wei};
use crate::{
    constants::{DEFAULT_METEOROLOGY_URL, LOCAL_DEV_CHAIN_BASE_FEE_GWEI},
    error::FetchError,
    types::{ConfirmationTimes, Network, Speed},
};
use alloy::primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, instrument, trace};

/// Response of the meteorology endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeteorologyResponse {
    /// Fee data.
    pub data: MeteorologyData,
}

/// Fee data served by the meteorology endpoint. Amounts are decimal wei strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeteorologyData {
    /// Base fee expected for the next blocks.
    pub base_fee_suggestion: String,
    /// `-1` falling, `0` stable, `1` rising, `2` surging.
    #[serde(default)]
    pub base_fee_trend: i64,
    /// Base fee of the latest block.
    pub current_base_fee: String,
    /// Suggested priority fee by tier (`normal`, `fast`, `urgent`).
    pub max_priority_fee_suggestions: HashMap<String, String>,
    /// Priority fee needed to be included within a number of seconds.
    #[serde(default)]
    pub confirmation_time_by_priority_fee: HashMap<String, String>,
    /// Average block time.
    #[serde(default)]
    pub seconds_per_new_block: Option<u64>,
}

impl MeteorologyData {
    /// Converts the payload into a quote.
    pub fn into_quote(self) -> Result<Eip1559Quote, FetchError> {
        let base_fee_suggestion = parse_wei(&self.base_fee_suggestion)?;
        let current_base_fee = parse_wei(&self.current_base_fee)?;

        let mut tiers = BTreeMap::new();
        for (speed, priority_fee) in &self.max_priority_fee_suggestions {
            let Ok(speed) = speed.parse::<Speed>() else {
                trace!(%speed, "Skipping unknown tier.");
                continue;
            };
            if speed == Speed::Custom {
                continue;
            }
            let max_priority_fee_per_gas = parse_wei(priority_fee)?;
            tiers.insert(
                speed,
                Eip1559TierQuote {
                    max_fee_per_gas: base_fee_suggestion + max_priority_fee_per_gas,
                    max_priority_fee_per_gas,
                },
            );
        }

        let confirmation_time_by_priority_fee = self
            .confirmation_time_by_priority_fee
            .iter()
            .map(|(secs, fee)| {
                let secs = secs.parse::<u64>().map_err(|_| {
                    FetchError::InvalidResponse(format!("invalid confirmation time {secs}"))
                })?;
                Ok((secs, parse_wei(fee)?))
            })
            .collect::<Result<ConfirmationTimes, FetchError>>()?;

        Ok(Eip1559Quote {
            tiers,
            base_fee_suggestion,
            current_base_fee,
            trend: self.base_fee_trend,
            confirmation_time_by_priority_fee,
        })
    }
}

/// Client of the meteorology endpoint serving EIP-1559 fee suggestions.
#[derive(Debug, Clone)]
pub struct MeteorologyClient {
    /// HTTP client for making requests.
    client: reqwest::Client,
    /// Base URL, the network name is appended.
    base_url: String,
    /// Whether the test network is served by a local development chain.
    local_dev_chain: bool,
}

impl Default for MeteorologyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MeteorologyClient {
    /// Creates a new [`MeteorologyClient`].
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_METEOROLOGY_URL.to_string(),
            local_dev_chain: false,
        }
    }

    /// Configures the base url.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Marks the test network as served by a local development chain.
    pub fn with_local_dev_chain(mut self, local_dev_chain: bool) -> Self {
        self.local_dev_chain = local_dev_chain;
        self
    }

    /// Fetches the fee data for `network`.
    pub async fn get_fees(&self, network: Network) -> Result<MeteorologyData, FetchError> {
        let url = format!("{}/{network}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .inspect_err(|err| error!(%err, %url, "Failed to fetch meteorology data."))?
            .json::<MeteorologyResponse>()
            .await?;

        trace!(?response, "Meteorology response.");
        Ok(response.data)
    }
}

/// Forces a base fee high enough to cover the real base fee of a forked chain.
fn apply_local_dev_chain_override(quote: &mut Eip1559Quote) {
    let base_fee = U256::from(LOCAL_DEV_CHAIN_BASE_FEE_GWEI) * U256::from(1_000_000_000u64);
    debug!(%base_fee, "Overriding base fee for local development chain.");

    quote.base_fee_suggestion = base_fee;
    quote.current_base_fee = base_fee;
    for tier in quote.tiers.values_mut() {
        tier.max_fee_per_gas = base_fee + tier.max_priority_fee_per_gas;
    }
}

#[async_trait]
impl FeeSource for MeteorologyClient {
    #[instrument(skip(self))]
    async fn fetch_quote(&self, network: Network) -> Result<RawQuote, FetchError> {
        if !network.supports_eip1559() {
            return Err(FetchError::UnsupportedNetwork(network));
        }

        let mut quote = self.get_fees(network).await?.into_quote()?;
        if network == Network::Goerli && self.local_dev_chain {
            apply_local_dev_chain_override(&mut quote);
        }

        Ok(RawQuote::Eip1559(quote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gwei(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000_000u64)
    }

    fn payload() -> MeteorologyResponse {
        serde_json::from_str(
            r#"{
                "data": {
                    "baseFeeSuggestion": "30000000000",
                    "baseFeeTrend": 1,
                    "currentBaseFee": "28000000000",
                    "maxPriorityFeeSuggestions": {
                        "normal": "1000000000",
                        "fast": "1500000000",
                        "urgent": "2000000000"
                    },
                    "confirmationTimeByPriorityFee": {
                        "15": "2000000000",
                        "30": "1500000000",
                        "45": "1000000000",
                        "60": "500000000"
                    },
                    "secondsPerNewBlock": 12
                },
                "meta": { "blockNumber": 1 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_payload() {
        let quote = payload().data.into_quote().unwrap();

        assert_eq!(quote.base_fee_suggestion, U256::from(30_000_000_000u64));
        assert_eq!(quote.current_base_fee, U256::from(28_000_000_000u64));
        assert_eq!(quote.trend, 1);
        assert_eq!(quote.tiers.len(), 3);

        let urgent = &quote.tiers[&Speed::Urgent];
        assert_eq!(urgent.max_priority_fee_per_gas, U256::from(2_000_000_000u64));
        assert_eq!(urgent.max_fee_per_gas, U256::from(32_000_000_000u64));

        assert_eq!(quote.confirmation_time_by_priority_fee[&15], U256::from(2_000_000_000u64));
        assert_eq!(quote.confirmation_time_by_priority_fee.len(), 4);
    }

    #[test]
    fn rejects_malformed_amounts() {
        let mut data = payload().data;
        data.base_fee_suggestion = "lots".to_string();
        assert!(matches!(data.into_quote(), Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn local_dev_chain_override() {
        let mut quote = payload().data.into_quote().unwrap();
        apply_local_dev_chain_override(&mut quote);

        assert_eq!(quote.base_fee_suggestion, gwei(1000));
        assert_eq!(quote.current_base_fee, gwei(1000));
        assert_eq!(quote.tiers[&Speed::Normal].max_fee_per_gas, gwei(1001));
    }

    #[tokio::test]
    async fn rejects_l2_networks() {
        let client = MeteorologyClient::new();
        assert!(matches!(
            client.fetch_quote(Network::Arbitrum).await,
            Err(FetchError::UnsupportedNetwork(Network::Arbitrum))
        ));
    }
}
