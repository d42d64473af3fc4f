//! Fee engine configuration.

use crate::{
    constants::{DEFAULT_GAS_LIMIT, DEFAULT_METEOROLOGY_URL, DEFAULT_POLYGON_STATION_URL},
    types::{NativeCurrency, Network},
};
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};
use url::Url;

/// Fee engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Gas limit fees are estimated for until a transaction supplies one.
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,
    /// Currency fee values are displayed in.
    #[serde(default)]
    pub currency: NativeCurrency,
    /// Fee oracle endpoints.
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Per network settings.
    #[serde(default)]
    pub networks: BTreeMap<Network, NetworkConfig>,
    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

const fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            default_gas_limit: DEFAULT_GAS_LIMIT,
            currency: NativeCurrency::default(),
            sources: SourcesConfig::default(),
            networks: BTreeMap::new(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl FeeConfig {
    /// Sets the default gas limit.
    pub fn with_default_gas_limit(mut self, default_gas_limit: u64) -> Self {
        self.default_gas_limit = default_gas_limit;
        self
    }

    /// Sets the display currency.
    pub fn with_currency(mut self, currency: NativeCurrency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the meteorology endpoint.
    pub fn with_meteorology_url(mut self, url: Option<Url>) -> Self {
        if let Some(url) = url {
            self.sources.meteorology_url = url.to_string();
        }
        self
    }

    /// Sets the Polygon gas station endpoint.
    pub fn with_polygon_station_url(mut self, url: Option<Url>) -> Self {
        if let Some(url) = url {
            self.sources.polygon_station_url = url.to_string();
        }
        self
    }

    /// Sets the RPC endpoints of networks.
    pub fn with_rpc_urls(mut self, urls: &[(Network, Url)]) -> Self {
        for (network, url) in urls {
            self.networks.entry(*network).or_default().rpc_url = Some(url.clone());
        }
        self
    }

    /// Overrides the polling interval of a network.
    pub fn with_polling_interval(mut self, network: Network, interval: Option<Duration>) -> Self {
        if let Some(interval) = interval {
            self.networks.entry(network).or_default().polling_interval = Some(interval);
        }
        self
    }

    /// Sets the metrics address.
    pub fn with_metrics_address(mut self, address: Option<SocketAddr>) -> Self {
        if let Some(address) = address {
            self.metrics.address = address;
        }
        self
    }

    /// Enables or disables the metrics exporter.
    pub fn with_metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics.enabled = enabled;
        self
    }

    /// Settings of `network`, if any.
    pub fn network(&self, network: Network) -> Option<&NetworkConfig> {
        self.networks.get(&network)
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Fee oracle endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Meteorology endpoint, the network name is appended.
    pub meteorology_url: String,
    /// Polygon gas station endpoint.
    pub polygon_station_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            meteorology_url: DEFAULT_METEOROLOGY_URL.to_string(),
            polygon_station_url: DEFAULT_POLYGON_STATION_URL.to_string(),
        }
    }
}

/// Settings of a single network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint, required by node priced networks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<Url>,
    /// Polling interval override.
    #[serde(
        rename = "polling_interval_ms",
        with = "crate::serde::duration_millis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub polling_interval: Option<Duration>,
}

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to serve Prometheus metrics.
    pub enabled: bool,
    /// Address to serve metrics on.
    pub address: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: false, address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9000) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml() {
        let config: FeeConfig = serde_yaml::from_str(
            r#"
networks:
  arbitrum:
    rpc_url: https://arb1.arbitrum.io/rpc
    polling_interval_ms: 1500
  polygon: {}
"#,
        )
        .unwrap();

        assert_eq!(config.default_gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.currency, NativeCurrency::default());
        assert_eq!(config.sources, SourcesConfig::default());

        let arbitrum = config.network(Network::Arbitrum).unwrap();
        assert_eq!(
            arbitrum.rpc_url.as_ref().map(Url::as_str),
            Some("https://arb1.arbitrum.io/rpc")
        );
        assert_eq!(arbitrum.polling_interval, Some(Duration::from_millis(1500)));
        assert_eq!(config.network(Network::Polygon), Some(&NetworkConfig::default()));
        assert_eq!(config.network(Network::Mainnet), None);
    }

    #[test]
    fn builder_overrides() {
        let url: Url = "http://localhost:8545".parse().unwrap();
        let config = FeeConfig::default()
            .with_rpc_urls(&[(Network::Goerli, url.clone())])
            .with_polling_interval(Network::Goerli, Some(Duration::from_secs(1)))
            .with_polling_interval(Network::Mainnet, None)
            .with_meteorology_url(None);

        let goerli = config.network(Network::Goerli).unwrap();
        assert_eq!(goerli.rpc_url, Some(url));
        assert_eq!(goerli.polling_interval, Some(Duration::from_secs(1)));
        assert!(config.network(Network::Mainnet).is_none());
        assert_eq!(config.sources.meteorology_url, DEFAULT_METEOROLOGY_URL);
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("gas-fees-{}.yaml", std::process::id()));
        let config = FeeConfig::default().with_default_gas_limit(50_000);

        config.save_to_file(&path).unwrap();
        let loaded = FeeConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }
}
