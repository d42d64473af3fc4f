//! Fee engine spawn utilities.
use crate::{
    cli::Args,
    config::FeeConfig,
    metrics,
    poller::FeePoller,
    provider::{GasPriceSource, ProviderExt, is_local_dev_endpoint},
    sources::{
        ArbitrumGasPrices, FeeSources, MeteorologyClient, OptimismGasPrices, PolygonGasStation,
    },
    store::{FeeStore, TracingEvents, WalletAssets},
    types::Network,
};
use alloy::{
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use eyre::OptionExt;
use metrics_exporter_prometheus::PrometheusHandle;
use std::{collections::BTreeMap, path::Path, sync::Arc};
use strum::IntoEnumIterator;
use tracing::{info, warn};

/// Context returned once the fee engine is launched.
#[derive(Debug)]
pub struct FeeEngine {
    /// Poller driving fee updates.
    pub poller: FeePoller,
    /// Store holding the latest fees.
    pub store: FeeStore,
    /// Providers of networks with a configured RPC endpoint.
    pub providers: BTreeMap<Network, DynProvider>,
    /// Metrics exporter handle, if enabled.
    pub metrics: Option<PrometheusHandle>,
}

impl FeeEngine {
    /// Estimates the L1 data fee of a transaction to `to` with `input` on `network` and hands
    /// it to the store.
    pub async fn supply_l1_data_fee(
        &self,
        network: Network,
        to: Address,
        input: Bytes,
    ) -> eyre::Result<()> {
        let provider = self
            .providers
            .get(&network)
            .ok_or_eyre(format!("no rpc endpoint configured for {network}"))?;
        let fee = provider.estimate_l1_fee_for_input(network.chain_id(), to, input).await?;
        info!(%network, %fee, "Estimated L1 data fee");

        self.store.recompute_tx_fee(None, None, Some(fee))?;
        Ok(())
    }
}

/// Attempts to spawn the fee engine using CLI arguments and a configuration file.
///
/// A missing configuration file is created from the CLI arguments.
pub async fn try_spawn_with_args<P: AsRef<Path>>(
    args: Args,
    config_path: P,
    wallet: Arc<dyn WalletAssets>,
) -> eyre::Result<FeeEngine> {
    let config = if !config_path.as_ref().exists() {
        let config = args.merge_fee_config(FeeConfig::default());
        config.save_to_file(&config_path)?;
        config
    } else {
        // File exists: load and override with CLI values.
        args.merge_fee_config(FeeConfig::load_from_file(&config_path)?)
    };

    try_spawn(config, wallet).await
}

/// Spawns the fee engine using the provided [`FeeConfig`].
///
/// Polling is not started, see [`FeePoller::start`].
pub async fn try_spawn(
    config: FeeConfig,
    wallet: Arc<dyn WalletAssets>,
) -> eyre::Result<FeeEngine> {
    let metrics = if config.metrics.enabled {
        Some(metrics::setup_exporter(config.metrics.address).await?)
    } else {
        None
    };

    let providers = Network::iter()
        .filter_map(|network| {
            let url = config.network(network)?.rpc_url.clone()?;
            Some((network, ProviderBuilder::new().connect_http(url).erased()))
        })
        .collect::<BTreeMap<_, _>>();

    let sources = build_sources(&config, &providers);
    for network in Network::iter().filter(|network| sources.get(*network).is_none()) {
        warn!(%network, "No fee source available, configure an rpc endpoint to poll it");
    }

    let store = FeeStore::new(
        config.default_gas_limit,
        wallet,
        Arc::new(TracingEvents),
        config.currency.clone(),
    );

    let mut poller = FeePoller::new(store.clone(), sources);
    for (network, settings) in &config.networks {
        if let Some(interval) = settings.polling_interval {
            poller = poller.with_polling_interval(*network, interval);
        }
    }

    info!(networks = ?providers.keys().collect::<Vec<_>>(), "Spawned fee engine");

    Ok(FeeEngine { poller, store, providers, metrics })
}

/// Routes every network to its fee source.
///
/// Node priced networks are only served if they have a provider.
pub fn build_sources(
    config: &FeeConfig,
    providers: &BTreeMap<Network, DynProvider>,
) -> FeeSources {
    let local_dev_chain = config
        .network(Network::Goerli)
        .and_then(|network| network.rpc_url.as_ref())
        .is_some_and(is_local_dev_endpoint);
    let meteorology = Arc::new(
        MeteorologyClient::new()
            .with_base_url(&config.sources.meteorology_url)
            .with_local_dev_chain(local_dev_chain),
    );
    let polygon =
        Arc::new(PolygonGasStation::new().with_url(&config.sources.polygon_station_url));

    let mut sources = FeeSources::default()
        .with_source(Network::Mainnet, meteorology.clone())
        .with_source(Network::Goerli, meteorology)
        .with_source(Network::Polygon, polygon);

    let provider = |network: Network| {
        providers
            .get(&network)
            .map(|provider| Arc::new(provider.clone()) as Arc<dyn GasPriceSource>)
    };
    if let Some(provider) = provider(Network::Arbitrum) {
        sources =
            sources.with_source(Network::Arbitrum, Arc::new(ArbitrumGasPrices::new(provider)));
    }
    if let Some(provider) = provider(Network::Optimism) {
        sources =
            sources.with_source(Network::Optimism, Arc::new(OptimismGasPrices::new(provider)));
    }

    sources
}
